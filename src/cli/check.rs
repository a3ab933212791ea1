//! `check` subcommand: config validation plus a health report.

use anyhow::Result;

use crate::app::{health_check, Config};

/// Print the health report; returns an error when a probe fails so the
/// process exits non-zero.
pub fn run(config: &Config) -> Result<()> {
    let report = health_check(config);

    for (name, result) in &report.checks {
        match result {
            Ok(()) => println!("ok    {name}"),
            Err(reason) => println!("FAIL  {name} ({reason})"),
        }
    }

    if report.is_healthy() {
        println!("configuration healthy");
        Ok(())
    } else {
        anyhow::bail!("configuration unhealthy");
    }
}
