//! Powerpos - Intra-day power position extraction and reporting.
//!
//! # Architecture
//!
//! ```text
//! src/
//! ├── core/             # Reusable engine components
//! │   ├── domain/       # Pure domain types
//! │   ├── time/         # Trading-day calendar + clock capability
//! │   ├── aggregate/    # Hourly position aggregation
//! │   ├── source/       # Trade source capability + adapters
//! │   ├── sink/         # Report + audit CSV sinks
//! │   ├── dlq/          # Persistent dead-letter queue
//! │   └── service/      # Extraction runner + scheduler
//! └── app/              # Configuration and capability wiring
//! ```
//!
//! The engine consumes capabilities (`TradeSource`, `Clock`, `ReportSink`,
//! `AuditSink`, `DeadLetterQueue`) wired by the `app` orchestrator; nothing
//! beyond those seams is shared between components.

pub mod app;
pub mod cli;
pub mod core;
pub mod error;
