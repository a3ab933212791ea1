//! Reusable engine components.

pub mod aggregate;
pub mod dlq;
pub mod domain;
pub mod service;
pub mod sink;
pub mod source;
pub mod time;
