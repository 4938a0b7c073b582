//! Error observability: where request failures are reported.
//!
//! Sinks are fire-and-forget. [`ErrorSink::record`] returns nothing, so a broken sink can never
//! turn a handled failure into a new one.

mod entry;
mod log_store;
mod sinks;

pub use entry::{ErrorEntry, RequestContext};
pub use log_store::{ErrorLogQuery, ErrorLogStore, parse_instant};
pub use sinks::{ErrorSink, FanoutSink, LogSink};
