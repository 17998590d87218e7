//! Observability
//!
//! Logging, metrics, and the JSONL game event stream.

pub mod events;
pub mod logging;
pub mod metrics;

pub use events::{EndReason, Event, EventEmitter};
pub use logging::{LogFormat, LogSettings, init_logging};
pub use metrics::init_metrics;
