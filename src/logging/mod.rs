//! Logging infrastructure for console output.

mod buffered;
mod logger;
mod subscriber;
mod types;

pub use buffered::{BufferedLog, LogEntry};
pub use logger::Logger;
pub use subscriber::{LOG_FILTER_ENV, init_subscriber};
pub use types::{Log, LogLevel};
