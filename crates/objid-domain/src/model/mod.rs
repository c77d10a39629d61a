//! App record data model.

mod log;
mod record;

pub use log::{append_bounded, recent_window, LogEntry, RECENT_LOG_WINDOW_MS};
pub use record::{is_extended_type, AppRecord, AuthorizationDescriptor, IdRange};
