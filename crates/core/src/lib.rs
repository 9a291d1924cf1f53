pub mod config;
pub mod discover;
pub mod entry;
pub mod error;
pub mod logging;
pub mod parser;

pub use config::{Config, FileLoggingConfig, LoggingConfig, WindowConfig};
pub use discover::{count_lines, find_transcript};
pub use entry::{Entry, MediaKind, MediaRef, normalize_line};
pub use error::{Error, Result};
pub use parser::{EntryParser, ProgressSink};
