//! Optional logger bootstrap for hosts that do not bring their own.

mod init;

pub use init::{init_logging, LoggingConfig};
