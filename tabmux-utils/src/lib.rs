//! tabmux-utils: Common utilities shared by the tabmux crates
//!
//! Provides the unified error type, logging setup, and XDG path helpers.

pub mod error;
pub mod logging;
pub mod paths;

pub use error::{Result, TabmuxError};
pub use logging::{init_logging, init_logging_with_config, LogConfig, LogOutput};
pub use paths::{config_file, ensure_dir, log_dir, runtime_dir, socket_path};
