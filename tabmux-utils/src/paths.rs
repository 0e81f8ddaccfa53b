//! Path utilities for tabmux
//!
//! Handles XDG Base Directory specification compliance for config,
//! state, and runtime directories.

use std::path::PathBuf;

use directories::ProjectDirs;

/// Application identifier for XDG directories
const APP_NAME: &str = "tabmux";

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", APP_NAME)
}

/// Get the Unix socket path for tab-broker communication
///
/// Location: `$XDG_RUNTIME_DIR/tabmux/tabmux.sock` or `/tmp/tabmux-$UID/tabmux.sock`
pub fn socket_path() -> PathBuf {
    runtime_dir().join("tabmux.sock")
}

/// Get the runtime directory
///
/// Location: `$XDG_RUNTIME_DIR/tabmux` or `/tmp/tabmux-$UID`
pub fn runtime_dir() -> PathBuf {
    if let Ok(xdg_runtime) = std::env::var("XDG_RUNTIME_DIR") {
        PathBuf::from(xdg_runtime).join(APP_NAME)
    } else {
        // Fallback to /tmp with UID for security
        // SAFETY: getuid() is always safe to call
        let uid = unsafe { libc::getuid() };
        PathBuf::from(format!("/tmp/{}-{}", APP_NAME, uid))
    }
}

/// Get the configuration directory
///
/// Location: `$XDG_CONFIG_HOME/tabmux` or `~/.config/tabmux`
pub fn config_dir() -> PathBuf {
    project_dirs()
        .map(|p| p.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".").join(format!(".{}", APP_NAME)))
}

/// Get the main configuration file path
///
/// Location: `$XDG_CONFIG_HOME/tabmux/config.toml`
pub fn config_file() -> PathBuf {
    config_dir().join("config.toml")
}

/// Get the state directory
///
/// Location: `$XDG_STATE_HOME/tabmux` or `~/.local/state/tabmux`
pub fn state_dir() -> PathBuf {
    project_dirs()
        .and_then(|p| p.state_dir().map(|d| d.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from(".").join(format!(".{}-state", APP_NAME)))
}

/// Get the log directory
///
/// Location: `$XDG_STATE_HOME/tabmux/log` or `~/.local/state/tabmux/log`
pub fn log_dir() -> PathBuf {
    state_dir().join("log")
}

/// Ensure a directory exists, creating it if necessary
pub fn ensure_dir(path: &PathBuf) -> std::io::Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}
