//! Path utilities for finding data directories

use std::env;
use std::path::PathBuf;

/// Returns the folder holding `config/`, `logs/` and `debug/`.
/// Prefers the executable's directory when it ships a `config` folder,
/// otherwise the current working directory.
pub fn get_data_dir() -> PathBuf {
    if let Ok(exe_path) = env::current_exe() {
        if let Some(parent) = exe_path.parent() {
            if parent.join("config").exists() {
                return parent.to_path_buf();
            }
        }
    }

    env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}
