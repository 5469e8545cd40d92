//! Default on-disk locations, resolved through `dirs`.
//!
//! Linux: `~/.config/Relief` and `~/.local/share/Relief`. macOS uses
//! `~/Library/Application Support/Relief` for both; Windows uses `%APPDATA%`.

use std::path::PathBuf;

use crate::constants::APP_NAME;
use crate::error::{ReliefError, ReliefResult};

pub fn config_dir() -> ReliefResult<PathBuf> {
    let base = dirs::config_dir()
        .ok_or_else(|| ReliefError::Config("could not determine config directory".into()))?;
    Ok(base.join(APP_NAME))
}

pub fn data_dir() -> ReliefResult<PathBuf> {
    let base = dirs::data_dir()
        .ok_or_else(|| ReliefError::Config("could not determine data directory".into()))?;
    Ok(base.join(APP_NAME))
}

/// `config.toml` inside [`config_dir`].
pub fn default_config_file() -> ReliefResult<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

/// Where proof uploads go when the config leaves the directory empty.
pub fn default_upload_dir() -> ReliefResult<PathBuf> {
    Ok(data_dir()?.join("uploads"))
}

/// Where log files go when the config leaves the directory empty.
pub fn default_log_dir() -> ReliefResult<PathBuf> {
    Ok(data_dir()?.join("logs"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_live_under_app_dirs() {
        // Headless CI may have no home directory; only check when resolvable.
        if let (Ok(data), Ok(uploads), Ok(logs)) = (data_dir(), default_upload_dir(), default_log_dir()) {
            assert!(data.ends_with(APP_NAME));
            assert_eq!(uploads, data.join("uploads"));
            assert_eq!(logs.parent(), Some(data.as_path()));
        }
        if let Ok(file) = default_config_file() {
            assert!(file.ends_with(format!("{APP_NAME}/config.toml")));
        }
    }
}
