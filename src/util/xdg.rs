use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

/// Vendor folder under the per-user application data directory.
pub const VENDOR: &str = "TypingsAcquire";

/// Product folder beneath [`VENDOR`].
pub const PRODUCT: &str = "Acquire";

const APP_NAME: &str = "typings-acquire";

/// Get the XDG config directory for typings-acquire
///
/// Returns `$XDG_CONFIG_HOME/typings-acquire` or `~/.config/typings-acquire` if not set
pub fn config_dir() -> Result<PathBuf> {
    let base = match env::var("XDG_CONFIG_HOME") {
        Ok(value) if !value.trim().is_empty() => PathBuf::from(value),
        _ => home_dir()?.join(".config"),
    };

    Ok(base.join(APP_NAME))
}

/// Get the per-user application data directory
///
/// Honours `$XDG_DATA_HOME`; otherwise the platform data directory
/// (`~/.local/share`, `~/Library/Application Support`, `%APPDATA%`).
pub fn data_dir() -> Result<PathBuf> {
    match env::var("XDG_DATA_HOME") {
        Ok(value) if !value.trim().is_empty() => Ok(PathBuf::from(value)),
        _ => directories::BaseDirs::new()
            .context("Failed to get home directory")
            .map(|bd| bd.data_dir().to_path_buf()),
    }
}

/// Shared install location for external tools
///
/// Returns `<data_dir>/TypingsAcquire/Acquire/ExternalTools`
pub fn external_tools_dir() -> Result<PathBuf> {
    Ok(data_dir()?.join(VENDOR).join(PRODUCT).join("ExternalTools"))
}

/// Get the home directory
pub fn home_dir() -> Result<PathBuf> {
    directories::BaseDirs::new()
        .context("Failed to get home directory")
        .map(|bd| bd.home_dir().to_path_buf())
}
