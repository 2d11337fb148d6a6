use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::util::xdg;

const CONFIG_FILE: &str = "config.toml";

/// User settings that shape how the acquisition tool is provisioned and invoked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Settings {
    /// Pass `--save` so acquired packages are recorded in the project's typings config.
    #[serde(default)]
    pub save: bool,
    /// Override for the shared tools directory. `~` and `$VARS` are expanded.
    #[serde(default)]
    pub tools_dir: Option<String>,
    /// Override for the pinned tool version.
    #[serde(default)]
    pub tool_version: Option<String>,
}

impl Settings {
    /// Default settings file: `$XDG_CONFIG_HOME/typings-acquire/config.toml`
    pub fn default_path() -> Result<PathBuf> {
        Ok(xdg::config_dir()?.join(CONFIG_FILE))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;

        if contents.trim().is_empty() {
            return Ok(Self::default());
        }

        toml::from_str(&contents).with_context(|| format!("Failed to parse config file {:?}", path))
    }

    /// Resolve the directory the acquisition tool is installed into.
    pub fn resolve_tools_dir(&self) -> Result<PathBuf> {
        match self.tools_dir.as_deref() {
            Some(raw) if !raw.trim().is_empty() => {
                let expanded = shellexpand::full(raw)
                    .with_context(|| format!("Failed to expand tools_dir {raw:?}"))?;
                Ok(PathBuf::from(expanded.as_ref()))
            }
            _ => xdg::external_tools_dir(),
        }
    }

    /// Version of the acquisition tool to install.
    pub fn tool_version(&self) -> &str {
        self.tool_version
            .as_deref()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or(crate::provisioner::TOOL_VERSION)
    }
}
