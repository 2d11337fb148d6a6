use anyhow::{bail, Context};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::Settings;
use crate::error::AcquireError;
use crate::sink::{emit, OutputSink};

/// Package name of the acquisition tool.
pub const TOOL_NAME: &str = "typings";

/// Pinned release of the acquisition tool. Newer releases changed the
/// registry prefixes the runner relies on.
pub const TOOL_VERSION: &str = "1.3.2";

#[cfg(windows)]
const SCRIPT_EXTENSION: &str = ".cmd";
#[cfg(not(windows))]
const SCRIPT_EXTENSION: &str = "";

// One check before the install attempt and one after it.
const MAX_CHECKS: usize = 2;

/// Installs a package at a version into a folder.
///
/// Implementations block; the provisioner runs them on the blocking pool.
pub trait PackageInstaller: Send + Sync {
    fn install(&self, package: &str, version: &str, folder: &Path) -> anyhow::Result<()>;
}

/// Installs packages with `npm install --prefix <folder>`.
#[derive(Debug, Clone)]
pub struct NpmInstaller {
    npm: PathBuf,
}

impl Default for NpmInstaller {
    fn default() -> Self {
        Self {
            npm: PathBuf::from(format!("npm{SCRIPT_EXTENSION}")),
        }
    }
}

impl PackageInstaller for NpmInstaller {
    fn install(&self, package: &str, version: &str, folder: &Path) -> anyhow::Result<()> {
        let output = Command::new(&self.npm)
            .arg("install")
            .arg(format!("{package}@{version}"))
            .arg("--prefix")
            .arg(folder)
            .arg("--no-audit")
            .arg("--no-fund")
            .current_dir(folder)
            .stdin(Stdio::null())
            .output()
            .with_context(|| format!("Failed to run {:?}", self.npm))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!("npm install returned {}: {}", output.status, stderr.trim());
        }

        Ok(())
    }
}

/// Name of the tool executable on this platform.
pub fn executable_name() -> String {
    format!("{TOOL_NAME}{SCRIPT_EXTENSION}")
}

/// Where the tool executable lives inside a tools directory.
pub fn tool_path_in(tools_dir: &Path) -> PathBuf {
    tools_dir
        .join("node_modules")
        .join(".bin")
        .join(executable_name())
}

/// Keeps the pinned acquisition tool installed in the shared tools directory.
///
/// Installation is attempted at most once for the lifetime of the
/// provisioner. It is owned by an [`AcquisitionGate`](crate::AcquisitionGate),
/// so the attempt flag is only touched while the gate is held.
pub struct ToolProvisioner {
    tools_dir: PathBuf,
    version: String,
    installer: Arc<dyn PackageInstaller>,
    attempted: bool,
}

impl std::fmt::Debug for ToolProvisioner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolProvisioner")
            .field("tools_dir", &self.tools_dir)
            .field("version", &self.version)
            .field("attempted", &self.attempted)
            .finish_non_exhaustive()
    }
}

impl ToolProvisioner {
    pub fn new(
        tools_dir: impl Into<PathBuf>,
        version: impl Into<String>,
        installer: Arc<dyn PackageInstaller>,
    ) -> Self {
        Self {
            tools_dir: tools_dir.into(),
            version: version.into(),
            installer,
            attempted: false,
        }
    }

    /// Provisioner for the configured tools directory, installing through npm.
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        Ok(Self::new(
            settings.resolve_tools_dir()?,
            settings.tool_version(),
            Arc::new(NpmInstaller::default()),
        ))
    }

    pub fn tools_dir(&self) -> &Path {
        &self.tools_dir
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn tool_path(&self) -> PathBuf {
        tool_path_in(&self.tools_dir)
    }

    /// Whether an installation has been attempted.
    pub fn attempted(&self) -> bool {
        self.attempted
    }

    /// Return the tool path, installing the tool first if this is the first
    /// time it is found missing.
    ///
    /// `Ok(None)` means the tool is unavailable. Only a failure to create the
    /// tools directory is returned as an error.
    pub async fn ensure_installed(
        &mut self,
        sink: Option<&dyn OutputSink>,
    ) -> Result<Option<PathBuf>, AcquireError> {
        let path = self.tool_path();

        for _ in 0..MAX_CHECKS {
            if path.is_file() {
                return Ok(Some(path));
            }
            if self.attempted {
                return Ok(None);
            }

            self.attempted = true;
            if let Err(err) = self.install(sink).await {
                if err.is_hard() {
                    return Err(err);
                }
                warn!(error = %err, "acquisition tool install failed");
                emit(sink, format!("Error: {err}"));
            }
        }

        Ok(None)
    }

    async fn install(&self, sink: Option<&dyn OutputSink>) -> Result<(), AcquireError> {
        fs::create_dir_all(&self.tools_dir).map_err(|source| AcquireError::ToolsDirectory {
            path: self.tools_dir.clone(),
            source,
        })?;

        info!(tool = TOOL_NAME, version = %self.version, dir = ?self.tools_dir, "installing acquisition tool");
        emit(
            sink,
            format!(
                "Installing {TOOL_NAME}@{} into {}",
                self.version,
                self.tools_dir.display()
            ),
        );

        let installer = Arc::clone(&self.installer);
        let version = self.version.clone();
        let folder = self.tools_dir.clone();
        let result =
            tokio::task::spawn_blocking(move || installer.install(TOOL_NAME, &version, &folder))
                .await;

        let message = match result {
            Ok(Ok(())) => return Ok(()),
            Ok(Err(err)) => format!("{err:#}"),
            Err(join) => format!("installer panicked: {join}"),
        };

        Err(AcquireError::ToolInstallFailed {
            tool: TOOL_NAME.to_string(),
            version: self.version.clone(),
            message,
        })
    }
}
