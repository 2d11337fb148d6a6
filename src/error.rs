use std::path::PathBuf;
use thiserror::Error;

/// Outcome kinds of a single acquisition attempt.
///
/// Only [`AcquireError::ToolsDirectory`] reaches callers of
/// [`AcquisitionCoordinator::acquire`](crate::AcquisitionCoordinator::acquire) as an `Err`;
/// every other kind is reported to the sink and collapses to `Ok(false)`.
#[derive(Debug, Error)]
pub enum AcquireError {
    /// The acquisition tool is missing and will not be installed in this process.
    #[error("{tool} is not installed at {path:?}")]
    ToolNotInstalled { tool: String, path: PathBuf },

    /// The package installer reported a failure while installing the tool.
    #[error("Failed to install {tool}@{version}: {message}")]
    ToolInstallFailed {
        tool: String,
        version: String,
        message: String,
    },

    /// The tool executable could not be launched.
    #[error("Failed to start {path:?}: {source}")]
    ProcessStartFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The tool ran but did not exit successfully.
    #[error("{tool} exited with {}", describe_exit(.code))]
    ProcessNonZeroExit { tool: String, code: Option<i32> },

    /// The shared tools directory could not be created.
    #[error("Failed to create tools directory {path:?}: {source}")]
    ToolsDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl AcquireError {
    /// Whether this error must be propagated to the caller instead of being
    /// collapsed into a failed acquisition.
    pub fn is_hard(&self) -> bool {
        matches!(self, AcquireError::ToolsDirectory { .. })
    }
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "no exit code (terminated by signal)".to_string(),
    }
}
