//! Serialized, cached acquisition of declaration packages.
//!
//! Every [`AcquisitionCoordinator`] sharing an [`AcquisitionGate`] runs at
//! most one acquisition at a time: the tool install location and the tool
//! itself are shared by all projects. Waiting callers suspend on the gate
//! instead of blocking a thread. No ordering among waiters is promised.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::error::AcquireError;
use crate::provisioner::{ToolProvisioner, TOOL_NAME};
use crate::runner::ProcessRunner;
use crate::scanner::{self, ScanOutcome};
use crate::sink::{emit, OutputSink};

/// Mutual-exclusion gate for acquisition work.
///
/// The gate owns the [`ToolProvisioner`], so the install-attempt flag can only
/// be read or changed by the holder. Clones share the same gate.
#[derive(Debug, Clone)]
pub struct AcquisitionGate {
    inner: Arc<Mutex<ToolProvisioner>>,
}

static GLOBAL_GATE: OnceLock<AcquisitionGate> = OnceLock::new();

impl AcquisitionGate {
    pub fn new(provisioner: ToolProvisioner) -> Self {
        Self {
            inner: Arc::new(Mutex::new(provisioner)),
        }
    }

    /// The process-wide gate, created by `init` on first use.
    ///
    /// Later calls return the existing gate and never run `init`.
    pub fn global_or_init(init: impl FnOnce() -> ToolProvisioner) -> &'static AcquisitionGate {
        GLOBAL_GATE.get_or_init(|| Self::new(init()))
    }

    /// Wait for the gate. It is released when the guard is dropped.
    pub async fn lock(&self) -> MutexGuard<'_, ToolProvisioner> {
        self.inner.lock().await
    }
}

/// Acquires declaration packages for one project.
#[derive(Debug)]
pub struct AcquisitionCoordinator {
    gate: AcquisitionGate,
    project_root: PathBuf,
    runner: ProcessRunner,
    // `None` until seeded by the first scan. Only locked while the gate is held.
    acquired: Mutex<Option<BTreeSet<String>>>,
}

impl AcquisitionCoordinator {
    pub fn new(gate: AcquisitionGate, project_root: impl Into<PathBuf>, settings: &Settings) -> Self {
        Self {
            gate,
            project_root: project_root.into(),
            runner: ProcessRunner::new(settings.save),
            acquired: Mutex::new(None),
        }
    }

    /// Make sure every package in `requested` has been acquired.
    ///
    /// Returns `Ok(true)` when nothing was missing or the tool installed the
    /// missing packages, `Ok(false)` when acquisition failed (the reason is
    /// written to `sink`), and `Err` only when the shared tools directory
    /// cannot be created.
    pub async fn acquire<I, S>(
        &self,
        requested: I,
        sink: Option<&dyn OutputSink>,
    ) -> Result<bool, AcquireError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let requested: BTreeSet<String> = requested.into_iter().map(Into::into).collect();

        let mut provisioner = self.gate.lock().await;
        let mut acquired = self.acquired.lock().await;
        if acquired.is_none() {
            *acquired = Some(self.seed().await);
        }
        let cache = acquired.get_or_insert_with(BTreeSet::new);

        let missing: BTreeSet<String> = requested.difference(cache).cloned().collect();
        if missing.is_empty() {
            debug!(project = ?self.project_root, "requested packages already acquired");
            return Ok(true);
        }

        let Some(tool) = provisioner.ensure_installed(sink).await? else {
            let err = AcquireError::ToolNotInstalled {
                tool: TOOL_NAME.to_string(),
                path: provisioner.tool_path(),
            };
            warn!(error = %err, "skipping acquisition");
            emit(sink, format!("Error: {err}"));
            return Ok(false);
        };

        if !self
            .runner
            .run(&tool, &missing, &self.project_root, sink)
            .await
        {
            return Ok(false);
        }

        info!(project = ?self.project_root, count = missing.len(), "recorded acquired packages");
        cache.extend(missing);
        Ok(true)
    }

    /// Snapshot of the packages known to be acquired, seeding from disk if needed.
    pub async fn acquired(&self) -> BTreeSet<String> {
        let _gate = self.gate.lock().await;
        let mut acquired = self.acquired.lock().await;
        if acquired.is_none() {
            *acquired = Some(self.seed().await);
        }
        acquired.clone().unwrap_or_default()
    }

    async fn seed(&self) -> BTreeSet<String> {
        let root = self.project_root.clone();
        let outcome = match tokio::task::spawn_blocking(move || scanner::scan(&root)).await {
            Ok(outcome) => outcome,
            Err(err) => {
                debug!(project = ?self.project_root, error = %err, "scan task failed; seeding empty");
                ScanOutcome::default()
            }
        };
        if let Some(err) = &outcome.error {
            debug!(project = ?self.project_root, error = %err, "seeded acquired packages from a partial scan");
        }
        debug!(project = ?self.project_root, count = outcome.packages.len(), "seeded acquired packages");
        outcome.into_packages()
    }
}
