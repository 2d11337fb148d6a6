use crate::{ui, AcquisitionCoordinator, AcquisitionGate, ConsoleSink, Settings, ToolProvisioner};
use anyhow::{bail, Context, Result};
use std::path::Path;
use tokio::runtime::Runtime;

pub fn execute(settings: &Settings, project: &Path, packages: Vec<String>) -> Result<()> {
    let project = project
        .canonicalize()
        .with_context(|| format!("Project directory {:?} does not exist", project))?;

    let provisioner = ToolProvisioner::from_settings(settings)?;
    let gate = AcquisitionGate::global_or_init(|| provisioner);
    let coordinator = AcquisitionCoordinator::new(gate.clone(), &project, settings);

    let runtime = Runtime::new().context("Failed to start async runtime")?;

    let summary = packages.join(", ");
    let progress = ui::Progress::new("Acquiring", summary.clone());
    let acquired = runtime
        .block_on(coordinator.acquire(packages, Some(&ConsoleSink)))
        .with_context(|| format!("Failed to acquire {summary}"))?;

    if acquired {
        progress.success("Acquired");
        Ok(())
    } else {
        progress.fail("Failed", "see output above");
        bail!("Failed to acquire {summary}");
    }
}
