use crate::{scan, typings_root, ui};
use anyhow::Result;
use std::path::Path;

pub fn execute(project: &Path) -> Result<()> {
    let outcome = scan(project);

    if let Some(err) = &outcome.error {
        ui::warn(format!(
            "Stopped scanning {} early: {err}",
            typings_root(project).display()
        ));
    }

    if outcome.packages.is_empty() {
        ui::info(format!(
            "No declaration packages found in {}",
            typings_root(project).display()
        ));
        return Ok(());
    }

    for name in &outcome.packages {
        ui::success("Found", name);
    }
    Ok(())
}
