use crate::{ui, Settings, ToolProvisioner, TOOL_NAME};
use anyhow::Result;
use std::path::Path;

pub fn execute(settings: &Settings, settings_path: &Path) -> Result<()> {
    let provisioner = ToolProvisioner::from_settings(settings)?;
    let tool_path = provisioner.tool_path();

    ui::info(format!("Tool: {TOOL_NAME}@{}", provisioner.version()));
    ui::info(format!(
        "Tools directory: {}",
        provisioner.tools_dir().display()
    ));
    if tool_path.is_file() {
        ui::success("Installed", tool_path.display());
    } else {
        ui::warn(format!(
            "{TOOL_NAME} is not installed yet; it will be installed on the next acquire"
        ));
    }

    let source = if settings_path.exists() {
        settings_path.display().to_string()
    } else {
        format!("{} (not present, using defaults)", settings_path.display())
    };
    ui::info(format!("Settings: {source}"));
    ui::info(format!("Save to project config: {}", settings.save));
    Ok(())
}
