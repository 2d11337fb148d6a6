use crate::cli::{Cli, Commands};
use crate::Settings;
use anyhow::Result;

mod acquire;
mod scan;
mod status;

pub fn execute(cli: Cli) -> Result<()> {
    // Settings are the root input for every command
    let settings_path = match cli.config {
        Some(path) => path,
        None => Settings::default_path()?,
    };
    let settings = Settings::load(&settings_path)?;

    match cli.command {
        Commands::Acquire {
            packages,
            project,
            save,
        } => {
            let settings = Settings {
                save: settings.save || save,
                ..settings
            };
            acquire::execute(&settings, &project, packages)
        }

        Commands::Scan { project } => scan::execute(&project),

        Commands::Status => status::execute(&settings, &settings_path),
    }
}
