use clap::{Parser, Subcommand};
use regex::Regex;
use std::path::PathBuf;
use std::sync::OnceLock;

/// Typings Acquire - fetch TypeScript declaration packages on demand
///
/// typings-acquire installs a pinned release of the `typings` tool into a
/// shared per-user location and uses it to download DefinitelyTyped
/// declarations into `<project>/typings`, skipping packages that are
/// already present.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Settings file (defaults to $XDG_CONFIG_HOME/typings-acquire/config.toml)
    #[arg(long, global = true, value_name = "FILE", env = "TYPINGS_ACQUIRE_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Acquire declaration packages that are not yet present
    Acquire {
        /// Package names (e.g. lodash, jquery)
        #[arg(value_name = "PACKAGE", required = true, value_parser = parse_package_name)]
        packages: Vec<String>,

        /// Project root containing the typings directory
        #[arg(short, long, value_name = "DIR", default_value = ".")]
        project: PathBuf,

        /// Record acquired packages in the project's typings config
        #[arg(long)]
        save: bool,
    },

    /// List declaration packages already present in a project
    Scan {
        /// Project root containing the typings directory
        #[arg(short, long, value_name = "DIR", default_value = ".")]
        project: PathBuf,
    },

    /// Show where the acquisition tool lives and whether it is installed
    Status,
}

fn package_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9@][A-Za-z0-9._~/@-]*$").expect("package name pattern is valid")
    })
}

/// Accept names the tool can resolve and reject anything it could read as a flag.
pub fn parse_package_name(value: &str) -> Result<String, String> {
    let trimmed = value.trim();
    if package_name_pattern().is_match(trimmed) {
        Ok(trimmed.to_string())
    } else {
        Err(format!("'{value}' is not a valid package name"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("lodash")]
    #[case("jquery.cookie")]
    #[case("@types/node")]
    #[case("node-uuid")]
    #[case(" react ")]
    fn accepts_package_names(#[case] name: &str) {
        assert_eq!(parse_package_name(name).unwrap(), name.trim());
    }

    #[rstest]
    #[case("")]
    #[case("--save")]
    #[case("two words")]
    #[case("~home")]
    #[case("semi;colon")]
    fn rejects_package_names(#[case] name: &str) {
        assert!(parse_package_name(name).is_err());
    }

    #[test]
    fn parses_acquire_command() {
        let cli = Cli::try_parse_from([
            "typings-acquire",
            "acquire",
            "lodash",
            "react",
            "--project",
            "/tmp/app",
            "--save",
        ])
        .unwrap();

        match cli.command {
            Commands::Acquire {
                packages,
                project,
                save,
            } => {
                assert_eq!(packages, vec!["lodash", "react"]);
                assert_eq!(project, PathBuf::from("/tmp/app"));
                assert!(save);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn acquire_requires_packages() {
        assert!(Cli::try_parse_from(["typings-acquire", "acquire"]).is_err());
    }
}
