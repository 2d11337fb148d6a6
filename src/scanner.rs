//! Discover declaration packages that already exist in a project.
//!
//! The acquisition tool writes declarations to
//! `<project>/typings/<package>/**/*.d.ts`. A package is reported under the
//! name of the directory that directly contains a declaration file, so
//! `typings/bar/sub/other.d.ts` reports `sub`, not `bar`. Acquisition
//! idempotence relies on that naming, so keep it.

use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Directory (relative to the project root) the acquisition tool writes into.
pub const TYPINGS_DIR: &str = "typings";

const DECLARATION_SUFFIX: &str = ".d.ts";

/// Result of a best-effort scan.
///
/// `error` holds the failure that stopped the walk early, if any; `packages`
/// always holds what was collected before it.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    pub packages: BTreeSet<String>,
    pub error: Option<io::Error>,
}

impl ScanOutcome {
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }

    pub fn into_packages(self) -> BTreeSet<String> {
        self.packages
    }
}

/// Path of the declaration directory for a project.
pub fn typings_root(project_root: &Path) -> PathBuf {
    project_root.join(TYPINGS_DIR)
}

/// Report the packages that already have declaration files under `project_root`.
pub fn scan(project_root: &Path) -> ScanOutcome {
    let root = typings_root(project_root);
    let mut outcome = ScanOutcome::default();

    if !root.is_dir() {
        return outcome;
    }

    if let Err(err) = collect(&root, &mut outcome.packages) {
        debug!(root = ?root, error = %err, "stopped scanning typings early");
        outcome.error = Some(err);
    }

    outcome
}

fn collect(root: &Path, packages: &mut BTreeSet<String>) -> io::Result<()> {
    let canonical_root = root.canonicalize()?;

    for entry in WalkDir::new(root).follow_links(true).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() || !is_declaration_file(entry.path()) {
            continue;
        }

        let Some(parent) = entry.path().parent() else {
            continue;
        };

        let canonical_parent = parent.canonicalize()?;
        if canonical_parent == canonical_root || !canonical_parent.starts_with(&canonical_root) {
            continue;
        }

        if let Some(name) = parent.file_name() {
            packages.insert(name.to_string_lossy().into_owned());
        }
    }

    Ok(())
}

fn is_declaration_file(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().ends_with(DECLARATION_SUFFIX))
        .unwrap_or(false)
}
