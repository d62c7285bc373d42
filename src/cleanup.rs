//! Removal of the local repository clone.
//!
//! Git marks objects under `.git/objects` read-only, which makes a plain
//! recursive delete fail on some platforms. The walk goes bottom-up,
//! clears the read-only bit on each file and deletes files before their
//! parent directories. One stubborn entry does not strand its siblings.

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::Path;
use tracing::warn;

/// Tally of a removal run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CleanupReport {
    pub files_removed: usize,
    pub dirs_removed: usize,
    pub failures: usize,
}

/// Delete `root` and everything under it.
///
/// Per-entry failures are logged and counted but do not abort the walk.
/// If `root` itself survives the walk, a recursive delete is attempted
/// as a fallback; failing that is an error.
pub fn remove_repository(root: &Path) -> Result<CleanupReport> {
    if !root.exists() {
        bail!("repository directory '{}' does not exist", root.display());
    }

    let mut report = CleanupReport::default();
    remove_tree(root, &mut report);

    if let Err(err) = fs::remove_dir(root) {
        warn!(dir = %root.display(), "direct removal failed, retrying recursively: {err}");
        fs::remove_dir_all(root)
            .with_context(|| format!("failed to remove '{}'", root.display()))?;
    }

    Ok(report)
}

fn remove_tree(dir: &Path, report: &mut CleanupReport) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            warn!(dir = %dir.display(), "could not list directory: {err}");
            report.failures += 1;
            return;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);

        if is_dir {
            remove_tree(&path, report);
            match fs::remove_dir(&path) {
                Ok(()) => report.dirs_removed += 1,
                Err(err) => {
                    warn!(dir = %path.display(), "could not remove directory: {err}");
                    report.failures += 1;
                }
            }
        } else {
            clear_readonly(&path);
            match fs::remove_file(&path) {
                Ok(()) => report.files_removed += 1,
                Err(err) => {
                    warn!(file = %path.display(), "could not remove file: {err}");
                    report.failures += 1;
                }
            }
        }
    }
}

fn clear_readonly(path: &Path) {
    let Ok(metadata) = fs::metadata(path) else {
        return;
    };

    let mut perms = metadata.permissions();
    if perms.readonly() {
        #[allow(clippy::permissions_set_readonly_false)]
        perms.set_readonly(false);
        if let Err(err) = fs::set_permissions(path, perms) {
            warn!(file = %path.display(), "could not clear read-only bit: {err}");
        }
    }
}
