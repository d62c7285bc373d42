//! Clone, pull and push flows for the save repository.
//!
//! The decisions live here; the subprocess plumbing lives in
//! [`crate::git`]. Push is guarded: local changes are only committed and
//! sent when the remote default branch has nothing the local copy lacks.

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::Config;
use crate::git::GitRunner;

/// Result of ensuring the local clone exists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloneOutcome {
    /// Repository was cloned just now
    Cloned,
    /// A directory with the repository's name already exists
    AlreadyPresent,
}

/// Result of a pull operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PullOutcome {
    /// The directory was absent, so a fresh clone took its place
    Cloned,
    /// An ordinary `git pull` ran in the existing clone
    Pulled,
}

/// Result of a push operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushOutcome {
    /// The working tree was clean, nothing was committed or sent
    NothingToPush,
    /// The remote default branch has commits the local copy lacks;
    /// nothing was committed or sent
    RemoteAhead { commits: u64 },
    /// Changes were staged, committed and pushed
    Pushed { message: String },
}

/// Synchronizes one save repository with its remote
#[derive(Debug, Clone)]
pub struct RepositorySync {
    git: GitRunner,
    repo_url: String,
    base_dir: PathBuf,
    repo_dir: PathBuf,
}

impl RepositorySync {
    /// Create a sync handle for the repository named by `config`,
    /// cloned under `base_dir`
    pub fn new(config: &Config, base_dir: PathBuf) -> Self {
        let repo_dir = base_dir.join(config.repo_dir_name());

        Self {
            git: GitRunner,
            repo_url: config.repo_url.clone(),
            base_dir,
            repo_dir,
        }
    }

    /// Local directory the clone lives in
    pub fn repo_dir(&self) -> &Path {
        &self.repo_dir
    }

    /// Clone the repository when its directory is absent
    pub async fn ensure_cloned(&self) -> Result<CloneOutcome> {
        if self.repo_dir.exists() {
            return Ok(CloneOutcome::AlreadyPresent);
        }

        info!(url = %self.repo_url, "cloning repository");

        let dir_name = self
            .repo_dir
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| crate::config::repo_dir_name(&self.repo_url));

        self.git
            .run(&self.base_dir, &["clone", &self.repo_url, &dir_name])
            .await
            .context("git clone failed")?;

        Ok(CloneOutcome::Cloned)
    }

    /// Download the latest changes, cloning first when nothing is there
    /// yet. Both paths produce the same end state.
    pub async fn pull(&self) -> Result<PullOutcome> {
        if !self.repo_dir.exists() {
            self.ensure_cloned().await?;
            return Ok(PullOutcome::Cloned);
        }

        self.git
            .run(&self.repo_dir, &["pull"])
            .await
            .context("git pull failed")?;

        Ok(PullOutcome::Pulled)
    }

    /// Commit and upload local changes.
    ///
    /// A clean working tree is a no-op. When the remote default branch
    /// is ahead, the push is refused so the user can pull first; this is
    /// an outcome, not an error. Everything else in the
    /// fetch/add/commit/push sequence is fatal on failure.
    pub async fn push(&self) -> Result<PushOutcome> {
        if !self.git.has_uncommitted_changes(&self.repo_dir).await? {
            return Ok(PushOutcome::NothingToPush);
        }

        self.git
            .run(&self.repo_dir, &["fetch", "origin"])
            .await
            .context("git fetch failed")?;

        let commits = self.git.commits_behind_remote(&self.repo_dir).await?;
        if commits > 0 {
            info!(commits, "push refused, remote is ahead");
            return Ok(PushOutcome::RemoteAhead { commits });
        }

        let message = commit_message(Local::now());

        self.git
            .run(&self.repo_dir, &["add", "."])
            .await
            .context("git add failed")?;
        self.git
            .run(&self.repo_dir, &["commit", "-m", &message])
            .await
            .context("git commit failed")?;
        self.git
            .run(&self.repo_dir, &["push"])
            .await
            .context("git push failed")?;

        Ok(PushOutcome::Pushed { message })
    }
}

/// Commit message for an upload: `Atualização: DD/MM/YYYY - HH:MM`
fn commit_message(now: DateTime<Local>) -> String {
    format!("Atualização: {}", now.format("%d/%m/%Y - %H:%M"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_commit_message_format() {
        let when = Local.with_ymd_and_hms(2024, 3, 7, 9, 5, 0).unwrap();
        assert_eq!(commit_message(when), "Atualização: 07/03/2024 - 09:05");
    }

    #[test]
    fn test_commit_message_pads_fields() {
        let when = Local.with_ymd_and_hms(2025, 12, 31, 23, 59, 0).unwrap();
        assert_eq!(commit_message(when), "Atualização: 31/12/2025 - 23:59");
    }

    #[test]
    fn test_repo_dir_is_joined_under_base() {
        let config = Config {
            repo_url: "https://example.com/user/world-saves.git".to_string(),
            save_dir: None,
        };

        let sync = RepositorySync::new(&config, PathBuf::from("/srv/savesync"));
        assert_eq!(sync.repo_dir(), Path::new("/srv/savesync/world-saves"));
    }
}
