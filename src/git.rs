use anyhow::{Context, Result};
use std::fmt;
use std::path::Path;
use std::process::Output;
use thiserror::Error;
use tokio::process::Command as AsyncCommand;
use tracing::debug;

/// Cosmetic classification of a failed git invocation, derived from its
/// stderr text. It only shapes the message shown to the user; control
/// flow never branches on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Credential or permission problems
    Authentication,
    /// Host name could not be resolved
    NetworkResolution,
    /// Remote exists but could not be reached or found
    RemoteUnreachable,
    /// Anything git did not explain in a recognizable way
    Other,
}

impl FailureKind {
    /// Best-effort substring matching against git's stderr
    pub fn classify(stderr: &str) -> Self {
        let text = stderr.to_lowercase();

        if text.contains("authentication failed")
            || text.contains("permission denied")
            || text.contains("could not read username")
        {
            FailureKind::Authentication
        } else if text.contains("could not resolve host")
            || text.contains("name or service not known")
            || text.contains("temporary failure in name resolution")
        {
            FailureKind::NetworkResolution
        } else if text.contains("repository not found")
            || text.contains("unable to access")
            || text.contains("connection refused")
        {
            FailureKind::RemoteUnreachable
        } else {
            FailureKind::Other
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            FailureKind::Authentication => "authentication failed (check your credentials)",
            FailureKind::NetworkResolution => {
                "could not resolve the remote host (check your connection)"
            }
            FailureKind::RemoteUnreachable => "the remote repository is not accessible",
            FailureKind::Other => "git reported an error",
        };
        f.write_str(text)
    }
}

/// A git subprocess that exited with a nonzero status.
///
/// Carries the full command line, the exit status and the captured
/// stderr, so the terminal shows exactly what failed and why.
#[derive(Debug, Error)]
#[error("`{command}` failed ({status}): {kind}\n{stderr}")]
pub struct GitCommandError {
    /// Command line that was executed, e.g. `git push`
    pub command: String,
    /// Rendered exit status
    pub status: String,
    /// Classification of `stderr`, for the message only
    pub kind: FailureKind,
    /// Captured stderr, trimmed
    pub stderr: String,
}

impl GitCommandError {
    fn from_output(args: &[&str], output: &Output) -> Self {
        let stderr = String::from_utf8_lossy(&output.stderr)
            .trim_end()
            .to_string();
        let stderr = if stderr.is_empty() {
            "(no stderr output)".to_string()
        } else {
            stderr
        };
        let status = match output.status.code() {
            Some(code) => format!("exit status {code}"),
            None => "terminated by signal".to_string(),
        };

        Self {
            command: format!("git {}", args.join(" ")),
            status,
            kind: FailureKind::classify(&stderr),
            stderr,
        }
    }
}

/// Thin wrapper over the external `git` executable.
///
/// Every invocation receives an explicit working directory; the
/// process-wide current directory is never changed.
#[derive(Debug, Clone, Copy, Default)]
pub struct GitRunner;

impl GitRunner {
    /// Run `git <args>` in `dir`, treating any nonzero exit as an error
    pub async fn run(&self, dir: &Path, args: &[&str]) -> Result<Output> {
        debug!(dir = %dir.display(), "running git {}", args.join(" "));

        let output = AsyncCommand::new("git")
            .args(args)
            .current_dir(dir)
            .output()
            .await
            .with_context(|| format!("failed to spawn `git {}`", args.join(" ")))?;

        if !output.status.success() {
            return Err(GitCommandError::from_output(args, &output).into());
        }

        Ok(output)
    }

    /// Like [`GitRunner::run`], returning captured stdout as text
    pub async fn run_capture(&self, dir: &Path, args: &[&str]) -> Result<String> {
        let output = self.run(dir, args).await?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Whether the repository has uncommitted or untracked changes
    pub async fn has_uncommitted_changes(&self, repo: &Path) -> Result<bool> {
        let stdout = self.run_capture(repo, &["status", "--porcelain"]).await?;
        Ok(!stdout.trim().is_empty())
    }

    /// Number of commits the remote default branch has that the local
    /// HEAD lacks. `origin/HEAD` tracks whatever branch the remote
    /// considers its default, so the count survives remotes that use a
    /// name other than `main`.
    ///
    /// A failing query (unborn HEAD, missing `origin/HEAD` ref) counts
    /// as zero: there is nothing to guard against yet.
    pub async fn commits_behind_remote(&self, repo: &Path) -> Result<u64> {
        let output = AsyncCommand::new("git")
            .args(["rev-list", "--count", "HEAD..origin/HEAD"])
            .current_dir(repo)
            .output()
            .await
            .context("failed to count commits behind the remote")?;

        if output.status.success() {
            let count_str = String::from_utf8_lossy(&output.stdout).trim().to_string();
            Ok(count_str.parse().unwrap_or(0))
        } else {
            Ok(0)
        }
    }
}
