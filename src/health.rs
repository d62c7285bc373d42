//! Preflight diagnostics for the `doctor` command.
//!
//! Pure reporting; nothing here mutates state.

use std::path::Path;
use tokio::process::Command as AsyncCommand;

use crate::config::{self, Config};

/// Result of the system health checks
#[derive(Debug, Clone)]
pub struct HealthCheck {
    /// Git installation status
    pub git: CheckResult,
    /// Configuration file status
    pub config: CheckResult,
    /// Local repository clone status
    pub repository: CheckResult,
}

/// Result of an individual health check
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub passed: bool,
    pub message: String,
    pub details: Option<String>,
    pub is_warning: bool,
}

#[allow(dead_code)]
impl CheckResult {
    fn ok(message: impl Into<String>) -> Self {
        Self {
            passed: true,
            message: message.into(),
            details: None,
            is_warning: false,
        }
    }

    fn ok_with_details(message: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            passed: true,
            message: message.into(),
            details: Some(details.into()),
            is_warning: false,
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            passed: false,
            message: message.into(),
            details: None,
            is_warning: false,
        }
    }

    fn error_with_details(message: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            passed: false,
            message: message.into(),
            details: Some(details.into()),
            is_warning: false,
        }
    }

    fn warning(message: impl Into<String>) -> Self {
        Self {
            passed: true,
            message: message.into(),
            details: None,
            is_warning: true,
        }
    }

    fn warning_with_details(message: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            passed: true,
            message: message.into(),
            details: Some(details.into()),
            is_warning: true,
        }
    }
}

impl HealthCheck {
    /// Run all health checks against the given configuration file
    pub async fn run(config_path: &Path) -> Self {
        Self {
            git: Self::check_git().await,
            config: Self::check_config(config_path),
            repository: Self::check_repository(config_path),
        }
    }

    /// Check if all required checks passed (warnings still pass)
    pub fn all_passed(&self) -> bool {
        self.git.passed && self.config.passed && self.repository.passed
    }

    /// All checks with their display names, in report order
    pub fn all_checks(&self) -> [(&'static str, &CheckResult); 3] {
        [
            ("Git", &self.git),
            ("Configuration", &self.config),
            ("Repository", &self.repository),
        ]
    }

    async fn check_git() -> CheckResult {
        match AsyncCommand::new("git").arg("--version").output().await {
            Ok(output) if output.status.success() => {
                let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
                CheckResult::ok_with_details("git is installed", version)
            }
            Ok(_) => CheckResult::error("git did not respond to --version"),
            Err(err) => CheckResult::error_with_details("git not found on PATH", err.to_string()),
        }
    }

    fn check_config(path: &Path) -> CheckResult {
        match Config::load(path) {
            Ok(config) => CheckResult::ok_with_details(
                "configuration is valid",
                format!("REPO_URL = {}", config.repo_url),
            ),
            Err(err) => {
                CheckResult::error_with_details("configuration is not usable", format!("{err:#}"))
            }
        }
    }

    fn check_repository(path: &Path) -> CheckResult {
        let Ok(config) = Config::load(path) else {
            return CheckResult::warning("repository state unknown until the configuration loads");
        };

        let repo_dir = config::base_dir_for(path).join(config.repo_dir_name());

        if !repo_dir.exists() {
            CheckResult::warning_with_details(
                "repository not cloned yet",
                format!("'{}' will be created on first pull", repo_dir.display()),
            )
        } else if repo_dir.join(".git").exists() {
            CheckResult::ok_with_details("repository clone present", repo_dir.display().to_string())
        } else {
            CheckResult::error_with_details(
                "directory exists but is not a git repository",
                repo_dir.display().to_string(),
            )
        }
    }
}
