use anyhow::{bail, Context, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Default configuration file name, looked up in the working directory
/// unless overridden with `--config`.
pub const CONFIG_FILE: &str = "config.txt";

/// Main configuration for SaveSync
///
/// Loaded from a plain `key=value` text file. Blank lines and lines
/// without `=` are ignored; keys and values are trimmed of surrounding
/// whitespace. Later duplicates of a key overwrite earlier ones.
#[derive(Debug, Clone)]
pub struct Config {
    /// Remote repository holding the save data (required, `REPO_URL`)
    pub repo_url: String,

    /// Optional override for the save-game folder (`SAVE_DIR`).
    /// `~` and environment variables are expanded when resolved.
    pub save_dir: Option<String>,
}

impl Config {
    /// Load configuration from a specific file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("could not read configuration file '{}'", path.display()))?;

        let entries = parse_entries(&content);

        let repo_url = match entries.get("REPO_URL") {
            Some(url) if !url.is_empty() => url.clone(),
            _ => bail!(
                "configuration file '{}' has no usable REPO_URL entry",
                path.display()
            ),
        };

        Ok(Self {
            repo_url,
            save_dir: entries.get("SAVE_DIR").cloned(),
        })
    }

    /// Local directory name for the clone of `repo_url`
    pub fn repo_dir_name(&self) -> String {
        repo_dir_name(&self.repo_url)
    }

    /// Resolve the save-game folder.
    ///
    /// The `SAVE_DIR` override wins when present; otherwise the
    /// platform's well-known Minecraft saves location is used.
    pub fn save_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.save_dir {
            let expanded = shellexpand::full(dir)
                .context("failed to expand SAVE_DIR path")?
                .into_owned();
            return Ok(PathBuf::from(expanded));
        }

        default_save_dir()
    }
}

/// Directory the repository clone lives under: the directory containing
/// the configuration file, so the tool behaves the same no matter where
/// it is launched from.
pub fn base_dir_for(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Derive the local clone directory name from a remote URL: the final
/// path segment with a trailing `.git` stripped.
///
/// Handles both `https://host/owner/repo.git` and scp-like
/// `git@host:owner/repo.git` forms.
pub fn repo_dir_name(url: &str) -> String {
    let trimmed = url.trim_end_matches('/');
    let basename = trimmed.rsplit(['/', ':']).next().unwrap_or(trimmed);
    basename.strip_suffix(".git").unwrap_or(basename).to_string()
}

fn parse_entries(content: &str) -> HashMap<String, String> {
    let mut entries = HashMap::new();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            entries.insert(key.trim().to_string(), value.trim().to_string());
        }
    }

    entries
}

/// Well-known Minecraft saves folder for the current platform
fn default_save_dir() -> Result<PathBuf> {
    #[cfg(windows)]
    {
        // <home>\AppData\Roaming\.minecraft\saves
        let roaming = dirs::config_dir().context("could not locate the Roaming directory")?;
        Ok(roaming.join(".minecraft").join("saves"))
    }

    #[cfg(not(windows))]
    {
        let home = dirs::home_dir().context("could not locate the home directory")?;
        Ok(home.join(".minecraft").join("saves"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("config.txt");
        std::fs::write(&path, content).expect("Failed to write test config");
        path
    }

    #[test]
    fn test_parse_entries_basic() {
        let entries = parse_entries("REPO_URL=https://example.com/user/repo.git\n");
        assert_eq!(
            entries.get("REPO_URL").map(String::as_str),
            Some("https://example.com/user/repo.git")
        );
    }

    #[test]
    fn test_parse_entries_skips_blank_and_malformed_lines() {
        let content = "\n\nthis line has no separator\n  \nKEY=value\n";
        let entries = parse_entries(content);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries.get("KEY").map(String::as_str), Some("value"));
    }

    #[test]
    fn test_parse_entries_trims_whitespace() {
        let entries = parse_entries("  REPO_URL  =   https://example.com/r.git  \n");
        assert_eq!(
            entries.get("REPO_URL").map(String::as_str),
            Some("https://example.com/r.git")
        );
    }

    #[test]
    fn test_parse_entries_splits_on_first_equals() {
        // Query strings and tokens may contain '=' themselves
        let entries = parse_entries("REPO_URL=https://example.com/r.git?token=abc=def\n");
        assert_eq!(
            entries.get("REPO_URL").map(String::as_str),
            Some("https://example.com/r.git?token=abc=def")
        );
    }

    #[test]
    fn test_parse_entries_last_duplicate_wins() {
        let entries = parse_entries("KEY=first\nKEY=second\n");
        assert_eq!(entries.get("KEY").map(String::as_str), Some("second"));
    }

    #[test]
    fn test_load_missing_file_is_an_error() {
        let result = Config::load(Path::new("/nonexistent/path/config.txt"));
        let err = result.expect_err("loading a missing file should fail");
        assert!(err.to_string().contains("config.txt"));
    }

    #[test]
    fn test_load_missing_repo_url_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "SOME_OTHER_KEY=value\n");

        let err = Config::load(&path).expect_err("missing REPO_URL should fail");
        assert!(err.to_string().contains("REPO_URL"));
    }

    #[test]
    fn test_load_empty_repo_url_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "REPO_URL=\n");

        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn test_load_valid_config() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            "REPO_URL=https://example.com/user/my-repo.git\nSAVE_DIR=/tmp/saves\n",
        );

        let config = Config::load(&path).expect("config should load");
        assert_eq!(config.repo_url, "https://example.com/user/my-repo.git");
        assert_eq!(config.save_dir.as_deref(), Some("/tmp/saves"));
        assert_eq!(config.repo_dir_name(), "my-repo");
    }

    #[test]
    fn test_repo_dir_name_strips_git_suffix() {
        assert_eq!(
            repo_dir_name("https://example.com/user/my-repo.git"),
            "my-repo"
        );
        assert_eq!(repo_dir_name("https://example.com/user/my-repo"), "my-repo");
    }

    #[test]
    fn test_repo_dir_name_scp_like_url() {
        assert_eq!(repo_dir_name("git@github.com:user/saves.git"), "saves");
    }

    #[test]
    fn test_repo_dir_name_trailing_slash() {
        assert_eq!(repo_dir_name("https://example.com/user/repo.git/"), "repo");
    }

    #[test]
    fn test_repo_dir_name_only_trailing_git_is_stripped() {
        assert_eq!(
            repo_dir_name("https://example.com/user/my.gitrepo"),
            "my.gitrepo"
        );
    }

    #[test]
    fn test_save_dir_override_expands_env_vars() {
        env::set_var("TEST_SAVESYNC_BASE", "/test/base");

        let config = Config {
            repo_url: "https://example.com/r.git".to_string(),
            save_dir: Some("${TEST_SAVESYNC_BASE}/saves".to_string()),
        };

        let dir = config.save_dir().expect("save dir should resolve");
        assert_eq!(dir, PathBuf::from("/test/base/saves"));

        env::remove_var("TEST_SAVESYNC_BASE");
    }

    #[test]
    fn test_default_save_dir_points_into_minecraft() {
        let config = Config {
            repo_url: "https://example.com/r.git".to_string(),
            save_dir: None,
        };

        let dir = config.save_dir().expect("save dir should resolve");
        assert!(dir.to_string_lossy().contains(".minecraft"));
        assert!(dir.ends_with("saves"));
    }

    #[test]
    fn test_base_dir_for() {
        assert_eq!(
            base_dir_for(Path::new("/etc/savesync/config.txt")),
            PathBuf::from("/etc/savesync")
        );
        assert_eq!(base_dir_for(Path::new("config.txt")), PathBuf::from("."));
    }
}
