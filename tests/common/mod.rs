/// Common test utilities and helpers for SaveSync tests
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// Scratch directory for seeding local git remotes and clones
pub struct TestEnvironment {
    pub temp_dir: TempDir,
}

impl TestEnvironment {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }
}

/// Whether a usable git binary is on PATH. Tests that drive real git
/// skip themselves when it is missing.
pub fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

/// Run a git command in `dir`, panicking on failure
pub fn git(dir: &Path, args: &[&str]) {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .unwrap_or_else(|err| panic!("failed to spawn git {:?}: {}", args, err));

    assert!(
        output.status.success(),
        "git {:?} failed in {}:\n{}",
        args,
        dir.display(),
        String::from_utf8_lossy(&output.stderr)
    );
}

/// Run a git command in `dir` and return trimmed stdout
pub fn git_stdout(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .unwrap_or_else(|err| panic!("failed to spawn git {:?}: {}", args, err));

    assert!(
        output.status.success(),
        "git {:?} failed in {}:\n{}",
        args,
        dir.display(),
        String::from_utf8_lossy(&output.stderr)
    );

    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// Give a repository a commit identity so test commits succeed on
/// machines without a global git config
pub fn set_identity(repo: &Path) {
    git(repo, &["config", "user.name", "SaveSync Tests"]);
    git(repo, &["config", "user.email", "savesync@example.com"]);
}

/// Create a bare remote named `saves.git` under `base` with one seed
/// commit on `main`, and return its path
pub fn seed_remote(base: &Path) -> PathBuf {
    let bare = base.join("saves.git");
    git(
        base,
        &[
            "init",
            "--bare",
            "--initial-branch=main",
            bare.to_str().unwrap(),
        ],
    );

    let seed = base.join("seed");
    std::fs::create_dir(&seed).expect("Failed to create seed dir");
    git(&seed, &["init", "--initial-branch=main"]);
    set_identity(&seed);

    std::fs::write(seed.join("world.dat"), "seed world").expect("Failed to write seed file");
    git(&seed, &["add", "."]);
    git(&seed, &["commit", "-m", "seed"]);
    git(&seed, &["remote", "add", "origin", bare.to_str().unwrap()]);
    git(&seed, &["push", "-u", "origin", "main"]);

    bare
}
