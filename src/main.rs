use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use savesync::cleanup;
use savesync::config;
use savesync::folders;
use savesync::menu::{self, MenuChoice};
use savesync::{CloneOutcome, Config, HealthCheck, PullOutcome, PushOutcome, RepositorySync};

#[derive(Parser)]
#[command(name = "savesync")]
#[command(about = "Menu-driven git synchronization for game save folders")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file path (defaults to ./config.txt)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Download the latest changes (clones first when needed)
    Pull,

    /// Commit and upload local changes
    Push,

    /// Open the save folder in the file browser
    Open {
        /// Open the folder inside the repository clone instead
        #[arg(long)]
        repo: bool,
    },

    /// Remove the local repository clone
    Remove,

    /// System health check and diagnostics
    Doctor,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // The interactive menu owns the terminal, so it only gets warnings;
    // scripted subcommands log at the usual level.
    let is_interactive = cli.command.is_none();
    init_logging(cli.verbose, is_interactive)?;
    if !is_interactive {
        info!("Starting SaveSync v{}", env!("CARGO_PKG_VERSION"));
    }

    let config_path = cli
        .config
        .unwrap_or_else(|| PathBuf::from(config::CONFIG_FILE));

    match cli.command {
        None => cmd_session(&config_path).await,
        Some(Commands::Pull) => cmd_pull(&config_path).await,
        Some(Commands::Push) => cmd_push(&config_path).await,
        Some(Commands::Open { repo }) => cmd_open(&config_path, repo),
        Some(Commands::Remove) => cmd_remove(&config_path),
        Some(Commands::Doctor) => cmd_doctor(&config_path).await,
    }
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: bool, quiet: bool) -> Result<()> {
    let default_level = if verbose {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    Ok(())
}

fn load_sync(config_path: &Path) -> Result<(Config, RepositorySync)> {
    let config = Config::load(config_path)?;
    let sync = RepositorySync::new(&config, config::base_dir_for(config_path));
    Ok((config, sync))
}

/// Run the interactive menu session: load config, make sure the clone
/// exists, then dispatch one action per menu iteration until exit.
async fn cmd_session(config_path: &Path) -> Result<()> {
    let (config, sync) = load_sync(config_path)?;

    match sync.ensure_cloned().await? {
        CloneOutcome::Cloned => println!("✅ Repository cloned successfully."),
        CloneOutcome::AlreadyPresent => println!(
            "✅ Repository already cloned at '{}'.",
            sync.repo_dir().display()
        ),
    }

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut out = io::stdout();
    let username = menu::display_username();

    loop {
        let choice = menu::prompt_choice(&mut input, &mut out, &username)?;

        match choice {
            MenuChoice::Pull => run_pull(&sync).await?,
            MenuChoice::Push => {
                // The clone may have been removed earlier in the session
                sync.ensure_cloned().await?;
                run_push(&sync).await?;
            }
            MenuChoice::OpenSaveFolder => open_save_folder(&config)?,
            MenuChoice::OpenRepoFolder => open_repo_folder(&sync),
            MenuChoice::RemoveRepository => run_remove(&sync)?,
            MenuChoice::Exit => {
                println!("👋 Bye, see you next time!");
                break;
            }
        }
    }

    Ok(())
}

async fn cmd_pull(config_path: &Path) -> Result<()> {
    let (_config, sync) = load_sync(config_path)?;
    run_pull(&sync).await
}

async fn cmd_push(config_path: &Path) -> Result<()> {
    let (_config, sync) = load_sync(config_path)?;
    sync.ensure_cloned().await?;
    run_push(&sync).await
}

fn cmd_open(config_path: &Path, repo: bool) -> Result<()> {
    let (config, sync) = load_sync(config_path)?;

    if repo {
        open_repo_folder(&sync);
    } else {
        open_save_folder(&config)?;
    }

    Ok(())
}

fn cmd_remove(config_path: &Path) -> Result<()> {
    let (_config, sync) = load_sync(config_path)?;
    run_remove(&sync)
}

/// System health check and diagnostics
async fn cmd_doctor(config_path: &Path) -> Result<()> {
    let health = HealthCheck::run(config_path).await;
    print_health_report(&health);
    Ok(())
}

async fn run_pull(sync: &RepositorySync) -> Result<()> {
    println!("📥 Downloading the latest changes...");

    match sync.pull().await? {
        PullOutcome::Cloned => println!("✅ Repository cloned successfully."),
        PullOutcome::Pulled => println!("✅ Pull completed successfully."),
    }

    Ok(())
}

async fn run_push(sync: &RepositorySync) -> Result<()> {
    println!("📤 Uploading your changes...");

    match sync.push().await? {
        PushOutcome::NothingToPush => {
            println!("⚠️  Nothing to send. The repository is already up to date.");
        }
        PushOutcome::RemoteAhead { commits } => {
            println!("⚠️  The remote has {commits} commit(s) you don't have yet.");
            println!("   Pull first (option 1), then push again.");
        }
        PushOutcome::Pushed { message } => {
            println!("✅ Push completed successfully ({message}).");
        }
    }

    Ok(())
}

fn run_remove(sync: &RepositorySync) -> Result<()> {
    let repo_dir = sync.repo_dir();

    if !repo_dir.exists() {
        println!("⚠️  No local repository to remove.");
        return Ok(());
    }

    println!("🗑️  Removing '{}'...", repo_dir.display());

    let report = cleanup::remove_repository(repo_dir)
        .with_context(|| format!("failed to remove '{}'", repo_dir.display()))?;

    if report.failures > 0 {
        println!(
            "⚠️  Removed with {} entries left behind on the first pass.",
            report.failures
        );
    }
    println!("✅ Local repository removed.");

    Ok(())
}

fn open_save_folder(config: &Config) -> Result<()> {
    let save_dir = config.save_dir()?;
    println!("📂 Opening '{}'...", save_dir.display());
    folders::open_in_file_browser(&save_dir);
    Ok(())
}

fn open_repo_folder(sync: &RepositorySync) {
    println!("📂 Opening '{}'...", sync.repo_dir().display());
    folders::open_in_file_browser(sync.repo_dir());
}

/// Print health check report to stdout
fn print_health_report(health: &HealthCheck) {
    println!("🔍 SaveSync System Diagnostics");
    println!();

    for (name, result) in health.all_checks() {
        let icon = if result.passed {
            if result.is_warning {
                "⚠️ "
            } else {
                "✅"
            }
        } else {
            "❌"
        };

        println!("{}:", name);
        println!("  {} {}", icon, result.message);
        if let Some(details) = &result.details {
            for line in details.lines() {
                println!("     {}", line);
            }
        }
        println!();
    }

    if health.all_passed() {
        println!("✅ All checks passed");
    } else {
        println!("❌ Some checks failed");
    }
}
