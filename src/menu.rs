//! The interactive menu loop.
//!
//! One numbered choice per iteration, read as a single line of input.
//! The prompt is generic over the reader and writer so the loop can be
//! driven by tests without a terminal.

use anyhow::{Context, Result};
use std::io::{BufRead, Write};

/// One user-selectable action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Pull,
    Push,
    OpenSaveFolder,
    OpenRepoFolder,
    RemoveRepository,
    Exit,
}

impl MenuChoice {
    /// Map one line of user input to a choice
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(MenuChoice::Pull),
            "2" => Some(MenuChoice::Push),
            "3" => Some(MenuChoice::OpenSaveFolder),
            "4" => Some(MenuChoice::OpenRepoFolder),
            "5" => Some(MenuChoice::RemoveRepository),
            "0" => Some(MenuChoice::Exit),
            _ => None,
        }
    }
}

/// Capitalized OS username for the welcome banner
pub fn display_username() -> String {
    let raw = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "player".to_string());
    capitalize(&raw)
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Show the menu and read lines until one maps to a choice.
///
/// Unrecognized input prints an invalid-choice notice and re-displays
/// the menu. End of input behaves like a requested exit.
pub fn prompt_choice<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    username: &str,
) -> Result<MenuChoice> {
    loop {
        print_menu(out, username).context("failed to write the menu")?;

        let mut line = String::new();
        let read = input
            .read_line(&mut line)
            .context("failed to read the menu choice")?;
        if read == 0 {
            return Ok(MenuChoice::Exit);
        }

        match MenuChoice::parse(&line) {
            Some(choice) => return Ok(choice),
            None => writeln!(out, "❌ Invalid choice, try again.")?,
        }
    }
}

fn print_menu<W: Write>(out: &mut W, username: &str) -> std::io::Result<()> {
    writeln!(out)?;
    writeln!(out, "Welcome, {username}.")?;
    writeln!(out)?;
    writeln!(out, "Choose an option:")?;
    writeln!(out, "1. Download the latest changes (git pull)")?;
    writeln!(out, "2. Upload your changes (git push)")?;
    writeln!(out, "3. Open the save folder on this PC")?;
    writeln!(out, "4. Open the save folder inside the repository")?;
    writeln!(out, "5. Remove the local repository")?;
    writeln!(out, "0. Exit")?;
    write!(out, "Enter the number of your choice: ")?;
    out.flush()
}
