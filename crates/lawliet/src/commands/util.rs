//! Shared helpers for command handlers.

use std::io::IsTerminal;
use std::sync::Arc;

use tokio::sync::broadcast::{self, error::TryRecvError};

use lawliet_core::{Controller, Notification, NotificationLevel};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
///
/// Without a terminal to prompt on, `--yes` is required.
pub fn confirm(message: &str, action: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

// ── Notifications ───────────────────────────────────────────────────

/// Collects controller notifications and prints them to stderr.
///
/// Warnings and errors always travel back as the command's `Err` as well,
/// so only informational and success messages are printed here.
pub struct Notices {
    rx: broadcast::Receiver<Arc<Notification>>,
    color: bool,
    quiet: bool,
}

impl Notices {
    pub fn new(controller: &Controller, global: &GlobalOpts) -> Self {
        Self {
            rx: controller.notifications(),
            color: output::should_color(&global.color),
            quiet: global.quiet,
        }
    }

    /// Print everything received so far.
    pub fn flush(&mut self) {
        loop {
            match self.rx.try_recv() {
                Ok(note) => self.print(&note),
                Err(TryRecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "notifications dropped");
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            }
        }
    }

    fn print(&self, note: &Notification) {
        if self.quiet
            || matches!(
                note.level,
                NotificationLevel::Warning | NotificationLevel::Error
            )
        {
            return;
        }
        eprintln!("{}", output::format_notification(note, self.color));
    }
}

// ── Progress bars ───────────────────────────────────────────────────

/// A progress bar on stderr, hidden under `--quiet`.
pub fn progress_bar(len: u64, template: &str, quiet: bool) -> indicatif::ProgressBar {
    if quiet {
        return indicatif::ProgressBar::hidden();
    }
    let style = indicatif::ProgressStyle::with_template(template)
        .unwrap_or_else(|_| indicatif::ProgressStyle::default_bar())
        .progress_chars("█▓▒░");
    let bar = indicatif::ProgressBar::new(len);
    bar.set_style(style);
    bar
}
