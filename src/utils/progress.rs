//! Progress spinner for long-running platform work.
//!
//! Gathering a folder tree and resolving references can take many round
//! trips, so the `package` command shows a spinner while it waits. The
//! spinner is hidden when progress is disabled (`--no-progress`, `--quiet`)
//! or when stderr is not a terminal, so piped output and CI logs stay clean.
//!
//! ```rust
//! use bldr_cli::utils::Spinner;
//!
//! let spinner = Spinner::new(false);
//! spinner.set_message("Gathering assets");
//! spinner.finish_and_clear();
//! ```

use indicatif::{ProgressBar as IndicatifBar, ProgressStyle as IndicatifStyle};
use std::io::IsTerminal;
use std::time::Duration;

/// An indeterminate progress indicator.
#[derive(Clone)]
pub struct Spinner {
    inner: IndicatifBar,
}

impl Spinner {
    /// Create a spinner, visible only when `enabled` and stderr is a terminal.
    pub fn new(enabled: bool) -> Self {
        let inner = if enabled && std::io::stderr().is_terminal() {
            let bar = IndicatifBar::new_spinner();
            bar.set_style(spinner_style());
            bar.enable_steady_tick(Duration::from_millis(100));
            bar
        } else {
            IndicatifBar::hidden()
        };
        Self { inner }
    }

    /// A spinner that never draws.
    pub fn hidden() -> Self {
        Self {
            inner: IndicatifBar::hidden(),
        }
    }

    /// Replace the message shown next to the spinner.
    pub fn set_message(&self, msg: impl Into<String>) {
        self.inner.set_message(msg.into());
    }

    /// Set the bold prefix shown before the spinner.
    pub fn set_prefix(&self, prefix: impl Into<String>) {
        self.inner.set_prefix(prefix.into());
    }

    /// Stop and erase the spinner.
    pub fn finish_and_clear(&self) {
        self.inner.finish_and_clear();
    }

    /// Whether the spinner draws anything.
    pub fn is_hidden(&self) -> bool {
        self.inner.is_hidden()
    }
}

fn spinner_style() -> IndicatifStyle {
    IndicatifStyle::default_spinner()
        .template("{prefix:.bold} {spinner:.cyan} {msg}")
        .unwrap_or_else(|_| IndicatifStyle::default_spinner())
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
}
