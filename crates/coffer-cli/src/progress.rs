//! Progress rendering for create and extract.

use coffer_core::NoopProgress;
use coffer_core::ProgressCallback;
use coffer_core::SkipReason;
use console::Term;
use indicatif::HumanBytes;
use indicatif::ProgressBar;
use indicatif::ProgressStyle;
use std::path::Path;
use std::time::Duration;

/// Progress bar implementing `ProgressCallback`.
///
/// Starts as a spinner and turns into a counted bar once the core reports
/// an entry total. Streamed tar extraction never does. Cleared on drop.
pub struct CliProgress {
    bar: ProgressBar,
    label: String,
    bytes_written: u64,
}

impl CliProgress {
    #[must_use]
    pub fn new(label: &str) -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg} {pos} entries")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.enable_steady_tick(Duration::from_millis(120));
        bar.set_message(label.to_string());

        Self {
            bar,
            label: label.to_string(),
            bytes_written: 0,
        }
    }

    fn switch_to_bar(&self, total: usize) {
        self.bar.disable_steady_tick();
        self.bar.set_length(total as u64);
        self.bar.set_style(
            ProgressStyle::default_bar()
                .template("{msg} [{bar:40.cyan/blue}] {pos}/{len} entries ({elapsed})")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▓░"),
        );
    }

    /// Progress is only drawn on an interactive terminal.
    #[must_use]
    pub fn should_show() -> bool {
        Term::stdout().is_term()
    }
}

impl Drop for CliProgress {
    fn drop(&mut self) {
        self.bar.finish_and_clear();
    }
}

impl ProgressCallback for CliProgress {
    fn on_entry_start(&mut self, _path: &Path, total: usize, _current: usize) {
        if total > 0 && self.bar.length().is_none() {
            self.switch_to_bar(total);
        }
    }

    fn on_bytes_written(&mut self, bytes: u64) {
        self.bytes_written += bytes;
        self.bar
            .set_message(format!("{} {}", self.label, HumanBytes(self.bytes_written)));
    }

    fn on_entry_complete(&mut self, _path: &Path) {
        self.bar.inc(1);
    }

    fn on_entry_skipped(&mut self, _path: &Path, _reason: SkipReason) {
        self.bar.inc(1);
    }

    fn on_complete(&mut self) {
        self.bar.finish_and_clear();
    }
}

/// Prints each completed member name, like `tar -v`.
pub struct EntryEcho {
    term: Term,
}

impl ProgressCallback for EntryEcho {
    fn on_entry_start(&mut self, _path: &Path, _total: usize, _current: usize) {}

    fn on_bytes_written(&mut self, _bytes: u64) {}

    fn on_entry_complete(&mut self, path: &Path) {
        let _ = self.term.write_line(&path.to_string_lossy());
    }

    fn on_complete(&mut self) {}
}

/// Picks the progress renderer for the current output mode.
///
/// Verbose human output echoes names. Otherwise a bar is drawn on a
/// terminal unless the output is quiet or JSON.
pub fn select(json: bool, verbose: bool, quiet: bool, label: &str) -> Box<dyn ProgressCallback> {
    if json || quiet {
        Box::new(NoopProgress)
    } else if verbose {
        Box::new(EntryEcho {
            term: Term::stdout(),
        })
    } else if CliProgress::should_show() {
        Box::new(CliProgress::new(label))
    } else {
        Box::new(NoopProgress)
    }
}
