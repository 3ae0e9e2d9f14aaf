//! Terminal and JSON output for the CLI.
//!
//! In JSON mode only [`Output::json`] and [`Output::error`] print; every
//! human-facing line is suppressed so stdout stays machine-readable.

use std::fmt::Display;
use std::time::Duration;

use anime_cache::CacheStatus;
use console::{style, StyledObject};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

/// Which stream a human-facing line goes to.
#[derive(Clone, Copy)]
enum Stream {
    Stdout,
    Stderr,
}

/// Output handler for CLI messages.
#[derive(Clone)]
pub struct Output {
    verbose: bool,
    json: bool,
}

impl Output {
    pub fn new(verbose: bool, json: bool) -> Self {
        Self { verbose, json }
    }

    /// Whether JSON mode is enabled.
    pub fn is_json(&self) -> bool {
        self.json
    }

    fn line(&self, stream: Stream, mark: StyledObject<&str>, msg: impl Display) {
        if self.json {
            return;
        }
        match stream {
            Stream::Stdout => println!("{} {}", mark, msg),
            Stream::Stderr => eprintln!("{} {}", mark, msg),
        }
    }

    pub fn info(&self, msg: &str) {
        self.line(Stream::Stdout, style("ℹ").blue(), msg);
    }

    pub fn success(&self, msg: &str) {
        self.line(Stream::Stdout, style("✓").green(), msg);
    }

    pub fn warn(&self, msg: &str) {
        self.line(Stream::Stderr, style("⚠").yellow(), msg);
    }

    /// Errors print in both modes; JSON mode emits `{"error": ...}`.
    pub fn error(&self, msg: &str) {
        if self.json {
            eprintln!("{}", serde_json::json!({ "error": msg }));
        } else {
            eprintln!("{} {}", style("✗").red(), style(msg).red());
        }
    }

    /// Only shown with `--verbose`.
    pub fn debug(&self, msg: &str) {
        if self.verbose {
            self.line(Stream::Stderr, style("→").dim(), style(msg).dim());
        }
    }

    pub fn header(&self, msg: &str) {
        if !self.json {
            println!("\n{}", style(msg).bold().underlined());
        }
    }

    /// `[n/total] msg` progress line.
    pub fn step(&self, num: usize, total: usize, msg: &str) {
        if !self.json {
            println!("{} {}", style(format!("[{}/{}]", num, total)).dim(), msg);
        }
    }

    /// Pretty-printed JSON, printed in every mode.
    pub fn json<T: Serialize>(&self, value: &T) {
        if let Ok(json) = serde_json::to_string_pretty(value) {
            println!("{}", json);
        }
    }

    pub fn kv(&self, key: &str, value: &str) {
        self.line(Stream::Stdout, style(" ").dim(), format!("{}: {}", style(key).dim(), value));
    }

    pub fn list_item(&self, item: &str) {
        self.line(Stream::Stdout, style("  •").dim(), item);
    }

    /// Columns padded to `widths`; extra columns are dropped.
    pub fn table_row(&self, cols: &[&str], widths: &[usize]) {
        let row = cols
            .iter()
            .zip(widths)
            .map(|(col, width)| format!("{:width$}", col, width = *width))
            .collect::<Vec<_>>()
            .join("  ");
        self.line(Stream::Stdout, style(" ").dim(), row);
    }

    /// Spinner for indeterminate progress; hidden in JSON mode.
    pub fn spinner(&self, msg: &str) -> ProgressBar {
        if self.json {
            return ProgressBar::hidden();
        }

        let style = ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        let pb = ProgressBar::new_spinner().with_style(style);
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }
}

/// Colored label for where a response came from.
pub fn cache_badge(status: CacheStatus) -> String {
    let label = style(status.to_string());
    let badge = match status {
        CacheStatus::Hit => label.green(),
        CacheStatus::Miss => label.yellow(),
        CacheStatus::Fallback => label.magenta(),
        CacheStatus::Bypass => label.dim(),
    };
    badge.to_string()
}

/// Human-readable byte size.
pub fn format_bytes(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;

    let size = bytes as f64;
    if size >= MB {
        format!("{:.2} MB", size / MB)
    } else if size >= KB {
        format!("{:.2} KB", size / KB)
    } else {
        format!("{} B", bytes)
    }
}
