//! Logging utilities with colored output.
//!
//! This module provides:
//! - `log!` macro for formatted terminal output with colored prefixes
//! - `debug!` for output shown only with `--verbose`
//! - `ReloadStatus` and the `status_*` helpers for the serve-mode status block
//!
//! # Example
//!
//! ```ignore
//! log!("sync"; "loaded {} objects", count);
//! status_success("scene reloaded");
//! ```

use crossterm::{
    cursor, execute,
    terminal::{Clear, ClearType},
};
use owo_colors::OwoColorize;
use parking_lot::Mutex;
use std::{
    io::{Write, stdout},
    sync::LazyLock,
    sync::atomic::{AtomicBool, Ordering},
};

/// Global verbose flag (set by --verbose or `debug = true`)
static VERBOSE: AtomicBool = AtomicBool::new(false);

/// Set verbose mode globally
pub fn set_verbose(v: bool) {
    VERBOSE.store(v, Ordering::SeqCst);
}

/// Check if verbose mode is enabled
pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::SeqCst)
}

// ============================================================================
// Log Macro
// ============================================================================

/// Log a message with a colored module prefix
///
/// # Usage
/// ```ignore
/// log!("module"; "message with {} formatting", args);
/// ```
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::log($module, &format!($($arg)*))
    }};
}

/// Log a debug message (only shown when --verbose is enabled)
///
/// # Usage
/// ```ignore
/// debug!("module"; "debug info: {}", value);
/// ```
#[macro_export]
macro_rules! debug {
    ($module:expr; $($arg:tt)*) => {{
        if $crate::logger::is_verbose() {
            $crate::logger::log($module, &format!($($arg)*))
        }
    }};
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Log a message with a colored module prefix
#[inline]
pub fn log(module: &str, message: &str) {
    let prefix = colorize_prefix(module);

    let mut stdout = stdout().lock();
    execute!(stdout, Clear(ClearType::UntilNewLine)).ok();
    writeln!(stdout, "{prefix} {message}").ok();
    stdout.flush().ok();
}

/// Apply color to a module prefix based on module type
#[inline]
fn colorize_prefix(module: &str) -> String {
    let prefix = format!("[{module}]");
    match module.to_ascii_lowercase().as_str() {
        "serve" | "ws" => prefix.bright_blue().bold().to_string(),
        "watch" => prefix.bright_green().bold().to_string(),
        "sync" => prefix.bright_cyan().bold().to_string(),
        "error" => prefix.bright_red().bold().to_string(),
        _ => prefix.bright_yellow().bold().to_string(),
    }
}

// ============================================================================
// Reload status block
// ============================================================================

/// Outcome shown in the reload status block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    Unchanged,
    Warning,
    Error,
}

impl Status {
    fn symbol(self) -> String {
        match self {
            Self::Success => "✓".green().to_string(),
            Self::Unchanged => String::new(),
            Self::Warning => "⚠".yellow().to_string(),
            Self::Error => "✗".red().to_string(),
        }
    }
}

/// UTC wall clock as HH:MM:SS
fn clock() -> String {
    use std::time::SystemTime;
    let secs = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map_or(0, |d| d.as_secs());
    format!(
        "{:02}:{:02}:{:02}",
        (secs / 3600) % 24,
        (secs / 60) % 60,
        secs % 60
    )
}

/// Status block for serve mode. Each report replaces the previous one, so a
/// long session of reloads leaves a single line (plus error detail) behind.
pub struct ReloadStatus {
    /// Height of the block currently on screen
    shown: usize,
}

static RELOAD_STATUS: LazyLock<Mutex<ReloadStatus>> =
    LazyLock::new(|| Mutex::new(ReloadStatus::new()));

impl ReloadStatus {
    pub const fn new() -> Self {
        Self { shown: 0 }
    }

    pub fn report(&mut self, status: Status, summary: &str, detail: &str) {
        let body = render_body(status, summary, detail);
        let symbol = status.symbol();
        let stamp = format!("[{}]", clock()).dimmed().to_string();

        let mut stdout = stdout().lock();
        if self.shown > 0 {
            let height = u16::try_from(self.shown).unwrap_or(u16::MAX);
            execute!(stdout, cursor::MoveUp(height), Clear(ClearType::FromCursorDown)).ok();
        }
        if symbol.is_empty() {
            writeln!(stdout, "{stamp} {body}").ok();
        } else {
            writeln!(stdout, "{stamp} {symbol} {body}").ok();
        }
        stdout.flush().ok();

        self.shown = block_height(&body);
    }
}

fn render_body(status: Status, summary: &str, detail: &str) -> String {
    let summary = match status {
        Status::Unchanged => summary.dimmed().to_string(),
        _ => summary.to_string(),
    };
    if detail.is_empty() {
        summary
    } else {
        format!("{summary}\n{detail}")
    }
}

fn block_height(body: &str) -> usize {
    body.lines().count().max(1)
}

pub fn status_success(message: &str) {
    RELOAD_STATUS.lock().report(Status::Success, message, "");
}

/// Dimmed, no symbol.
pub fn status_unchanged(message: &str) {
    RELOAD_STATUS.lock().report(Status::Unchanged, message, "");
}

pub fn status_error(summary: &str, detail: &str) {
    RELOAD_STATUS.lock().report(Status::Error, summary, detail);
}

pub fn status_warning(detail: &str) {
    RELOAD_STATUS.lock().report(Status::Warning, detail, "");
}
