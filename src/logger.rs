//! Structured logging with box-drawing output.
//!
//! Every line is routed through [`write_output`], which prints to stdout or,
//! when a host owns stdout, forwards to a file writer thread started with
//! [`Log::start_file_logging`].
//!
//! ## Logging Conventions
//!
//! - **`log_block_start!`**: opens a new conceptual block (an update cycle, a
//!   configuration load). Prints an empty pipe `┃` then `┣ message`.
//! - **`log_decorated!`**: continues the current block with `┣ message`.
//! - **`log_indented!`**: nested detail under a block, `┃   message`.
//! - **`log_pipe!`**: a single empty `┃` line for spacing before a semantic
//!   message that starts its own block.
//! - **`log_version!`** / **`log_end!`**: header and terminator, once each per
//!   extension lifetime.
//! - **`log_info!`, `log_warning!`, `log_error!`, `log_debug!`**: semantic
//!   messages with a colored `[LEVEL]` tag. `log_debug!` is silent unless
//!   [`Log::set_debug`] enabled it.

use std::io::Write;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Sender, channel};

static LOGGING_ENABLED: AtomicBool = AtomicBool::new(true);
static DEBUG_ENABLED: AtomicBool = AtomicBool::new(false);

// Set once when file logging starts; stdout is used otherwise
static LOG_CHANNEL: OnceLock<Sender<LogMessage>> = OnceLock::new();

enum LogMessage {
    Formatted(String),
    Shutdown,
}

/// Shape of a single log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line {
    BlockStart,
    Decorated,
    Indented,
    Info,
    Warning,
    Error,
    Debug,
}

/// Global switches for the logger.
pub struct Log;

impl Log {
    /// Enable or disable all output. Tests use this to keep runs quiet.
    pub fn set_enabled(enabled: bool) {
        LOGGING_ENABLED.store(enabled, Ordering::SeqCst);
    }

    pub fn is_enabled() -> bool {
        LOGGING_ENABLED.load(Ordering::SeqCst)
    }

    /// Enable or disable `log_debug!` output.
    pub fn set_debug(enabled: bool) {
        DEBUG_ENABLED.store(enabled, Ordering::SeqCst);
    }

    pub fn is_debug() -> bool {
        DEBUG_ENABLED.load(Ordering::SeqCst)
    }

    /// Route all further output to `file_path` instead of stdout.
    ///
    /// Lines are written by a background thread. ANSI color codes are stripped.
    /// The returned guard flushes and joins the writer when dropped. File
    /// logging can be started only once per process.
    pub fn start_file_logging(file_path: impl Into<std::path::PathBuf>) -> anyhow::Result<LoggerGuard> {
        let file_path = file_path.into();
        if LOG_CHANNEL.get().is_some() {
            anyhow::bail!("Logger channel already initialized");
        }
        let mut file = std::fs::File::create(&file_path).map_err(|e| {
            anyhow::anyhow!("Failed to create log file {}: {e}", file_path.display())
        })?;

        let (tx, rx) = channel();
        LOG_CHANNEL
            .set(tx.clone())
            .map_err(|_| anyhow::anyhow!("Logger channel already initialized"))?;

        let handle = std::thread::spawn(move || {
            loop {
                match rx.recv() {
                    Ok(LogMessage::Formatted(text)) => {
                        file.write_all(text.as_bytes())?;
                    }
                    Ok(LogMessage::Shutdown) | Err(_) => {
                        file.flush()?;
                        break;
                    }
                }
            }

            Ok::<(), anyhow::Error>(())
        });

        Ok(LoggerGuard {
            tx,
            handle: Some(handle),
        })
    }
}

/// Guard for file logging that flushes the writer thread on drop.
pub struct LoggerGuard {
    tx: Sender<LogMessage>,
    handle: Option<std::thread::JoinHandle<anyhow::Result<()>>>,
}

impl Drop for LoggerGuard {
    fn drop(&mut self) {
        let _ = self.tx.send(LogMessage::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn strip_ansi_codes(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '\x1b' && chars.peek() == Some(&'[') {
            chars.next();
            for ch in chars.by_ref() {
                if ch == 'm' {
                    break;
                }
            }
        } else {
            result.push(ch);
        }
    }

    result
}

/// Render one line in the box-drawing style.
pub fn render(line: Line, message: &str) -> String {
    match line {
        Line::BlockStart => format!("┃\n┣ {message}\n"),
        Line::Decorated => format!("┣ {message}\n"),
        Line::Indented => format!("┃   {message}\n"),
        Line::Info => format!("┣[\x1b[32mINFO\x1b[0m] {message}\n"),
        Line::Warning => format!("┣[\x1b[33mWARNING\x1b[0m] {message}\n"),
        Line::Error => format!("┣[\x1b[31mERROR\x1b[0m] {message}\n"),
        Line::Debug => format!("┣[\x1b[36mDEBUG\x1b[0m] {message}\n"),
    }
}

/// Format and write a line if logging (and, for debug lines, debug output) is on.
pub fn emit(line: Line, message: &str) {
    if !Log::is_enabled() || (line == Line::Debug && !Log::is_debug()) {
        return;
    }
    write_output(&render(line, message));
}

// Public because the macros expand to it
pub fn write_output(text: &str) {
    if let Some(tx) = LOG_CHANNEL.get() {
        let _ = tx.send(LogMessage::Formatted(strip_ansi_codes(text)));
    } else {
        print!("{text}");
        let _ = std::io::stdout().flush();
    }
}

// # Logging Macros

/// Open a new block of related messages.
#[macro_export]
macro_rules! log_block_start {
    ($fmt:literal $($arg:tt)*) => {
        $crate::logger::emit($crate::logger::Line::BlockStart, &format!($fmt $($arg)*))
    };
    ($expr:expr) => {
        $crate::logger::emit($crate::logger::Line::BlockStart, &format!("{}", $expr))
    };
}

/// Continue the current block.
#[macro_export]
macro_rules! log_decorated {
    ($fmt:literal $($arg:tt)*) => {
        $crate::logger::emit($crate::logger::Line::Decorated, &format!($fmt $($arg)*))
    };
    ($expr:expr) => {
        $crate::logger::emit($crate::logger::Line::Decorated, &format!("{}", $expr))
    };
}

/// Nested detail inside a block.
#[macro_export]
macro_rules! log_indented {
    ($fmt:literal $($arg:tt)*) => {
        $crate::logger::emit($crate::logger::Line::Indented, &format!($fmt $($arg)*))
    };
    ($expr:expr) => {
        $crate::logger::emit($crate::logger::Line::Indented, &format!("{}", $expr))
    };
}

/// Empty pipe line for vertical spacing.
#[macro_export]
macro_rules! log_pipe {
    () => {{
        if $crate::logger::Log::is_enabled() {
            $crate::logger::write_output("┃\n");
        }
    }};
}

/// Header printed when an extension instance starts.
#[macro_export]
macro_rules! log_version {
    () => {{
        if $crate::logger::Log::is_enabled() {
            let version = env!("CARGO_PKG_VERSION");
            $crate::logger::write_output(&format!("┏ dashsunrise v{version} ━━╸\n"));
        }
    }};
}

/// Terminator printed on teardown.
#[macro_export]
macro_rules! log_end {
    () => {{
        if $crate::logger::Log::is_enabled() {
            $crate::logger::write_output("╹\n");
        }
    }};
}

#[macro_export]
macro_rules! log_info {
    ($fmt:literal $($arg:tt)*) => {
        $crate::logger::emit($crate::logger::Line::Info, &format!($fmt $($arg)*))
    };
    ($expr:expr) => {
        $crate::logger::emit($crate::logger::Line::Info, &format!("{}", $expr))
    };
}

#[macro_export]
macro_rules! log_warning {
    ($fmt:literal $($arg:tt)*) => {
        $crate::logger::emit($crate::logger::Line::Warning, &format!($fmt $($arg)*))
    };
    ($expr:expr) => {
        $crate::logger::emit($crate::logger::Line::Warning, &format!("{}", $expr))
    };
}

#[macro_export]
macro_rules! log_error {
    ($fmt:literal $($arg:tt)*) => {
        $crate::logger::emit($crate::logger::Line::Error, &format!($fmt $($arg)*))
    };
    ($expr:expr) => {
        $crate::logger::emit($crate::logger::Line::Error, &format!("{}", $expr))
    };
}

/// Debug message, only written when debug output is enabled.
#[macro_export]
macro_rules! log_debug {
    ($fmt:literal $($arg:tt)*) => {
        $crate::logger::emit($crate::logger::Line::Debug, &format!($fmt $($arg)*))
    };
    ($expr:expr) => {
        $crate::logger::emit($crate::logger::Line::Debug, &format!("{}", $expr))
    };
}
