//! Logging for ward.
//!
//! Library code reports through the `log` facade: every deny is logged at
//! debug level, skipped roots and fail-closed policies at warn level.
//! [`Logger`] is the stderr backend the CLI installs; its [`LogLevel`]
//! comes from `--verbose`/`--quiet` or `WARD_LOG_MODE`.

use std::env;
use std::fmt;

use log::{Level, LevelFilter, Log, Metadata, Record};

/// Environment variable selecting the log level.
pub const LOG_MODE_VAR: &str = "WARD_LOG_MODE";

/// How much diagnostic output reaches stderr.
///
/// # Examples
///
/// ```
/// use ward::LogLevel;
///
/// assert!(LogLevel::Quiet < LogLevel::Normal);
/// assert!(LogLevel::Normal < LogLevel::Verbose);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    /// Nothing.
    Quiet,
    /// Errors and warnings, such as roots that were skipped.
    Normal,
    /// Everything, including why each operation was denied.
    Verbose,
}

impl LogLevel {
    const NAMES: [(&'static str, Self); 3] = [
        ("quiet", Self::Quiet),
        ("normal", Self::Normal),
        ("verbose", Self::Verbose),
    ];

    /// Parse `quiet`, `normal` or `verbose`, ignoring case.
    ///
    /// # Errors
    ///
    /// Returns a message naming the accepted values.
    ///
    /// # Examples
    ///
    /// ```
    /// use ward::LogLevel;
    ///
    /// assert_eq!(LogLevel::parse("VERBOSE").unwrap(), LogLevel::Verbose);
    /// assert!(LogLevel::parse("trace").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self, String> {
        Self::NAMES
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(s.trim()))
            .map(|&(_, level)| level)
            .ok_or_else(|| format!("unknown log mode {s:?} (expected quiet, normal or verbose)"))
    }

    /// The most detailed `log` level shown at this level.
    #[must_use]
    pub const fn filter(self) -> LevelFilter {
        match self {
            Self::Quiet => LevelFilter::Off,
            Self::Normal => LevelFilter::Warn,
            Self::Verbose => LevelFilter::Debug,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = Self::NAMES
            .iter()
            .find(|(_, level)| level == self)
            .map_or("normal", |(name, _)| name);
        f.write_str(name)
    }
}

/// The stderr backend for the `log` facade.
///
/// Lines look like `ward: debug: deny write "x": outside-roots`.
///
/// # Examples
///
/// ```
/// use log::Log;
/// use ward::{Logger, LogLevel};
///
/// let logger = Logger::new(LogLevel::Normal);
/// assert!(logger.enabled(&log::Metadata::builder().level(log::Level::Warn).build()));
/// assert!(!logger.enabled(&log::Metadata::builder().level(log::Level::Debug).build()));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Logger {
    level: LogLevel,
}

impl Default for LogLevel {
    fn default() -> Self {
        Self::Normal
    }
}

impl Logger {
    /// A logger showing messages up to `level`.
    #[must_use]
    pub const fn new(level: LogLevel) -> Self {
        Self { level }
    }

    /// The level in effect.
    #[must_use]
    pub const fn level(&self) -> LogLevel {
        self.level
    }

    /// Format one stderr line.
    #[must_use]
    pub fn format_line(level: Level, message: &fmt::Arguments<'_>) -> String {
        format!("ward: {}: {message}", level.as_str().to_ascii_lowercase())
    }

    /// Install as the global `log` backend and set the facade's filter.
    ///
    /// # Errors
    ///
    /// Returns an error if a global logger was already installed.
    pub fn install(self) -> Result<(), log::SetLoggerError> {
        let filter = self.level.filter();
        log::set_boxed_logger(Box::new(self))?;
        log::set_max_level(filter);
        Ok(())
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.level.filter()
    }

    fn log(&self, record: &Record<'_>) {
        if self.enabled(record.metadata()) {
            eprintln!("{}", Self::format_line(record.level(), record.args()));
        }
    }

    fn flush(&self) {}
}

/// The logger for the given CLI flags.
///
/// `--verbose` wins over `--quiet`; without either, `WARD_LOG_MODE` is
/// consulted, and an unparseable value falls back to normal.
///
/// # Examples
///
/// ```
/// use ward::{init_logger, LogLevel};
///
/// assert_eq!(init_logger(true, true).level(), LogLevel::Verbose);
/// assert_eq!(init_logger(false, true).level(), LogLevel::Quiet);
/// ```
#[must_use]
pub fn init_logger(verbose: bool, quiet: bool) -> Logger {
    let level = match (verbose, quiet) {
        (true, _) => LogLevel::Verbose,
        (false, true) => LogLevel::Quiet,
        (false, false) => env::var(LOG_MODE_VAR)
            .ok()
            .and_then(|mode| LogLevel::parse(&mode).ok())
            .unwrap_or_default(),
    };
    Logger::new(level)
}
