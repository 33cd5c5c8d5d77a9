// fuzzer/src/logger.rs
use crate::errors::{FuzzerError, Result};
use crate::resources::{self, LogSink};
use chrono::{Local, NaiveDateTime};
use std::cell::Cell;
use std::fmt;
use std::io;
use std::path::Path;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::field::{Field, Visit};
use tracing::metadata::LevelFilter;
use tracing::{Dispatch, Event, Level, Subscriber};
use tracing_subscriber::fmt::format::{FmtSpan, FormatEvent, FormatFields, Writer};
use tracing_subscriber::fmt::{FmtContext, MakeWriter};
use tracing_subscriber::registry::{LookupSpan, Registry};
use tracing_subscriber::{layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter, Layer};

const TRACE_ENV_VAR: &str = "FUZZER_TRACE";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Severity scale of the report log, from quietest to chattiest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum LogLevel {
    Silent,
    Error,
    Warning,
    #[default]
    Info,
    Debug,
    Advanced,
}

impl LogLevel {
    pub const ALL: [LogLevel; 6] = [
        LogLevel::Silent,
        LogLevel::Error,
        LogLevel::Warning,
        LogLevel::Info,
        LogLevel::Debug,
        LogLevel::Advanced,
    ];

    pub fn label(self) -> &'static str {
        match self {
            LogLevel::Silent => "SILENT",
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARNING",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
            LogLevel::Advanced => "ADVANCED",
        }
    }

    pub fn from_index(index: u8) -> Option<LogLevel> {
        LogLevel::ALL.get(usize::from(index)).copied()
    }

    /// Threshold filter for the report subscriber. SILENT turns it off.
    pub fn filter(self) -> LevelFilter {
        match self {
            LogLevel::Silent => LevelFilter::OFF,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warning => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Advanced => LevelFilter::TRACE,
        }
    }

    fn from_tracing(level: Level) -> LogLevel {
        match level {
            Level::ERROR => LogLevel::Error,
            Level::WARN => LogLevel::Warning,
            Level::INFO => LogLevel::Info,
            Level::DEBUG => LogLevel::Debug,
            Level::TRACE => LogLevel::Advanced,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for LogLevel {
    type Err = FuzzerError;

    /// Accepts a level name in any case or its position on the scale (`0`-`5`).
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if let Ok(index) = trimmed.parse::<u8>() {
            return LogLevel::from_index(index)
                .ok_or_else(|| FuzzerError::Config(format!("Log level {} is out of range 0-5", index)));
        }
        LogLevel::ALL
            .iter()
            .copied()
            .find(|level| level.label().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| FuzzerError::Config(format!("Unknown log level '{}'", trimmed)))
    }
}

/// Renders one report line, without the trailing line break.
pub fn format_entry(at: NaiveDateTime, level: LogLevel, message: &str) -> String {
    format!("[{}] {}:{}", at.format(TIMESTAMP_FORMAT), level, message)
}

#[derive(Default)]
struct MessageVisitor {
    message: String,
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        }
    }
}

/// `[YYYY-MM-DD HH:MM:SS] LEVEL:message`, one line per event.
struct ReportFormat;

impl<S, N> FormatEvent<S, N> for ReportFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(&self, _ctx: &FmtContext<'_, S, N>, mut writer: Writer<'_>, event: &Event<'_>) -> fmt::Result {
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        let level = LogLevel::from_tracing(*event.metadata().level());
        writeln!(writer, "{}", format_entry(Local::now().naive_local(), level, &visitor.message))
    }
}

/// File slot shared between the logger and its file layer. Empty until a
/// sink is attached.
#[derive(Debug, Clone, Default)]
struct SharedSink(Arc<Mutex<Option<LogSink>>>);

impl SharedSink {
    fn lock(&self) -> MutexGuard<'_, Option<LogSink>> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<'a> MakeWriter<'a> for SharedSink {
    type Writer = SinkWriter<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        SinkWriter(self.lock())
    }
}

/// Writes and flushes each entry before the lock is released.
struct SinkWriter<'a>(MutexGuard<'a, Option<LogSink>>);

impl io::Write for SinkWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let failure = match self.0.as_mut() {
            Some(sink) => sink.append(buf).err().map(|e| (sink.path().display().to_string(), e)),
            None => None,
        };
        if let Some((path, e)) = failure {
            eprintln!(
                "[E] Writing to the output file '{}' failed, continuing on the console only: {}",
                path, e
            );
            *self.0 = None;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Report log: a private `tracing` subscriber with a stdout layer and an
/// append-only file layer, both gated by a reloadable level filter.
///
/// Events reach it only through [`Logger::in_scope`], so the report log and
/// the process-wide diagnostics never mix. The file is closed when the
/// logger is dropped.
pub struct Logger {
    dispatch: Dispatch,
    filter: reload::Handle<LevelFilter, Registry>,
    threshold: Cell<LogLevel>,
    sink: SharedSink,
}

impl Logger {
    pub fn console(threshold: LogLevel) -> Self {
        let sink = SharedSink::default();
        let (filter_layer, filter) = reload::Layer::new(threshold.filter());

        let console_layer = tracing_subscriber::fmt::layer()
            .with_writer(io::stdout)
            .with_ansi(false)
            .event_format(ReportFormat);
        let file_layer = tracing_subscriber::fmt::layer()
            .with_writer(sink.clone())
            .with_ansi(false)
            .event_format(ReportFormat);

        let subscriber = tracing_subscriber::registry()
            .with(filter_layer)
            .with(console_layer)
            .with(file_layer);

        Logger {
            dispatch: Dispatch::new(subscriber),
            filter,
            threshold: Cell::new(threshold),
            sink,
        }
    }

    /// Opens `path` as the file sink. Failure is reported on the console and the
    /// logger carries on console-only.
    pub fn open(path: &Path, threshold: LogLevel) -> Self {
        let logger = Logger::console(threshold);
        match resources::open_log_file(path) {
            Ok(sink) => logger.attach(sink),
            Err(e) => {
                let msg = e.to_string();
                logger.in_scope(|| tracing::error!("{}", msg));
            }
        }
        logger
    }

    /// Replaces the file sink, if any.
    pub fn attach(&self, sink: LogSink) {
        tracing::debug!(path = %sink.path().display(), "report log sink attached");
        *self.sink.lock() = Some(sink);
    }

    #[cfg(test)]
    pub fn has_sink(&self) -> bool {
        self.sink.lock().is_some()
    }

    pub fn set_threshold(&self, threshold: LogLevel) {
        self.threshold.set(threshold);
        if let Err(e) = self.filter.reload(threshold.filter()) {
            tracing::warn!("Could not change the report log level: {}", e);
        }
    }

    pub fn enabled(&self, level: LogLevel) -> bool {
        let threshold = self.threshold.get();
        threshold != LogLevel::Silent && level != LogLevel::Silent && level <= threshold
    }

    /// Runs `f` with this logger's subscriber as the current dispatcher.
    pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        tracing::dispatcher::with_default(&self.dispatch, f)
    }
}

/// Installs the stderr diagnostics subscriber. `FUZZER_TRACE` takes an
/// `EnvFilter` directive and wins over the `debug` default.
pub fn setup_tracing(debug: bool) -> Result<()> {
    let default_level = if debug { LevelFilter::DEBUG } else { LevelFilter::WARN };
    let filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .with_env_var(TRACE_ENV_VAR)
        .from_env_lossy();

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_target(false)
        .with_level(true)
        .with_ansi(true)
        .with_span_events(FmtSpan::NONE)
        .without_time()
        .with_filter(filter);

    tracing_subscriber::registry()
        .with(stderr_layer)
        .try_init()
        .map_err(|e| FuzzerError::LoggingSetup(format!("Failed to initialize diagnostics: {}", e)))?;

    Ok(())
}

// --- Macros --- (No #[macro_export])
macro_rules! log_error {
    ($logger:expr, $($arg:tt)*) => {{
        let msg = format!($($arg)*);
        $logger.in_scope(|| tracing::error!("{}", msg));
    }};
}

macro_rules! log_warn {
    ($logger:expr, $($arg:tt)*) => {{
        let msg = format!($($arg)*);
        $logger.in_scope(|| tracing::warn!("{}", msg));
    }};
}

macro_rules! log_info {
    ($logger:expr, $($arg:tt)*) => {{
        let msg = format!($($arg)*);
        $logger.in_scope(|| tracing::info!("{}", msg));
    }};
}

macro_rules! log_debug {
    ($logger:expr, $($arg:tt)*) => {{
        let msg = format!($($arg)*);
        $logger.in_scope(|| tracing::debug!("{}", msg));
    }};
}

macro_rules! log_advanced {
    ($logger:expr, $($arg:tt)*) => {{
        let msg = format!($($arg)*);
        $logger.in_scope(|| tracing::trace!("{}", msg));
    }};
}

pub(crate) use log_advanced;
pub(crate) use log_debug;
pub(crate) use log_error;
pub(crate) use log_info;
pub(crate) use log_warn;
