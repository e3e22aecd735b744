//! Stderr logging for the classification tools.
//!
//! Lines look like `[  0.012s  WARN tilegrid_templates] message`. Records
//! from the `tilegrid*` crates pass at the requested level; records from
//! dependencies (image decoders, thread pools) are held to `Warn` unless
//! the requested level is `Trace`. Library code only talks to the `log`
//! facade; binaries install a backend once.

use std::fmt;
use std::io::Write;
use std::sync::OnceLock;
use std::time::Instant;

use log::{Level, LevelFilter, Log, Metadata, Record};

#[cfg(feature = "tracing")]
use tracing_subscriber::fmt::format::FmtSpan;
#[cfg(feature = "tracing")]
use tracing_subscriber::util::SubscriberInitExt;
#[cfg(feature = "tracing")]
use tracing_subscriber::EnvFilter;

/// Target prefix shared by every crate of the workspace.
pub const OWN_TARGET_PREFIX: &str = "tilegrid";

/// Map a `-v` count (and `-q`) to a level filter: warnings by default,
/// then info, debug, trace.
pub fn verbosity_level(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::Error;
    }
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn is_own_target(target: &str) -> bool {
    target.starts_with(OWN_TARGET_PREFIX)
}

fn format_line(elapsed: f64, level: Level, target: &str, args: &fmt::Arguments<'_>) -> String {
    let source = target.split("::").next().unwrap_or(target);
    format!("[{elapsed:7.3}s {level:>5} {source}] {args}")
}

struct StderrLogger {
    own: LevelFilter,
    foreign: LevelFilter,
    started: Instant,
}

impl StderrLogger {
    fn new(level: LevelFilter) -> Self {
        let foreign = if level == LevelFilter::Trace {
            level
        } else {
            level.min(LevelFilter::Warn)
        };
        Self {
            own: level,
            foreign,
            started: Instant::now(),
        }
    }

    fn threshold(&self, target: &str) -> LevelFilter {
        if is_own_target(target) {
            self.own
        } else {
            self.foreign
        }
    }
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.threshold(metadata.target())
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format_line(
            self.started.elapsed().as_secs_f64(),
            record.level(),
            record.target(),
            record.args(),
        );
        let _ = writeln!(std::io::stderr().lock(), "{line}");
    }

    fn flush(&self) {}
}

static LOGGER: OnceLock<StderrLogger> = OnceLock::new();

/// Install the stderr logger with the provided level filter.
///
/// Calling this more than once is a no-op after the first successful
/// initialization.
pub fn init_with_level(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    if LOGGER.get().is_none() {
        let logger = LOGGER.get_or_init(|| StderrLogger::new(level));
        log::set_logger(logger)?;
        log::set_max_level(level);
    }
    Ok(())
}

/// Output shape of the `tracing` subscriber.
#[cfg(feature = "tracing")]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TracingFormat {
    /// Human-readable lines with uptime stamps.
    #[default]
    Uptime,
    /// One flattened JSON object per event.
    Json,
}

/// Default `tracing` directive: dependencies at `warn`, the workspace
/// crates at `level`.
#[cfg(feature = "tracing")]
pub fn tracing_directive(level: LevelFilter) -> String {
    format!(
        "warn,{OWN_TARGET_PREFIX}={}",
        level.as_str().to_ascii_lowercase()
    )
}

/// Install a `tracing` subscriber that reports span timings on close.
///
/// `RUST_LOG` wins when set; otherwise [`tracing_directive`] is used.
#[cfg(feature = "tracing")]
pub fn init_tracing(level: LevelFilter, format: TracingFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(tracing_directive(level)));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_span_events(FmtSpan::CLOSE);
    let _ = match format {
        TracingFormat::Json => builder.json().flatten_event(true).finish().try_init(),
        TracingFormat::Uptime => builder
            .with_timer(tracing_subscriber::fmt::time::Uptime::default())
            .finish()
            .try_init(),
    };
}
