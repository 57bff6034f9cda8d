//! Diagnostic log output for scans.
//!
//! Library code only talks to the `log` facade. A binary installs one sink,
//! either stderr ([`init_with_level`]) or a log file ([`init_with_file`]).
//! Lines carry the time since installation and the emitting subsystem,
//! e.g. `[  0.012s DEBUG grid::slots] column bin 10-11 ...`.

use std::fs::File;
use std::io::{self, LineWriter, Write};
use std::path::Path;
use std::sync::{Mutex, OnceLock};
use std::time::Instant;

use log::{LevelFilter, Log, Metadata, Record};

#[cfg(feature = "tracing")]
use tracing_subscriber::fmt::format::FmtSpan;
#[cfg(feature = "tracing")]
use tracing_subscriber::util::SubscriberInitExt;
#[cfg(feature = "tracing")]
use tracing_subscriber::{fmt, EnvFilter};

/// Default file name used by front ends that log to a file.
pub const DEFAULT_LOG_FILE: &str = "tubescan.log";

/// Installing the diagnostic sink failed.
#[derive(thiserror::Error, Debug)]
pub enum LoggerError {
    #[error("cannot open log file: {0}")]
    Io(#[from] io::Error),
    #[error("a logger is already installed")]
    AlreadySet,
}

enum Sink {
    Stderr,
    File(Mutex<LineWriter<File>>),
}

struct ScanLogger {
    level: LevelFilter,
    started: Instant,
    sink: Sink,
}

/// `tubescan_grid::slots` -> `grid::slots`; foreign targets are kept as is.
fn subsystem(target: &str) -> &str {
    target
        .strip_prefix("tubescan_")
        .or_else(|| target.strip_prefix("tubescan::"))
        .unwrap_or(target)
}

impl ScanLogger {
    fn format(&self, record: &Record) -> String {
        format!(
            "[{:8.3}s {:>5} {}] {}\n",
            self.started.elapsed().as_secs_f64(),
            record.level(),
            subsystem(record.target()),
            record.args()
        )
    }
}

impl Log for ScanLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = self.format(record);
        match &self.sink {
            Sink::Stderr => {
                let _ = io::stderr().write_all(line.as_bytes());
            }
            Sink::File(file) => {
                if let Ok(mut file) = file.lock() {
                    let _ = file.write_all(line.as_bytes());
                }
            }
        }
    }

    fn flush(&self) {
        if let Sink::File(file) = &self.sink {
            if let Ok(mut file) = file.lock() {
                let _ = file.flush();
            }
        }
    }
}

static LOGGER: OnceLock<ScanLogger> = OnceLock::new();

fn install(level: LevelFilter, sink: Sink) -> Result<(), LoggerError> {
    if LOGGER.get().is_some() {
        return Ok(());
    }
    let logger = LOGGER.get_or_init(|| ScanLogger {
        level,
        started: Instant::now(),
        sink,
    });
    log::set_logger(logger).map_err(|_| LoggerError::AlreadySet)?;
    log::set_max_level(level);
    Ok(())
}

/// Send diagnostics at `level` and above to stderr.
///
/// Only the first successful call in a process installs a sink; later calls
/// are no-ops.
pub fn init_with_level(level: LevelFilter) -> Result<(), LoggerError> {
    install(level, Sink::Stderr)
}

/// Send diagnostics at `level` and above to `path`, truncating it.
pub fn init_with_file(level: LevelFilter, path: impl AsRef<Path>) -> Result<(), LoggerError> {
    if LOGGER.get().is_some() {
        return Ok(());
    }
    let file = File::create(path)?;
    install(level, Sink::File(Mutex::new(LineWriter::new(file))))
}

/// Install a `tracing` subscriber filtered by `RUST_LOG` (default `info`).
#[cfg(feature = "tracing")]
pub fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(io::stderr);
    if json {
        let _ = builder.json().flatten_event(true).finish().try_init();
    } else {
        let _ = builder
            .with_timer(fmt::time::Uptime::default())
            .finish()
            .try_init();
    }
}
