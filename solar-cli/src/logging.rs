//! Process-wide `tracing` setup for the `octosolar` binary.
//!
//! Records go to stderr so command output on stdout stays clean, and
//! optionally to a log file named in `[logging] file`.

use std::fs::File;
use std::io::{self, IsTerminal, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use anyhow::{Context, Result, anyhow};
use chrono::Local;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::{FormatEvent, FormatFields, Writer};
use tracing_subscriber::fmt::{FmtContext, MakeWriter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, filter, reload};

/// Targets whose name is left off the line: this crate and the binary.
const OWN_TARGETS: [&str; 2] = ["solar_cli", "octosolar"];

const RESET: &str = "\x1b[0m";

/// `<local timestamp> <LEVEL> [library target] <fields>`
struct LineFormat;

fn level_color(level: Level) -> &'static str {
    match level {
        Level::ERROR => "\x1b[1;31m",
        Level::WARN => "\x1b[1;33m",
        Level::INFO => "\x1b[1;32m",
        Level::DEBUG => "\x1b[1;34m",
        Level::TRACE => "\x1b[1;35m",
    }
}

impl<S, N> FormatEvent<S, N> for LineFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let meta = event.metadata();
        let stamp = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
        let target = meta.target();
        let own = OWN_TARGETS.iter().any(|t| target.starts_with(t));

        if writer.has_ansi_escapes() {
            let color = level_color(*meta.level());
            write!(writer, "\x1b[2m{stamp}{RESET} {color}{:>5}{RESET} ", meta.level())?;
            if !own {
                write!(writer, "\x1b[36m{target}{RESET} ")?;
            }
        } else {
            write!(writer, "{stamp} {:>5} ", meta.level())?;
            if !own {
                write!(writer, "{target} ")?;
            }
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// The file layer's destination. Writes are dropped while it is empty.
#[derive(Clone, Default)]
struct LogFile(Arc<Mutex<Option<File>>>);

impl LogFile {
    /// Ignores poisoning so one panicking writer does not end file logging.
    fn lock(&self) -> MutexGuard<'_, Option<File>> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

struct LogFileWriter<'a>(MutexGuard<'a, Option<File>>);

impl Write for LogFileWriter<'_> {
    fn write(
        &mut self,
        buf: &[u8],
    ) -> io::Result<usize> {
        self.0.as_mut().map_or(Ok(buf.len()), |file| file.write(buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.as_mut().map_or(Ok(()), |file| file.flush())
    }
}

impl<'a> MakeWriter<'a> for LogFile {
    type Writer = LogFileWriter<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        LogFileWriter(self.lock())
    }
}

/// Runtime controls captured by [`init_logging`].
struct Controls {
    level: reload::Handle<EnvFilter, Registry>,
    console: Arc<AtomicBool>,
    log_file: LogFile,
}

static CONTROLS: OnceLock<Controls> = OnceLock::new();

fn controls() -> Result<&'static Controls> {
    CONTROLS.get().ok_or_else(|| anyhow!("logging not yet initialized"))
}

/// Replaces the level filter shared by the console and the log file.
///
/// Takes a bare level such as `debug` or a full `EnvFilter` directive.
pub fn set_log_level(directive: &str) -> Result<()> {
    let controls = controls()?;
    let filter = EnvFilter::try_new(directive)
        .with_context(|| format!("invalid log level '{directive}'"))?;
    controls.level.reload(filter).context("filter reload failed")
}

/// Shows or hides console output. The log file is unaffected.
pub fn set_console_enabled(enabled: bool) -> Result<()> {
    controls()?.console.store(enabled, Ordering::Relaxed);
    Ok(())
}

/// Points the file layer at `path`, appending, or closes the current file
/// when `path` is `None`. The parent directory must already exist.
pub fn set_log_file(path: Option<&Path>) -> Result<()> {
    let controls = controls()?;
    let file = match path {
        Some(path) => Some(
            File::options()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("cannot open log file '{}'", path.display()))?,
        ),
        None => None,
    };
    *controls.log_file.lock() = file;
    Ok(())
}

/// Installs the global subscriber. Later calls leave the first one in place.
///
/// The level comes from `RUST_LOG` when set, otherwise `default_directive`.
/// No log file is open until [`set_log_file`] is called.
pub fn init_logging(default_directive: &str) {
    let initial = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let (level_filter, level) = reload::Layer::<EnvFilter, Registry>::new(initial);

    let console = Arc::new(AtomicBool::new(true));
    let console_on = console.clone();
    let log_file = LogFile::default();

    let console_layer = tracing_subscriber::fmt::layer()
        .event_format(LineFormat)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_filter(filter::filter_fn(move |_| console_on.load(Ordering::Relaxed)));

    let file_layer = tracing_subscriber::fmt::layer()
        .event_format(LineFormat)
        .with_ansi(false)
        .with_writer(log_file.clone());

    let installed = tracing_subscriber::registry()
        .with(level_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init();

    if installed.is_ok() {
        let _ = CONTROLS.set(Controls {
            level,
            console,
            log_file,
        });
    }
}
