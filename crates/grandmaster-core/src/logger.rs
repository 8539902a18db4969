//! Stderr logger for the robot.
//!
//! Records from the `grandmaster*` crates are printed at the requested level;
//! everything else (serial, HTTP, image decoding) only at `warn` and above.
//! Lines look like `[  12.034s  INFO vision::detector] 6 tags`.

use std::io::Write;
use std::sync::OnceLock;
use std::time::Instant;

use log::{LevelFilter, Log, Metadata, Record};

#[cfg(feature = "tracing")]
use tracing_subscriber::fmt::format::FmtSpan;
#[cfg(feature = "tracing")]
use tracing_subscriber::util::SubscriberInitExt;
#[cfg(feature = "tracing")]
use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable overriding the level passed to [`init_with_level`].
pub const LOG_ENV: &str = "GRANDMASTER_LOG";

const OWN_PREFIX: &str = "grandmaster";
const DEPENDENCY_LEVEL: LevelFilter = LevelFilter::Warn;

struct StderrLogger {
    level: LevelFilter,
    started: Instant,
}

impl StderrLogger {
    fn threshold(&self, target: &str) -> LevelFilter {
        if target.starts_with(OWN_PREFIX) {
            self.level
        } else {
            self.level.min(DEPENDENCY_LEVEL)
        }
    }
}

/// `grandmaster_vision::detector` -> `vision::detector`, `grandmaster` -> `grandmaster`.
fn short_target(target: &str) -> &str {
    target
        .strip_prefix("grandmaster_")
        .filter(|rest| !rest.is_empty())
        .unwrap_or(target)
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.threshold(metadata.target())
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let elapsed = self.started.elapsed().as_secs_f64();
        let mut stderr = std::io::stderr().lock();
        let _ = writeln!(
            stderr,
            "[{:8.3}s {:>5} {}] {}",
            elapsed,
            record.level(),
            short_target(record.target()),
            record.args()
        );
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

static LOGGER: OnceLock<StderrLogger> = OnceLock::new();

/// Parse a level name (`off`, `error`, .., `trace`), case-insensitively.
pub fn parse_level(value: &str) -> Option<LevelFilter> {
    value.trim().parse().ok()
}

/// Install the stderr logger.
///
/// `GRANDMASTER_LOG` (when set to a valid level) wins over `level`. Only the
/// first successful call has an effect.
pub fn init_with_level(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    if LOGGER.get().is_some() {
        return Ok(());
    }
    let level = std::env::var(LOG_ENV)
        .ok()
        .and_then(|v| parse_level(&v))
        .unwrap_or(level);
    let logger = LOGGER.get_or_init(|| StderrLogger {
        level,
        started: Instant::now(),
    });
    log::set_logger(logger)?;
    log::set_max_level(level);
    if level >= LevelFilter::Debug {
        log::debug!(
            target: "grandmaster",
            "logging at {level}, dependencies at {}",
            level.min(DEPENDENCY_LEVEL)
        );
    }
    Ok(())
}

/// Install a `tracing` subscriber instead of the plain logger.
///
/// The filter comes from `RUST_LOG`; the default keeps the robot crates at
/// `info` and the HTTP and serial stacks at `warn`.
#[cfg(feature = "tracing")]
pub fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(
            "warn,grandmaster=info,grandmaster_vision=info,grandmaster_devices=info,grandmaster_game=info",
        )
    });
    if json {
        let _ = fmt()
            .with_env_filter(filter)
            .with_span_events(FmtSpan::CLOSE)
            .json()
            .flatten_event(true)
            .finish()
            .try_init();
    } else {
        let _ = fmt()
            .with_env_filter(filter)
            .with_span_events(FmtSpan::CLOSE)
            .with_timer(fmt::time::Uptime::default())
            .with_target(true)
            .finish()
            .try_init();
    }
}
