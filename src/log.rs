//! Console logging for the model, backed by `log4rs`.
//!
//! Logging is off until a level is set, usually through the `--log-level` option of the `seirv`
//! binary. The engine logs under its module paths:
//!
//! - `ixa_seirv::simulation`: run start and end at `info`, daily counts at `debug`, every
//!   transmission and progression transition at `trace`.
//! - `ixa_seirv::environment`: population traits at `debug`.
//! - `ixa_seirv::batch` and `ixa_seirv::runner`: batch progress and configuration at `info` and
//!   `debug`.
//!
//! A per-target filter overrides the global level for that module and its children:
//!
//! ```rust
//! use ixa_seirv::log::{set_log_level, set_module_filters, LevelFilter};
//!
//! set_log_level(LevelFilter::Info).unwrap();
//! set_module_filters(&[("ixa_seirv::simulation", LevelFilter::Trace)]).unwrap();
//! ```

pub use log::{debug, error, info, trace, warn, LevelFilter};

use std::sync::{LazyLock, Mutex, MutexGuard, PoisonError};

use log4rs::append::console::ConsoleAppender;
use log4rs::config::{Appender, Logger, Root};
use log4rs::encode::pattern::PatternEncoder;
use log4rs::{Config, Handle};

use crate::error::SeirvError;
use crate::hashing::HashMap;

// ISO 8601 timestamp, color coded level, target
const LOG_PATTERN: &str = "{d(%Y-%m-%dT%H:%M:%SZ)} {h({l})} {t} - {m}{n}";
const CONSOLE: &str = "console";

static CONSOLE_LOGGER: LazyLock<Mutex<ConsoleLogger>> =
    LazyLock::new(|| Mutex::new(ConsoleLogger::new()));

/// The level filters in force and the handle of the installed `log4rs` logger, if any.
#[derive(Debug)]
struct ConsoleLogger {
    level: LevelFilter,
    targets: HashMap<String, LevelFilter>,
    handle: Option<Handle>,
}

impl ConsoleLogger {
    fn new() -> Self {
        ConsoleLogger {
            level: LevelFilter::Off,
            targets: HashMap::default(),
            handle: None,
        }
    }

    fn config(&self) -> Result<Config, SeirvError> {
        let console = ConsoleAppender::builder()
            .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
            .build();
        let mut builder =
            Config::builder().appender(Appender::builder().build(CONSOLE, Box::new(console)));

        let mut targets: Vec<(&String, &LevelFilter)> = self.targets.iter().collect();
        targets.sort();
        for (target, level) in targets {
            builder = builder.logger(Logger::builder().build(target.as_str(), *level));
        }

        builder
            .build(Root::builder().appender(CONSOLE).build(self.level))
            .map_err(|errors| {
                SeirvError::SeirvError(format!("invalid log configuration: {errors}"))
            })
    }

    /// Installs the logger on first use and swaps its configuration afterwards.
    fn apply(&mut self) -> Result<(), SeirvError> {
        let config = self.config()?;
        match &self.handle {
            Some(handle) => handle.set_config(config),
            None => {
                let handle = log4rs::init_config(config).map_err(|error| {
                    SeirvError::SeirvError(format!("could not install the logger: {error}"))
                })?;
                self.handle = Some(handle);
            }
        }
        Ok(())
    }
}

fn console_logger() -> MutexGuard<'static, ConsoleLogger> {
    CONSOLE_LOGGER
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}

/// Sets the level for every target without a filter of its own. `LevelFilter::Off` silences
/// them.
///
/// # Errors
///
/// Returns an error if the logger cannot be installed.
pub fn set_log_level(level: LevelFilter) -> Result<(), SeirvError> {
    let mut logger = console_logger();
    logger.level = level;
    logger.apply()
}

/// Sets the level of each `(target, level)` pair, replacing any earlier filter for that target.
///
/// # Errors
///
/// Returns an error if the logger cannot be installed.
pub fn set_module_filters<S: AsRef<str>>(
    filters: &[(S, LevelFilter)],
) -> Result<(), SeirvError> {
    let mut logger = console_logger();
    for (target, level) in filters {
        logger.targets.insert(target.as_ref().to_string(), *level);
    }
    logger.apply()
}
