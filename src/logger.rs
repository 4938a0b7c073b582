//! Process-wide log4rs setup: stderr always, plus a size-rolled `evgrid.log` when a log
//! directory is configured.

use log::LevelFilter;
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::append::rolling_file::RollingFileAppender;
use log4rs::append::rolling_file::policy::compound::{
    CompoundPolicy, roll::fixed_window::FixedWindowRoller, trigger::size::SizeTrigger,
};
use log4rs::config::{Appender, Config, Logger, Root};
use log4rs::encode::pattern::PatternEncoder;
use std::path::Path;

use crate::errors::AppError;

const PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S%.3f)} [{l}] {t} - {m}{n}";
const ROLL_BYTES: u64 = 10 * 1024 * 1024;

/// # Errors
/// [`AppError::Config`] for an unknown level name.
pub fn parse_level(level: &str) -> Result<LevelFilter, AppError> {
    level.trim().parse().map_err(|_| AppError::Config(format!("unknown log level: {level}")))
}

/// Builds the logging config without installing it.
///
/// Developer trace lines stay off the console and only reach the file, at TRACE, when the
/// level itself is TRACE.
///
/// # Errors
/// Directory creation, appender or config failures.
pub fn build_config(dir: Option<&Path>, level: &str, retention: u32) -> Result<Config, AppError> {
    let lvl = parse_level(level)?;
    let console = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(PATTERN)))
        .build();
    let mut builder =
        Config::builder().appender(Appender::builder().build("console", Box::new(console)));
    let mut root = Root::builder().appender("console");

    if let Some(dir) = dir {
        std::fs::create_dir_all(dir)?;
        let roller = FixedWindowRoller::builder()
            .build(&dir.join("evgrid.{}.log").display().to_string(), retention.max(1))
            .map_err(|e| AppError::Config(format!("log roller: {e}")))?;
        let policy = CompoundPolicy::new(Box::new(SizeTrigger::new(ROLL_BYTES)), Box::new(roller));
        let file = RollingFileAppender::builder()
            .encoder(Box::new(PatternEncoder::new(PATTERN)))
            .build(dir.join("evgrid.log"), Box::new(policy))?;
        builder = builder.appender(Appender::builder().build("file", Box::new(file)));
        root = root.appender("file");
    }

    let trace_level = if lvl == LevelFilter::Trace { LevelFilter::Trace } else { LevelFilter::Off };
    let mut trace_logger = Logger::builder().additive(false);
    if dir.is_some() {
        trace_logger = trace_logger.appender("file");
    }
    builder
        .logger(trace_logger.build(crate::devlog::TARGET, trace_level))
        .build(root.build(lvl))
        .map_err(|e| AppError::Config(format!("log config: {e}")))
}

/// Installs the global logger. Fails if one is already installed.
///
/// # Errors
/// Any [`build_config`] failure, or a logger already being set.
pub fn init(dir: Option<&Path>, level: &str, retention: u32) -> Result<log4rs::Handle, AppError> {
    let config = build_config(dir, level, retention)?;
    log4rs::init_config(config).map_err(|e| AppError::Config(format!("logger: {e}")))
}
