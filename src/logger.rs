use log::LevelFilter;
use log4rs::append::rolling_file::RollingFileAppender;
use log4rs::append::rolling_file::policy::compound::{
    CompoundPolicy, roll::fixed_window::FixedWindowRoller, trigger::size::SizeTrigger,
};
use log4rs::config::{Appender, Config, Logger, Root};
use log4rs::encode::pattern::PatternEncoder;
use std::path::{Path, PathBuf};

use crate::config::LogConfig;
use crate::errors::GateError;

const PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S%.3f)} [{l}] {t} - {m}{n}";
const ROLL_SIZE: u64 = 10 * 1024 * 1024;

fn parse_level(level: Option<&str>) -> LevelFilter {
    match level.unwrap_or("info").to_ascii_lowercase().as_str() {
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        "off" => LevelFilter::Off,
        _ => LevelFilter::Info,
    }
}

fn rolling(base: &Path, name: &str, keep: u32) -> Result<RollingFileAppender, GateError> {
    let cfg_err = |e: Box<dyn std::error::Error>| GateError::Config(format!("{name} log: {e}"));
    let roller = FixedWindowRoller::builder()
        .build(&base.join(format!("{name}.{{}}.log")).display().to_string(), keep)
        .map_err(|e| cfg_err(e.into()))?;
    let policy = CompoundPolicy::new(Box::new(SizeTrigger::new(ROLL_SIZE)), Box::new(roller));
    RollingFileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(PATTERN)))
        .build(base.join(format!("{name}.log")), Box::new(policy))
        .map_err(|e| cfg_err(e.into()))
}

/// Installs process-wide logging.
///
/// - `app.log` receives everything at `level` (default info).
/// - `audit.log` receives rejected filters (`docgate::audit`) and nothing else.
///
/// Both roll at 10 MiB, keeping `retention` files (default 7).
///
/// # Errors
/// Returns `GateError::Config` if the directory or appenders cannot be created,
/// or if a global logger is already installed.
pub fn configure_logging(
    dir: Option<&Path>,
    level: Option<&str>,
    retention: Option<usize>,
) -> Result<(), GateError> {
    let base = match dir {
        Some(d) => d.to_path_buf(),
        None => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    };
    std::fs::create_dir_all(&base)
        .map_err(|e| GateError::Config(format!("{}: {e}", base.display())))?;
    let keep = u32::try_from(retention.unwrap_or(7)).unwrap_or(u32::MAX);
    let lvl = parse_level(level);

    let config = Config::builder()
        .appender(Appender::builder().build("app", Box::new(rolling(&base, "app", keep)?)))
        .appender(Appender::builder().build("audit", Box::new(rolling(&base, "audit", keep)?)))
        .logger(Logger::builder().appender("audit").additive(false).build("docgate::audit", lvl))
        .build(Root::builder().appender("app").build(lvl))
        .map_err(|e| GateError::Config(e.to_string()))?;
    log4rs::init_config(config).map_err(|e| GateError::Config(e.to_string()))?;
    Ok(())
}

/// # Errors
/// See [`configure_logging`].
pub fn configure_from_config(cfg: &LogConfig) -> Result<(), GateError> {
    configure_logging(cfg.dir.as_deref(), cfg.level.as_deref(), cfg.retention)
}

/// Configure logging from `DOCGATE_LOG_DIR`, `DOCGATE_LOG_LEVEL` and `DOCGATE_LOG_RETENTION`.
///
/// # Errors
/// See [`configure_logging`].
pub fn configure_from_env() -> Result<(), GateError> {
    let dir = std::env::var("DOCGATE_LOG_DIR").ok().map(PathBuf::from);
    let level = std::env::var("DOCGATE_LOG_LEVEL").ok();
    let retention =
        std::env::var("DOCGATE_LOG_RETENTION").ok().and_then(|s| s.parse::<usize>().ok());
    configure_logging(dir.as_deref(), level.as_deref(), retention)
}
