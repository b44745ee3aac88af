//! Process logging on top of `log4rs`.
//!
//! Everything goes to the console. When a directory is configured, application logs also go to
//! a size-rolled `estatelite.log`, and mutation audit lines (target `estatelite::audit`) go to a
//! separate `estatelite_audit.log`.

use log::LevelFilter;
use log4rs::Handle;
use log4rs::append::console::ConsoleAppender;
use log4rs::append::rolling_file::RollingFileAppender;
use log4rs::append::rolling_file::policy::compound::{
    CompoundPolicy, roll::fixed_window::FixedWindowRoller, trigger::size::SizeTrigger,
};
use log4rs::config::{Appender, Config, Logger, Root};
use log4rs::encode::pattern::PatternEncoder;
use std::path::Path;
use std::sync::OnceLock;

pub const AUDIT_TARGET: &str = "estatelite::audit";

const PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S%.3f)} [{l}] {t} - {m}{n}";
const ROLL_SIZE: u64 = 10 * 1024 * 1024;

static HANDLE: OnceLock<Handle> = OnceLock::new();

#[must_use]
pub fn parse_level(level: &str) -> LevelFilter {
    match level.to_ascii_lowercase().as_str() {
        "off" => LevelFilter::Off,
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    }
}

fn rolling(dir: &Path, stem: &str, keep: u32) -> Result<RollingFileAppender, Box<dyn std::error::Error>> {
    let roller = FixedWindowRoller::builder()
        .build(&format!("{}", dir.join(format!("{stem}.{{}}.log")).display()), keep)?;
    let policy = CompoundPolicy::new(Box::new(SizeTrigger::new(ROLL_SIZE)), Box::new(roller));
    Ok(RollingFileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(PATTERN)))
        .build(dir.join(format!("{stem}.log")), Box::new(policy))?)
}

/// Configure logging globally for the process. Calling it again replaces the active config.
/// - dir: when set, also log to rolling files in this directory (created if missing)
/// - level: off|error|warn|info|debug|trace
/// - retention: number of rolled files to keep
///
/// # Errors
/// Returns an error if the log directory or an appender cannot be created.
pub fn configure_logging(
    dir: Option<&Path>,
    level: &str,
    retention: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    let lvl = parse_level(level);
    let console = ConsoleAppender::builder().encoder(Box::new(PatternEncoder::new(PATTERN))).build();
    let mut builder = Config::builder().appender(Appender::builder().build("console", Box::new(console)));
    let mut root = Root::builder().appender("console");

    if let Some(dir) = dir {
        std::fs::create_dir_all(dir)?;
        builder = builder
            .appender(Appender::builder().build("app", Box::new(rolling(dir, "estatelite", retention)?)))
            .appender(Appender::builder().build("audit", Box::new(rolling(dir, "estatelite_audit", retention)?)))
            .logger(Logger::builder().appender("audit").additive(false).build(AUDIT_TARGET, lvl));
        root = root.appender("app");
    }

    let config = builder.build(root.build(lvl))?;
    match HANDLE.get() {
        Some(handle) => handle.set_config(config),
        None => match log4rs::init_config(config) {
            Ok(handle) => {
                let _ = HANDLE.set(handle);
            }
            // Another logger owns the facade (e.g. a test harness); keep it.
            Err(e) => log::debug!("logger already installed: {e}"),
        },
    }
    Ok(())
}

/// Emits one JSON audit line for a mutation.
pub fn log_audit(op: &str, collection: &str, doc_id: &str, actor: Option<&str>) {
    let line = serde_json::json!({
        "ts": chrono::Utc::now().to_rfc3339(),
        "op": op,
        "collection": collection,
        "doc_id": doc_id,
        "actor": actor,
    });
    log::info!(target: AUDIT_TARGET, "{line}");
}
