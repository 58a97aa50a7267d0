//! Process-wide logging setup.
//!
//! Every module logs through the `log` facade under its own module path.
//! [`init`] installs the `env_logger` backend once at startup; `RUST_LOG`
//! overrides the configured level when set.  [`set_level`] changes the
//! maximum level at runtime (the menu's "Log Level" setting).

use std::io::Write;
use std::sync::Once;

use log::{error, info, LevelFilter};

static INIT: Once = Once::new();

/// Install the logger.  Later calls are ignored.
///
/// The backend itself passes every record; the `log` max level does the
/// filtering so [`set_level`] can raise it later.  With `RUST_LOG` set the
/// backend uses that filter instead and the max level is left alone.
pub fn init(level: &str) {
    let default = parse_level(level).unwrap_or(LevelFilter::Info);
    INIT.call_once(|| {
        let rust_log = std::env::var("RUST_LOG").ok();
        let mut builder = env_logger::Builder::new();
        match &rust_log {
            Some(filters) => builder.parse_filters(filters),
            None => builder.filter_level(LevelFilter::Trace),
        };
        let result = builder
            .format(|buf, record| {
                writeln!(
                    buf,
                    "{} [{}] [{}]: {}",
                    buf.timestamp(),
                    record.level(),
                    record.target(),
                    record.args()
                )
            })
            .try_init();
        // Another logger (e.g. a test harness) may have got there first.
        if rust_log.is_none() || result.is_err() {
            log::set_max_level(default);
        }
    });
}

/// Level for a name such as `"debug"`, `"INFO"` or `"WARNING"`.
pub fn parse_level(name: &str) -> Option<LevelFilter> {
    match name.trim().to_ascii_lowercase().as_str() {
        "off" => Some(LevelFilter::Off),
        "error" | "critical" => Some(LevelFilter::Error),
        "warn" | "warning" => Some(LevelFilter::Warn),
        "info" => Some(LevelFilter::Info),
        "debug" => Some(LevelFilter::Debug),
        "trace" => Some(LevelFilter::Trace),
        _ => None,
    }
}

/// Change the maximum level at runtime.  Unknown names fall back to INFO.
pub fn set_level(name: &str) -> LevelFilter {
    let level = parse_level(name).unwrap_or_else(|| {
        error!("Unknown log level '{}', using INFO", name);
        LevelFilter::Info
    });
    log::set_max_level(level);
    info!("Log level set to {}", level);
    level
}
