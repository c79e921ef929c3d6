use tracing::Level;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

use crate::config::GeneralConfig;
use crate::error::Error;

/// Parse a configured log level; unknown values fall back to info
pub fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

/// Initialize the logging system.
///
/// `RUST_LOG` takes precedence over the configured level. Output goes to
/// stderr so stdout stays free for certificate output.
pub fn init_logging(config: &GeneralConfig) -> Result<(), Error> {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(parse_level(&config.log_level)).into())
        .from_env_lossy();

    let result = if config.structured_logging {
        let fmt_layer = fmt::Layer::default()
            .with_target(true)
            .with_writer(std::io::stderr)
            .json();
        Registry::default().with(filter).with(fmt_layer).try_init()
    } else {
        let fmt_layer = fmt::Layer::default()
            .with_target(true)
            .with_writer(std::io::stderr);
        Registry::default().with(filter).with(fmt_layer).try_init()
    };

    result.map_err(|e| Error::Config(format!("Failed to set global default subscriber: {}", e)))
}
