use std::sync::Once;

/// Logger configuration.
///
/// `env_filter` uses the `env_logger` filter syntax, e.g.
/// "imdraw_engine=debug,wgpu=warn". When unset, `RUST_LOG` is consulted,
/// then `default_level`.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub default_level: log::LevelFilter,
    pub write_style: env_logger::WriteStyle,
    /// Route output through the test harness capture instead of stderr.
    pub capture_for_tests: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            default_level: log::LevelFilter::Info,
            write_style: env_logger::WriteStyle::Auto,
            capture_for_tests: false,
        }
    }
}

impl LoggingConfig {
    /// Trace-level output for this crate, warnings from wgpu, captured by `cargo test`.
    pub fn for_tests() -> Self {
        Self {
            env_filter: Some("imdraw_engine=trace,wgpu=warn".to_owned()),
            default_level: log::LevelFilter::Warn,
            write_style: env_logger::WriteStyle::Never,
            capture_for_tests: true,
        }
    }
}

static INIT: Once = Once::new();

/// Initializes the global logger once.
///
/// Idempotent; later calls are ignored. If another logger was installed
/// first, this one is dropped silently.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();

        match config.env_filter.or_else(|| std::env::var("RUST_LOG").ok()) {
            Some(filter) => {
                builder.parse_filters(&filter);
            }
            None => {
                builder.filter_level(config.default_level);
            }
        }

        builder
            .write_style(config.write_style)
            .is_test(config.capture_for_tests);

        if builder.try_init().is_ok() {
            log::debug!("logging initialized");
        }
    });
}
