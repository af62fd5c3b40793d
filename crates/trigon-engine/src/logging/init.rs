use std::sync::Once;

/// Logger configuration.
///
/// `env_filter` follows the `env_logger` syntax (e.g. "info",
/// "trigon_engine=debug,wgpu=warn"). When unset, `RUST_LOG` wins, and the
/// fallback is debug-level for the engine with the noisier GPU crates kept
/// at warn.
#[derive(Debug, Clone, Default)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
}

static INIT: Once = Once::new();

/// Initializes the global logger once; subsequent calls are ignored.
///
/// Intended usage is early in `main`.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();

        if let Some(filter) = config.env_filter {
            builder.parse_filters(&filter);
        } else if let Ok(filter) = std::env::var("RUST_LOG") {
            builder.parse_filters(&filter);
        } else {
            builder.parse_filters("debug,wgpu_core=warn,wgpu_hal=warn,naga=warn");
        }

        builder.format_timestamp_millis();
        builder.init();

        log::debug!("logging initialized");
    });
}
