use config::builder::{ConfigBuilder, DefaultState};

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use error::ConfigError;
pub use logging::init_tracing;
pub use settings::{Config, DatabaseSettings, LoggingSettings, OutputFormat, OutputSettings};

/// Prefix for environment overrides, e.g. `CUSTOMER_SERVICE__DATABASE__MAX_CONNECTIONS=4`.
pub const ENV_PREFIX: &str = "CUSTOMER_SERVICE";

/// Loads the configuration with `path` as the (optional) file layer.
///
/// Layers, lowest precedence first: built-in defaults, the file, `CUSTOMER_SERVICE__*`
/// environment variables, and finally `DATABASE_URL`.
pub fn load_config_from(path: &str) -> Result<Config, ConfigError> {
    let builder = defaults()?
        .add_source(config::File::with_name(path).required(false))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
        .set_override_option("database.url", std::env::var("DATABASE_URL").ok())?;

    finish(builder)
}

fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let builder = config::Config::builder()
        .set_default("database.url", "sqlite://customer_service.db")?
        .set_default("database.max_connections", 1_i64)?
        .set_default("database.acquire_timeout_secs", 5_i64)?
        .set_default("logging.level", "info")?
        .set_default("logging.file_prefix", "customer-service")?
        .set_default("output.format", "json")?;
    Ok(builder)
}

fn finish(builder: ConfigBuilder<DefaultState>) -> Result<Config, ConfigError> {
    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.build()?.try_deserialize::<Config>()?;
    config.validate()?;
    Ok(config)
}
