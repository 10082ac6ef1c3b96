use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub struct Config {
    pub service_name: &'static str,
    /// Used when `RUST_LOG` is not set.
    pub default_filter: &'static str,
}

pub fn setup(config: Config) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.default_filter))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .try_init()?;

    tracing::info!(service = config.service_name, "tracing initialized");
    Ok(())
}
