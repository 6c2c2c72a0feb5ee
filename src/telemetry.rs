use tracing::Subscriber;
use tracing::subscriber::set_global_default;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt};

/// Subscriber writing human-readable events to stderr, so stdout carries only
/// the report. `RUST_LOG` overrides `env_filter`.
pub fn get_subscriber(env_filter: &str) -> impl Subscriber + Send + Sync {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(env_filter));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
}

pub fn init_subscriber(subscriber: impl Subscriber + Send + Sync) -> anyhow::Result<()> {
    set_global_default(subscriber)?;
    Ok(())
}
