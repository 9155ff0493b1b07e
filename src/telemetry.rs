use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global JSON subscriber.
/// `RUST_LOG` controls the level; `default_filter` applies when it is unset.
/// Records emitted through `log` by dependencies are forwarded as well.
pub fn init_telemetry(default_filter: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let formatting_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(true)
        .json();

    // A second call (e.g. from tests) keeps the first subscriber
    if let Err(e) = tracing_subscriber::registry()
        .with(env_filter)
        .with(formatting_layer)
        .try_init()
    {
        tracing::debug!("Telemetry already initialized: {}", e);
    }
}
