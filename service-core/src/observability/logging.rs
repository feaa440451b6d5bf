use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise `default_level` applies to everything
/// and the service's own crate logs at debug. Output is JSON with file/line
/// so structured fields survive log aggregation.
pub fn init_tracing(service_name: &str, default_level: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!(
            "{},{}=debug",
            default_level,
            service_name.replace('-', "_")
        ))
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_file(true)
                .with_line_number(true)
                .json()
                .flatten_event(true),
        )
        .init();
}
