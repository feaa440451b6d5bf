use service_core::observability::logging::init_tracing;
use translate_service::{config::Config, Application};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    init_tracing(&config.service_name, "info");

    let application = Application::build(config).await?;
    tracing::info!(
        "Starting translate-service on port {}",
        application.port()
    );
    application.run_until_stopped().await?;

    Ok(())
}
