use comfy_relay::{logger, server, Config, Orchestrator, RunningHubClient};
use std::sync::Arc;

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dotenv_loaded = dotenv::dotenv().is_ok();
    logger::init()?;

    if dotenv_loaded {
        log::info!("✅ .env file loaded successfully");
    } else {
        log::warn!("⚠️  No .env file found, using system environment variables");
    }

    let config = Config::from_env()?;
    logger::log_startup_info(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"), &config);

    let client = RunningHubClient::new(&config.provider)?;
    let orchestrator = Orchestrator::new(Arc::new(client), config.provider.workflow.clone());

    server::run(&config, orchestrator).await?;
    Ok(())
}
