use hearth_app::{views, AppContext};
use hearth_gateway::app_config::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hearth_app=debug,hearth_gateway=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load()?;
    tracing::info!("Connecting to backend at {}", config.backend.url);

    let ctx = AppContext::connect(&config);

    if let Err(e) = ctx.sync_backend_token().await {
        tracing::warn!("Could not restore session: {}", e);
    }

    match views::home_feed(&ctx).await {
        Ok(feed) => tracing::info!("Home feed loaded with {} listings", feed.len()),
        Err(e) => tracing::error!("Failed to load home feed: {}", e),
    }

    Ok(())
}
