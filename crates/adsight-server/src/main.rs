mod api;
mod middleware;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use adsight_agent::AgentContext;
use adsight_data::Dataset;
use adsight_gemini::GeminiClient;

use crate::api::{build_app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = adsight_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    tracing::info!(env = %config.env, "starting adsight server");

    let programs = match &config.programs_path {
        Some(path) => adsight_core::load_programs(path)?.programs,
        None => adsight_core::default_programs(),
    };
    let dataset = Dataset::generate(&config.dataset, &programs);
    tracing::info!(
        accounts = dataset.accounts.len(),
        campaigns = dataset.campaigns.len(),
        daily_records = dataset.daily.len(),
        "synthetic dataset generated"
    );

    let gemini = match &config.gemini_api_key {
        Some(key) => Some(GeminiClient::new(
            key,
            &config.gemini_model,
            config.gemini_timeout_secs,
        )?),
        None => {
            tracing::warn!(
                "GEMINI_API_KEY not set; intent classification and narratives run in fallback mode"
            );
            None
        }
    };

    let agent = AgentContext::new(Arc::new(dataset), gemini);
    let app = build_app(AppState { agent });

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
