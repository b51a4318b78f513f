use case_dashboard::{load_cases, load_model_stats, router, AppState, Config};
use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env();
    let cases = load_cases(&config.cases_path).await;
    let model_stats = load_model_stats(&config.model_stats_path).await;
    let state = AppState::new(&config, cases, model_stats);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("grouping cases by '{}'", config.category_path);
    info!("listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {err}");
    }
    info!("shutting down");
}
