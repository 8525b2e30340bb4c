use nse_server::api::{app_router, ENDPOINTS};
use nse_server::config::Config;
use nse_server::scheduler::start_cache_sweeper;
use nse_server::{build_state, init_tracing};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_tracing();
    let state = build_state(&config)?;
    start_cache_sweeper(state.clone());
    let router = app_router(state, &config);

    tracing::info!("NSE data server listening on {}", config.listen_addr);
    for (path, description) in ENDPOINTS {
        tracing::info!("  {} - {}", path, description);
    }

    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}
