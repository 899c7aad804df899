use std::net::SocketAddr;

use tower_http::trace::TraceLayer;

use book_catalog::frontend::{FrontendConfig, FrontendState, frontend_router};
use book_catalog::infrastructure::logging::init_tracing;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    init_tracing("book_catalog=debug,tower_http=debug");

    let config = FrontendConfig::from_env();
    let state = FrontendState::new(reqwest::Client::new(), config.api_url.clone());
    let app = frontend_router(state, config.index_path.clone()).layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(
        "Frontend listening on {} (catalog API: {})",
        addr,
        config.api_url
    );

    axum::serve(listener, app).await?;
    Ok(())
}
