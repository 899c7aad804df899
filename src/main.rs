use book_catalog::infrastructure::logging::init_tracing;
use book_catalog::{AppState, config, db, seed, server};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    dotenvy::dotenv().ok();
    init_tracing("book_catalog=debug,tower_http=debug");

    let config = config::Config::from_env();

    // Initialize database
    let db = db::init_db(&config.database_url).await?;

    if config.seed_demo {
        tracing::info!("Seeding demo data...");
        if let Err(e) = seed::seed_demo_data(&db).await {
            tracing::error!("Failed to seed data: {}", e);
        } else {
            tracing::info!("Demo data seeded successfully.");
        }
    }

    // Repositories and the cover worker
    let state = AppState::new(db, &config)?;

    server::run(state, &config).await?;
    Ok(())
}
