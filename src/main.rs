use rhizome_tracker::{AppState, build_router, config::Config, jobs};
use sea_orm::Database;
use sea_orm_migration::MigratorTrait;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,rhizome_tracker=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    tracing::info!("Connecting to database...");
    let db = Database::connect(&config.database_url).await?;

    tracing::info!("Running migrations...");
    migration::Migrator::up(&db, None).await?;

    let bind_addr = config.bind_addr.clone();
    let enable_sync_jobs = config.enable_sync_jobs;
    tracing::info!(env = %config.env, "Starting Rhizome Tracker");
    let state = AppState::new(db, config);

    if enable_sync_jobs {
        jobs::snapshot_sync::start_snapshot_jobs(state.db.clone(), state.snapshot.clone()).await;
        jobs::snapshot_sync::start_github_jobs(state.db.clone(), state.github_sync.clone()).await;
    } else {
        tracing::info!("Sync jobs disabled (set ENABLE_SYNC_JOBS=true to enable)");
    }

    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
