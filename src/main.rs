/// WaiEdu data store provisioning entry point
///
/// Establishes the store structure from a clean slate and seeds the subject
/// catalog. Destructive: any existing tables are dropped first, so this is
/// for first-time setup and disposable environments only.

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use waiedu_data::{config::StoreConfig, db, error::DataResult};

#[tokio::main]
async fn main() -> DataResult<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "waiedu_data=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = StoreConfig::from_env()?;
    config.validate()?;

    info!("WaiEdu data store v{}", env!("CARGO_PKG_VERSION"));
    info!("Provisioning {}", config.storage.store_db.display());

    let pool = db::create_pool(
        &config.storage.store_db,
        db::DatabaseOptions {
            max_connections: config.pool.max_connections,
            enable_wal: config.pool.enable_wal,
        },
    )
    .await?;
    db::test_connection(&pool).await?;

    db::schema::initialize_schema(&pool).await?;
    db::seed::seed_subjects(&pool).await?;

    info!("Store provisioned and seeded");

    Ok(())
}
