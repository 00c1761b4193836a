use anyhow::Result;
use gym_manager::api::routes::create_routes;
use gym_manager::config::{run_migrations, AppConfig, DatabaseConfig, DatabaseSeeder};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let app_config = AppConfig::from_env()?;

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&app_config.log_level)),
        )
        .init();

    let db_config = DatabaseConfig::from_env()?;
    let pool = db_config.connect().await?;
    run_migrations(&pool).await?;

    if app_config.seed_demo_data {
        DatabaseSeeder::new(pool.clone()).seed_all().await?;
    }

    let app = create_routes(pool, &app_config.jwt_secret);

    let listener = TcpListener::bind(app_config.server_address()).await?;
    info!(
        "Gym manager starting on http://{} ({})",
        app_config.server_address(),
        app_config.environment
    );
    info!("Health check available at http://{}/health", app_config.server_address());

    axum::serve(listener, app).await?;

    Ok(())
}
