use poker_league::{
    auth::TokenConfig, build_router, photo::upload::UploadConfig, AppConfig, AppState,
    Repositories,
};
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "poker_league=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting poker league server");

    let repositories = match &config.database_url {
        Some(url) => {
            let pool = PgPoolOptions::new()
                .max_connections(config.database_max_connections)
                .acquire_timeout(Duration::from_secs(3))
                .connect(url)
                .await?;
            info!(
                max_connections = config.database_max_connections,
                "Connected to Postgres"
            );

            sqlx::migrate!("./migrations").run(&pool).await?;
            info!("Database migrations applied");
            Repositories::postgres(pool)
        }
        None => {
            warn!("DATABASE_URL not set, using in-memory repositories (data is lost on exit)");
            Repositories::in_memory()
        }
    };

    let state = AppState::new(
        repositories,
        TokenConfig::from_config(&config),
        UploadConfig::from_config(&config),
    );
    let app = build_router(state, &config.allowed_origins);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server running on http://{addr}");
    axum::serve(listener, app).await?;
    Ok(())
}
