use boardgame_league::{
    auth::TokenConfig,
    build_router,
    catalog::repository::{CatalogRepository, InMemoryCatalogRepository, PostgresCatalogRepository},
    directory::repository::{
        DirectoryRepository, InMemoryDirectoryRepository, PostgresDirectoryRepository,
    },
    sessions::repository::{InMemorySessionRepository, PostgresSessionRepository, SessionRepository},
    AppConfig, AppState, SessionScorer,
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

type Repositories = (
    Arc<dyn DirectoryRepository + Send + Sync>,
    Arc<dyn CatalogRepository + Send + Sync>,
    Arc<dyn SessionRepository + Send + Sync>,
);

async fn repositories(config: &AppConfig) -> Result<Repositories, Box<dyn std::error::Error>> {
    let Some(database_url) = config.database_url.as_deref() else {
        info!("DATABASE_URL not set, using in-memory repositories");
        return Ok((
            Arc::new(InMemoryDirectoryRepository::new()),
            Arc::new(InMemoryCatalogRepository::new()),
            Arc::new(InMemorySessionRepository::new()),
        ));
    };

    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(database_url)
        .await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Connected to PostgreSQL and applied migrations");

    Ok((
        Arc::new(PostgresDirectoryRepository::new(pool.clone())),
        Arc::new(PostgresCatalogRepository::new(pool.clone())),
        Arc::new(PostgresSessionRepository::new(pool)),
    ))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "boardgame_league=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting board game league server");

    let config = AppConfig::from_env();
    let (directory_repository, catalog_repository, session_repository) =
        repositories(&config).await?;

    let scorer = SessionScorer::new(config.points_scheme.policy());
    info!(points = scorer.policy_name(), "League points policy selected");

    let app_state = AppState::new(
        directory_repository,
        catalog_repository,
        session_repository,
        TokenConfig::from_config(&config),
        scorer,
    );

    let app = build_router(app_state);

    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    info!("Server running on http://{}", config.bind_address);
    axum::serve(listener, app).await?;
    Ok(())
}
