use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::config::AppConfig;
use crate::dashboard::DashboardSettings;

pub type DbPool = SqlitePool;

/// Application state shared by the command layer
pub struct AppState {
  pub db: DbPool,
  pub settings: DashboardSettings,
}

impl AppState {
  /// State over an open pool, with dashboard settings taken from `config`
  pub fn new(db: DbPool, config: &AppConfig) -> Self {
    Self {
      db,
      settings: config.dashboard_settings(),
    }
  }
}

/// Open the database at `database_url` (created if missing) and run migrations
pub async fn initialize_db(database_url: &str) -> Result<DbPool, sqlx::Error> {
  tracing::info!("Initializing database at: {}", database_url);

  let options = SqliteConnectOptions::from_str(database_url)?
    .create_if_missing(true)
    .foreign_keys(true);

  // Create connection pool
  let pool = SqlitePoolOptions::new()
    .max_connections(5)
    .connect_with(options)
    .await?;

  // Run migrations
  sqlx::migrate!("./migrations").run(&pool).await?;

  tracing::info!("Database initialized successfully");

  Ok(pool)
}

/// Open the configured database and build the application state
pub async fn initialize_state(config: &AppConfig) -> Result<AppState, sqlx::Error> {
  let pool = initialize_db(&config.database_url).await?;
  Ok(AppState::new(pool, config))
}
