use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::{postgres::PgPoolOptions, PgPool};

const DEFAULT_DATABASE_URL: &str = "postgres://localhost:5432/gym_manager";

/// Reads `key` and parses it, falling back to `default` when unset or malformed.
pub(crate) fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Ignoring malformed {}={:?}", key, raw);
            default
        }),
        Err(_) => default,
    }
}

/// Pool settings from `DATABASE_URL` and the `DB_*` variables
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
    pub idle_timeout: Duration,
}

impl DatabaseConfig {
    pub fn from_env() -> Result<Self> {
        let url = env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());

        let config = DatabaseConfig {
            url,
            max_connections: env_parse("DB_MAX_CONNECTIONS", 10),
            min_connections: env_parse("DB_MIN_CONNECTIONS", 1),
            acquire_timeout: Duration::from_secs(env_parse("DB_ACQUIRE_TIMEOUT", 10)),
            idle_timeout: Duration::from_secs(env_parse("DB_IDLE_TIMEOUT", 300)),
        };

        if config.min_connections > config.max_connections {
            anyhow::bail!(
                "DB_MIN_CONNECTIONS ({}) exceeds DB_MAX_CONNECTIONS ({})",
                config.min_connections,
                config.max_connections
            );
        }

        Ok(config)
    }

    pub fn pool_options(&self) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .acquire_timeout(self.acquire_timeout)
            .idle_timeout(Some(self.idle_timeout))
    }

    pub async fn connect(&self) -> Result<PgPool> {
        let pool = self
            .pool_options()
            .connect(&self.url)
            .await
            .context("could not connect to the gym database")?;

        tracing::info!(
            "Connected to database (pool {}..{} connections)",
            self.min_connections,
            self.max_connections
        );
        Ok(pool)
    }
}

pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("failed to apply migrations")?;
    tracing::info!("Database migrations applied");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_parse_falls_back_on_missing_or_malformed_values() {
        assert_eq!(env_parse("GYM_TEST_UNSET_VARIABLE", 7u32), 7);

        env::set_var("GYM_TEST_MALFORMED_POOL_SIZE", "many");
        assert_eq!(env_parse("GYM_TEST_MALFORMED_POOL_SIZE", 3u32), 3);

        env::set_var("GYM_TEST_POOL_SIZE", " 12 ");
        assert_eq!(env_parse("GYM_TEST_POOL_SIZE", 3u32), 12);
    }

    #[test]
    fn test_pool_options_follow_config() {
        let config = DatabaseConfig {
            url: DEFAULT_DATABASE_URL.to_string(),
            max_connections: 4,
            min_connections: 2,
            acquire_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(60),
        };

        let options = config.pool_options();
        assert_eq!(options.get_max_connections(), 4);
        assert_eq!(options.get_min_connections(), 2);
        assert_eq!(options.get_acquire_timeout(), Duration::from_secs(5));
        assert_eq!(options.get_idle_timeout(), Some(Duration::from_secs(60)));
    }
}
