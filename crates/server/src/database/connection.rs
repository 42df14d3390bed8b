use serde::{Deserialize, Serialize};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::Error as SqlxError;
use tracing::info;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DbConfig {
    username: String,
    password: String,
    dbname: String,
    address: Option<String>,
    max_connections: Option<u32>,
    /// Full connection string; takes precedence over the individual fields.
    url: Option<String>,
}

impl DbConfig {
    const ADDRESS_FALLBACK: &'static str = "localhost";
    const MAX_CONN_FALLBACK: u32 = 5;

    #[cfg(test)]
    pub fn development(dbname: &str, username: &str, password: &str) -> Self {
        Self {
            dbname: dbname.to_string(),
            username: username.to_string(),
            password: password.to_string(),
            address: None,
            max_connections: None,
            url: None,
        }
    }

    pub fn with_url(mut self, url: String) -> Self {
        self.url = Some(url);
        self
    }

    pub fn get_url(&self) -> String {
        if let Some(url) = &self.url {
            return url.clone();
        }
        format!(
            "postgresql://{}:{}@{}/{}",
            self.username,
            self.password,
            self.address.as_deref().unwrap_or(Self::ADDRESS_FALLBACK),
            self.dbname,
        )
    }

    pub fn max_connections(&self) -> u32 {
        self.max_connections.unwrap_or(Self::MAX_CONN_FALLBACK)
    }
}

pub struct DbConnection {
    pool: PgPool,
}

impl DbConnection {
    pub async fn connect(config: &DbConfig) -> Result<Self, SqlxError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections())
            .connect(&config.get_url())
            .await?;
        info!(
            "connected to database with up to {} connections",
            config.max_connections()
        );
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}
