use std::fs::read_to_string;
use std::path::PathBuf;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::database::connection::DbConfig;
use crate::media::cloudinary::MediaConfig;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    pub address: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DbConfig,
    pub media: MediaConfig,
}

impl AppConfig {
    pub fn from_yaml_file<P: Into<PathBuf>>(path: P) -> Result<Self, anyhow::Error> {
        let path = path.into();
        let content = read_to_string(&path).with_context(|| format!("path: {path:?}"))?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, anyhow::Error> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Replaces file values with the ones found by `lookup`, usually the process environment.
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|value| !value.is_empty());
        if let Some(url) = lookup("DATABASE_URL") {
            info!("using database url from environment");
            self.database = self.database.with_url(url);
        }
        if let Some(cloud_name) = lookup("CLOUDINARY_CLOUD_NAME") {
            self.media.cloud_name = cloud_name;
        }
        if let Some(api_key) = lookup("CLOUDINARY_API_KEY") {
            self.media.api_key = api_key;
        }
        if let Some(api_secret) = lookup("CLOUDINARY_API_SECRET") {
            self.media.api_secret = api_secret;
        }
        self
    }

    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }
}
