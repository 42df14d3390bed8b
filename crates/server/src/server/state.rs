use std::sync::Arc;
use std::time::Duration;

use crate::config::AppConfig;
use crate::database::connection::DbConnection;
use crate::media::cloudinary::CloudinaryClient;
use crate::media::MediaHost;

const HTTP_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

pub struct AppState {
    pub config: AppConfig,
    pub db_connection: DbConnection,
    pub media: Arc<dyn MediaHost>,
    /// Shared client for proxied downloads.
    pub http: reqwest::Client,
}

impl AppState {
    pub async fn try_init(config: &AppConfig) -> anyhow::Result<Self> {
        let db_connection = DbConnection::connect(&config.database).await?;
        let http = reqwest::Client::builder()
            .connect_timeout(HTTP_CONNECT_TIMEOUT)
            .build()?;
        let media = Arc::new(CloudinaryClient::new(config.media.clone(), http.clone()));
        Ok(Self {
            config: config.clone(),
            db_connection,
            media,
            http,
        })
    }
}
