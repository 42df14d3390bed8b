use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use crate::error::{RequestError, ValidationError};
use crate::media::MediaError;
use crate::server::state::AppState;
use crate::slug::fold_diacritic;

const FALLBACK_NAME: &str = "download";
const FALLBACK_EXTENSION: &str = "pdf";
const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";
const MAX_EXTENSION_CHARS: usize = 4;

#[derive(Debug, Deserialize)]
pub struct DownloadQuery {
    pub url: Option<String>,
    pub name: Option<String>,
}

/// Streams a stored file back to the client as an attachment. Only files on our media host
/// or linked from a stored resource are fetched.
pub async fn download_file(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DownloadQuery>,
) -> Result<Response, RequestError> {
    let file_url = query
        .url
        .filter(|url| !url.trim().is_empty())
        .ok_or_else(|| ValidationError::InvalidInput {
            value: "url".to_string(),
            reason: "url is required".to_string(),
        })?;
    let name = query.name.unwrap_or_default();

    let allowed = state.media.is_hosted(&file_url)
        || state.db_connection.is_known_file_url(&file_url).await?;
    if !allowed {
        warn!("refusing to proxy unknown url {file_url}");
        return Err(ValidationError::InvalidInput {
            value: file_url,
            reason: "url does not belong to a stored resource".to_string(),
        }
        .into());
    }

    let download_url = state.media.attachment_url(&file_url);
    info!("proxying download of {download_url}");
    let upstream = state
        .http
        .get(&download_url)
        .send()
        .await
        .map_err(MediaError::from)?;

    let status = upstream.status();
    if !status.is_success() {
        warn!("upstream answered {status} for {download_url}");
        let status = StatusCode::from_u16(status.as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
        let body = json!({
            "error": format!("failed to fetch file: {status}"),
            "attemptedUrl": download_url,
            "originalUrl": file_url,
        });
        return Ok((status, Json(body)).into_response());
    }

    let content_type = upstream
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or(FALLBACK_CONTENT_TYPE)
        .to_string();
    let disposition = format!(
        "attachment; filename=\"{}\"",
        download_file_name(&name, &file_url)
    );
    let body = Body::from_stream(upstream.bytes_stream());
    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

/// File name offered to the browser: `name` made header-safe, with an extension taken
/// from `file_url` when `name` carries none.
pub fn download_file_name(name: &str, file_url: &str) -> String {
    let mut file_name: String = name
        .trim()
        .chars()
        .map(fold_diacritic)
        .map(|ch| match ch {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '.' | '-' | '_' => ch,
            _ => '_',
        })
        .collect();
    if file_name.trim_matches(['_', '.']).is_empty() {
        file_name = FALLBACK_NAME.to_string();
    }
    if file_name.contains('.') {
        return file_name;
    }
    let extension = url_extension(file_url).unwrap_or(FALLBACK_EXTENSION);
    format!("{file_name}.{extension}")
}

fn url_extension(file_url: &str) -> Option<&str> {
    let path = file_url.split(['?', '#']).next().unwrap_or(file_url);
    let (_, extension) = path.rsplit_once('.')?;
    let valid = (1..=MAX_EXTENSION_CHARS).contains(&extension.len())
        && extension.chars().all(|ch| ch.is_ascii_alphanumeric());
    valid.then_some(extension)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_extension_from_url() {
        assert_eq!(
            download_file_name("Cálculo I", "https://cdn.example.org/a/calc.pdf?v=2"),
            "Calculo_I.pdf"
        );
        assert_eq!(
            download_file_name("slides", "https://x.io/deck.pptx"),
            "slides.pptx"
        );
    }

    #[test]
    fn keeps_existing_extension() {
        assert_eq!(
            download_file_name("notes.txt", "https://x.io/notes.docx"),
            "notes.txt"
        );
    }

    #[test]
    fn falls_back_to_pdf() {
        assert_eq!(
            download_file_name("paper", "https://example.org/file"),
            "paper.pdf"
        );
        assert_eq!(
            download_file_name("paper", "https://example.org/file.backup"),
            "paper.pdf"
        );
    }

    #[test]
    fn blank_or_unsafe_names_are_replaced() {
        assert_eq!(download_file_name("", "https://x.io/a.epub"), "download.epub");
        assert_eq!(
            download_file_name("a \"quoted\" name", "https://x.io/a.pdf"),
            "a__quoted__name.pdf"
        );
    }
}
