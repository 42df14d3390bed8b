use std::collections::BTreeMap;

use async_trait::async_trait;
use base64::prelude::BASE64_URL_SAFE_NO_PAD as BASE64_URL;
use base64::Engine;
use chrono::Utc;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info, instrument, warn};

use crate::media::{MediaError, MediaHost, MediaUpload, UploadedMedia};

const API_BASE: &str = "https://api.cloudinary.com/v1_1";
const DELIVERY_BASE: &str = "https://res.cloudinary.com";
const ATTACHMENT_FLAG: &str = "fl_attachment";
const URL_SIGNATURE_LENGTH: usize = 32;

fn default_folder() -> String {
    "memba".to_string()
}

fn default_api_base() -> String {
    API_BASE.to_string()
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MediaConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    #[serde(default = "default_folder")]
    pub folder: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

pub struct CloudinaryClient {
    config: MediaConfig,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: String,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorMessage,
}

#[derive(Debug, Deserialize)]
struct ApiErrorMessage {
    message: String,
}

impl CloudinaryClient {
    pub fn new(config: MediaConfig, http: Client) -> Self {
        Self { config, http }
    }

    fn api_url(&self, path: &str) -> String {
        format!(
            "{}/{}/{path}",
            self.config.api_base.trim_end_matches('/'),
            self.config.cloud_name
        )
    }

    /// Signs `params` and returns them together with the credentials the API expects.
    fn signed_params(&self, mut params: BTreeMap<&'static str, String>) -> BTreeMap<&'static str, String> {
        params.insert("timestamp", Utc::now().timestamp().to_string());
        let signature = sign_params(&params, &self.config.api_secret);
        params.insert("api_key", self.config.api_key.clone());
        params.insert("signature", signature);
        params.insert("signature_algorithm", "sha256".to_string());
        params
    }
}

#[async_trait]
impl MediaHost for CloudinaryClient {
    #[instrument(skip_all, fields(file = %upload.file_name, folder = %upload.folder))]
    async fn upload(&self, upload: MediaUpload) -> Result<UploadedMedia, MediaError> {
        let params = self.signed_params(BTreeMap::from([("folder", upload.folder)]));
        let mut form = Form::new();
        for (name, value) in params {
            form = form.text(name, value);
        }
        let file = Part::bytes(upload.bytes).file_name(upload.file_name);
        form = form.part("file", file);

        let response = self
            .http
            .post(self.api_url("auto/upload"))
            .multipart(form)
            .send()
            .await?;
        let uploaded: UploadResponse = read_response(response).await?;
        info!("uploaded media {}", uploaded.public_id);
        Ok(UploadedMedia {
            url: uploaded.secure_url,
            public_id: uploaded.public_id,
        })
    }

    #[instrument(skip(self))]
    async fn destroy(&self, public_id: &str) -> Result<(), MediaError> {
        let params = self.signed_params(BTreeMap::from([("public_id", public_id.to_string())]));
        let response = self
            .http
            .post(self.api_url("image/destroy"))
            .form(&params)
            .send()
            .await?;
        let destroyed: DestroyResponse = read_response(response).await?;
        if destroyed.result == "ok" {
            info!("destroyed media {public_id}");
        } else {
            warn!("media host reported `{}` destroying {public_id}", destroyed.result);
        }
        Ok(())
    }

    fn attachment_url(&self, file_url: &str) -> String {
        match CloudinaryAsset::parse(file_url) {
            Some(asset) => asset.signed_attachment_url(&self.config.cloud_name, &self.config.api_secret),
            None => file_url.to_string(),
        }
    }

    fn is_hosted(&self, file_url: &str) -> bool {
        let own_prefix = format!("{DELIVERY_BASE}/{}/", self.config.cloud_name);
        file_url.starts_with(&own_prefix) && CloudinaryAsset::parse(file_url).is_some()
    }
}

async fn read_response<T: DeserializeOwned>(response: Response) -> Result<T, MediaError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }
    let message = match response.json::<ApiErrorBody>().await {
        Ok(body) => body.error.message,
        Err(e) => {
            debug!("unreadable media host error body: {e}");
            status.to_string()
        }
    };
    Err(MediaError::Rejected {
        status: status.as_u16(),
        message,
    })
}

/// `k=v` pairs sorted by key and joined by `&`, the string the API signature covers.
pub fn string_to_sign(params: &BTreeMap<&'static str, String>) -> String {
    params
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&")
}

pub fn sign_params(params: &BTreeMap<&'static str, String>, api_secret: &str) -> String {
    let mut hash = Sha256::new();
    hash.update(string_to_sign(params).as_bytes());
    hash.update(api_secret.as_bytes());
    hex::encode(hash.finalize())
}

/// A file stored on Cloudinary, as identified by its delivery URL.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CloudinaryAsset {
    pub resource_type: String,
    pub public_id: String,
    pub extension: Option<String>,
}

impl CloudinaryAsset {
    /// Parses `.../<resource_type>/upload/[v<digits>/]<public_id>[.<ext>]`.
    pub fn parse(url: &str) -> Option<Self> {
        if !url.contains("cloudinary.com") {
            return None;
        }
        let (head, tail) = url.split_once("/upload/")?;
        let resource_type = head.rsplit('/').next().filter(|s| !s.is_empty())?;
        let tail = tail.split(['?', '#']).next().unwrap_or(tail);

        let mut segments: Vec<&str> = tail.split('/').collect();
        if segments.first().is_some_and(|s| is_version_segment(s)) {
            segments.remove(0);
        }
        let path = segments.join("/");
        let (public_id, extension) = match path.rsplit_once('.') {
            Some((id, ext)) if !id.is_empty() && !ext.is_empty() && !ext.contains('/') => {
                (id.to_string(), Some(ext.to_string()))
            }
            _ => (path, None),
        };
        if public_id.is_empty() {
            return None;
        }
        Some(Self {
            resource_type: resource_type.to_string(),
            public_id,
            extension,
        })
    }

    fn delivery_path(&self) -> String {
        match &self.extension {
            Some(ext) => format!("{ATTACHMENT_FLAG}/{}.{ext}", self.public_id),
            None => format!("{ATTACHMENT_FLAG}/{}", self.public_id),
        }
    }

    pub fn signed_attachment_url(&self, cloud_name: &str, api_secret: &str) -> String {
        let path = self.delivery_path();
        let mut hash = Sha256::new();
        hash.update(path.as_bytes());
        hash.update(api_secret.as_bytes());
        let encoded = BASE64_URL.encode(hash.finalize());
        let signature = &encoded[..URL_SIGNATURE_LENGTH];
        format!(
            "{DELIVERY_BASE}/{cloud_name}/{}/upload/s--{signature}--/{path}",
            self.resource_type
        )
    }
}

fn is_version_segment(segment: &str) -> bool {
    segment
        .strip_prefix('v')
        .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    const PDF_URL: &str =
        "https://res.cloudinary.com/demo/image/upload/v1772233722/memba/resources/qkdqzdeidk7k9cru0q3j.pdf";

    #[test]
    fn signature_string_is_sorted_by_key() {
        let params = BTreeMap::from([
            ("timestamp", "1700000000".to_string()),
            ("folder", "memba".to_string()),
            ("public_id", "memba/a".to_string()),
        ]);
        assert_eq!(
            string_to_sign(&params),
            "folder=memba&public_id=memba/a&timestamp=1700000000"
        );
    }

    #[test]
    fn signature_is_hex_sha256_of_params_and_secret() {
        assert_eq!(
            sign_params(&BTreeMap::new(), "abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn parses_versioned_pdf_url() {
        let asset = CloudinaryAsset::parse(PDF_URL).unwrap();
        assert_eq!(asset.resource_type, "image");
        assert_eq!(asset.public_id, "memba/resources/qkdqzdeidk7k9cru0q3j");
        assert_eq!(asset.extension.as_deref(), Some("pdf"));
    }

    #[test]
    fn parses_unversioned_url_without_extension() {
        let asset =
            CloudinaryAsset::parse("https://res.cloudinary.com/demo/raw/upload/memba/notes?x=1")
                .unwrap();
        assert_eq!(asset.resource_type, "raw");
        assert_eq!(asset.public_id, "memba/notes");
        assert_eq!(asset.extension, None);
    }

    #[test]
    fn ignores_foreign_and_malformed_urls() {
        assert_eq!(CloudinaryAsset::parse("https://arxiv.org/pdf/1234.pdf"), None);
        assert_eq!(
            CloudinaryAsset::parse("https://res.cloudinary.com/demo/image/fetch/x.pdf"),
            None
        );
        assert_eq!(
            CloudinaryAsset::parse("https://res.cloudinary.com/demo/image/upload/v12/"),
            None
        );
    }

    #[test]
    fn attachment_url_is_signed_and_flagged() {
        let client = demo_client(API_BASE);

        let url = client.attachment_url(PDF_URL);
        let prefix = "https://res.cloudinary.com/demo/image/upload/s--";
        let suffix = "--/fl_attachment/memba/resources/qkdqzdeidk7k9cru0q3j.pdf";
        assert!(url.starts_with(prefix), "{url}");
        assert!(url.ends_with(suffix), "{url}");
        assert_eq!(url.len(), prefix.len() + URL_SIGNATURE_LENGTH + suffix.len());
        assert_eq!(url, client.attachment_url(PDF_URL));

        let foreign = "https://example.org/paper.pdf";
        assert_eq!(client.attachment_url(foreign), foreign);
    }

    fn demo_client(api_base: &str) -> CloudinaryClient {
        CloudinaryClient::new(
            MediaConfig {
                cloud_name: "demo".to_string(),
                api_key: "key".to_string(),
                api_secret: "secret".to_string(),
                folder: default_folder(),
                api_base: api_base.to_string(),
            },
            Client::new(),
        )
    }

    fn pdf_upload() -> MediaUpload {
        MediaUpload {
            bytes: b"%PDF-1.7".to_vec(),
            file_name: "calculo.pdf".to_string(),
            folder: "memba/resources".to_string(),
        }
    }

    #[test]
    fn only_own_cloud_assets_are_hosted() {
        let client = demo_client(API_BASE);
        assert!(client.is_hosted(PDF_URL));
        assert!(!client.is_hosted(
            "https://res.cloudinary.com/other/image/upload/v1/memba/a.pdf"
        ));
        assert!(!client.is_hosted("https://res.cloudinary.com/demo.evil.io/image/upload/a.pdf"));
        assert!(!client.is_hosted("http://169.254.169.254/latest/meta-data"));
    }

    #[tokio::test]
    async fn upload_posts_signed_multipart_form() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/demo/auto/upload"))
            .and(body_string_contains(r#"name="folder""#))
            .and(body_string_contains("memba/resources"))
            .and(body_string_contains(r#"name="api_key""#))
            .and(body_string_contains(r#"name="signature""#))
            .and(body_string_contains(r#"name="signature_algorithm""#))
            .and(body_string_contains(r#"filename="calculo.pdf""#))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "secure_url": "https://res.cloudinary.com/demo/image/upload/v1/memba/resources/x.pdf",
                "public_id": "memba/resources/x",
                "bytes": 8
            })))
            .expect(1)
            .mount(&server)
            .await;

        let uploaded = demo_client(&server.uri()).upload(pdf_upload()).await.unwrap();
        assert_eq!(uploaded.public_id, "memba/resources/x");
        assert!(uploaded.url.ends_with("/memba/resources/x.pdf"));
    }

    #[tokio::test]
    async fn destroy_sends_signed_form() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/demo/image/destroy"))
            .and(body_string_contains("public_id=memba%2Fresources%2Fx"))
            .and(body_string_contains("api_key=key"))
            .and(body_string_contains("signature_algorithm=sha256"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": "ok" })))
            .expect(1)
            .mount(&server)
            .await;

        demo_client(&server.uri())
            .destroy("memba/resources/x")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn destroy_of_missing_asset_is_not_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/demo/image/destroy"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "result": "not found" })),
            )
            .mount(&server)
            .await;

        assert!(demo_client(&server.uri()).destroy("memba/gone").await.is_ok());
    }

    #[tokio::test]
    async fn api_error_message_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/demo/auto/upload"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": { "message": "Invalid Signature" }
            })))
            .mount(&server)
            .await;

        let err = demo_client(&server.uri())
            .upload(pdf_upload())
            .await
            .unwrap_err();
        match err {
            MediaError::Rejected { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Invalid Signature");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn unreadable_error_body_falls_back_to_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/demo/image/destroy"))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
            .mount(&server)
            .await;

        let err = demo_client(&server.uri())
            .destroy("memba/a")
            .await
            .unwrap_err();
        match err {
            MediaError::Rejected { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "500 Internal Server Error");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
