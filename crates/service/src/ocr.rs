use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::multipart;
use tracing::instrument;

use crate::errors::ServiceError;

/// Client for the third-party plate-recognition endpoint.
///
/// The provider takes a multipart image upload authenticated with
/// `username`/`apikey` headers and answers with JSON holding the
/// recognized text. The response is passed through untouched so the
/// frontend keeps whatever shape the provider emits.
pub struct OcrClient {
    http: reqwest::Client,
    endpoint: String,
    username: String,
    api_key: String,
}

impl OcrClient {
    pub fn new(cfg: &configs::OcrConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: cfg.endpoint.clone(),
            username: cfg.username.clone(),
            api_key: cfg.api_key.clone(),
        }
    }

    /// Recognize text in a base64-encoded image, with or without a
    /// `data:image/...;base64,` prefix.
    #[instrument(skip_all)]
    pub async fn recognize(&self, image: &str) -> Result<serde_json::Value, ServiceError> {
        let bytes = STANDARD
            .decode(strip_data_uri(image).trim())
            .map_err(|_| ServiceError::Validation("image is not valid base64".into()))?;

        let part = multipart::Part::bytes(bytes)
            .file_name("upload.jpg")
            .mime_str("image/jpeg")
            .map_err(|e| ServiceError::Upstream { status: 500, message: e.to_string() })?;
        let form = multipart::Form::new().part("file", part);

        let resp = self
            .http
            .post(&self.endpoint)
            .header("username", &self.username)
            .header("apikey", &self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| ServiceError::Upstream { status: 502, message: e.to_string() })?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(ServiceError::Upstream { status: status.as_u16(), message });
        }
        resp.json::<serde_json::Value>()
            .await
            .map_err(|e| ServiceError::Upstream { status: 502, message: e.to_string() })
    }
}

/// Camera captures arrive as data URIs; raw base64 is accepted too.
fn strip_data_uri(image: &str) -> &str {
    match image.split_once("base64,") {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => image,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_data_uri_prefix_only() {
        assert_eq!(strip_data_uri("data:image/jpeg;base64,abcd"), "abcd");
        assert_eq!(strip_data_uri("data:image/png;base64,xyz="), "xyz=");
        assert_eq!(strip_data_uri("abcd"), "abcd");
    }

    #[tokio::test]
    async fn invalid_base64_is_a_validation_error() {
        let client = OcrClient::new(&configs::OcrConfig::default());
        let err = client.recognize("data:image/jpeg;base64,!!not-base64!!").await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }
}
