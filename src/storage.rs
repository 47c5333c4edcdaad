//! Object storage client for uploaded catalog assets.
//!
//! Every upload lands under one of a fixed set of prefixes with a
//! collision-avoided object key (`{prefix}/{uuid}_{filename}`) and the
//! resulting public URL is embedded directly into the document being saved.
//! Nothing ever deletes an object: files orphaned by a cancelled or failed
//! submission stay in the bucket (tracked product inconsistency).

use anyhow::{Context, Result};
use reqwest::header::CONTENT_TYPE;
use uuid::Uuid;

use crate::config::Config;

/// Fixed storage prefixes, one per asset kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoragePrefix {
    Textures,
    Logos,
    Pdfs,
    Advantages,
    Colors,
    ColorPdfs,
    HouseIcons,
    Images,
}

impl StoragePrefix {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Textures => "textures",
            Self::Logos => "logos",
            Self::Pdfs => "pdfs",
            Self::Advantages => "advantages",
            Self::Colors => "colors",
            Self::ColorPdfs => "color-pdfs",
            Self::HouseIcons => "house_icons",
            Self::Images => "images",
        }
    }
}

#[derive(Clone)]
pub struct ObjectStorage {
    client: reqwest::Client,
    upload_url: String,
    public_url: String,
    token: Option<String>,
}

impl ObjectStorage {
    pub fn new(config: &Config) -> Self {
        Self::from_parts(
            &config.storage_url,
            &config.storage_public_url,
            config.storage_token.clone(),
        )
    }

    pub fn from_parts(upload_url: &str, public_url: &str, token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            upload_url: upload_url.trim_end_matches('/').to_string(),
            public_url: public_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    /// Upload one file and return its public URL.
    ///
    /// The object key prepends a fresh uuid to the (sanitized) original file
    /// name, so repeated uploads of the same file never collide.
    pub async fn upload(
        &self,
        prefix: StoragePrefix,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String> {
        let object_key = format!(
            "{}/{}_{}",
            prefix.as_str(),
            Uuid::new_v4(),
            sanitize_file_name(file_name)
        );
        let url = format!("{}/{}", self.upload_url, object_key);

        let mut request = self
            .client
            .put(&url)
            .header(CONTENT_TYPE, content_type)
            .body(bytes);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .context("Failed to reach object storage")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Object storage error ({}): {}", status, body);
        }

        tracing::info!("✓ Uploaded {}", object_key);
        Ok(format!("{}/{}", self.public_url, object_key))
    }
}

/// Keep object keys URL-safe: path separators, whitespace and anything
/// outside `[A-Za-z0-9._-]` become dashes.
fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    base.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '-'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path_regex};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    // ==================== Sanitizer Tests ====================

    #[test]
    fn test_sanitize_keeps_safe_names() {
        assert_eq!(sanitize_file_name("logo-v2.webp"), "logo-v2.webp");
        assert_eq!(sanitize_file_name("spec_sheet.pdf"), "spec_sheet.pdf");
    }

    #[test]
    fn test_sanitize_replaces_unsafe_chars() {
        assert_eq!(sanitize_file_name("my logo (1).png"), "my-logo--1-.png");
        assert_eq!(sanitize_file_name("лого.webp"), "----.webp");
    }

    #[test]
    fn test_sanitize_strips_path_components() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("C:\\files\\icon.svg"), "icon.svg");
    }

    // ==================== Upload Tests ====================

    #[tokio::test]
    async fn test_upload_returns_public_url() {
        let mock_server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path_regex(r"^/logos/[0-9a-f-]{36}_logo\.webp$"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        let storage =
            ObjectStorage::from_parts(&mock_server.uri(), "https://cdn.test", None);
        let url = storage
            .upload(StoragePrefix::Logos, "logo.webp", "image/webp", vec![1, 2, 3])
            .await
            .expect("upload");

        assert!(url.starts_with("https://cdn.test/logos/"));
        assert!(url.ends_with("_logo.webp"));
    }

    #[tokio::test]
    async fn test_upload_sends_bearer_token() {
        let mock_server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path_regex(r"^/pdfs/.*$"))
            .and(header("Authorization", "Bearer secret"))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&mock_server)
            .await;

        let storage = ObjectStorage::from_parts(
            &mock_server.uri(),
            &mock_server.uri(),
            Some("secret".to_string()),
        );
        storage
            .upload(StoragePrefix::Pdfs, "spec.pdf", "application/pdf", vec![0])
            .await
            .expect("upload");
    }

    #[tokio::test]
    async fn test_upload_failure_is_an_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(403).set_body_string("denied"))
            .mount(&mock_server)
            .await;

        let storage =
            ObjectStorage::from_parts(&mock_server.uri(), &mock_server.uri(), None);
        let result = storage
            .upload(StoragePrefix::Images, "photo.webp", "image/webp", vec![0])
            .await;

        assert!(result.is_err());
        let message = result.unwrap_err().to_string();
        assert!(message.contains("403"));
        assert!(message.contains("denied"));
    }

    #[test]
    fn test_prefixes_match_bucket_layout() {
        let prefixes = [
            StoragePrefix::Textures,
            StoragePrefix::Logos,
            StoragePrefix::Pdfs,
            StoragePrefix::Advantages,
            StoragePrefix::Colors,
            StoragePrefix::ColorPdfs,
            StoragePrefix::HouseIcons,
            StoragePrefix::Images,
        ];
        let names: Vec<_> = prefixes.iter().map(|p| p.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "textures",
                "logos",
                "pdfs",
                "advantages",
                "colors",
                "color-pdfs",
                "house_icons",
                "images"
            ]
        );
    }
}
