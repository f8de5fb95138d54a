use std::time::Duration;

use async_trait::async_trait;
use logo_kit_common::ContentType;
use reqwest::StatusCode;
use tracing::debug;

use crate::{error::FetchError, providers::FileFetcher, traits::ImageFetcher};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Downloads generator output over HTTP(S), following redirects.
///
/// `file://` URLs and bare paths are read from disk.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Transport(e.to_string()))?;
        Ok(Self { client, timeout })
    }

    /// Use a preconfigured client; `timeout` is what gets reported when it fires
    pub fn with_client(client: reqwest::Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn is_remote(url: &str) -> bool {
        url.starts_with("http://") || url.starts_with("https://")
    }

    fn transport_error(&self, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout(self.timeout)
        } else {
            FetchError::Transport(err.to_string())
        }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self::with_client(client, DEFAULT_TIMEOUT)
    }
}

fn check_status(url: &str, status: StatusCode) -> Result<(), FetchError> {
    if status.is_success() {
        Ok(())
    } else {
        Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        })
    }
}

fn content_type_of(header: Option<&str>) -> ContentType {
    header
        .and_then(|value| value.split(';').next())
        .map(|mime| ContentType::from_mime_or_png(mime.trim()))
        .unwrap_or(ContentType::Png)
}

#[async_trait]
impl ImageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<(Vec<u8>, ContentType), FetchError> {
        if !Self::is_remote(url) {
            return FileFetcher.fetch(url).await;
        }
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        check_status(url, response.status())?;

        let content_type = content_type_of(
            response
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|value| value.to_str().ok()),
        );
        let bytes = response.bytes().await.map_err(|e| self.transport_error(e))?;
        debug!(%url, size = bytes.len(), %content_type, "downloaded image");
        Ok((bytes.to_vec(), content_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Retryable;

    #[test]
    fn test_status_mapping() {
        assert!(check_status("https://cdn.test/a.png", StatusCode::OK).is_ok());

        let err = check_status("https://cdn.test/a.png", StatusCode::NOT_FOUND).unwrap_err();
        assert!(matches!(&err, FetchError::Status { status: 404, url } if url == "https://cdn.test/a.png"));
        assert!(!err.is_retryable());

        for status in [StatusCode::TOO_MANY_REQUESTS, StatusCode::BAD_GATEWAY] {
            let err = check_status("https://cdn.test/a.png", status).unwrap_err();
            assert!(err.is_retryable(), "{status} should be retried");
        }
    }

    #[test]
    fn test_content_type_header() {
        assert_eq!(content_type_of(Some("image/svg+xml; charset=utf-8")), ContentType::Svg);
        assert_eq!(content_type_of(Some("image/jpeg")), ContentType::Jpeg);
        assert_eq!(content_type_of(Some("application/octet-stream")), ContentType::Png);
        assert_eq!(content_type_of(None), ContentType::Png);
    }

    #[test]
    fn test_reports_configured_timeout() {
        let fetcher = HttpFetcher::new(Duration::from_secs(7)).unwrap();
        assert_eq!(fetcher.timeout(), Duration::from_secs(7));
        assert_eq!(HttpFetcher::default().timeout(), DEFAULT_TIMEOUT);
    }

    #[tokio::test]
    async fn test_local_urls_read_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mark.svg");
        std::fs::write(&path, b"<svg/>").unwrap();

        let fetcher = HttpFetcher::default();
        let (data, content_type) = fetcher
            .fetch(&format!("file://{}", path.display()))
            .await
            .unwrap();
        assert_eq!(data, b"<svg/>");
        assert_eq!(content_type, ContentType::Svg);

        assert!(matches!(
            fetcher.fetch("s3://bucket/a.png").await,
            Err(FetchError::Unsupported(_))
        ));
    }
}
