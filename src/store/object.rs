//! HTTP object-store backend.
//!
//! Records are uploaded with `PUT {endpoint}/{bucket}/{key}`, one object per
//! key. Any store that accepts plain or bearer-authenticated PUTs works
//! (S3-compatible gateways, MinIO behind a proxy, presigning proxies).

use crate::config::CollectorConfig;
use crate::errors::StoreError;
use crate::models::{NormalizedArticle, StorageKey};
use crate::store::ArticleStore;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use std::fmt;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

#[derive(Clone)]
pub struct ObjectStore {
    client: Client,
    endpoint: Url,
    bucket: String,
    token: Option<String>,
}

impl fmt::Debug for ObjectStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectStore")
            .field("endpoint", &self.endpoint.as_str())
            .field("bucket", &self.bucket)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl ObjectStore {
    /// Create a store for `bucket` at `endpoint`.
    ///
    /// The bucket is passed in explicitly; nothing is read from the
    /// environment here.
    pub fn new(
        endpoint: &str,
        bucket: impl Into<String>,
        token: Option<String>,
        config: &CollectorConfig,
    ) -> Result<Self, StoreError> {
        let endpoint = Url::parse(endpoint).map_err(|e| StoreError::Endpoint(e.to_string()))?;
        if endpoint.cannot_be_a_base() {
            return Err(StoreError::Endpoint(endpoint.to_string()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self {
            client,
            endpoint,
            bucket: bucket.into(),
            token,
        })
    }

    /// Object URL for a key; every segment is percent-encoded.
    pub fn object_url(&self, key: &StorageKey) -> Result<Url, StoreError> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| StoreError::Endpoint(self.endpoint.to_string()))?
            .pop_if_empty()
            .push(&self.bucket)
            .extend(key.segments());
        Ok(url)
    }
}

impl ArticleStore for ObjectStore {
    #[instrument(level = "debug", skip_all, fields(%key, bucket = %self.bucket))]
    async fn put(&self, key: &StorageKey, record: &NormalizedArticle) -> Result<(), StoreError> {
        let body = serde_json::to_vec(record)?;
        let url = self.object_url(key)?;

        let mut request = self
            .client
            .put(url)
            .header(CONTENT_TYPE, "application/json")
            .body(body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::Status {
                key: key.to_string(),
                status: status.as_u16(),
            });
        }
        debug!(%status, "Uploaded record");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Topic;
    use chrono::NaiveDate;
    use httpmock::prelude::*;
    use std::collections::BTreeMap;

    fn record(title: &str) -> NormalizedArticle {
        NormalizedArticle {
            url: "https://example.com/mars".to_string(),
            title: title.to_string(),
            description: String::new(),
            publisher: BTreeMap::from([("title".to_string(), "Example".to_string())]),
            published_date: NaiveDate::from_ymd_opt(2023, 6, 1).unwrap(),
            topic: Topic::Science,
            text: "hello".to_string(),
        }
    }

    #[test]
    fn test_object_url_encodes_segments() {
        let store = ObjectStore::new(
            "https://objects.example.com/",
            "news",
            None,
            &CollectorConfig::default(),
        )
        .unwrap();
        let url = store.object_url(&record("A-B Test?").storage_key()).unwrap();
        assert_eq!(
            url.as_str(),
            "https://objects.example.com/news/2023-06-01/SCIENCE/A-B%20Test%3F"
        );
    }

    #[test]
    fn test_rejects_invalid_endpoint() {
        let err = ObjectStore::new("not a url", "news", None, &CollectorConfig::default())
            .unwrap_err();
        assert!(matches!(err, StoreError::Endpoint(_)));
    }

    #[tokio::test]
    async fn test_put_uploads_json() {
        let server = MockServer::start_async().await;
        let put_mock = server
            .mock_async(|when, then| {
                when.method(PUT)
                    .path("/news-bucket/2023-06-01/SCIENCE/Mars")
                    .header("content-type", "application/json")
                    .header("authorization", "Bearer secret")
                    .body_contains(r#""published date":"2023-06-01""#)
                    .body_contains(r#""text":"hello""#);
                then.status(200);
            })
            .await;

        let store = ObjectStore::new(
            &server.base_url(),
            "news-bucket",
            Some("secret".to_string()),
            &CollectorConfig::default(),
        )
        .unwrap();
        let article = record("Mars");
        store.put(&article.storage_key(), &article).await.unwrap();
        put_mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_put_reports_rejected_writes() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(PUT).path("/news-bucket/2023-06-01/SCIENCE/Mars");
                then.status(403);
            })
            .await;

        let store = ObjectStore::new(
            &server.base_url(),
            "news-bucket",
            None,
            &CollectorConfig::default(),
        )
        .unwrap();
        let article = record("Mars");
        let err = store.put(&article.storage_key(), &article).await.unwrap_err();
        assert!(matches!(err, StoreError::Status { status: 403, .. }));
    }
}
