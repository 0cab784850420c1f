//! Key-value API client for kvscope

use std::time::Duration;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::{Response, StatusCode, Url};

use crate::error::ClientError;
use kvscope_types::{KeyPage, KeyValue};

/// Characters escaped in a path segment; matches `encodeURIComponent`
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Percent-encode a key (or database name) for use as a single path segment
pub fn encode_key(key: &str) -> String {
    utf8_percent_encode(key, COMPONENT).to_string()
}

/// HTTP client wrapper for one key-value server
#[derive(Clone, Debug)]
pub struct KvClient {
    http: reqwest::Client,
    base_url: String,
    page_size: Option<u32>,
}

impl KvClient {
    /// Create a client for the server at `base_url`
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let trimmed = base_url.trim().trim_end_matches('/');
        let parsed = Url::parse(trimmed).map_err(|e| ClientError::InvalidUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ClientError::InvalidUrl {
                url: base_url.to_string(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }

        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            base_url: trimmed.to_string(),
            page_size: None,
        })
    }

    /// Ask the server for pages of at most `page_size` keys.
    /// `None` leaves the page size to the server.
    pub fn with_page_size(mut self, page_size: Option<u32>) -> Self {
        self.page_size = page_size.filter(|n| *n > 0);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn page_size(&self) -> Option<u32> {
        self.page_size
    }

    /// `GET /api/dbs`
    pub async fn list_databases(&self) -> Result<Vec<String>, ClientError> {
        let url = format!("{}/api/dbs", self.base_url);
        let response = self.http.get(&url).send().await?;
        let response = expect_success(response).await?;
        let mut names: Vec<String> = response.json().await.map_err(ClientError::Decode)?;
        names.sort();
        Ok(names)
    }

    /// `GET /api/db/{name}/keys?start=..&prefix=..`
    pub async fn list_keys(
        &self,
        database: &str,
        prefix: &str,
        cursor: Option<&str>,
    ) -> Result<KeyPage, ClientError> {
        let url = self.keys_url(database);
        let query = listing_query(prefix, cursor, self.page_size);
        tracing::debug!(database, prefix, ?cursor, "listing keys");

        let response = self.http.get(&url).query(&query).send().await?;
        let response = expect_success(response).await?;
        response.json().await.map_err(ClientError::Decode)
    }

    /// `GET /api/db/{name}/key/{key}`
    pub async fn get_key(&self, database: &str, key: &str) -> Result<KeyValue, ClientError> {
        let response = self.http.get(self.key_url(database, key)).send().await?;
        let response = expect_success(response).await?;
        response.json().await.map_err(ClientError::Decode)
    }

    /// `POST /api/db/{name}/key`, creating or overwriting the key
    pub async fn set_key(&self, database: &str, entry: &KeyValue) -> Result<(), ClientError> {
        let url = format!("{}/api/db/{}/key", self.base_url, encode_key(database));
        let response = self.http.post(&url).json(entry).send().await?;
        expect_status(response, StatusCode::CREATED).await
    }

    /// `DELETE /api/db/{name}/key/{key}`
    pub async fn delete_key(&self, database: &str, key: &str) -> Result<(), ClientError> {
        let response = self.http.delete(self.key_url(database, key)).send().await?;
        expect_status(response, StatusCode::NO_CONTENT).await
    }

    fn keys_url(&self, database: &str) -> String {
        format!("{}/api/db/{}/keys", self.base_url, encode_key(database))
    }

    fn key_url(&self, database: &str, key: &str) -> String {
        format!(
            "{}/api/db/{}/key/{}",
            self.base_url,
            encode_key(database),
            encode_key(key)
        )
    }
}

/// Query parameters for a listing; empty values are omitted entirely
fn listing_query(
    prefix: &str,
    cursor: Option<&str>,
    page_size: Option<u32>,
) -> Vec<(&'static str, String)> {
    let mut query = Vec::with_capacity(3);
    if let Some(cursor) = cursor.filter(|c| !c.is_empty()) {
        query.push(("start", cursor.to_string()));
    }
    if !prefix.is_empty() {
        query.push(("prefix", prefix.to_string()));
    }
    if let Some(limit) = page_size {
        query.push(("limit", limit.to_string()));
    }
    query
}

async fn expect_success(response: Response) -> Result<Response, ClientError> {
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(status_error(response).await)
    }
}

async fn expect_status(response: Response, expected: StatusCode) -> Result<(), ClientError> {
    if response.status() == expected {
        Ok(())
    } else {
        Err(status_error(response).await)
    }
}

async fn status_error(response: Response) -> ClientError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    ClientError::Status {
        status,
        body: body.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> KvClient {
        KvClient::new("http://localhost:8080/", Duration::from_secs(1)).unwrap()
    }

    #[test]
    fn test_encode_key_matches_uri_component() {
        assert_eq!(encode_key("user:1"), "user%3A1");
        assert_eq!(encode_key("a/b c"), "a%2Fb%20c");
        assert_eq!(encode_key("it's-(ok)_~*!."), "it's-(ok)_~*!.");
        assert_eq!(encode_key("ключ"), "%D0%BA%D0%BB%D1%8E%D1%87");
    }

    #[test]
    fn test_urls() {
        let client = client();
        assert_eq!(client.base_url(), "http://localhost:8080");
        assert_eq!(client.keys_url("users"), "http://localhost:8080/api/db/users/keys");
        assert_eq!(
            client.key_url("users", "a/b?c"),
            "http://localhost:8080/api/db/users/key/a%2Fb%3Fc"
        );
    }

    #[test]
    fn test_listing_query_omits_empty() {
        assert!(listing_query("", None, None).is_empty());
        assert!(listing_query("", Some(""), None).is_empty());

        let query = listing_query("ali", Some("c"), Some(25));
        assert_eq!(
            query,
            vec![
                ("start", "c".to_string()),
                ("prefix", "ali".to_string()),
                ("limit", "25".to_string()),
            ]
        );
    }

    #[test]
    fn test_page_size_zero_is_server_default() {
        let client = client().with_page_size(Some(0));
        assert_eq!(client.page_size(), None);
        let client = client.with_page_size(Some(10));
        assert_eq!(client.page_size(), Some(10));
    }

    #[test]
    fn test_invalid_base_url() {
        let err = KvClient::new("localhost:8080", Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, ClientError::InvalidUrl { .. }));

        let err = KvClient::new("not a url", Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, ClientError::InvalidUrl { .. }));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_request_error() {
        let client = KvClient::new("http://127.0.0.1:1", Duration::from_secs(2)).unwrap();
        let err = client.list_databases().await.unwrap_err();
        assert!(matches!(err, ClientError::Request(_)));
    }
}
