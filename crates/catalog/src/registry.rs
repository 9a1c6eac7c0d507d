use crate::decode::{decode_server, decode_server_list};
use crate::error::{CatalogError, Result};
use crate::model::CatalogEntry;
use crate::source::{CatalogSource, Page, PageRequest};
use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct RegistryClientConfig {
    pub base_url: String,
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl RegistryClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            request_timeout: Duration::from_secs(10),
            user_agent: format!("catalog-scout/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// HTTP collaborator for the upstream registry REST API (`/v0/servers`).
#[derive(Debug, Clone)]
pub struct RegistryClient {
    base: Url,
    http: Client,
}

impl RegistryClient {
    pub fn new(config: RegistryClientConfig) -> Result<Self> {
        let base = Url::parse(&config.base_url)
            .map_err(|err| CatalogError::InvalidBaseUrl(format!("{}: {err}", config.base_url)))?;
        if base.cannot_be_a_base() {
            return Err(CatalogError::InvalidBaseUrl(config.base_url));
        }
        let http = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent)
            .build()
            .map_err(|err| CatalogError::Other(format!("Failed to build HTTP client: {err}")))?;
        Ok(Self { base, http })
    }

    /// Probe the listing endpoint once to confirm the registry is reachable.
    pub async fn verify(&self) -> Result<()> {
        let url = self.endpoint(&["v0", "servers"])?;
        let response = self
            .http
            .get(url)
            .query(&[("limit", "1")])
            .send()
            .await
            .map_err(|err| CatalogError::Unavailable(err.to_string()))?;
        if !response.status().is_success() {
            return Err(CatalogError::Status {
                status: response.status().as_u16(),
                body: String::new(),
            });
        }
        Ok(())
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| CatalogError::InvalidBaseUrl(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn list_query(request: &PageRequest) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if !request.cursor.is_empty() {
            query.push(("cursor", request.cursor.as_str().to_string()));
        }
        if let Some(version) = request.version_filter.as_deref().filter(|v| !v.is_empty()) {
            query.push(("version", version.to_string()));
        }
        if let Some(search) = request.search_hint.as_deref().filter(|s| !s.is_empty()) {
            query.push(("search", search.to_string()));
        }
        query
    }
}

#[async_trait]
impl CatalogSource for RegistryClient {
    async fn list_page(&self, request: &PageRequest) -> Result<Page> {
        let url = self.endpoint(&["v0", "servers"])?;
        log::debug!("GET {url} (cursor='{}')", request.cursor.as_str());

        let response = self
            .http
            .get(url)
            .query(&Self::list_query(request))
            .send()
            .await
            .map_err(|err| CatalogError::Unavailable(err.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| CatalogError::Unavailable(err.to_string()))?;
        if !status.is_success() {
            return Err(CatalogError::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }
        decode_server_list(&body)
    }

    async fn get_entry(&self, name: &str) -> Result<Option<CatalogEntry>> {
        let url = self.endpoint(&["v0", "servers", name, "versions", "latest"])?;
        log::debug!("GET {url}");

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|err| CatalogError::Unavailable(err.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let body = response
            .bytes()
            .await
            .map_err(|err| CatalogError::Unavailable(err.to_string()))?;
        if !status.is_success() {
            return Err(CatalogError::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }
        decode_server(&body).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::Cursor;
    use std::sync::{Arc, Mutex};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    type Route = (&'static str, u16, &'static str);

    const LIST_BODY: &str = r#"{
      "servers": [
        { "server": { "name": "io.test/pg", "version": "1.0.0", "description": "Postgres" } }
      ],
      "metadata": { "nextCursor": "abc" }
    }"#;

    const ENTRY_BODY: &str = r#"{ "server": { "name": "io.test/pg", "version": "1.0.0" } }"#;

    const ROUTES: &[Route] = &[
        ("/v0/servers", 200, LIST_BODY),
        ("/v0/servers/io.test%2Fpg/versions/latest", 200, ENTRY_BODY),
        ("/v0/servers/io.test%2Fbroken/versions/latest", 500, "boom"),
    ];

    const FAILING_ROUTES: &[Route] = &[("/v0/servers", 503, "maintenance")];

    /// Local HTTP stub answering one request per connection; unknown paths get 404.
    /// Returns the base URL and the request targets it has seen.
    async fn serve(routes: &'static [Route]) -> (String, Arc<Mutex<Vec<String>>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&seen);

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let mut head = Vec::new();
                let mut chunk = [0u8; 1024];
                while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut chunk).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => head.extend_from_slice(&chunk[..n]),
                    }
                }
                let head = String::from_utf8_lossy(&head);
                let target = head.split_whitespace().nth(1).unwrap_or_default().to_string();
                log.lock().unwrap().push(target.clone());

                let path = target.split('?').next().unwrap_or_default();
                let (status, body) = routes
                    .iter()
                    .find(|(route, ..)| *route == path)
                    .map_or((404, ""), |(_, status, body)| (*status, *body));
                let response = format!(
                    "HTTP/1.1 {status} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        (format!("http://{addr}"), seen)
    }

    fn client(base_url: &str) -> RegistryClient {
        RegistryClient::new(
            RegistryClientConfig::new(base_url).request_timeout(Duration::from_secs(5)),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn list_page_decodes_payload_and_forwards_hints() {
        let (base, seen) = serve(ROUTES).await;
        let request = PageRequest {
            cursor: Cursor::from_token("c2"),
            version_filter: None,
            search_hint: Some("pg".to_string()),
        };

        let page = client(&base).list_page(&request).await.unwrap();
        assert_eq!(page.entries.len(), 1);
        assert_eq!(page.entries[0].name, "io.test/pg");
        assert_eq!(page.next_cursor, Cursor::from_token("abc"));

        let targets = seen.lock().unwrap().clone();
        assert_eq!(targets, vec!["/v0/servers?cursor=c2&search=pg".to_string()]);
    }

    #[tokio::test]
    async fn lookup_maps_found_missing_and_failing() {
        let (base, _) = serve(ROUTES).await;
        let client = client(&base);

        let found = client.get_entry("io.test/pg").await.unwrap();
        assert_eq!(found.map(|e| e.name), Some("io.test/pg".to_string()));

        assert!(client.get_entry("io.test/ghost").await.unwrap().is_none());

        match client.get_entry("io.test/broken").await {
            Err(CatalogError::Status { status, body }) => {
                assert_eq!(status, 500);
                assert_eq!(body, "boom");
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn non_success_listing_is_status_error() {
        let (base, seen) = serve(FAILING_ROUTES).await;
        let client = client(&base);

        match client.list_page(&PageRequest::default()).await {
            Err(CatalogError::Status { status, body }) => {
                assert_eq!(status, 503);
                assert_eq!(body, "maintenance");
            }
            other => panic!("expected status error, got {other:?}"),
        }
        assert!(matches!(
            client.verify().await,
            Err(CatalogError::Status { status: 503, .. })
        ));
        assert_eq!(seen.lock().unwrap().last().map(String::as_str), Some("/v0/servers?limit=1"));
    }

    #[tokio::test]
    async fn verify_succeeds_against_reachable_registry() {
        let (base, _) = serve(ROUTES).await;
        client(&base).verify().await.unwrap();
    }

    #[tokio::test]
    async fn refused_connection_is_unavailable() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let client = client(&format!("http://{addr}"));

        assert!(matches!(
            client.list_page(&PageRequest::default()).await,
            Err(CatalogError::Unavailable(_))
        ));
        assert!(matches!(
            client.get_entry("io.test/pg").await,
            Err(CatalogError::Unavailable(_))
        ));
        assert!(matches!(client.verify().await, Err(CatalogError::Unavailable(_))));
    }

    #[test]
    fn lookup_url_escapes_qualified_name() {
        let client =
            RegistryClient::new(RegistryClientConfig::new("https://registry.example.com/")).unwrap();
        let url = client
            .endpoint(&["v0", "servers", "io.github.acme/everything", "versions", "latest"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://registry.example.com/v0/servers/io.github.acme%2Feverything/versions/latest"
        );
    }

    #[test]
    fn base_path_is_preserved() {
        let client =
            RegistryClient::new(RegistryClientConfig::new("http://localhost:8080/api")).unwrap();
        let url = client.endpoint(&["v0", "servers"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/api/v0/servers");
    }

    #[test]
    fn list_query_forwards_only_present_hints() {
        let request = PageRequest {
            cursor: Cursor::from_token("c2"),
            version_filter: Some("latest".to_string()),
            search_hint: Some(String::new()),
        };
        let query = RegistryClient::list_query(&request);
        assert_eq!(
            query,
            vec![("cursor", "c2".to_string()), ("version", "latest".to_string())]
        );
        assert!(RegistryClient::list_query(&PageRequest::default()).is_empty());
    }

    #[test]
    fn rejects_unusable_base_url() {
        assert!(RegistryClient::new(RegistryClientConfig::new("not a url")).is_err());
        assert!(RegistryClient::new(RegistryClientConfig::new("mailto:ops@example.com")).is_err());
    }
}
