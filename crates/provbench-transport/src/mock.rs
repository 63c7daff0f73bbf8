use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde_json::json;
use tokio::sync::RwLock;
use tracing::info;

use crate::error::TransportError;
use crate::http::{HttpRequest, HttpResponse};
use crate::table::ResponseTable;
use crate::transport::Transport;

/// One intercepted call, exactly as the caller sent it.
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub method: String,
    pub url: String,
    pub headers: HeaderMap,
    pub body: String,
}

impl CapturedRequest {
    /// First value of `name`, or `""` when absent or not valid text.
    pub fn header(&self, name: &str) -> &str {
        self.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
    }

    /// Every value of `name`, in insertion order.
    pub fn header_all(&self, name: &str) -> Vec<&str> {
        self.headers
            .get_all(name)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect()
    }
}

/// Append-only log of intercepted requests, shared between the transport and
/// whoever inspects it.
#[derive(Debug, Clone, Default)]
pub struct RequestLog {
    inner: Arc<RwLock<Vec<CapturedRequest>>>,
}

impl RequestLog {
    async fn push(&self, req: CapturedRequest) {
        self.inner.write().await.push(req);
    }

    /// All requests captured so far, in arrival order.
    pub async fn snapshot(&self) -> Vec<CapturedRequest> {
        self.inner.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

/// In-process [`Transport`] that records every request and answers it from a
/// [`ResponseTable`] without touching the network.
///
/// Unmatched requests fail closed with `403 Forbidden` and an empty body.
#[derive(Debug, Clone)]
pub struct MockTransport {
    table: Arc<ResponseTable>,
    log: RequestLog,
}

impl MockTransport {
    pub fn new(table: ResponseTable) -> Self {
        Self {
            table: Arc::new(table),
            log: RequestLog::default(),
        }
    }

    pub fn golden() -> Self {
        Self::new(ResponseTable::golden())
    }

    pub fn log(&self) -> RequestLog {
        self.log.clone()
    }

    pub async fn requests(&self) -> Vec<CapturedRequest> {
        self.log.snapshot().await
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn round_trip(&self, req: HttpRequest) -> Result<HttpResponse, TransportError> {
        info!("request: {} {}", req.method, req.url);

        self.log
            .push(CapturedRequest {
                method: req.method.to_string(),
                url: req.url.to_string(),
                headers: req.headers.clone(),
                body: req
                    .body
                    .as_deref()
                    .map(|b| String::from_utf8_lossy(b).into_owned())
                    .unwrap_or_default(),
            })
            .await;

        let Some(canned) = self.table.lookup(&req.method, &req.url) else {
            info!("response: {} -", StatusCode::FORBIDDEN.as_u16());
            return Ok(HttpResponse::new(StatusCode::FORBIDDEN, Vec::new()));
        };

        let body = canned.body.clone().unwrap_or_else(|| json!({}));
        let bytes = serde_json::to_vec(&body)?;
        info!("response: {} {}", canned.status.as_u16(), body);

        let mut resp = HttpResponse::new(canned.status, bytes);
        resp.headers.insert(
            reqwest::header::CONTENT_TYPE,
            reqwest::header::HeaderValue::from_static("application/json"),
        );
        Ok(resp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::CannedResponse;
    use reqwest::header::{HeaderName, HeaderValue};
    use reqwest::{Method, Url};
    use serde_json::Value;

    fn get(url: &str) -> HttpRequest {
        HttpRequest::new(Method::GET, Url::parse(url).unwrap())
    }

    #[tokio::test]
    async fn unmatched_request_is_denied_with_empty_body() {
        let mock = MockTransport::golden();
        for url in [
            "https://example.com/anything",
            "https://sqladmin.googleapis.com/sql/v1beta4/projects/config-test/instances/test1",
            "https://sqladmin.googleapis.com/sql/v1beta4/projects/config-test/instances/test1?alt=json&prettyPrint=true",
        ] {
            let resp = mock.round_trip(get(url)).await.unwrap();
            assert_eq!(resp.status, StatusCode::FORBIDDEN, "{url}");
            assert!(resp.body.is_empty(), "{url}");
        }
        assert_eq!(mock.log().len().await, 3);
    }

    #[tokio::test]
    async fn matched_request_without_fragment_returns_empty_object() {
        let mock = MockTransport::golden();
        let req = HttpRequest::new(
            Method::POST,
            Url::parse("https://sqladmin.googleapis.com/sql/v1beta4/projects/config-test/instances?alt=json&prettyPrint=false").unwrap(),
        );
        let resp = mock.round_trip(req).await.unwrap();
        assert_eq!(resp.status, StatusCode::OK);
        assert_eq!(resp.text(), "{}");
    }

    #[tokio::test]
    async fn records_requests_in_order_with_headers_and_body() {
        let mock = MockTransport::golden();
        let first = get("https://openidconnect.googleapis.com/v1/userinfo?alt=json")
            .with_header(
                HeaderName::from_static("x-goog-user-project"),
                HeaderValue::from_static("a"),
            )
            .with_header(
                HeaderName::from_static("x-goog-user-project"),
                HeaderValue::from_static("b"),
            );
        let second = HttpRequest::new(Method::POST, Url::parse("https://example.com/x").unwrap())
            .with_json(&serde_json::json!({ "name": "test1" }))
            .unwrap();

        mock.round_trip(first).await.unwrap();
        mock.round_trip(second).await.unwrap();

        let reqs = mock.requests().await;
        assert_eq!(reqs.len(), 2);
        assert_eq!(reqs[0].method, "GET");
        assert_eq!(reqs[0].header("X-Goog-User-Project"), "a");
        assert_eq!(reqs[0].header_all("x-goog-user-project"), vec!["a", "b"]);
        assert_eq!(reqs[0].body, "");
        assert_eq!(reqs[1].method, "POST");
        assert_eq!(reqs[1].url, "https://example.com/x");
        assert_eq!(reqs[1].body, r#"{"name":"test1"}"#);
        assert_eq!(reqs[1].header("x-goog-user-project"), "");
    }

    #[tokio::test]
    async fn replayed_read_is_identical() {
        let mock = MockTransport::golden();
        let url = "https://container.googleapis.com/v1beta1/projects/resource-project/locations/us-central1-a/clusters/test1?alt=json&prettyPrint=false";

        let a = mock.round_trip(get(url)).await.unwrap();
        let b = mock.round_trip(get(url)).await.unwrap();
        assert_eq!(a.status, b.status);
        assert_eq!(a.body, b.body);
        let body: Value = a.json().unwrap();
        assert_eq!(body["status"], "RUNNING");
    }

    #[tokio::test]
    async fn instances_do_not_share_tables_or_logs() {
        let custom = MockTransport::new(
            ResponseTable::builder()
                .on("GET https://example.com/x", CannedResponse::status(StatusCode::ACCEPTED))
                .unwrap()
                .build(),
        );
        let golden = MockTransport::golden();

        let resp = custom.round_trip(get("https://example.com/x")).await.unwrap();
        assert_eq!(resp.status, StatusCode::ACCEPTED);
        let resp = golden.round_trip(get("https://example.com/x")).await.unwrap();
        assert_eq!(resp.status, StatusCode::FORBIDDEN);

        assert_eq!(custom.log().len().await, 1);
        assert_eq!(golden.log().len().await, 1);
    }
}
