use reqwest::{Method, StatusCode, Url};
use serde_json::{json, Value};

use crate::error::TransportError;
use crate::matcher::RequestMatcher;

/// A predetermined response for a matched request.
#[derive(Debug, Clone, PartialEq)]
pub struct CannedResponse {
    pub status: StatusCode,
    /// JSON fragment returned as the body. `None` still serializes as `{}`.
    pub body: Option<Value>,
}

impl CannedResponse {
    pub fn ok() -> Self {
        Self { status: StatusCode::OK, body: None }
    }

    pub fn json(body: Value) -> Self {
        Self { status: StatusCode::OK, body: Some(body) }
    }

    pub fn status(status: StatusCode) -> Self {
        Self { status, body: None }
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Ordered list of matcher → response routes. The first matching route wins;
/// a request that matches nothing is denied by the transport.
#[derive(Debug, Clone, Default)]
pub struct ResponseTable {
    routes: Vec<(RequestMatcher, CannedResponse)>,
}

impl ResponseTable {
    pub fn builder() -> ResponseTableBuilder {
        ResponseTableBuilder::default()
    }

    /// A table that answers nothing; every request gets the default-deny 403.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn lookup(&self, method: &Method, url: &Url) -> Option<&CannedResponse> {
        self.routes
            .iter()
            .find(|(m, _)| m.matches(method, url))
            .map(|(_, r)| r)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Start a builder seeded with this table's routes. Routes added to the
    /// builder take precedence over the seeded ones.
    pub fn to_builder(&self) -> ResponseTableBuilder {
        ResponseTableBuilder {
            overrides: Vec::new(),
            routes: self.routes.clone(),
        }
    }

    /// Routes for the userinfo lookup plus the SQL Admin and GKE lifecycles of
    /// `test1` used by the provider scenarios.
    pub fn golden() -> Self {
        const SQL: &str = "https://sqladmin.googleapis.com/sql/v1beta4/projects/config-test";
        const GKE: &str = "https://container.googleapis.com/v1beta1/projects/resource-project/locations/us-central1-a";

        let gcp = |method: Method, url: String| RequestMatcher::new(method, url).gcp_json();

        Self::builder()
            .route(
                RequestMatcher::new(Method::GET, "https://openidconnect.googleapis.com/v1/userinfo")
                    .query("alt", "json"),
                CannedResponse::json(json!({ "email": "test@example.com" })),
            )
            .route(gcp(Method::POST, format!("{SQL}/instances")), CannedResponse::ok())
            .route(
                gcp(Method::GET, format!("{SQL}/operations/")),
                CannedResponse::json(json!({ "status": "DONE" })),
            )
            .route(
                gcp(Method::GET, format!("{SQL}/instances/test1")),
                CannedResponse::json(json!({ "settings": {} })),
            )
            .route(gcp(Method::GET, format!("{SQL}/instances/test1/users")), CannedResponse::ok())
            .route(
                gcp(Method::GET, format!("{GKE}/clusters/test1")),
                CannedResponse::json(json!({
                    "legacyAbac":    {},
                    "networkConfig": {},
                    "status":        "RUNNING",
                })),
            )
            .route(gcp(Method::POST, format!("{GKE}/clusters")), CannedResponse::ok())
            .route(
                gcp(Method::GET, format!("{GKE}/operations/")),
                CannedResponse::json(json!({ "status": "DONE" })),
            )
            .build()
    }
}

#[derive(Debug, Default)]
pub struct ResponseTableBuilder {
    overrides: Vec<(RequestMatcher, CannedResponse)>,
    routes: Vec<(RequestMatcher, CannedResponse)>,
}

impl ResponseTableBuilder {
    pub fn route(mut self, matcher: RequestMatcher, response: CannedResponse) -> Self {
        self.overrides.push((matcher, response));
        self
    }

    /// Add a route keyed on a `"<METHOD> <URL>"` signature.
    pub fn on(self, signature: &str, response: CannedResponse) -> Result<Self, TransportError> {
        let matcher = RequestMatcher::parse(signature)?;
        Ok(self.route(matcher, response))
    }

    pub fn build(self) -> ResponseTable {
        let mut routes = self.overrides;
        routes.extend(self.routes);
        ResponseTable { routes }
    }
}
