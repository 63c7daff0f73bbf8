use std::time::Duration;

use provbench_config::ProviderConfig;
use provbench_transport::header::{HeaderName, HeaderValue, AUTHORIZATION, USER_AGENT};
use provbench_transport::{HttpRequest, Method, Url};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::USER_PROJECT_HEADER;

/// Thin JSON client shared by every resource. Adds the standard GCP request
/// decoration and turns error envelopes into [`ApiError::Status`].
#[derive(Debug, Clone)]
pub struct ApiClient {
    config: ProviderConfig,
}

impl ApiClient {
    pub fn new(config: &ProviderConfig) -> Result<Self, ApiError> {
        if !config.is_validated() {
            return Err(ApiError::ConfigNotLoaded);
        }
        Ok(Self { config: config.clone() })
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// `base` + `path` with the `alt=json&prettyPrint=false` query every JSON
    /// API call carries.
    pub fn gcp_url(&self, base: &str, path: &str) -> Result<Url, ApiError> {
        let raw = format!("{}{}", base, path);
        let mut url = Url::parse(&raw).map_err(|_| ApiError::InvalidUrl(raw))?;
        url.query_pairs_mut()
            .append_pair("alt", "json")
            .append_pair("prettyPrint", "false");
        Ok(url)
    }

    // ── Request helpers ───────────────────────────────────────────────────────

    pub async fn get(&self, url: Url, user_project: Option<&str>) -> Result<Value, ApiError> {
        self.send(Method::GET, url, None, user_project).await
    }

    pub async fn post(
        &self,
        url: Url,
        body: &Value,
        user_project: Option<&str>,
    ) -> Result<Value, ApiError> {
        self.send(Method::POST, url, Some(body), user_project).await
    }

    pub async fn delete(&self, url: Url, user_project: Option<&str>) -> Result<Value, ApiError> {
        self.send(Method::DELETE, url, None, user_project).await
    }

    pub async fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<&Value>,
        user_project: Option<&str>,
    ) -> Result<Value, ApiError> {
        let token = self.config.access_token().await?;

        let mut req = HttpRequest::new(method, url)
            .with_header(AUTHORIZATION, header_value("authorization", &format!("Bearer {token}"))?)
            .with_header(USER_AGENT, header_value("user-agent", &self.config.user_agent)?);
        if let Some(project) = user_project {
            req = req.with_header(
                HeaderName::from_static(USER_PROJECT_HEADER),
                header_value(USER_PROJECT_HEADER, project)?,
            );
        }
        if let Some(body) = body {
            req = req.with_json(body)?;
        }

        let signature = req.signature();
        let resp = self.config.transport.round_trip(req).await?;
        if !resp.status.is_success() {
            let body: Value = resp.json().unwrap_or(Value::Null);
            let message = if body.get("error").is_some() {
                Self::extract_gcp_error(&body)
            } else {
                resp.status
                    .canonical_reason()
                    .unwrap_or("unknown status")
                    .to_string()
            };
            debug!(%signature, status = resp.status.as_u16(), %message, "request failed");
            return Err(ApiError::Status {
                code: resp.status.as_u16(),
                message,
            });
        }
        Ok(resp.json()?)
    }

    // ── GCP error parsing ─────────────────────────────────────────────────────

    /// Flatten a GCP error envelope into one line. The first detail carrying
    /// a `reason` is appended with its metadata values, e.g. a billing
    /// project the caller may not charge:
    ///
    /// `PERMISSION_DENIED: Caller does not have required permission to use project billing-project [USER_PROJECT_DENIED - billing-project, sqladmin.googleapis.com]`
    pub fn extract_gcp_error(body: &Value) -> String {
        let err = &body["error"];
        let status = match (err["status"].as_str(), err["code"].as_u64()) {
            (Some(status), _) => status.to_string(),
            (None, Some(code)) => code.to_string(),
            (None, None) => "UNKNOWN".to_string(),
        };
        let message = err["message"].as_str().unwrap_or("unknown error");

        let reason = err["details"].as_array().and_then(|details| {
            details.iter().find_map(|d| {
                let reason = d["reason"].as_str()?;
                let values: Vec<&str> = d["metadata"]
                    .as_object()
                    .into_iter()
                    .flat_map(|m| m.values().filter_map(Value::as_str))
                    .collect();
                Some(if values.is_empty() {
                    format!(" [{reason}]")
                } else {
                    format!(" [{reason} - {}]", values.join(", "))
                })
            })
        });

        format!("{status}: {message}{}", reason.unwrap_or_default())
    }

    /// Message of a finished operation's `error` field. SQL Admin and Compute
    /// nest messages under `errors[]`; GKE puts one at the top level.
    fn operation_error(err: &Value) -> String {
        if let Some(errors) = err["errors"].as_array() {
            let msgs: Vec<&str> = errors
                .iter()
                .filter_map(|e| e["message"].as_str().or_else(|| e["code"].as_str()))
                .collect();
            if !msgs.is_empty() {
                return msgs.join("; ");
            }
        }
        err["message"]
            .as_str()
            .map(str::to_string)
            .unwrap_or_else(|| err.to_string())
    }

    // ── Long-running operation polling ────────────────────────────────────────

    /// Poll an operation URL until its `status` is `DONE`.
    ///
    /// Backoff: 1 s, 2 s, 4 s, 8 s, 16 s, 30 s, 30 s, … (max 30 polls).
    pub async fn wait_for_operation(
        &self,
        op_url: Url,
        user_project: Option<&str>,
    ) -> Result<Value, ApiError> {
        let delays = [1u64, 2, 4, 8, 16, 30];
        let iter = delays.iter().chain(std::iter::repeat(&30));

        for &delay in iter.take(30) {
            let op = self.get(op_url.clone(), user_project).await?;

            if op["status"].as_str() == Some("DONE") {
                if let Some(err) = op.get("error").filter(|e| !e.is_null()) {
                    let msg = Self::operation_error(err);
                    warn!(url = %op_url, %msg, "operation finished with error");
                    return Err(ApiError::OperationFailed(msg));
                }
                return Ok(op);
            }

            debug!(url = %op_url, status = op["status"].as_str().unwrap_or(""), "operation pending");
            tokio::time::sleep(Duration::from_secs(delay)).await;
        }

        Err(ApiError::OperationTimeout(op_url.to_string()))
    }

    // ── Identity ──────────────────────────────────────────────────────────────

    /// Email of the account the credentials belong to.
    pub async fn user_email(&self) -> Result<String, ApiError> {
        let raw = format!("{}userinfo", self.config.base_paths.userinfo);
        let mut url = Url::parse(&raw).map_err(|_| ApiError::InvalidUrl(raw))?;
        url.query_pairs_mut().append_pair("alt", "json");

        let info = self.get(url, self.config.user_project(None)).await?;
        info["email"]
            .as_str()
            .map(str::to_string)
            .ok_or(ApiError::MissingField("email"))
    }
}

fn header_value(name: &'static str, value: &str) -> Result<HeaderValue, ApiError> {
    HeaderValue::from_str(value).map_err(|_| ApiError::InvalidHeader { name })
}
