use std::sync::Arc;

use provbench_transport::{ReqwestTransport, Transport, Url};
use tracing::{debug, info, warn};

use crate::error::ConfigError;

/// Environment variables consulted for the project, in order.
pub const PROJECT_ENV_VARS: &[&str] = &["GOOGLE_PROJECT", "GCLOUD_PROJECT", "CLOUDSDK_CORE_PROJECT"];

const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";

const DEFAULT_USER_AGENT: &str = concat!("provbench/", env!("CARGO_PKG_VERSION"));

// ── Base paths (overridden in tests to point at a mock server) ────────────────

/// Service endpoints, each ending in `/` so relative paths join onto them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasePaths {
    pub container: String,
    pub sql_admin: String,
    pub compute:   String,
    pub userinfo:  String,
}

impl Default for BasePaths {
    fn default() -> Self {
        Self {
            container: "https://container.googleapis.com/v1beta1/".into(),
            sql_admin: "https://sqladmin.googleapis.com/sql/v1beta4/".into(),
            compute:   "https://compute.googleapis.com/compute/v1/".into(),
            userinfo:  "https://openidconnect.googleapis.com/v1/".into(),
        }
    }
}

impl BasePaths {
    /// Every base path pointed at one root, keeping each service's path suffix.
    pub fn all_at(root: &str) -> Self {
        let root = root.trim_end_matches('/');
        Self {
            container: format!("{root}/v1beta1/"),
            sql_admin: format!("{root}/sql/v1beta4/"),
            compute:   format!("{root}/compute/v1/"),
            userinfo:  format!("{root}/v1/"),
        }
    }

    fn normalize(&mut self) -> Result<(), ConfigError> {
        for (service, path) in [
            ("container", &mut self.container),
            ("sqladmin", &mut self.sql_admin),
            ("compute", &mut self.compute),
            ("userinfo", &mut self.userinfo),
        ] {
            let url = Url::parse(path.as_str()).map_err(|e| ConfigError::InvalidBasePath {
                service,
                url: path.clone(),
                message: e.to_string(),
            })?;
            if !matches!(url.scheme(), "http" | "https") || url.host().is_none() {
                return Err(ConfigError::InvalidBasePath {
                    service,
                    url: path.clone(),
                    message: "expected an absolute http(s) url".into(),
                });
            }
            if !path.ends_with('/') {
                path.push('/');
            }
        }
        Ok(())
    }
}

// ── ProviderConfig ────────────────────────────────────────────────────────────

/// Credential, project and region state shared by every resource operation.
///
/// Build one, adjust the public fields, then call
/// [`load_and_validate`](Self::load_and_validate) before handing it to a client.
#[derive(Clone)]
pub struct ProviderConfig {
    /// Static OAuth2 access token. When unset, Application Default Credentials are used.
    pub access_token: Option<String>,
    pub project: String,
    /// Project charged for quota when `user_project_override` is set.
    pub billing_project: Option<String>,
    pub region: String,
    pub zone: Option<String>,
    /// Send `X-Goog-User-Project` so quota is attributed to the billing project
    /// instead of the credentials' own project.
    pub user_project_override: bool,
    pub user_agent: String,
    pub base_paths: BasePaths,
    pub transport: Arc<dyn Transport>,
    adc: Option<Arc<dyn gcp_auth::TokenProvider>>,
    validated: bool,
}

impl ProviderConfig {
    pub fn new(project: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            access_token: None,
            project: project.into(),
            billing_project: None,
            region: region.into(),
            zone: None,
            user_project_override: false,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            base_paths: BasePaths::default(),
            transport: Arc::new(ReqwestTransport::new()),
            adc: None,
            validated: false,
        }
    }

    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = transport;
        self
    }

    /// Check the configuration and resolve credentials. Must succeed before
    /// any API call is made with this config.
    pub async fn load_and_validate(&mut self) -> Result<(), ConfigError> {
        if self.project.trim().is_empty() {
            return Err(ConfigError::MissingProject(PROJECT_ENV_VARS));
        }
        if self.region.trim().is_empty() {
            return Err(ConfigError::MissingRegion);
        }
        self.base_paths.normalize()?;

        if self.access_token.as_deref().is_some_and(|t| !t.is_empty()) {
            debug!(project = %self.project, "using static access token");
        } else if self.adc.is_none() {
            info!("no access token configured, resolving Application Default Credentials");
            let provider = gcp_auth::provider()
                .await
                .map_err(|e| ConfigError::MissingCredentials(e.to_string()))?;
            self.adc = Some(provider);
        }

        if self.billing_project.is_some() && !self.user_project_override {
            warn!(
                billing_project = self.billing_project.as_deref().unwrap_or_default(),
                "billing project is ignored unless user_project_override is set"
            );
        }

        self.validated = true;
        Ok(())
    }

    pub fn is_validated(&self) -> bool {
        self.validated
    }

    /// Bearer token for the next request.
    pub async fn access_token(&self) -> Result<String, ConfigError> {
        if let Some(token) = self.access_token.as_deref().filter(|t| !t.is_empty()) {
            return Ok(token.to_string());
        }
        let provider = self.adc.as_ref().ok_or_else(|| {
            ConfigError::MissingCredentials("config not loaded; call load_and_validate first".into())
        })?;
        let token = provider
            .token(&[CLOUD_PLATFORM_SCOPE])
            .await
            .map_err(|e| ConfigError::Auth(e.to_string()))?;
        Ok(token.as_str().to_string())
    }

    /// Value for the `X-Goog-User-Project` header.
    ///
    /// A project set on the resource itself wins, then the billing project (only
    /// with `user_project_override`), then the provider project.
    pub fn user_project<'a>(&'a self, resource_project: Option<&'a str>) -> Option<&'a str> {
        resource_project
            .filter(|p| !p.is_empty())
            .or_else(|| {
                self.billing_project
                    .as_deref()
                    .filter(|p| self.user_project_override && !p.is_empty())
            })
            .or_else(|| Some(self.project.as_str()).filter(|p| !p.is_empty()))
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("project", &self.project)
            .field("billing_project", &self.billing_project)
            .field("region", &self.region)
            .field("zone", &self.zone)
            .field("user_project_override", &self.user_project_override)
            .field("user_agent", &self.user_agent)
            .field("base_paths", &self.base_paths)
            .field("adc", &self.adc.is_some())
            .field("validated", &self.validated)
            .finish()
    }
}
