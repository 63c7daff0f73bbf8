//! Test harness for provider resources against the in-memory mock transport.
//!
//! A [`Harness`] owns a validated [`ProviderConfig`] whose transport is a
//! [`MockTransport`], so every API call a resource makes is captured and
//! answered from a canned [`ResponseTable`]. Assertions that fail are
//! collected rather than aborting the test; [`Harness::finish`], or dropping
//! the harness, reports them all at once.

use std::fmt::Display;
use std::sync::{Arc, Mutex, PoisonError};

use provbench_config::{ConfigError, ProviderConfig};
use provbench_domain::ResourceData;
use provbench_provider::{Resource, ResourceError, ResourceRegistry, USER_PROJECT_HEADER};
use provbench_transport::{CapturedRequest, MockTransport, ResponseTable};
use thiserror::Error;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

pub const TEST_ACCESS_TOKEN: &str = "coolbeans";
pub const TEST_PROJECT: &str = "config-test";
pub const TEST_BILLING_PROJECT: &str = "billing-project";
pub const TEST_REGION: &str = "us-central1";

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Resource(#[from] ResourceError),

    #[error("unknown resource type: {0}")]
    UnknownResource(String),
}

/// Install a `tracing` subscriber that writes through the test capture.
/// Safe to call from every test; only the first call takes effect.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_test_writer()
        .try_init();
}

/// The configuration scenarios run with: a static token, a billing project
/// and `user_project_override` on. Not yet validated.
pub fn test_config(transport: MockTransport) -> ProviderConfig {
    let mut config =
        ProviderConfig::new(TEST_PROJECT, TEST_REGION).with_transport(Arc::new(transport));
    config.access_token = Some(TEST_ACCESS_TOKEN.into());
    config.billing_project = Some(TEST_BILLING_PROJECT.into());
    config.user_project_override = true;
    config
}

pub struct Harness {
    config: ProviderConfig,
    resources: ResourceRegistry,
    transport: MockTransport,
    failures: Mutex<Vec<String>>,
}

impl Harness {
    /// Harness answering from the golden response table.
    pub async fn new() -> Result<Self, HarnessError> {
        Self::with_table(ResponseTable::golden()).await
    }

    pub async fn with_table(table: ResponseTable) -> Result<Self, HarnessError> {
        let transport = MockTransport::new(table);
        let mut config = test_config(transport.clone());
        config.load_and_validate().await?;
        let resources = ResourceRegistry::builtin()?;
        Ok(Self {
            config,
            resources,
            transport,
            failures: Mutex::new(Vec::new()),
        })
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    pub fn transport(&self) -> &MockTransport {
        &self.transport
    }

    pub fn resource(&self, resource_type: &str) -> Result<Arc<dyn Resource>, HarnessError> {
        self.resources
            .get(resource_type)
            .ok_or_else(|| HarnessError::UnknownResource(resource_type.to_string()))
    }

    pub async fn create(
        &self,
        resource_type: &str,
        data: &mut ResourceData,
    ) -> Result<(), HarnessError> {
        self.resource(resource_type)?.create(data, &self.config).await?;
        Ok(())
    }

    pub async fn read(
        &self,
        resource_type: &str,
        data: &mut ResourceData,
    ) -> Result<(), HarnessError> {
        self.resource(resource_type)?.read(data, &self.config).await?;
        Ok(())
    }

    pub async fn requests(&self) -> Vec<CapturedRequest> {
        self.transport.requests().await
    }

    // ── Soft failures ─────────────────────────────────────────────────────────

    /// Record `what` as failed when `result` is an error. The test keeps going.
    pub fn check<T, E: Display>(&self, result: Result<T, E>, what: &str) -> Option<T> {
        match result {
            Ok(v) => Some(v),
            Err(e) => {
                self.record_failure(format!("{what}: {e}"));
                None
            }
        }
    }

    pub fn record_failure(&self, message: impl Into<String>) {
        let message = message.into();
        error!("{}", message);
        self.failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message);
    }

    pub fn failures(&self) -> Vec<String> {
        self.failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Remove and return the recorded failures, for tests that expect some.
    pub fn take_failures(&self) -> Vec<String> {
        std::mem::take(
            &mut *self
                .failures
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        )
    }

    /// Panic listing every recorded failure, if any. Dropping the harness
    /// does the same; `finish` makes the end of the test explicit.
    pub fn finish(self) {
        report_failures(self.take_failures());
    }

    // ── Attribution assertions ────────────────────────────────────────────────

    /// Every captured request must carry `X-Goog-User-Project: expected`.
    pub async fn must_have_user_project(&self, expected: &str) {
        self.assert_user_project(|_| true, expected).await;
    }

    /// Like [`must_have_user_project`](Self::must_have_user_project), limited to
    /// requests whose URL starts with `url_prefix`.
    pub async fn must_have_user_project_for(&self, url_prefix: &str, expected: &str) {
        self.assert_user_project(|r| r.url.starts_with(url_prefix), expected)
            .await;
    }

    async fn assert_user_project<F>(&self, include: F, expected: &str)
    where
        F: Fn(&CapturedRequest) -> bool,
    {
        for (i, req) in self.requests().await.iter().enumerate() {
            if !include(req) {
                continue;
            }
            let got = req.header(USER_PROJECT_HEADER);
            debug!(index = i, method = %req.method, url = %req.url, user_project = got, "checking request");
            if got != expected {
                self.record_failure(format!(
                    "request {i} {} {}: {USER_PROJECT_HEADER} = {got:?}, want {expected:?}",
                    req.method, req.url
                ));
            }
        }
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        if std::thread::panicking() {
            return;
        }
        report_failures(self.take_failures());
    }
}

fn report_failures(failures: Vec<String>) {
    if !failures.is_empty() {
        panic!(
            "{} check(s) failed:\n  {}",
            failures.len(),
            failures.join("\n  ")
        );
    }
}

impl std::fmt::Debug for Harness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Harness")
            .field("config", &self.config)
            .field("resources", &self.resources)
            .field("failures", &self.failures())
            .finish()
    }
}
