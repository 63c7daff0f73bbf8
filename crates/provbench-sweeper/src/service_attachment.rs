use std::sync::Arc;

use async_trait::async_trait;
use provbench_config::shared_config_for_region;
use provbench_domain::is_sweepable_test_resource;
use provbench_provider::{ComputeClient, ServiceAttachment};
use tracing::info;

use crate::error::SweepError;
use crate::sweeper::{ConfigSource, Sweep};

/// Deletes leftover Compute service attachments in a region.
pub struct ComputeServiceAttachmentSweeper {
    config: ConfigSource,
}

impl ComputeServiceAttachmentSweeper {
    /// Sweeper configured from the environment.
    pub fn new() -> Self {
        Self::with_config_source(Arc::new(shared_config_for_region))
    }

    pub fn with_config_source(config: ConfigSource) -> Self {
        Self { config }
    }
}

impl Default for ComputeServiceAttachmentSweeper {
    fn default() -> Self {
        Self::new()
    }
}

pub fn is_deletable_service_attachment(attachment: &ServiceAttachment) -> bool {
    is_sweepable_test_resource(&attachment.name)
}

#[async_trait]
impl Sweep for ComputeServiceAttachmentSweeper {
    fn name(&self) -> &'static str {
        "ComputeServiceAttachment"
    }

    async fn sweep(&self, region: &str) -> Result<Vec<String>, SweepError> {
        info!("[SWEEPER_LOG] Starting sweeper for {}", self.name());

        let mut config = (self.config)(region).inspect_err(|e| {
            info!("[SWEEPER_LOG] error getting shared config for region: {}", e);
        })?;
        config.load_and_validate().await.inspect_err(|e| {
            info!("[SWEEPER_LOG] error loading: {}", e);
        })?;

        let client = ComputeClient::new(&config)?;
        let deleted = client
            .delete_all_service_attachments(&config.project, region, is_deletable_service_attachment)
            .await?;
        info!(
            "[SWEEPER_LOG] {} deleted {} service attachment(s) in {}",
            self.name(),
            deleted.len(),
            region
        );
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use provbench_config::{ConfigError, ProviderConfig};
    use provbench_provider::ApiError;
    use provbench_transport::{CannedResponse, MockTransport, ResponseTable};
    use serde_json::json;

    const REGION: &str = "https://compute.googleapis.com/compute/v1/projects/sweep-project/regions/us-central1";

    fn source(mock: &MockTransport) -> ConfigSource {
        let mock = mock.clone();
        Arc::new(move |region: &str| -> Result<ProviderConfig, ConfigError> {
            let mut config = ProviderConfig::new("sweep-project", region)
                .with_transport(Arc::new(mock.clone()));
            config.access_token = Some("fake-token".into());
            Ok(config)
        })
    }

    fn attachment(name: &str) -> ServiceAttachment {
        serde_json::from_value(json!({ "name": name })).unwrap()
    }

    #[test]
    fn predicate_follows_naming_convention() {
        assert!(is_deletable_service_attachment(&attachment("tf-test-sa-1")));
        assert!(!is_deletable_service_attachment(&attachment("customer-sa")));
    }

    #[tokio::test]
    async fn deletes_only_test_attachments() {
        let table = ResponseTable::builder()
            .on(
                &format!("GET {REGION}/serviceAttachments?alt=json&prettyPrint=false"),
                CannedResponse::json(json!({
                    "items": [{ "name": "tf-test-sa-1" }, { "name": "customer-sa" }]
                })),
            )
            .unwrap()
            .on(
                &format!("DELETE {REGION}/serviceAttachments/tf-test-sa-1"),
                CannedResponse::json(json!({ "name": "op-1", "status": "RUNNING" })),
            )
            .unwrap()
            .on(
                &format!("GET {REGION}/operations/op-1"),
                CannedResponse::json(json!({ "name": "op-1", "status": "DONE" })),
            )
            .unwrap()
            .build();
        let mock = MockTransport::new(table);

        let deleted = ComputeServiceAttachmentSweeper::with_config_source(source(&mock))
            .sweep("us-central1")
            .await
            .unwrap();
        assert_eq!(deleted, vec!["tf-test-sa-1"]);

        let reqs = mock.requests().await;
        assert!(!reqs.iter().any(|r| r.url.contains("customer-sa")));
        assert!(reqs.iter().all(|r| r.header("x-goog-user-project") == "sweep-project"));
    }

    #[tokio::test]
    async fn config_error_aborts() {
        let sweeper = ComputeServiceAttachmentSweeper::with_config_source(Arc::new(
            |_: &str| -> Result<ProviderConfig, ConfigError> {
                Err(ConfigError::MissingProject(&["GOOGLE_PROJECT"]))
            },
        ));
        let err = sweeper.sweep("us-central1").await.unwrap_err();
        assert!(matches!(err, SweepError::Config(ConfigError::MissingProject(_))));
    }

    #[tokio::test]
    async fn validation_error_aborts_before_any_request() {
        let mock = MockTransport::golden();
        let inner = source(&mock);
        let sweeper = ComputeServiceAttachmentSweeper::with_config_source(Arc::new(
            move |region: &str| -> Result<ProviderConfig, ConfigError> {
                let mut config = inner(region)?;
                config.base_paths.compute = "not a url".into();
                Ok(config)
            },
        ));
        let err = sweeper.sweep("us-central1").await.unwrap_err();
        assert!(matches!(err, SweepError::Config(ConfigError::InvalidBasePath { .. })));
        assert!(mock.log().is_empty().await);
    }

    #[tokio::test]
    async fn list_failure_propagates_unchanged() {
        let mock = MockTransport::new(ResponseTable::empty());
        let err = ComputeServiceAttachmentSweeper::with_config_source(source(&mock))
            .sweep("us-central1")
            .await
            .unwrap_err();
        assert!(matches!(err, SweepError::Api(ApiError::Status { code: 403, .. })));
    }
}
