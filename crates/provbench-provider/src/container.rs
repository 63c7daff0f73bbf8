use async_trait::async_trait;
use provbench_config::ProviderConfig;
use provbench_domain::ResourceData;
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::client::ApiClient;
use crate::error::ResourceError;
use crate::resource::{resource_project, Resource};

/// Cluster states a read reports as a failure.
const UNHEALTHY_STATES: &[&str] = &["ERROR", "DEGRADED"];

/// `google_container_cluster`, backed by the GKE v1beta1 API.
#[derive(Debug, Default, Clone)]
pub struct ContainerCluster;

impl ContainerCluster {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Resource for ContainerCluster {
    fn resource_type(&self) -> &'static str {
        "google_container_cluster"
    }

    async fn create(
        &self,
        data: &mut ResourceData,
        config: &ProviderConfig,
    ) -> Result<(), ResourceError> {
        let client = ApiClient::new(config)?;
        let name = data.require_str("name")?.to_string();
        let location = data.require_str("location")?.to_string();
        let project = resource_project(data, config).to_string();
        let project_override = data.get_str("project").map(str::to_string);
        let user_project = config.user_project(project_override.as_deref());
        let parent = format!("projects/{project}/locations/{location}");
        let base = &config.base_paths.container;

        info!(%parent, cluster = %name, "Creating GKE cluster");
        let body = json!({
            "cluster": {
                "name":             name,
                "initialNodeCount": data.get("initial_node_count").and_then(Value::as_u64).unwrap_or(1),
            },
            "parent": parent,
        });
        let op = client
            .post(client.gcp_url(base, &format!("{parent}/clusters"))?, &body, user_project)
            .await?;

        let op_name = op["name"].as_str().unwrap_or("");
        client
            .wait_for_operation(
                client.gcp_url(base, &format!("{parent}/operations/{op_name}"))?,
                user_project,
            )
            .await?;
        data.set_id(format!("{parent}/clusters/{name}"));

        self.read(data, config).await
    }

    async fn read(
        &self,
        data: &mut ResourceData,
        config: &ProviderConfig,
    ) -> Result<(), ResourceError> {
        let client = ApiClient::new(config)?;
        let name = data.require_str("name")?.to_string();
        let location = data.require_str("location")?.to_string();
        let project = resource_project(data, config).to_string();
        let project_override = data.get_str("project").map(str::to_string);
        let user_project = config.user_project(project_override.as_deref());
        let id = format!("projects/{project}/locations/{location}/clusters/{name}");

        let cluster = match client
            .get(client.gcp_url(&config.base_paths.container, &id)?, user_project)
            .await
        {
            Ok(v) => v,
            Err(e) if e.is_not_found() => {
                debug!(cluster = %name, "GKE cluster not found, clearing id");
                data.clear_id();
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        let status = cluster["status"].as_str().unwrap_or_default();
        if UNHEALTHY_STATES.contains(&status) {
            return Err(ResourceError::Unhealthy {
                resource: self.resource_type(),
                name,
                status: status.to_string(),
            });
        }

        if let Value::Object(fields) = &cluster {
            data.set_from_response(
                fields,
                &[
                    ("status", "status"),
                    ("legacyAbac", "legacy_abac"),
                    ("networkConfig", "network_config"),
                    ("endpoint", "endpoint"),
                    ("currentMasterVersion", "master_version"),
                ],
            );
        }
        data.set_id(id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use provbench_domain::DomainError;
    use provbench_transport::{CannedResponse, MockTransport, ResponseTable};

    const PARENT: &str =
        "https://container.googleapis.com/v1beta1/projects/resource-project/locations/us-central1-a";

    async fn config(mock: &MockTransport) -> ProviderConfig {
        let mut config = ProviderConfig::new("config-test", "us-central1")
            .with_transport(Arc::new(mock.clone()));
        config.access_token = Some("coolbeans".into());
        config.load_and_validate().await.unwrap();
        config
    }

    fn cluster_data() -> ResourceData {
        let mut data = ResourceData::new();
        data.set("name", "test1")
            .set("project", "resource-project")
            .set("location", "us-central1-a");
        data
    }

    #[tokio::test]
    async fn create_reads_back_cluster() {
        let mock = MockTransport::golden();
        let mut data = cluster_data();
        ContainerCluster::new()
            .create(&mut data, &config(&mock).await)
            .await
            .unwrap();

        assert_eq!(
            data.id(),
            Some("projects/resource-project/locations/us-central1-a/clusters/test1")
        );
        assert_eq!(data.get_str("status"), Some("RUNNING"));
        assert_eq!(data.get("legacy_abac"), Some(&json!({})));
        assert_eq!(data.get("network_config"), Some(&json!({})));

        let reqs = mock.requests().await;
        assert_eq!(reqs.len(), 3);
        assert!(reqs
            .iter()
            .all(|r| r.header("x-goog-user-project") == "resource-project"));
    }

    #[tokio::test]
    async fn location_is_required() {
        let mock = MockTransport::golden();
        let mut data = ResourceData::new();
        data.set("name", "test1");
        let err = ContainerCluster::new()
            .read(&mut data, &config(&mock).await)
            .await
            .unwrap_err();
        assert!(matches!(err, ResourceError::Domain(DomainError::MissingField(f)) if f == "location"));
    }

    #[tokio::test]
    async fn errored_cluster_is_unhealthy() {
        let table = ResponseTable::builder()
            .on(
                &format!("GET {PARENT}/clusters/test1"),
                CannedResponse::json(json!({ "status": "ERROR" })),
            )
            .unwrap()
            .build();
        let mock = MockTransport::new(table);
        let err = ContainerCluster::new()
            .read(&mut cluster_data(), &config(&mock).await)
            .await
            .unwrap_err();
        assert!(matches!(err, ResourceError::Unhealthy { status, .. } if status == "ERROR"));
    }
}
