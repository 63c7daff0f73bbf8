use async_trait::async_trait;
use provbench_config::ProviderConfig;
use provbench_domain::ResourceData;
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::client::ApiClient;
use crate::error::ResourceError;
use crate::resource::{resource_project, Resource};

const DEFAULT_DATABASE_VERSION: &str = "POSTGRES_14";
const DEFAULT_TIER: &str = "db-f1-micro";

/// `google_sql_database_instance`, backed by the SQL Admin v1beta4 API.
#[derive(Debug, Default, Clone)]
pub struct SqlDatabaseInstance;

impl SqlDatabaseInstance {
    pub fn new() -> Self {
        Self
    }

    /// MySQL instances come with a passwordless `root@%` user; remove it.
    async fn delete_default_root_user(
        &self,
        client: &ApiClient,
        project: &str,
        name: &str,
        database_version: &str,
        user_project: Option<&str>,
    ) -> Result<(), ResourceError> {
        let base = &client.config().base_paths.sql_admin;
        let users = client
            .get(
                client.gcp_url(base, &format!("projects/{project}/instances/{name}/users"))?,
                user_project,
            )
            .await?;

        if !database_version.starts_with("MYSQL") {
            return Ok(());
        }
        let has_root = users["items"].as_array().is_some_and(|items| {
            items
                .iter()
                .any(|u| u["name"] == "root" && u["host"] == "%")
        });
        if !has_root {
            return Ok(());
        }

        info!(instance = name, "Deleting default root@% user");
        let mut url = client.gcp_url(base, &format!("projects/{project}/instances/{name}/users"))?;
        url.query_pairs_mut().append_pair("name", "root").append_pair("host", "%");
        let op = client.delete(url, user_project).await?;
        let op_name = op["name"].as_str().unwrap_or("");
        client
            .wait_for_operation(
                client.gcp_url(base, &format!("projects/{project}/operations/{op_name}"))?,
                user_project,
            )
            .await?;
        Ok(())
    }
}

#[async_trait]
impl Resource for SqlDatabaseInstance {
    fn resource_type(&self) -> &'static str {
        "google_sql_database_instance"
    }

    async fn create(
        &self,
        data: &mut ResourceData,
        config: &ProviderConfig,
    ) -> Result<(), ResourceError> {
        let client = ApiClient::new(config)?;
        let name = data.require_str("name")?.to_string();
        let project = resource_project(data, config).to_string();
        let project_override = data.get_str("project").map(str::to_string);
        let user_project = config.user_project(project_override.as_deref());
        let database_version = data
            .get_str("database_version")
            .unwrap_or(DEFAULT_DATABASE_VERSION)
            .to_string();
        let base = &config.base_paths.sql_admin;

        info!(%project, instance = %name, "Creating SQL database instance");
        let body = json!({
            "name":            name,
            "project":         project,
            "region":          data.get_str("region").unwrap_or(&config.region),
            "databaseVersion": database_version,
            "settings": {
                "tier": data.get_str("tier").unwrap_or(DEFAULT_TIER),
            },
        });
        let op = client
            .post(client.gcp_url(base, &format!("projects/{project}/instances"))?, &body, user_project)
            .await?;

        let op_name = op["name"].as_str().unwrap_or("");
        client
            .wait_for_operation(
                client.gcp_url(base, &format!("projects/{project}/operations/{op_name}"))?,
                user_project,
            )
            .await?;
        data.set_id(format!("projects/{project}/instances/{name}"));

        self.delete_default_root_user(&client, &project, &name, &database_version, user_project)
            .await?;

        self.read(data, config).await
    }

    async fn read(
        &self,
        data: &mut ResourceData,
        config: &ProviderConfig,
    ) -> Result<(), ResourceError> {
        let client = ApiClient::new(config)?;
        let name = data.require_str("name")?.to_string();
        let project = resource_project(data, config).to_string();
        let project_override = data.get_str("project").map(str::to_string);
        let user_project = config.user_project(project_override.as_deref());

        let url = client.gcp_url(
            &config.base_paths.sql_admin,
            &format!("projects/{project}/instances/{name}"),
        )?;
        let instance = match client.get(url, user_project).await {
            Ok(v) => v,
            Err(e) if e.is_not_found() => {
                debug!(instance = %name, "SQL instance not found, clearing id");
                data.clear_id();
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        if let Value::Object(fields) = &instance {
            data.set_from_response(
                fields,
                &[
                    ("settings", "settings"),
                    ("state", "state"),
                    ("connectionName", "connection_name"),
                    ("databaseVersion", "database_version"),
                    ("region", "region"),
                ],
            );
        }
        data.set_id(format!("projects/{project}/instances/{name}"));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use provbench_domain::DomainError;
    use provbench_transport::{CannedResponse, MockTransport, ResponseTable, StatusCode};

    const BASE: &str = "https://sqladmin.googleapis.com/sql/v1beta4/projects/config-test";

    async fn config(mock: &MockTransport) -> ProviderConfig {
        let mut config = ProviderConfig::new("config-test", "us-central1")
            .with_transport(Arc::new(mock.clone()));
        config.access_token = Some("coolbeans".into());
        config.load_and_validate().await.unwrap();
        config
    }

    fn named(name: &str) -> ResourceData {
        let mut data = ResourceData::new();
        data.set("name", name);
        data
    }

    #[tokio::test]
    async fn create_walks_insert_poll_users_read() {
        let mock = MockTransport::golden();
        let mut data = named("test1");
        SqlDatabaseInstance::new()
            .create(&mut data, &config(&mock).await)
            .await
            .unwrap();

        let calls: Vec<String> = mock
            .requests()
            .await
            .iter()
            .map(|r| format!("{} {}", r.method, r.url))
            .collect();
        assert_eq!(
            calls,
            vec![
                format!("POST {BASE}/instances?alt=json&prettyPrint=false"),
                format!("GET {BASE}/operations/?alt=json&prettyPrint=false"),
                format!("GET {BASE}/instances/test1/users?alt=json&prettyPrint=false"),
                format!("GET {BASE}/instances/test1?alt=json&prettyPrint=false"),
            ]
        );
        assert_eq!(data.id(), Some("projects/config-test/instances/test1"));
        assert_eq!(data.get("settings"), Some(&json!({})));

        let insert = &mock.requests().await[0];
        let body: Value = serde_json::from_str(&insert.body).unwrap();
        assert_eq!(body["name"], "test1");
        assert_eq!(body["databaseVersion"], DEFAULT_DATABASE_VERSION);
        assert_eq!(insert.header("content-type"), "application/json");
    }

    #[tokio::test]
    async fn mysql_root_user_is_deleted() {
        let table = ResponseTable::golden()
            .to_builder()
            .on(
                &format!("GET {BASE}/instances/test1/users"),
                CannedResponse::json(json!({ "items": [{ "name": "root", "host": "%" }] })),
            )
            .unwrap()
            .on(
                &format!("DELETE {BASE}/instances/test1/users?name=root&host=%25"),
                CannedResponse::json(json!({ "name": "op-root" })),
            )
            .unwrap()
            .on(
                &format!("GET {BASE}/operations/op-root"),
                CannedResponse::json(json!({ "status": "DONE" })),
            )
            .unwrap()
            .build();
        let mock = MockTransport::new(table);
        let mut data = named("test1");
        data.set("database_version", "MYSQL_8_0");

        SqlDatabaseInstance::new()
            .create(&mut data, &config(&mock).await)
            .await
            .unwrap();

        let reqs = mock.requests().await;
        assert!(reqs.iter().any(|r| r.method == "DELETE" && r.url.contains("name=root")));
    }

    #[tokio::test]
    async fn read_of_missing_instance_clears_id() {
        let table = ResponseTable::builder()
            .on(
                &format!("GET {BASE}/instances/gone"),
                CannedResponse::status(StatusCode::NOT_FOUND),
            )
            .unwrap()
            .build();
        let mock = MockTransport::new(table);
        let mut data = named("gone");
        data.set_id("projects/config-test/instances/gone");

        SqlDatabaseInstance::new()
            .read(&mut data, &config(&mock).await)
            .await
            .unwrap();
        assert_eq!(data.id(), None);
    }

    #[tokio::test]
    async fn denied_create_is_an_error() {
        let mock = MockTransport::new(ResponseTable::empty());
        let err = SqlDatabaseInstance::new()
            .create(&mut named("test1"), &config(&mock).await)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ResourceError::Api(crate::ApiError::Status { code: 403, .. })
        ));
    }

    #[tokio::test]
    async fn name_is_required_before_any_request() {
        let mock = MockTransport::golden();
        let err = SqlDatabaseInstance::new()
            .create(&mut ResourceData::new(), &config(&mock).await)
            .await
            .unwrap_err();
        assert!(matches!(err, ResourceError::Domain(DomainError::MissingField(f)) if f == "name"));
        assert!(mock.log().is_empty().await);
    }
}
