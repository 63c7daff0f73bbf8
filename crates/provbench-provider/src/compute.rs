use provbench_config::ProviderConfig;
use serde::Deserialize;
use tracing::{debug, info};

use crate::client::ApiClient;
use crate::error::ApiError;

/// The fields of a Compute service attachment the sweeper looks at.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceAttachment {
    pub name: String,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub self_link: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServiceAttachmentList {
    #[serde(default)]
    items: Vec<ServiceAttachment>,
    #[serde(default)]
    next_page_token: Option<String>,
}

/// Compute Engine client for the bulk operations sweepers need.
#[derive(Debug, Clone)]
pub struct ComputeClient {
    api: ApiClient,
}

impl ComputeClient {
    pub fn new(config: &ProviderConfig) -> Result<Self, ApiError> {
        Ok(Self { api: ApiClient::new(config)? })
    }

    fn user_project(&self) -> Option<&str> {
        self.api.config().user_project(None)
    }

    fn regional(&self, project: &str, region: &str, rest: &str) -> Result<provbench_transport::Url, ApiError> {
        self.api.gcp_url(
            &self.api.config().base_paths.compute,
            &format!("projects/{project}/regions/{region}/{rest}"),
        )
    }

    /// Every service attachment in the region, across all pages.
    pub async fn list_service_attachments(
        &self,
        project: &str,
        region: &str,
    ) -> Result<Vec<ServiceAttachment>, ApiError> {
        let mut out = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut url = self.regional(project, region, "serviceAttachments")?;
            if let Some(token) = &page_token {
                url.query_pairs_mut().append_pair("pageToken", token);
            }
            let page: ServiceAttachmentList =
                serde_json::from_value(self.api.get(url, self.user_project()).await?)?;
            debug!(count = page.items.len(), "listed service attachments page");
            out.extend(page.items);

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) if page_token.as_deref() == Some(token.as_str()) => {
                    return Err(ApiError::RepeatedPageToken(token));
                }
                Some(token) => page_token = Some(token),
                None => break,
            }
        }
        Ok(out)
    }

    /// Delete one attachment and wait for the region operation to finish.
    pub async fn delete_service_attachment(
        &self,
        project: &str,
        region: &str,
        name: &str,
    ) -> Result<(), ApiError> {
        let url = self.regional(project, region, &format!("serviceAttachments/{name}"))?;
        let op = self.api.delete(url, self.user_project()).await?;
        let op_name = op["name"].as_str().unwrap_or("");
        self.api
            .wait_for_operation(
                self.regional(project, region, &format!("operations/{op_name}"))?,
                self.user_project(),
            )
            .await?;
        Ok(())
    }

    /// Delete every service attachment in the region that `is_deletable`
    /// accepts. Returns the deleted names; the first failure is returned as is.
    pub async fn delete_all_service_attachments<F>(
        &self,
        project: &str,
        region: &str,
        is_deletable: F,
    ) -> Result<Vec<String>, ApiError>
    where
        F: Fn(&ServiceAttachment) -> bool + Send + Sync,
    {
        let mut deleted = Vec::new();
        for attachment in self.list_service_attachments(project, region).await? {
            if !is_deletable(&attachment) {
                debug!(name = %attachment.name, "skipping service attachment");
                continue;
            }
            info!(%project, %region, name = %attachment.name, "Deleting service attachment");
            self.delete_service_attachment(project, region, &attachment.name)
                .await?;
            deleted.push(attachment.name);
        }
        Ok(deleted)
    }
}
