use async_trait::async_trait;
use provbench_config::ProviderConfig;
use provbench_domain::ResourceData;

use crate::error::ResourceError;

/// A provider resource type, seen from the outside as create and read calls
/// over a mutable [`ResourceData`].
///
/// Implementations read their inputs from `data`, talk to the API through the
/// config's transport, and write the id and computed attributes back.
#[async_trait]
pub trait Resource: Send + Sync + 'static {
    /// Registry name, e.g. `google_container_cluster`.
    fn resource_type(&self) -> &'static str;

    async fn create(
        &self,
        data: &mut ResourceData,
        config: &ProviderConfig,
    ) -> Result<(), ResourceError>;

    /// Refresh `data` from the API. A resource that no longer exists is not an
    /// error; its id is cleared instead.
    async fn read(
        &self,
        data: &mut ResourceData,
        config: &ProviderConfig,
    ) -> Result<(), ResourceError>;
}

/// Project a resource lives in: its own `project` field, else the provider's.
pub(crate) fn resource_project<'a>(data: &'a ResourceData, config: &'a ProviderConfig) -> &'a str {
    data.get_str("project").unwrap_or(&config.project)
}
