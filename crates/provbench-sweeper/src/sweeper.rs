use std::sync::Arc;

use async_trait::async_trait;
use provbench_config::{ConfigError, ProviderConfig};

use crate::error::SweepError;

/// Resolves the (not yet validated) configuration a sweeper runs with for a region.
pub type ConfigSource = Arc<dyn Fn(&str) -> Result<ProviderConfig, ConfigError> + Send + Sync>;

/// A post-test cleanup routine for one resource kind.
#[async_trait]
pub trait Sweep: Send + Sync + 'static {
    fn name(&self) -> &'static str;

    /// Sweepers that must run before this one.
    fn dependencies(&self) -> &[&'static str] {
        &[]
    }

    /// Delete leftover test resources in `region`. Returns the deleted names.
    async fn sweep(&self, region: &str) -> Result<Vec<String>, SweepError>;
}
