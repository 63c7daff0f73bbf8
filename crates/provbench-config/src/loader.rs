use std::path::Path;

use tracing::debug;

use crate::config::{BasePaths, ProviderConfig};
use crate::error::ConfigError;
use crate::raw::RawProviderConfig;

/// Read a YAML provider config:
///
/// ```yaml
/// project: config-test
/// billing_project: billing-project
/// user_project_override: true
/// region: us-central1
/// base_paths:
///   sql_admin: http://localhost:8080/sql/v1beta4/
/// ```
///
/// The returned config still needs [`ProviderConfig::load_and_validate`].
pub fn load_config_file(path: &Path) -> Result<ProviderConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    debug!("Loading provider config from {}", path.display());
    parse_config(&content, &path.display().to_string())
}

/// Parse YAML config text. `origin` names the source in error messages.
pub fn parse_config(content: &str, origin: &str) -> Result<ProviderConfig, ConfigError> {
    let raw: RawProviderConfig =
        serde_yaml::from_str(content).map_err(|e| ConfigError::YamlParse {
            path: origin.to_string(),
            source: e,
        })?;
    Ok(convert(raw))
}

fn convert(raw: RawProviderConfig) -> ProviderConfig {
    let defaults = BasePaths::default();
    let mut config = ProviderConfig::new(
        raw.project.unwrap_or_default(),
        raw.region.unwrap_or_default(),
    );
    config.billing_project = raw.billing_project;
    config.zone = raw.zone;
    config.access_token = raw.access_token;
    config.user_project_override = raw.user_project_override;
    if let Some(ua) = raw.user_agent {
        config.user_agent = ua;
    }
    config.base_paths = BasePaths {
        container: raw.base_paths.container.unwrap_or(defaults.container),
        sql_admin: raw.base_paths.sql_admin.unwrap_or(defaults.sql_admin),
        compute: raw.base_paths.compute.unwrap_or(defaults.compute),
        userinfo: raw.base_paths.userinfo.unwrap_or(defaults.userinfo),
    };
    config
}
