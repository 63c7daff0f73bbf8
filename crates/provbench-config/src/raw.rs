use serde::{Deserialize, Serialize};

/// Raw YAML representation of a provider config file.
#[derive(Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RawProviderConfig {
    pub project: Option<String>,
    pub billing_project: Option<String>,
    pub region: Option<String>,
    pub zone: Option<String>,
    pub access_token: Option<String>,
    #[serde(default)]
    pub user_project_override: bool,
    pub user_agent: Option<String>,
    #[serde(default)]
    pub base_paths: RawBasePaths,
}

/// Per-service endpoint overrides; absent entries keep the public defaults.
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RawBasePaths {
    pub container: Option<String>,
    pub sql_admin: Option<String>,
    pub compute: Option<String>,
    pub userinfo: Option<String>,
}
