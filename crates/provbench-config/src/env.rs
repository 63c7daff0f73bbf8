use tracing::debug;

use crate::config::{ProviderConfig, PROJECT_ENV_VARS};
use crate::error::ConfigError;

const ADC_ENV_VARS: &[&str] = &["GOOGLE_APPLICATION_CREDENTIALS", "GOOGLE_USE_DEFAULT_CREDENTIALS"];

/// Build the configuration sweepers run with, from the process environment.
pub fn shared_config_for_region(region: &str) -> Result<ProviderConfig, ConfigError> {
    shared_config_from(|var| std::env::var(var).ok(), region)
}

/// Like [`shared_config_for_region`], reading variables through `lookup`.
pub fn shared_config_from<F>(lookup: F, region: &str) -> Result<ProviderConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let first_set = |vars: &[&str]| {
        vars.iter()
            .copied()
            .find_map(|v| lookup(v).filter(|s| !s.trim().is_empty()))
    };

    let project = first_set(PROJECT_ENV_VARS).ok_or(ConfigError::MissingProject(PROJECT_ENV_VARS))?;

    let access_token = lookup("GOOGLE_OAUTH_ACCESS_TOKEN").filter(|t| !t.is_empty());
    if access_token.is_none() && first_set(ADC_ENV_VARS).is_none() {
        return Err(ConfigError::MissingCredentials(format!(
            "set GOOGLE_OAUTH_ACCESS_TOKEN or one of {:?}",
            ADC_ENV_VARS
        )));
    }

    let user_project_override = match lookup("GOOGLE_USER_PROJECT_OVERRIDE") {
        None => false,
        Some(v) => parse_bool(&v).ok_or_else(|| ConfigError::InvalidEnv {
            var: "GOOGLE_USER_PROJECT_OVERRIDE".into(),
            message: format!("expected true/false, got {v:?}"),
        })?,
    };

    debug!(%project, region, "building shared config from environment");
    let mut config = ProviderConfig::new(project, region);
    config.access_token = access_token;
    config.billing_project = lookup("GOOGLE_BILLING_PROJECT").filter(|s| !s.is_empty());
    config.user_project_override = user_project_override;
    Ok(config)
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" | "" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn project_falls_through_env_vars() {
        let c = shared_config_from(
            env(&[
                ("GOOGLE_PROJECT", ""),
                ("GCLOUD_PROJECT", "sweep-project"),
                ("GOOGLE_OAUTH_ACCESS_TOKEN", "tok"),
            ]),
            "us-east1",
        )
        .unwrap();
        assert_eq!(c.project, "sweep-project");
        assert_eq!(c.region, "us-east1");
        assert_eq!(c.access_token.as_deref(), Some("tok"));
        assert!(!c.user_project_override);
    }

    #[test]
    fn missing_project_is_an_error() {
        let err = shared_config_from(env(&[("GOOGLE_OAUTH_ACCESS_TOKEN", "tok")]), "us-east1")
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingProject(_)));
    }

    #[test]
    fn missing_credentials_is_an_error() {
        let err = shared_config_from(env(&[("GOOGLE_PROJECT", "p")]), "us-east1").unwrap_err();
        assert!(matches!(err, ConfigError::MissingCredentials(_)));

        let ok = shared_config_from(
            env(&[("GOOGLE_PROJECT", "p"), ("GOOGLE_USE_DEFAULT_CREDENTIALS", "true")]),
            "us-east1",
        )
        .unwrap();
        assert!(ok.access_token.is_none());
    }

    #[test]
    fn billing_and_override() {
        let c = shared_config_from(
            env(&[
                ("GOOGLE_PROJECT", "p"),
                ("GOOGLE_OAUTH_ACCESS_TOKEN", "tok"),
                ("GOOGLE_BILLING_PROJECT", "billing-project"),
                ("GOOGLE_USER_PROJECT_OVERRIDE", "TRUE"),
            ]),
            "us-central1",
        )
        .unwrap();
        assert_eq!(c.billing_project.as_deref(), Some("billing-project"));
        assert!(c.user_project_override);

        let err = shared_config_from(
            env(&[
                ("GOOGLE_PROJECT", "p"),
                ("GOOGLE_OAUTH_ACCESS_TOKEN", "tok"),
                ("GOOGLE_USER_PROJECT_OVERRIDE", "maybe"),
            ]),
            "us-central1",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { .. }));
    }
}
