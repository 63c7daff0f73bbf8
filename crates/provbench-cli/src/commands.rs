use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use provbench_config::{load_config_file, shared_config_for_region};
use provbench_provider::ApiClient;
use provbench_sweeper::SweeperRegistry;
use tracing::{info, warn};

use crate::cli::ReportOutput;
use crate::output;

// ── Sweep ─────────────────────────────────────────────────────────────────────

pub async fn sweep(region: String, sweepers: Vec<String>, format: ReportOutput) -> Result<()> {
    run_sweep(&SweeperRegistry::builtin()?, &region, &sweepers, format).await
}

async fn run_sweep(
    registry: &SweeperRegistry,
    region: &str,
    sweepers: &[String],
    format: ReportOutput,
) -> Result<()> {
    info!(%region, selected = ?sweepers, "Starting sweep");
    let report = registry
        .run_sweepers(region, sweepers)
        .await
        .context("Failed to plan sweep")?;

    match format {
        ReportOutput::Text => print!("{}", output::render_report(&report)),
        ReportOutput::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    let failed = report.failed().count();
    info!(
        %region,
        deleted = report.deleted_count(),
        failed,
        "Sweep finished"
    );
    if failed > 0 {
        warn!(%region, failed, "Some sweepers failed");
        bail!("{failed} sweeper(s) failed in {region}");
    }
    Ok(())
}

// ── Sweepers ──────────────────────────────────────────────────────────────────

pub fn list_sweepers() -> Result<()> {
    let registry = SweeperRegistry::builtin()?;
    for name in registry.execution_order(&[])? {
        println!("{name}");
    }
    Ok(())
}

// ── Whoami ────────────────────────────────────────────────────────────────────

pub async fn whoami(config_path: Option<PathBuf>, region: String) -> Result<()> {
    let mut config = match &config_path {
        Some(path) => load_config_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => shared_config_for_region(&region)
            .context("Failed to build config from the environment")?,
    };
    config.load_and_validate().await?;
    info!(project = %config.project, "Looking up credentials' account");

    let email = ApiClient::new(&config)?
        .user_email()
        .await
        .context("Failed to look up the credentials' account")?;

    println!("account:      {email}");
    println!("project:      {}", config.project);
    println!(
        "user project: {}",
        config.user_project(None).unwrap_or("(none)")
    );
    Ok(())
}
