use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct SweeperResult {
    pub name: String,
    pub deleted: Vec<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SweepReport {
    pub region: String,
    pub started_at: DateTime<Utc>,
    pub results: Vec<SweeperResult>,
}

impl SweepReport {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            started_at: Utc::now(),
            results: Vec::new(),
        }
    }

    pub fn failed(&self) -> impl Iterator<Item = &SweeperResult> {
        self.results.iter().filter(|r| r.error.is_some())
    }

    pub fn is_success(&self) -> bool {
        self.failed().next().is_none()
    }

    pub fn deleted_count(&self) -> usize {
        self.results.iter().map(|r| r.deleted.len()).sum()
    }
}
