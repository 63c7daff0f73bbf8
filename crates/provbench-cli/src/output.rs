use provbench_sweeper::SweepReport;

/// Render a sweep report as human-readable text.
pub fn render_report(report: &SweepReport) -> String {
    let mut out = format!(
        "Sweep of {} started {}\n",
        report.region,
        report.started_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    if report.results.is_empty() {
        out.push_str("No sweepers ran.\n");
        return out;
    }
    for result in &report.results {
        match &result.error {
            Some(err) => out.push_str(&format!("! {}: {}\n", result.name, err)),
            None => {
                out.push_str(&format!("  {}: {} deleted\n", result.name, result.deleted.len()));
                for name in &result.deleted {
                    out.push_str(&format!("    - {}\n", name));
                }
            }
        }
    }
    out.push_str(&format!(
        "{} resource(s) deleted, {} sweeper(s) failed.\n",
        report.deleted_count(),
        report.failed().count()
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use provbench_sweeper::SweeperResult;

    #[test]
    fn renders_deleted_and_failed() {
        let mut report = SweepReport::new("us-central1");
        report.results.push(SweeperResult {
            name: "ComputeServiceAttachment".into(),
            deleted: vec!["tf-test-sa".into()],
            error: None,
        });
        report.results.push(SweeperResult {
            name: "Other".into(),
            deleted: vec![],
            error: Some("api error: googleapi: error 403: Forbidden".into()),
        });

        let text = render_report(&report);
        assert!(text.starts_with("Sweep of us-central1 started "));
        assert!(text.contains("  ComputeServiceAttachment: 1 deleted\n    - tf-test-sa\n"));
        assert!(text.contains("! Other: api error: googleapi: error 403: Forbidden\n"));
        assert!(text.ends_with("1 resource(s) deleted, 1 sweeper(s) failed.\n"));
    }

    #[test]
    fn empty_report() {
        let text = render_report(&SweepReport::new("europe-west1"));
        assert!(text.ends_with("No sweepers ran.\n"));
    }
}
