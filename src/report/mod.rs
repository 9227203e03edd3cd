//! HTML quota report.
//!
//! Collects the live quota of every project and namespace and renders it
//! as a single self-contained HTML page.

mod collect;
mod html;

use std::path::Path;

use chrono::Utc;
use tracing::info;

use crate::error::Result;
use crate::rancher::QuotaBackend;

pub use collect::{ClusterQuotaData, ProjectQuotaData, collect_quota_data};
pub use html::{escape_html, render_html};

/// Default report title.
pub const DEFAULT_TITLE: &str = "Rancher Quota Overview";

/// Collects quota data and writes the HTML report to `output`.
///
/// # Errors
///
/// Returns an error if the clusters cannot be read or the file cannot be
/// written.
pub async fn generate_report<B: QuotaBackend + ?Sized>(
    backend: &B,
    rancher_url: &str,
    output: &Path,
    cluster_ids: &[String],
    title: &str,
) -> Result<()> {
    let clusters = collect_quota_data(backend, cluster_ids).await?;
    let generated_at = Utc::now().format("%Y-%m-%d %H:%M UTC").to_string();
    let html = render_html(title, rancher_url, &generated_at, &clusters);

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(output, html)?;
    info!("Report written to {}", output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quota::QuotaValue;
    use crate::rancher::memory::InMemoryBackend;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_generate_report_file() {
        let backend = InMemoryBackend::new()
            .with_cluster("c-1", "prod")
            .with_project("c-1:p-a", "team-a", QuotaValue::new().with_cpu_limit("2"))
            .with_namespace("c-1:p-a", "web", QuotaValue::new().with_memory_limit("1Gi"));

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out").join("quotas.html");
        generate_report(&backend, "https://rancher.example.com", &path, &[], DEFAULT_TITLE)
            .await
            .unwrap();

        let html = std::fs::read_to_string(&path).unwrap();
        assert!(html.contains("<title>Rancher Quota Overview</title>"));
        assert!(html.contains("team-a"));
        assert!(html.contains("<td>1Gi</td>"));
        assert!(html.contains(" UTC</div>"));
    }
}
