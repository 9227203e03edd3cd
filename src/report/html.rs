//! HTML rendering of collected quota data.

use std::fmt::Write;

use crate::quota::{QuotaField, QuotaValue};

use super::collect::ClusterQuotaData;

/// Placeholder for an unset quota field.
const EMPTY_CELL: &str = "—";

const STYLE: &str = r"
        :root {
            --bg: #f5f5f5;
            --card: #fff;
            --border: #ddd;
            --text: #333;
            --muted: #666;
            --accent: #2563eb;
        }
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            margin: 0;
            padding: 2rem;
            background: var(--bg);
            color: var(--text);
            line-height: 1.5;
        }
        .header { margin-bottom: 2rem; padding-bottom: 1rem; border-bottom: 1px solid var(--border); }
        .header h1 { margin: 0 0 0.5rem 0; }
        .meta { color: var(--muted); font-size: 0.9rem; }
        section.cluster {
            background: var(--card);
            border-radius: 8px;
            padding: 1.5rem;
            margin-bottom: 2rem;
            box-shadow: 0 1px 3px rgba(0,0,0,0.1);
        }
        .project { margin-top: 1.5rem; padding-top: 1.5rem; border-top: 1px solid var(--border); }
        .project:first-of-type { margin-top: 0; padding-top: 0; border-top: none; }
        .namespace { margin: 1rem 0 1rem 2rem; padding: 1rem; background: var(--bg); border-radius: 4px; }
        h2 { margin-top: 0; color: var(--accent); }
        h5 { margin: 0 0 0.5rem 0; font-size: 0.9rem; color: var(--muted); }
        .cluster-id, .project-id { font-weight: normal; color: var(--muted); font-size: 0.85em; }
        table { width: 100%; border-collapse: collapse; font-size: 0.9rem; }
        th, td { padding: 0.5rem 0.75rem; text-align: left; border-bottom: 1px solid var(--border); }
        th { background: var(--bg); font-weight: 600; }
";

/// Escapes text for inclusion in HTML content or attribute values.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

fn quota_table(out: &mut String, quota: &QuotaValue) {
    out.push_str("<table>\n<thead><tr>");
    for field in QuotaField::ALL {
        let _ = write!(out, "<th>{}</th>", field.label());
    }
    out.push_str("</tr></thead>\n<tbody>\n");

    if quota.is_empty() {
        out.push_str("<tr><td colspan=\"4\"><em>No quota set</em></td></tr>\n");
    } else {
        out.push_str("<tr>");
        for field in QuotaField::ALL {
            let value = quota.get(field).map_or_else(|| EMPTY_CELL.to_string(), escape_html);
            let _ = write!(out, "<td>{value}</td>");
        }
        out.push_str("</tr>\n");
    }
    out.push_str("</tbody>\n</table>\n");
}

fn cluster_section(out: &mut String, cluster: &ClusterQuotaData) {
    let _ = writeln!(
        out,
        "<section class=\"cluster\">\n<h2>{} <span class=\"cluster-id\">({})</span></h2>",
        escape_html(&cluster.cluster_name),
        escape_html(&cluster.cluster_id)
    );

    if cluster.projects.is_empty() {
        out.push_str("<p><em>No projects</em></p>\n");
    }

    for data in &cluster.projects {
        let project = &data.project;
        let _ = writeln!(
            out,
            "<div class=\"project\">\n<h3>{} <span class=\"project-id\">({})</span></h3>\n<h4>Project quota</h4>",
            escape_html(&project.name),
            escape_html(&project.id)
        );
        quota_table(out, &project.quota);

        let _ = writeln!(out, "<h4>Namespaces ({})</h4>", data.namespaces.len());
        if data.namespaces.is_empty() {
            out.push_str("<p><em>No namespaces in project</em></p>\n");
        }
        for namespace in &data.namespaces {
            let _ = writeln!(
                out,
                "<div class=\"namespace\">\n<h5>{}</h5>",
                escape_html(&namespace.name)
            );
            quota_table(out, &namespace.quota);
            out.push_str("</div>\n");
        }
        out.push_str("</div>\n");
    }

    out.push_str("</section>\n");
}

/// Renders a self-contained HTML document.
#[must_use]
pub fn render_html(
    title: &str,
    rancher_url: &str,
    generated_at: &str,
    clusters: &[ClusterQuotaData],
) -> String {
    let title = escape_html(title);
    let mut out = String::new();

    let _ = write!(
        out,
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"UTF-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n\
         <title>{title}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n\
         <div class=\"header\">\n<h1>{title}</h1>\n\
         <div class=\"meta\">Rancher: {} · Generated: {}</div>\n</div>\n",
        escape_html(rancher_url),
        escape_html(generated_at)
    );

    for cluster in clusters {
        cluster_section(&mut out, cluster);
    }

    out.push_str("</body>\n</html>\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rancher::{Namespace, Project};
    use crate::report::ProjectQuotaData;

    fn sample() -> Vec<ClusterQuotaData> {
        vec![ClusterQuotaData {
            cluster_id: String::from("c-1"),
            cluster_name: String::from("prod <eu>"),
            projects: vec![
                ProjectQuotaData {
                    project: Project {
                        id: String::from("c-1:p-a"),
                        name: String::from("team-a"),
                        cluster_id: String::from("c-1"),
                        quota: QuotaValue::new().with_cpu_limit("2000m"),
                    },
                    namespaces: vec![Namespace {
                        id: String::from("c-1:web"),
                        name: String::from("web"),
                        cluster_id: String::from("c-1"),
                        project_id: Some(String::from("c-1:p-a")),
                        quota: QuotaValue::new(),
                    }],
                },
                ProjectQuotaData {
                    project: Project {
                        id: String::from("c-1:p-b"),
                        name: String::from("team-b"),
                        cluster_id: String::from("c-1"),
                        quota: QuotaValue::new(),
                    },
                    namespaces: Vec::new(),
                },
            ],
        }]
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#x27;Jerry&#x27;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_render_document() {
        let html = render_html(
            "Quotas & Limits",
            "https://rancher.example.com",
            "2026-01-02 03:04 UTC",
            &sample(),
        );

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Quotas &amp; Limits</title>"));
        assert!(html.contains("Rancher: https://rancher.example.com · Generated: 2026-01-02 03:04 UTC"));
        assert!(html.contains("prod &lt;eu&gt;"));
        assert!(html.contains("<td>2000m</td><td>—</td><td>—</td><td>—</td>"));
        assert!(html.contains("<h4>Namespaces (1)</h4>"));
        assert!(html.contains("No namespaces in project"));
        assert_eq!(html.matches("No quota set").count(), 2);
        assert!(html.trim_end().ends_with("</html>"));
    }

    #[test]
    fn test_render_cluster_without_projects() {
        let clusters = vec![ClusterQuotaData {
            cluster_id: String::from("c-9"),
            cluster_name: String::from("empty"),
            projects: Vec::new(),
        }];
        let html = render_html("Report", "https://r", "now", &clusters);
        assert!(html.contains("No projects"));
    }
}
