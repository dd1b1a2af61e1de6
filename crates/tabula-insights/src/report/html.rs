//! HTML rendering of a [`Report`].
//!
//! Rendering is pure string building over the already-synthesized report
//! value. It never touches the clock or the filesystem and it never
//! fails: sections whose stages did not complete render placeholders.
//! Every dynamic value is escaped before interpolation.

use super::model::Report;
use crate::pipeline::StageStatus;

const REPORT_CSS: &str = r#"
* { margin: 0; padding: 0; box-sizing: border-box; }
body {
    font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif;
    line-height: 1.6;
    color: #333;
    background: linear-gradient(135deg, #667eea 0%, #764ba2 100%);
    min-height: 100vh;
    padding: 20px;
}
.container {
    max-width: 1200px;
    margin: 0 auto;
    background: white;
    border-radius: 15px;
    box-shadow: 0 20px 40px rgba(0,0,0,0.1);
    overflow: hidden;
}
.header {
    background: linear-gradient(135deg, #4285f4 0%, #34a853 100%);
    color: white;
    padding: 30px;
    text-align: center;
}
.header h1 { font-size: 2.2em; margin-bottom: 8px; }
.header .subtitle { opacity: 0.9; }
.header .timestamp { opacity: 0.8; font-size: 0.9em; margin-top: 8px; }
.content { padding: 30px; }
.section { margin-bottom: 35px; }
.section h2 {
    color: #4285f4;
    border-bottom: 2px solid #e9ecef;
    padding-bottom: 8px;
    margin-bottom: 18px;
}
.section h3 { margin: 18px 0 10px; }
.stats-grid {
    display: grid;
    grid-template-columns: repeat(auto-fit, minmax(160px, 1fr));
    gap: 15px;
    margin-bottom: 18px;
}
.stat-card {
    background: #f8f9fa;
    border: 1px solid #e9ecef;
    border-radius: 10px;
    padding: 18px;
    text-align: center;
}
.stat-value { font-size: 1.8em; font-weight: bold; color: #4285f4; }
.stat-label { color: #6c757d; font-size: 0.9em; }
.highlight {
    background: #e8f0fe;
    border-left: 4px solid #4285f4;
    border-radius: 5px;
    padding: 12px 15px;
    margin-top: 10px;
}
.summary-box {
    background: #f8f9fa;
    border-radius: 10px;
    padding: 20px;
}
.summary-text p { margin-bottom: 10px; }
.table-container { overflow-x: auto; margin-bottom: 15px; }
table { width: 100%; border-collapse: collapse; }
th, td { padding: 10px 12px; border-bottom: 1px solid #e9ecef; text-align: left; }
th { background: #f8f9fa; }
.status-badge {
    display: inline-block;
    padding: 3px 10px;
    border-radius: 12px;
    font-size: 0.85em;
    font-weight: bold;
    text-transform: capitalize;
}
.status-completed { background: #d4edda; color: #155724; }
.status-failed { background: #f8d7da; color: #721c24; }
.status-skipped { background: #fff3cd; color: #856404; }
.json-container {
    background: #272822;
    color: #f8f8f2;
    border-radius: 8px;
    padding: 15px;
    overflow-x: auto;
}
details summary {
    cursor: pointer;
    padding: 10px;
    background: #e9ecef;
    border-radius: 5px;
    margin-bottom: 15px;
}
.footer {
    background: #f8f9fa;
    border-top: 1px solid #e9ecef;
    padding: 20px 30px;
    text-align: center;
    color: #6c757d;
    font-size: 0.9em;
}
"#;

/// Render a report to a complete standalone HTML document.
pub fn render(report: &Report) -> String {
    let mut html = String::with_capacity(16 * 1024);

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"UTF-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n");
    html.push_str(&format!(
        "<title>Tabula Insight Report - {}</title>\n",
        escape(&report.source_filename)
    ));
    html.push_str("<style>");
    html.push_str(REPORT_CSS);
    html.push_str("</style>\n</head>\n<body>\n<div class=\"container\">\n");

    html.push_str(&render_header(report));
    html.push_str("<div class=\"content\">\n");
    html.push_str(&render_summary_section(report));
    html.push_str(&render_overview_section(report));
    html.push_str(&render_pipeline_section(report));
    html.push_str(&render_quality_section(report));
    html.push_str(&render_statistics_section(report));
    html.push_str(&render_technical_section(report));
    html.push_str("</div>\n");
    html.push_str(&render_footer(report));

    html.push_str("</div>\n</body>\n</html>\n");
    html
}

fn render_header(report: &Report) -> String {
    format!(
        "<div class=\"header\">\n\
         <h1>&#128202; Tabula Insight Report</h1>\n\
         <div class=\"subtitle\">{}</div>\n\
         <div class=\"timestamp\">Generated on {}</div>\n\
         </div>\n",
        escape(&report.source_filename),
        escape(&report.created_at)
    )
}

fn render_summary_section(report: &Report) -> String {
    format!(
        "<div class=\"section\">\n<h2>Executive Summary</h2>\n\
         <div class=\"summary-box\">\n<h3>Key Insights</h3>\n\
         <div class=\"summary-text\">{}</div>\n</div>\n</div>\n",
        format_summary(report.summary_text.as_deref())
    )
}

fn render_overview_section(report: &Report) -> String {
    let (rows, columns, fields, joined_names) = match &report.dataset {
        Some(d) => (
            d.rows.to_string(),
            d.columns.to_string(),
            d.column_names.len().to_string(),
            d.column_names
                .iter()
                .map(|n| escape(n))
                .collect::<Vec<_>>()
                .join(", "),
        ),
        None => (
            "N/A".to_string(),
            "N/A".to_string(),
            "0".to_string(),
            String::new(),
        ),
    };

    format!(
        "<div class=\"section\">\n<h2>Data Overview</h2>\n\
         <div class=\"stats-grid\">\n\
         <div class=\"stat-card\"><div class=\"stat-value\">{rows}</div><div class=\"stat-label\">Total Rows</div></div>\n\
         <div class=\"stat-card\"><div class=\"stat-value\">{columns}</div><div class=\"stat-label\">Total Columns</div></div>\n\
         <div class=\"stat-card\"><div class=\"stat-value\">{fields}</div><div class=\"stat-label\">Data Fields</div></div>\n\
         <div class=\"stat-card\"><div class=\"stat-value\">{completed}</div><div class=\"stat-label\">Completed Steps</div></div>\n\
         </div>\n\
         <div class=\"highlight\"><strong>File:</strong> {file}<br>\n\
         <strong>Columns:</strong> {joined_names}</div>\n\
         </div>\n",
        completed = report.completed_steps(),
        file = escape(&report.source_filename),
    )
}

fn render_pipeline_section(report: &Report) -> String {
    let mut rows = String::new();
    for (index, result) in report.stage_results.iter().enumerate() {
        let status_class = match result.status {
            StageStatus::Completed => "status-completed",
            StageStatus::Failed => "status-failed",
            StageStatus::Skipped => "status-skipped",
        };
        let key_output = result
            .output
            .as_deref()
            .or(result.error_message.as_deref())
            .unwrap_or("No output");
        rows.push_str(&format!(
            "<tr><td><strong>{step}</strong></td><td>{agent}</td><td>{description}</td>\
             <td><span class=\"status-badge {status_class}\">{status}</span></td>\
             <td>{key_output}</td></tr>\n",
            step = index + 1,
            agent = escape(&result.name),
            description = escape(&result.description),
            status = result.status,
            key_output = escape(key_output),
        ));
    }

    format!(
        "<div class=\"section\">\n<h2>Processing Pipeline</h2>\n\
         <div class=\"table-container\">\n<table>\n<thead><tr>\
         <th>Step</th><th>Agent</th><th>Description</th><th>Status</th><th>Key Output</th>\
         </tr></thead>\n<tbody>\n{rows}</tbody>\n</table>\n</div>\n</div>\n"
    )
}

fn render_quality_section(report: &Report) -> String {
    let Some(null_summary) = &report.null_summary else {
        return "<div class=\"section\">\n<h2>Data Quality Analysis</h2>\n\
                <p>No cleaning analysis available.</p>\n</div>\n"
            .to_string();
    };

    let mut table = String::from(
        "<table><thead><tr><th>Column</th><th>Missing Values</th></tr></thead><tbody>",
    );
    for column in report.ordered_columns(null_summary) {
        table.push_str(&format!(
            "<tr><td>{}</td><td>{}</td></tr>",
            escape(column),
            null_summary[column]
        ));
    }
    table.push_str("</tbody></table>");

    let suggestions_html = match &report.cleaning_suggestions {
        Some(suggestions) if !suggestions.is_empty() => {
            let mut list = String::from("<h4>Cleaning Suggestions:</h4><ul>");
            for suggestion in suggestions {
                list.push_str(&format!("<li>{}</li>", escape(suggestion)));
            }
            list.push_str("</ul>");
            list
        }
        _ => "<div class=\"highlight\"><strong>Great!</strong> No data quality issues found.</div>"
            .to_string(),
    };

    format!(
        "<div class=\"section\">\n<h2>Data Quality Analysis</h2>\n\
         <h3>Missing Values Analysis</h3>\n\
         <div class=\"table-container\">{table}</div>\n\
         {suggestions_html}\n</div>\n"
    )
}

fn render_statistics_section(report: &Report) -> String {
    let body = match &report.column_stats {
        None => "<p>No statistical analysis available.</p>".to_string(),
        Some(stats) if stats.is_empty() => "<p>No numeric columns to analyze.</p>".to_string(),
        Some(stats) => {
            let mut out = String::new();
            for column in report.ordered_columns(stats) {
                let s = stats[column];
                out.push_str(&format!("<h3>{}</h3>\n", escape(column)));
                out.push_str(
                    "<div class=\"table-container\"><table>\
                     <thead><tr><th>Metric</th><th>Value</th></tr></thead><tbody>",
                );
                out.push_str(&format!("<tr><td>Count</td><td>{}</td></tr>", s.count));
                out.push_str(&format!(
                    "<tr><td>Mean</td><td>{}</td></tr>",
                    format_stat(s.mean)
                ));
                out.push_str(&format!(
                    "<tr><td>Sum</td><td>{}</td></tr>",
                    format_stat(s.sum)
                ));
                out.push_str(&format!(
                    "<tr><td>Min</td><td>{}</td></tr>",
                    format_stat(s.min)
                ));
                out.push_str(&format!(
                    "<tr><td>Max</td><td>{}</td></tr>",
                    format_stat(s.max)
                ));
                out.push_str("</tbody></table></div>\n");
            }
            out
        }
    };

    format!("<div class=\"section\">\n<h2>Statistical Analysis</h2>\n{body}</div>\n")
}

fn render_technical_section(report: &Report) -> String {
    let json =
        serde_json::to_string_pretty(&report.insights()).unwrap_or_else(|_| "{}".to_string());
    format!(
        "<div class=\"section\">\n<h2>Technical Details</h2>\n\
         <details>\n<summary><strong>View Raw Analysis Data (JSON)</strong></summary>\n\
         <div class=\"json-container\"><pre>{}</pre></div>\n</details>\n</div>\n",
        escape(&json)
    )
}

fn render_footer(report: &Report) -> String {
    format!(
        "<div class=\"footer\">\n\
         <p><strong>Tabula</strong> - CSV Insight Pipeline</p>\n\
         <p>Report ID: {}</p>\n\
         </div>\n",
        escape(&report.report_id)
    )
}

/// Escape the HTML metacharacters in `text`.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Summary text escaped first, then paragraph-formatted: blank lines
/// split paragraphs, single newlines become line breaks.
fn format_summary(summary: Option<&str>) -> String {
    let Some(text) = summary else {
        return "<p>No summary available.</p>".to_string();
    };
    if text.trim().is_empty() {
        return "<p>No summary available.</p>".to_string();
    }

    let escaped = escape(text);
    let paragraphs: Vec<String> = escaped
        .split("\n\n")
        .map(|p| p.replace('\n', "<br>"))
        .collect();
    format!("<p>{}</p>", paragraphs.join("</p><p>"))
}

fn format_stat(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.2}"),
        None => "NaN".to_string(),
    }
}
