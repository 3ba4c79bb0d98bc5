//! CSV export of a category's classifier breakdown.

use crate::catalog::Category;
use crate::models::CategoryDetails;
use crate::sle::SleService;
use crate::upstream::UpstreamError;

/// Rendered CSV document plus the download filename for it.
#[derive(Debug, Clone)]
pub struct CsvExport {
    pub filename: String,
    pub content: String,
}

const HEADER: &str = "Metric,SLE Value (%),Classifier,Contribution (%),Impact Count";

impl SleService {
    /// Category detail flattened into CSV, one row per metric/classifier
    /// pair. The site name goes into the filename; if it cannot be fetched
    /// the site ID is used instead.
    pub async fn export_category_csv(
        &self,
        site_id: &str,
        category: Category,
        duration_token: &str,
    ) -> Result<CsvExport, UpstreamError> {
        let details = self
            .category_details(site_id, category, duration_token)
            .await?;
        let site_name = match self.upstream().site_info(site_id).await {
            Ok(site) => site.name,
            Err(error) => {
                tracing::warn!(site_id, %error, "site lookup for export failed");
                site_id.to_string()
            }
        };
        Ok(CsvExport {
            filename: filename(category, &site_name, duration_token),
            content: render(&details),
        })
    }
}

fn filename(category: Category, site_name: &str, duration: &str) -> String {
    format!(
        "sle_{}_{}_{}.csv",
        category,
        sanitize(site_name),
        sanitize(duration)
    )
}

/// Keep filenames shell- and filesystem-safe.
fn sanitize(part: &str) -> String {
    part.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn render(details: &CategoryDetails) -> String {
    let mut out = String::from(HEADER);
    out.push('\n');

    for (metric, detail) in &details.metrics {
        let sle_value = detail
            .sle_value
            .map(|v| format!("{v:.1}"))
            .unwrap_or_else(|| "N/A".to_string());

        if detail.classifiers.is_empty() {
            out.push_str(&format!("{},{},,,\n", escape(metric), sle_value));
            continue;
        }
        for classifier in &detail.classifiers {
            let impact_count = classifier
                .impact
                .impact_count()
                .unwrap_or(classifier.degraded_sum as i64);
            out.push_str(&format!(
                "{},{},{},{:.1},{}\n",
                escape(metric),
                sle_value,
                escape(&classifier.name),
                classifier.percentage,
                impact_count
            ));
        }
    }
    out
}

fn escape(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
