//! Findings export: per-project bulk dump joined with rule metadata

use super::enrich::{merge_rule, RuleCatalog, RuleSource};
use super::flatten::{flatten, Row};
use super::projects::ProjectIterator;
use super::schema::FINDING_COLUMNS;
use super::{write_rows, Exporter};
use crate::error::Result;
use crate::http::endpoints::{into_records, take_array, EXPORT_FINDINGS};
use crate::http::{describe_request, SonarClient};
use crate::models::{ExportConfig, ExportKind, ExportStats, Record};
use crate::sink::RowSink;
use async_trait::async_trait;
use serde_json::Value;
use tracing::info;

/// Exports `export_findings` for every project, each finding enriched with its rule
pub struct FindingsExporter;

/// Fetches the non-paged findings dump for one project
pub async fn fetch_findings(client: &SonarClient, project_key: &str) -> Result<Vec<Record>> {
    let query = [("project", project_key.to_string())];
    let context = describe_request(EXPORT_FINDINGS, &query);
    let mut body = client.get_json(EXPORT_FINDINGS, &query).await?;
    let items = take_array(&mut body, "export_findings", &context)?;
    into_records(items, &context)
}

/// Enriches and flattens one project's findings. Always one row per finding.
pub async fn enrich_findings<R>(findings: Vec<Record>, catalog: &mut RuleCatalog<'_, R>) -> Vec<Row>
where
    R: RuleSource + ?Sized,
{
    let mut rows = Vec::with_capacity(findings.len());
    for finding in findings {
        let reference = finding
            .get("ruleReference")
            .and_then(Value::as_str)
            .map(str::to_owned);
        let lookup = catalog.lookup(reference.as_deref()).await;
        rows.push(flatten(&merge_rule(finding, &lookup), &FINDING_COLUMNS));
    }
    rows
}

#[async_trait]
impl Exporter for FindingsExporter {
    fn kind(&self) -> ExportKind {
        ExportKind::Findings
    }

    fn description(&self) -> &str {
        "Per-project findings joined with rules/show details"
    }

    async fn export(
        &self,
        client: &SonarClient,
        _config: &ExportConfig,
        sink: &mut dyn RowSink,
    ) -> Result<ExportStats> {
        let mut stats = ExportStats::default();
        let mut catalog = RuleCatalog::new(client);
        let mut projects = ProjectIterator::new(client);

        while let Some(page) = projects.next_page().await? {
            for project in page {
                stats.projects += 1;
                let findings = fetch_findings(client, &project.key).await?;
                info!("Project {}: {} findings", project.key, findings.len());

                let rows = enrich_findings(findings, &mut catalog).await;
                write_rows(sink, &rows, &mut stats)?;
            }
        }
        stats.pages += projects.pages_fetched();
        stats.enrichment_misses = catalog.misses();

        Ok(stats)
    }
}
