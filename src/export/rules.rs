//! Rule metadata export

use super::enrich::with_cwe_codes;
use super::paginator::{ApiPageSource, Paginator};
use super::schema::RULE_COLUMNS;
use super::{drain_pages, Exporter};
use crate::error::Result;
use crate::http::endpoints::RULES_SEARCH;
use crate::http::SonarClient;
use crate::models::{ExportConfig, ExportKind, ExportStats};
use crate::sink::RowSink;
use async_trait::async_trait;
use tracing::info;

/// Exports every rule from `rules/search`, with CWE codes pulled from the description
pub struct RulesExporter;

#[async_trait]
impl Exporter for RulesExporter {
    fn kind(&self) -> ExportKind {
        ExportKind::Rules
    }

    fn description(&self) -> &str {
        "Rule metadata with CWE references from rules/search"
    }

    async fn export(
        &self,
        client: &SonarClient,
        config: &ExportConfig,
        sink: &mut dyn RowSink,
    ) -> Result<ExportStats> {
        let mut source = ApiPageSource::new(client, RULES_SEARCH);
        if config.rules_ascending {
            source = source.with_param("asc", "true");
        }

        let mut stats = ExportStats::default();
        let mut pages = Paginator::new(source);
        drain_pages(&mut pages, &RULE_COLUMNS, with_cwe_codes, sink, &mut stats).await?;

        info!("Exported {} rules", stats.rows);
        Ok(stats)
    }
}
