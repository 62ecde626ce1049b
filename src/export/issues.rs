//! Issue export

use super::paginator::{ApiPageSource, Paginator};
use super::schema::ISSUE_COLUMNS;
use super::{drain_pages, Exporter};
use crate::error::Result;
use crate::http::endpoints::ISSUES_SEARCH;
use crate::http::SonarClient;
use crate::models::{ExportConfig, ExportKind, ExportStats};
use crate::sink::RowSink;
use async_trait::async_trait;
use tracing::info;

/// Exports every issue visible to the token from `issues/search`
pub struct IssuesExporter;

#[async_trait]
impl Exporter for IssuesExporter {
    fn kind(&self) -> ExportKind {
        ExportKind::Issues
    }

    fn description(&self) -> &str {
        "Issues across all projects from issues/search"
    }

    async fn export(
        &self,
        client: &SonarClient,
        _config: &ExportConfig,
        sink: &mut dyn RowSink,
    ) -> Result<ExportStats> {
        let mut stats = ExportStats::default();
        let mut pages = Paginator::new(ApiPageSource::new(client, ISSUES_SEARCH));
        drain_pages(&mut pages, &ISSUE_COLUMNS, |issue| issue, sink, &mut stats).await?;

        info!("Exported {} issues", stats.rows);
        Ok(stats)
    }
}
