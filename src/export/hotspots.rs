//! Security hotspot export, project by project

use super::paginator::{ApiPageSource, Paginator};
use super::projects::ProjectIterator;
use super::schema::HOTSPOT_COLUMNS;
use super::{drain_pages, Exporter};
use crate::error::Result;
use crate::http::endpoints::HOTSPOTS_SEARCH;
use crate::http::SonarClient;
use crate::models::{ExportConfig, ExportKind, ExportStats};
use crate::sink::RowSink;
use async_trait::async_trait;
use tracing::info;

/// Walks every project and pages through its hotspots
pub struct HotspotsExporter;

#[async_trait]
impl Exporter for HotspotsExporter {
    fn kind(&self) -> ExportKind {
        ExportKind::Hotspots
    }

    fn description(&self) -> &str {
        "Security hotspots per project from hotspots/search"
    }

    async fn export(
        &self,
        client: &SonarClient,
        _config: &ExportConfig,
        sink: &mut dyn RowSink,
    ) -> Result<ExportStats> {
        let mut stats = ExportStats::default();
        let mut projects = ProjectIterator::new(client);

        while let Some(page) = projects.next_page().await? {
            for project in page {
                stats.projects += 1;
                let rows_before = stats.rows;

                let source =
                    ApiPageSource::new(client, HOTSPOTS_SEARCH).with_param("projectKey", &project.key);
                let mut hotspots = Paginator::new(source);
                drain_pages(&mut hotspots, &HOTSPOT_COLUMNS, |h| h, sink, &mut stats).await?;

                info!(
                    "Project {}: {} hotspots",
                    project.key,
                    stats.rows - rows_before
                );
            }
        }
        stats.pages += projects.pages_fetched();

        Ok(stats)
    }
}
