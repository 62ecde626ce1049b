//! Export engine and exporter trait definitions

pub mod enrich;
pub mod findings;
pub mod flatten;
pub mod hotspots;
pub mod issues;
pub mod paginator;
pub mod projects;
pub mod rules;
pub mod schema;

use crate::error::{ExportError, Result};
use crate::http::SonarClient;
use crate::models::{ExportConfig, ExportKind, ExportStats, ExportSummary, Record};
use crate::sink::{CsvSink, RowSink};
use async_trait::async_trait;
use flatten::{flatten, Column, Row};
use indicatif::{ProgressBar, ProgressStyle};
use paginator::{PageSource, Paginator};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

/// Trait that all exporters implement
#[async_trait]
pub trait Exporter: Send + Sync {
    /// Which export this produces
    fn kind(&self) -> ExportKind;

    /// Returns a description of what this exporter fetches
    fn description(&self) -> &str;

    /// CSV header
    fn columns(&self) -> &'static [Column] {
        schema::columns_for(self.kind())
    }

    /// Streams every row into an already initialized sink
    async fn export(
        &self,
        client: &SonarClient,
        config: &ExportConfig,
        sink: &mut dyn RowSink,
    ) -> Result<ExportStats>;
}

/// Writes one batch, skipping empty ones
pub(crate) fn write_rows(
    sink: &mut dyn RowSink,
    rows: &[Row],
    stats: &mut ExportStats,
) -> Result<()> {
    if rows.is_empty() {
        return Ok(());
    }
    sink.append_rows(rows)?;
    stats.rows += rows.len() as u64;
    Ok(())
}

/// Drains a paginator, flattening and writing each page as it arrives
pub(crate) async fn drain_pages<S, F>(
    pages: &mut Paginator<S>,
    columns: &[Column],
    transform: F,
    sink: &mut dyn RowSink,
    stats: &mut ExportStats,
) -> Result<()>
where
    S: PageSource,
    F: Fn(Record) -> Record + Send + Sync,
{
    while let Some(records) = pages.next_page().await? {
        let rows: Vec<Row> = records
            .into_iter()
            .map(|record| flatten(&transform(record), columns))
            .collect();
        write_rows(sink, &rows, stats)?;
    }
    stats.pages += pages.pages_fetched();
    Ok(())
}

/// Runs registered exporters, one at a time
pub struct ExportEngine {
    exporters: Vec<Arc<dyn Exporter>>,
}

impl ExportEngine {
    /// Creates a new ExportEngine with no registered exporters
    pub fn new() -> Self {
        Self {
            exporters: Vec::new(),
        }
    }

    /// Creates an ExportEngine with all exporters registered
    pub fn with_defaults() -> Self {
        let mut engine = Self::new();
        engine.register(Arc::new(rules::RulesExporter));
        engine.register(Arc::new(issues::IssuesExporter));
        engine.register(Arc::new(hotspots::HotspotsExporter));
        engine.register(Arc::new(findings::FindingsExporter));
        engine
    }

    /// Registers a new exporter
    pub fn register(&mut self, exporter: Arc<dyn Exporter>) {
        self.exporters.push(exporter);
    }

    /// Returns information about all registered exporters
    pub fn list_exporters(&self) -> Vec<(ExportKind, &str)> {
        self.exporters
            .iter()
            .map(|e| (e.kind(), e.description()))
            .collect()
    }

    fn exporter(&self, kind: ExportKind) -> Result<Arc<dyn Exporter>> {
        self.exporters
            .iter()
            .find(|e| e.kind() == kind)
            .cloned()
            .ok_or_else(|| ExportError::ConfigError(format!("no exporter registered for {kind}")))
    }

    /// Runs the requested exports in order, stopping at the first failure
    pub async fn run(
        &self,
        kinds: &[ExportKind],
        config: &ExportConfig,
    ) -> Result<Vec<ExportSummary>> {
        let client = SonarClient::from_config(config)?;
        let work = self.run_sequential(kinds, &client, config);

        match config.max_runtime_secs {
            Some(secs) => tokio::time::timeout(Duration::from_secs(secs), work)
                .await
                .map_err(|_| ExportError::RunTimeout(secs))?,
            None => work.await,
        }
    }

    async fn run_sequential(
        &self,
        kinds: &[ExportKind],
        client: &SonarClient,
        config: &ExportConfig,
    ) -> Result<Vec<ExportSummary>> {
        let mut summaries = Vec::with_capacity(kinds.len());
        for &kind in kinds {
            let exporter = self.exporter(kind)?;
            match self.run_exporter(exporter.as_ref(), client, config).await {
                Ok(summary) => summaries.push(summary),
                Err(e) => {
                    error!("Export '{kind}' failed: {e}");
                    return Err(e);
                }
            }
        }
        Ok(summaries)
    }

    async fn run_exporter(
        &self,
        exporter: &dyn Exporter,
        client: &SonarClient,
        config: &ExportConfig,
    ) -> Result<ExportSummary> {
        let kind = exporter.kind();
        let target = config.output_dir.join(kind.file_name());
        info!("Executing export: {kind} -> {}", target.display());

        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("  {spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.enable_steady_tick(Duration::from_millis(120));
        pb.set_message(format!("Exporting {kind}..."));

        let requests_before = client.request_count();
        let mut sink = CsvSink::create(&target)?;
        sink.initialize(exporter.columns())?;

        let stats = match exporter.export(client, config, &mut sink).await {
            Ok(stats) => stats,
            Err(e) => {
                pb.abandon_with_message(format!("{kind} failed"));
                return Err(e);
            }
        };
        let output_path = sink.finish()?;

        pb.finish_with_message(format!("{kind}: {} rows", stats.rows));
        info!(
            "Export '{kind}' completed: {} rows, {} pages",
            stats.rows, stats.pages
        );

        Ok(ExportSummary {
            kind,
            output_path,
            stats,
            requests: client.request_count() - requests_before,
        })
    }
}

impl Default for ExportEngine {
    fn default() -> Self {
        Self::with_defaults()
    }
}
