//! Project enumeration, the outer loop of per-project exports

use super::paginator::{ApiPageSource, PageSource, Paginator};
use crate::error::{ExportError, Result};
use crate::http::endpoints::PROJECTS_SEARCH;
use crate::http::SonarClient;
use crate::models::{Project, Record};
use serde_json::Value;

/// Pages through `projects/search`, yielding typed projects one page at a time
pub struct ProjectIterator<S> {
    pages: Paginator<S>,
}

impl<'a> ProjectIterator<ApiPageSource<'a>> {
    pub fn new(client: &'a SonarClient) -> Self {
        Self::from_source(ApiPageSource::new(client, PROJECTS_SEARCH))
    }
}

impl<S: PageSource> ProjectIterator<S> {
    pub fn from_source(source: S) -> Self {
        Self {
            pages: Paginator::new(source),
        }
    }

    /// Next page of projects, or `None` when every page has been read
    pub async fn next_page(&mut self) -> Result<Option<Vec<Project>>> {
        match self.pages.next_page().await? {
            Some(records) => records.into_iter().map(to_project).collect::<Result<_>>().map(Some),
            None => Ok(None),
        }
    }

    pub fn pages_fetched(&self) -> u64 {
        self.pages.pages_fetched()
    }
}

fn to_project(record: Record) -> Result<Project> {
    serde_json::from_value(Value::Object(record)).map_err(|e| {
        ExportError::malformed(PROJECTS_SEARCH.path, format!("invalid project entry: {e}"))
    })
}
