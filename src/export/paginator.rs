//! Lazy traversal of paged list endpoints

use crate::error::Result;
use crate::http::{describe_request, ListEndpoint, SonarClient};
use crate::models::{Page, Record, PAGE_SIZE};
use async_trait::async_trait;
use std::collections::VecDeque;
use tracing::debug;

/// Anything that can serve numbered pages of records
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Human-readable name used in logs
    fn describe(&self) -> String;

    /// Fetches one page; `page_index` is 1-based
    async fn fetch_page(&self, page_index: u32, page_size: u32) -> Result<Page>;
}

/// A list endpoint on the live API, with fixed extra query parameters
pub struct ApiPageSource<'a> {
    client: &'a SonarClient,
    endpoint: ListEndpoint,
    params: Vec<(&'static str, String)>,
}

impl<'a> ApiPageSource<'a> {
    pub fn new(client: &'a SonarClient, endpoint: ListEndpoint) -> Self {
        Self {
            client,
            endpoint,
            params: Vec::new(),
        }
    }

    /// Adds a query parameter sent with every page request
    pub fn with_param(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.params.push((name, value.into()));
        self
    }
}

#[async_trait]
impl PageSource for ApiPageSource<'_> {
    fn describe(&self) -> String {
        describe_request(self.endpoint.path, &self.params)
    }

    async fn fetch_page(&self, page_index: u32, page_size: u32) -> Result<Page> {
        let mut query = vec![("p", page_index.to_string()), ("ps", page_size.to_string())];
        query.extend(self.params.iter().cloned());

        let context = describe_request(self.endpoint.path, &query);
        let body = self.client.get_json(self.endpoint.path, &query).await?;
        self.endpoint.parse_page(body, &context)
    }
}

/// Walks a page source from page 1 until `page_index >= ceil(total / page_size)`.
///
/// Pages are fetched on demand, one at a time. The traversal is single-pass:
/// once exhausted it keeps returning `None`.
pub struct Paginator<S> {
    source: S,
    page_size: u32,
    next_index: u32,
    exhausted: bool,
    pages_fetched: u64,
    buffer: VecDeque<Record>,
}

impl<S: PageSource> Paginator<S> {
    pub fn new(source: S) -> Self {
        Self::with_page_size(source, PAGE_SIZE)
    }

    pub fn with_page_size(source: S, page_size: u32) -> Self {
        Self {
            source,
            page_size: page_size.max(1),
            next_index: 1,
            exhausted: false,
            pages_fetched: 0,
            buffer: VecDeque::new(),
        }
    }

    /// Fetches the next page, or `None` once the last page has been read
    pub async fn next_page(&mut self) -> Result<Option<Vec<Record>>> {
        if self.exhausted {
            return Ok(None);
        }

        let page_index = self.next_index;
        let page = match self.source.fetch_page(page_index, self.page_size).await {
            Ok(page) => page,
            Err(e) => {
                self.exhausted = true;
                return Err(e);
            }
        };
        self.pages_fetched += 1;

        let last_page = page.total.div_ceil(u64::from(self.page_size));
        debug!(
            "{}: page {page_index}/{last_page}, {} records",
            self.source.describe(),
            page.items.len()
        );

        if u64::from(page_index) >= last_page {
            self.exhausted = true;
        } else {
            self.next_index += 1;
        }

        Ok(Some(page.items))
    }

    /// Yields records one at a time, fetching the next page when the buffer runs dry
    pub async fn next_record(&mut self) -> Result<Option<Record>> {
        loop {
            if let Some(record) = self.buffer.pop_front() {
                return Ok(Some(record));
            }
            match self.next_page().await? {
                Some(items) => self.buffer.extend(items),
                None => return Ok(None),
            }
        }
    }

    /// Drains every remaining page into memory
    pub async fn collect_all(&mut self) -> Result<Vec<Record>> {
        let mut records: Vec<Record> = self.buffer.drain(..).collect();
        while let Some(items) = self.next_page().await? {
            records.extend(items);
        }
        Ok(records)
    }

    /// Number of page requests issued so far
    pub fn pages_fetched(&self) -> u64 {
        self.pages_fetched
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted && self.buffer.is_empty()
    }
}
