//! Paginated list controller.
//!
//! Shows one fixed-size page of a collection at a time. While a page
//! transition is in flight the previous page stays on display, marked as a
//! placeholder. A response that arrives for a superseded request is dropped.

use std::fmt;
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::cache::{QueryCache, QueryKey};
use crate::error::{AppError, AppResult};
use crate::models::Page;
use crate::services::ResourceApi;

pub const PAGE_SIZE: usize = 30;

/// A 1-based page number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PageNumber(u32);

impl PageNumber {
    pub const FIRST: PageNumber = PageNumber(1);

    pub fn new(n: u32) -> Option<Self> {
        (n >= 1).then_some(PageNumber(n))
    }

    /// Reads a page number from a query value, falling back to the first
    /// page when it is missing or not a positive integer.
    pub fn parse(raw: Option<&str>) -> Self {
        raw.and_then(|s| s.trim().parse::<u32>().ok())
            .and_then(PageNumber::new)
            .unwrap_or(PageNumber::FIRST)
    }

    pub fn get(self) -> u32 {
        self.0
    }

    pub fn skip(self) -> u64 {
        u64::from(self.0 - 1) * PAGE_SIZE as u64
    }

    pub fn limit(self) -> u64 {
        PAGE_SIZE as u64
    }

    /// `(skip, limit)` for the list request.
    pub fn range(self) -> (u64, u64) {
        (self.skip(), self.limit())
    }

    pub fn next(self) -> Self {
        PageNumber(self.0.saturating_add(1))
    }

    pub fn previous(self) -> Option<Self> {
        PageNumber::new(self.0 - 1)
    }
}

impl Default for PageNumber {
    fn default() -> Self {
        PageNumber::FIRST
    }
}

impl fmt::Display for PageNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What the list shows right now.
#[derive(Debug, Clone, PartialEq)]
pub struct PageView<R> {
    /// The page being shown or, for a placeholder, the page being loaded.
    pub page: PageNumber,
    pub records: Vec<R>,
    pub count: Option<u64>,
    pub is_placeholder: bool,
}

impl<R: Clone> PageView<R> {
    fn loaded(page: PageNumber, fetched: &Page<R>) -> Self {
        Self {
            page,
            records: fetched.data.clone(),
            count: fetched.count,
            is_placeholder: false,
        }
    }

    fn placeholder_for(&self, page: PageNumber) -> Self {
        Self {
            page,
            records: self.records.clone(),
            count: self.count,
            is_placeholder: true,
        }
    }
}

impl<R> PageView<R> {
    /// A short page marks the end of the collection, count or no count.
    pub fn has_next_page(&self) -> bool {
        !self.is_placeholder && self.records.len() == PAGE_SIZE
    }

    pub fn has_previous_page(&self) -> bool {
        self.page.get() > 1
    }

    /// Number of pages implied by the backend's total, when it sent one.
    pub fn total_pages(&self) -> Option<u64> {
        self.count.map(|c| c.div_ceil(PAGE_SIZE as u64))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ListState<R> {
    /// Nothing requested yet.
    Idle,
    Loading { placeholder: Option<PageView<R>> },
    Ready(PageView<R>),
    /// Distinct from an empty page; the last good page is kept as placeholder.
    Failed {
        page: PageNumber,
        error: String,
        placeholder: Option<PageView<R>>,
    },
}

impl<R> ListState<R> {
    /// The view to render, placeholder or not.
    pub fn view(&self) -> Option<&PageView<R>> {
        match self {
            ListState::Idle => None,
            ListState::Loading { placeholder } => placeholder.as_ref(),
            ListState::Ready(view) => Some(view),
            ListState::Failed { placeholder, .. } => placeholder.as_ref(),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, ListState::Loading { .. })
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ListState::Failed { error, .. } => Some(error),
            _ => None,
        }
    }
}

/// Identifies one page request; results for older tickets are discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    page: PageNumber,
    generation: u64,
}

impl Ticket {
    pub fn page(&self) -> PageNumber {
        self.page
    }
}

pub struct ListController<A: ResourceApi> {
    api: Arc<A>,
    cache: Arc<QueryCache>,
    page: PageNumber,
    generation: u64,
    state: ListState<A::Record>,
    prefetch: Option<JoinHandle<()>>,
}

impl<A: ResourceApi> ListController<A> {
    pub fn new(api: Arc<A>, cache: Arc<QueryCache>) -> Self {
        Self {
            api,
            cache,
            page: PageNumber::FIRST,
            generation: 0,
            state: ListState::Idle,
            prefetch: None,
        }
    }

    pub fn page(&self) -> PageNumber {
        self.page
    }

    pub fn state(&self) -> &ListState<A::Record> {
        &self.state
    }

    pub fn view(&self) -> Option<&PageView<A::Record>> {
        self.state.view()
    }

    pub fn has_next_page(&self) -> bool {
        self.view().is_some_and(PageView::has_next_page)
    }

    pub fn has_previous_page(&self) -> bool {
        self.page.get() > 1
    }

    /// Starts a transition to `page`; whatever is on display becomes the
    /// placeholder until the matching [`apply`](Self::apply).
    pub fn begin(&mut self, page: PageNumber) -> Ticket {
        self.generation += 1;
        self.page = page;
        let placeholder = self.state.view().map(|v| v.placeholder_for(page));
        self.state = ListState::Loading { placeholder };
        Ticket {
            page,
            generation: self.generation,
        }
    }

    /// Applies a fetch result. Returns `false` when the ticket has been
    /// superseded and the result was dropped.
    pub fn apply(&mut self, ticket: Ticket, result: &AppResult<Page<A::Record>>) -> bool {
        if ticket.generation != self.generation {
            tracing::debug!(
                "Discarding stale page response: kind={}, page={}, current={}",
                self.api.kind(),
                ticket.page,
                self.page
            );
            return false;
        }

        self.state = match result {
            Ok(fetched) => ListState::Ready(PageView::loaded(ticket.page, fetched)),
            Err(e) => {
                tracing::warn!(
                    "Page fetch failed: kind={}, page={}, error={}",
                    self.api.kind(),
                    ticket.page,
                    e
                );
                let placeholder = self.state.view().cloned();
                ListState::Failed {
                    page: ticket.page,
                    error: e.to_string(),
                    placeholder,
                }
            }
        };
        true
    }

    /// Loads `page`, serving a fresh cached copy without a network call.
    pub async fn load_page(&mut self, page: PageNumber) -> AppResult<PageView<A::Record>> {
        let ticket = self.begin(page);
        let result = fetch_page(self.api.as_ref(), &self.cache, page).await;
        self.apply(ticket, &result);
        result?;

        let view = match &self.state {
            ListState::Ready(view) => view.clone(),
            _ => return Err(AppError::Internal("page state lost after load".to_string())),
        };
        if view.has_next_page() {
            self.spawn_prefetch(page.next());
        }
        Ok(view)
    }

    /// Reloads the current page, e.g. after its cache entry was invalidated.
    pub async fn refresh(&mut self) -> AppResult<PageView<A::Record>> {
        self.load_page(self.page).await
    }

    pub async fn next_page(&mut self) -> AppResult<PageView<A::Record>> {
        if !self.has_next_page() {
            return Err(AppError::InvalidInput(format!(
                "page {} is the last page",
                self.page
            )));
        }
        self.load_page(self.page.next()).await
    }

    pub async fn previous_page(&mut self) -> AppResult<PageView<A::Record>> {
        match self.page.previous() {
            Some(page) => self.load_page(page).await,
            None => Err(AppError::InvalidInput("already on the first page".to_string())),
        }
    }

    /// Waits for the outstanding background prefetch, if any.
    pub async fn settle(&mut self) {
        if let Some(handle) = self.prefetch.take() {
            if let Err(e) = handle.await {
                tracing::warn!("Prefetch task failed: {}", e);
            }
        }
    }

    fn spawn_prefetch(&mut self, page: PageNumber) {
        let api = Arc::clone(&self.api);
        let cache = Arc::clone(&self.cache);
        // A replaced handle is detached, not aborted: the fetch still lands in the cache.
        self.prefetch = Some(tokio::spawn(async move {
            match fetch_page(api.as_ref(), &cache, page).await {
                Ok(fetched) => tracing::debug!(
                    "Prefetched page: kind={}, page={}, records={}",
                    api.kind(),
                    page,
                    fetched.data.len()
                ),
                Err(e) => tracing::warn!(
                    "Prefetch failed: kind={}, page={}, error={}",
                    api.kind(),
                    page,
                    e
                ),
            }
        }));
    }
}

/// Cache-first page fetch. Only successful responses are written back, and
/// a response that raced an invalidation is written back stale.
pub async fn fetch_page<A: ResourceApi>(
    api: &A,
    cache: &QueryCache,
    page: PageNumber,
) -> AppResult<Page<A::Record>> {
    let key = QueryKey::page(api.kind(), page.get());
    if let Some(cached) = cache.get::<Page<A::Record>>(&key).await {
        if !cached.stale {
            return Ok(cached.value.as_ref().clone());
        }
    }

    let sent_at = cache.epoch(key.kind).await;
    let (skip, limit) = page.range();
    let fetched = api.list(skip, limit).await?;
    cache.put_fetched(key, fetched.clone(), sent_at).await;
    Ok(fetched)
}
