//! Turning list-view input into list fetches.
//!
//! [`ListQueryCoordinator`] is a pure state machine over
//! [`tokio::time::Instant`]: feed it input with the `set_*` methods and ask
//! [`ListQueryCoordinator::poll`] whether a fetch is due. Text edits are
//! debounced; filter, page and size changes take effect on the next poll.
//! [`drive_list_queries`] runs it against an [`EntityStore`].

use std::time::Duration;

use libris_client::{CancellationToken, Resource};
use libris_model::{
    DEFAULT_GUTTER, DEFAULT_ITEM_WIDTH, DEFAULT_PAGE_WINDOW, EntityId, ListQuery, ListResult,
    PageLink, Pagination, page_size_for_viewport,
};
use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::slot::LifecycleError;
use crate::store::EntityStore;

/// Quiet window applied to search text.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Tuning for [`ListQueryCoordinator`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinatorConfig {
    pub debounce: Duration,
    /// Number of page links in the pagination window.
    pub page_window: usize,
    /// Go back to page 1 when the collection or location filter changes.
    pub reset_page_on_filter_change: bool,
    /// Card width used by [`ListQueryCoordinator::size_for_viewport`].
    pub item_width: u32,
    pub gutter: u32,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            page_window: DEFAULT_PAGE_WINDOW,
            reset_page_on_filter_change: true,
            item_width: DEFAULT_ITEM_WIDTH,
            gutter: DEFAULT_GUTTER,
        }
    }
}

impl CoordinatorConfig {
    #[must_use]
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }
}

/// Server paging metadata from the latest applied list result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Reconciled {
    total_items: u64,
    current_page: u32,
}

/// Builds list queries from user input.
#[derive(Debug, Clone)]
pub struct ListQueryCoordinator {
    config: CoordinatorConfig,
    query: ListQuery,
    pending_text: Option<(String, Instant)>,
    last_issued: Option<ListQuery>,
    force: bool,
    reconciled: Option<Reconciled>,
}

impl Default for ListQueryCoordinator {
    fn default() -> Self {
        Self::new(CoordinatorConfig::default())
    }
}

impl ListQueryCoordinator {
    /// Starts with an unmeasured page size; nothing is fetched until one is set.
    #[must_use]
    pub fn new(config: CoordinatorConfig) -> Self {
        Self::with_query(config, ListQuery::default())
    }

    #[must_use]
    pub fn with_query(config: CoordinatorConfig, query: ListQuery) -> Self {
        Self {
            config,
            query,
            pending_text: None,
            last_issued: None,
            force: false,
            reconciled: None,
        }
    }

    #[must_use]
    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    /// The query as of the last committed change.
    #[must_use]
    pub fn query(&self) -> &ListQuery {
        &self.query
    }

    /// Search text typed at `now`; committed once the debounce window passes.
    pub fn set_text(&mut self, text: impl Into<String>, now: Instant) {
        self.pending_text = Some((text.into(), now + self.config.debounce));
    }

    pub fn set_collection_filter(&mut self, collection: Option<EntityId>) {
        if self.query.collection_filter != collection {
            self.query.collection_filter = collection;
            self.after_filter_change();
        }
    }

    pub fn set_location_filter(&mut self, location: Option<EntityId>) {
        if self.query.location_filter != location {
            self.query.location_filter = location;
            self.after_filter_change();
        }
    }

    fn after_filter_change(&mut self) {
        if self.config.reset_page_on_filter_change {
            self.query.page = 1;
        }
    }

    pub fn set_page(&mut self, page: u32) {
        self.query.page = page.max(1);
    }

    pub fn set_page_size(&mut self, page_size: u32) {
        self.query.page_size = page_size;
    }

    /// Derive the page size from the available width.
    pub fn size_for_viewport(&mut self, available_width: u32) -> u32 {
        let size = page_size_for_viewport(available_width, self.config.item_width, self.config.gutter);
        self.set_page_size(size);
        size
    }

    /// Fetch the current query again on the next poll even if unchanged.
    pub fn refresh(&mut self) {
        self.force = true;
    }

    /// When the pending text edit becomes due.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending_text.as_ref().map(|(_, deadline)| *deadline)
    }

    /// The query to fetch now, if any.
    ///
    /// Commits due text edits (which resets the page to 1), then returns the
    /// query when it is ready and differs from the last one returned.
    pub fn poll(&mut self, now: Instant) -> Option<ListQuery> {
        if self.next_deadline().is_some_and(|deadline| deadline <= now)
            && let Some((text, _)) = self.pending_text.take()
        {
            let committed = self.query.clone().with_query(text);
            if committed.query != self.query.query {
                self.query = committed.with_page(1);
            }
        }

        if !self.query.is_ready() {
            return None;
        }
        if !self.force && self.last_issued.as_ref() == Some(&self.query) {
            return None;
        }
        self.force = false;
        self.last_issued = Some(self.query.clone());
        Some(self.query.clone())
    }

    /// Take the server's paging metadata from a fresh result.
    pub fn reconcile<T>(&mut self, result: &ListResult<T>) {
        self.reconciled = Some(Reconciled {
            total_items: result.total_items,
            current_page: result.current_page,
        });
    }

    /// Page controls for the latest result.
    #[must_use]
    pub fn pagination(&self) -> Pagination {
        let (total, current) = match self.reconciled {
            Some(r) => (r.total_items, r.current_page),
            None => (0, self.query.page),
        };
        Pagination::new(total, self.query.page_size, current)
    }

    /// Page links for the latest result, using the configured window.
    #[must_use]
    pub fn page_links(&self) -> Vec<PageLink> {
        self.pagination().window(self.config.page_window)
    }

    /// Apply one input event received at `now`.
    pub fn apply(&mut self, event: QueryEvent, now: Instant) {
        match event {
            QueryEvent::Text(text) => self.set_text(text, now),
            QueryEvent::Collection(id) => self.set_collection_filter(id),
            QueryEvent::Location(id) => self.set_location_filter(id),
            QueryEvent::Page(page) => self.set_page(page),
            QueryEvent::PageSize(size) => self.set_page_size(size),
            QueryEvent::Viewport(width) => {
                self.size_for_viewport(width);
            }
            QueryEvent::Refresh => self.refresh(),
        }
    }
}

/// Input to [`drive_list_queries`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryEvent {
    Text(String),
    Collection(Option<EntityId>),
    Location(Option<EntityId>),
    Page(u32),
    PageSize(u32),
    /// Available width in pixels.
    Viewport(u32),
    Refresh,
}

/// Forward due queries from `coordinator` to `store` until `events` closes
/// or `cancel` fires.
///
/// A text edit still pending when the channel closes is flushed first.
/// Returns the coordinator so the caller can inspect the final paging, or
/// [`LifecycleError::SessionExpired`] when the server ends the session.
pub async fn drive_list_queries<R: Resource>(
    store: &EntityStore<R>,
    mut coordinator: ListQueryCoordinator,
    mut events: mpsc::Receiver<QueryEvent>,
    cancel: CancellationToken,
) -> Result<ListQueryCoordinator, LifecycleError> {
    let mut closed = false;
    loop {
        if let Some(query) = coordinator.poll(Instant::now()) {
            match store.list_with(query, Some(cancel.clone())).await {
                Ok(state) => {
                    if let Some(result) = state.result() {
                        coordinator.reconcile(result);
                    }
                }
                Err(LifecycleError::Cancelled) => break,
                Err(error) => return Err(error),
            }
        }

        let deadline = coordinator.next_deadline();
        if closed && deadline.is_none() {
            break;
        }

        tokio::select! {
            () = cancel.cancelled() => break,
            event = events.recv(), if !closed => match event {
                Some(event) => coordinator.apply(event, Instant::now()),
                None => closed = true,
            },
            () = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {}
        }
    }
    Ok(coordinator)
}
