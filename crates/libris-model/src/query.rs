//! List parameters and list results.

use serde::{Deserialize, Serialize};

use crate::entity::{Entity, EntityId};
use crate::pagination::Pagination;

/// Parameters of one list fetch.
///
/// `page_size == 0` means "not measured yet": such a query is never sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub page: u32,
    pub page_size: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_filter: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_filter: Option<EntityId>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 0,
            query: None,
            collection_filter: None,
            location_filter: None,
        }
    }
}

impl ListQuery {
    /// First page with the given page size and no filters.
    #[must_use]
    pub fn first_page(page_size: u32) -> Self {
        Self {
            page_size,
            ..Self::default()
        }
    }

    /// Whether every required field is resolved and the query may be sent.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.page >= 1 && self.page_size >= 1
    }

    #[must_use]
    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }

    /// Set the free-text search; blank text clears it.
    #[must_use]
    pub fn with_query(mut self, text: impl Into<String>) -> Self {
        self.query = normalize_text(text.into());
        self
    }

    #[must_use]
    pub fn with_collection(mut self, collection: Option<EntityId>) -> Self {
        self.collection_filter = collection;
        self
    }

    #[must_use]
    pub fn with_location(mut self, location: Option<EntityId>) -> Self {
        self.location_filter = location;
        self
    }

    /// The search text, if any.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.query.as_deref()
    }
}

/// Trim search text and map blank input to `None`.
pub(crate) fn normalize_text(text: String) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else if trimmed.len() == text.len() {
        Some(text)
    } else {
        Some(trimmed.to_string())
    }
}

/// One page of records plus the server's paging metadata.
///
/// Replaces the previous result wholesale on every successful fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResult<T> {
    pub items: Vec<T>,
    pub total_items: u64,
    pub current_page: u32,
}

impl<T> Default for ListResult<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            total_items: 0,
            current_page: 1,
        }
    }
}

impl<T> ListResult<T> {
    /// Wrap an unpaginated list as a single page.
    #[must_use]
    pub fn single_page(items: Vec<T>) -> Self {
        Self {
            total_items: items.len() as u64,
            items,
            current_page: 1,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Cut a whole-list result down to one page.
    ///
    /// For lists the server returns unpaginated. `page` is clamped into
    /// range so `current_page` always names a page that exists; a zero
    /// `page_size` leaves the result whole.
    #[must_use]
    pub fn paged(self, page: u32, page_size: u32) -> Self {
        if page_size == 0 {
            return self;
        }
        let current_page = Pagination::new(self.total_items, page_size, page).current_page();
        let size = page_size as usize;
        let items = self
            .items
            .into_iter()
            .skip((current_page as usize - 1).saturating_mul(size))
            .take(size)
            .collect();
        Self {
            items,
            total_items: self.total_items,
            current_page,
        }
    }

    /// Page math for this result at the given page size.
    #[must_use]
    pub fn pagination(&self, page_size: u32) -> Pagination {
        Pagination::new(self.total_items, page_size, self.current_page)
    }
}

impl<T: Entity> ListResult<T> {
    /// Keep records whose name contains `query`, ignoring case.
    ///
    /// Used for the lists the server does not search itself.
    #[must_use]
    pub fn filter_by_name(self, query: Option<&str>) -> Self {
        let Some(needle) = query.map(str::to_lowercase).filter(|q| !q.is_empty()) else {
            return self;
        };
        let items: Vec<T> = self
            .items
            .into_iter()
            .filter(|item| item.display_name().to_lowercase().contains(&needle))
            .collect();
        Self::single_page(items)
    }

    /// Whether a record with `id` is on this page.
    #[must_use]
    pub fn contains_id(&self, id: EntityId) -> bool {
        self.items.iter().any(|item| item.id() == Some(id))
    }
}
