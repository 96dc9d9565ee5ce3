//! Wire contract of each entity.
//!
//! The API is not uniform: books are paginated and searched server side,
//! collections and locations come back whole inside a named envelope. Each
//! [`Resource`] impl pins down its own shapes and normalizes the list into
//! a [`ListResult`]; whole lists are searched and paged on the client.

use std::fmt;

use libris_model::{
    Book, BookDraft, Collection, CollectionDraft, Draft, Entity, EntityId, ListQuery, ListResult,
    Location, LocationDraft, Validate,
};
use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::Result;
use crate::transport::ApiRequest;

/// An entity the client can list, fetch, create, update and delete.
pub trait Resource:
    Entity + DeserializeOwned + Serialize + Clone + fmt::Debug + Send + Sync + 'static
{
    /// Create/update payload.
    type Draft: Draft + Validate + Clone + fmt::Debug + Send + Sync + 'static;

    /// Collection path, e.g. `/v1/books`.
    #[must_use]
    fn path() -> String {
        format!("/v1/{}", Self::KIND.plural())
    }

    /// Path of a single record.
    #[must_use]
    fn item_path(id: EntityId) -> String {
        format!("{}/{id}", Self::path())
    }

    /// Request for one list page.
    fn list_request(query: &ListQuery) -> ApiRequest;

    /// Decode a list body into a normalized page.
    fn decode_list(body: &[u8], query: &ListQuery) -> Result<ListResult<Self>>;

    /// Decode a create/update body.
    fn decode_saved(body: &[u8]) -> Result<Self>;

    /// Decode a single-record body.
    fn decode_one(body: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(body)?)
    }
}

/// Book list body: `{items, totalItems, currentPage}`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BookPage {
    #[serde(default)]
    items: Vec<Book>,
    #[serde(default)]
    total_items: u64,
    #[serde(default = "first_page")]
    current_page: u32,
}

fn first_page() -> u32 {
    1
}

/// Saved books come back bare; older servers wrap them in `{book}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum SavedBook {
    Wrapped { book: Book },
    Bare(Book),
}

impl Resource for Book {
    type Draft = BookDraft;

    fn list_request(query: &ListQuery) -> ApiRequest {
        let mut request = ApiRequest::get(Self::path())
            .with_query("page", query.page)
            .with_query("pageSize", query.page_size);
        if let Some(text) = query.text() {
            request = request.with_query("query", text);
        }
        if let Some(collection) = query.collection_filter {
            request = request.with_query("collection_id", collection);
        }
        if let Some(location) = query.location_filter {
            request = request.with_query("location_id", location);
        }
        request
    }

    fn decode_list(body: &[u8], _query: &ListQuery) -> Result<ListResult<Self>> {
        let page: BookPage = serde_json::from_slice(body)?;
        Ok(ListResult {
            items: page.items,
            total_items: page.total_items,
            current_page: page.current_page.max(1),
        })
    }

    fn decode_saved(body: &[u8]) -> Result<Self> {
        Ok(match serde_json::from_slice(body)? {
            SavedBook::Wrapped { book } | SavedBook::Bare(book) => book,
        })
    }
}

#[derive(Deserialize)]
struct CollectionList {
    #[serde(default)]
    collections: Vec<Collection>,
}

#[derive(Deserialize)]
struct SavedCollection {
    collection: Collection,
}

impl Resource for Collection {
    type Draft = CollectionDraft;

    fn list_request(_query: &ListQuery) -> ApiRequest {
        ApiRequest::get(Self::path())
    }

    fn decode_list(body: &[u8], query: &ListQuery) -> Result<ListResult<Self>> {
        let list: CollectionList = serde_json::from_slice(body)?;
        Ok(ListResult::single_page(list.collections)
            .filter_by_name(query.text())
            .paged(query.page, query.page_size))
    }

    fn decode_saved(body: &[u8]) -> Result<Self> {
        let saved: SavedCollection = serde_json::from_slice(body)?;
        Ok(saved.collection)
    }
}

#[derive(Deserialize)]
struct LocationList {
    #[serde(default)]
    locations: Vec<Location>,
}

#[derive(Deserialize)]
struct SavedLocation {
    location: Location,
}

impl Resource for Location {
    type Draft = LocationDraft;

    fn list_request(_query: &ListQuery) -> ApiRequest {
        ApiRequest::get(Self::path())
    }

    fn decode_list(body: &[u8], query: &ListQuery) -> Result<ListResult<Self>> {
        let list: LocationList = serde_json::from_slice(body)?;
        Ok(ListResult::single_page(list.locations)
            .filter_by_name(query.text())
            .paged(query.page, query.page_size))
    }

    fn decode_saved(body: &[u8]) -> Result<Self> {
        let saved: SavedLocation = serde_json::from_slice(body)?;
        Ok(saved.location)
    }
}
