//! Data model shared by every libris crate.
//!
//! - [`entity`]: books, collections and locations as the API returns them
//! - [`draft`]: write payloads for create/update and login credentials
//! - [`query`]: list parameters and list results
//! - [`pagination`]: page math and the bounded page-link window
//! - [`validation`]: form rules applied before a draft is submitted

pub mod draft;
pub mod entity;
pub mod pagination;
pub mod query;
pub mod validation;

pub use draft::{AccessToken, BookDraft, CollectionDraft, Credentials, Draft, LocationDraft};
pub use entity::{
    Author, Book, Collection, DEFAULT_COVER_URL, Entity, EntityId, EntityKind, Genre, Language,
    Location,
};
pub use pagination::{
    DEFAULT_GUTTER, DEFAULT_ITEM_WIDTH, DEFAULT_PAGE_WINDOW, PageLink, Pagination,
    page_size_for_viewport,
};
pub use query::{ListQuery, ListResult};
pub use validation::{BookRules, FieldErrors, FieldRule, NameRules, Validate};
