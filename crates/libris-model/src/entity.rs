//! Library records as the API returns them.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Numeric id assigned by the server on first persistence.
pub type EntityId = i64;

/// Cover shown for books that were saved without one.
pub const DEFAULT_COVER_URL: &str = "https://d28hgpri8am2if.cloudfront.net/book_images/onix/cvr9781787550360/classic-book-cover-foiled-journal-9781787550360_hr.jpg";

/// The entity families managed through the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// A book record.
    Book,
    /// A named group of books.
    Collection,
    /// A physical place where books are kept.
    Location,
}

impl EntityKind {
    /// Singular label used in messages.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Book => "book",
            Self::Collection => "collection",
            Self::Location => "location",
        }
    }

    /// Plural label, also the final path segment of the resource.
    #[must_use]
    pub const fn plural(&self) -> &'static str {
        match self {
            Self::Book => "books",
            Self::Collection => "collections",
            Self::Location => "locations",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Common view over the persisted records.
pub trait Entity {
    /// Which family this record belongs to.
    const KIND: EntityKind;

    /// Server id, absent before the first save.
    fn id(&self) -> Option<EntityId>;

    /// Human-facing name (the title for books).
    fn display_name(&self) -> &str;
}

/// A book author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Author {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: None,
        }
    }
}

/// A literary genre tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub name: String,
}

/// A language a book is written in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
    pub name: String,
    /// Short code such as `pt` or `en`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// A named group of books owned by one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    pub name: String,
    #[serde(default)]
    pub user_id: EntityId,
}

impl Entity for Collection {
    const KIND: EntityKind = EntityKind::Collection;

    fn id(&self) -> Option<EntityId> {
        self.id
    }

    fn display_name(&self) -> &str {
        &self.name
    }
}

/// A shelf, room or box where books live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    pub name: String,
    #[serde(default)]
    pub user_id: EntityId,
}

impl Entity for Location {
    const KIND: EntityKind = EntityKind::Location;

    fn id(&self) -> Option<EntityId> {
        self.id
    }

    fn display_name(&self) -> &str {
        &self.name
    }
}

/// A book as read back from the server.
///
/// On read the collection and location are embedded objects; writes go
/// through [`crate::BookDraft`], which references them by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    pub title: String,
    #[serde(default)]
    pub authors: Vec<Author>,
    #[serde(default)]
    pub publisher: String,
    #[serde(default)]
    pub languages: Vec<Language>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(default)]
    pub genres: Vec<Genre>,
    /// Cover image: a URL or a base64 data URI.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection: Option<Collection>,
    pub location: Location,
    #[serde(default)]
    pub user_id: EntityId,
}

impl Book {
    /// Author names joined with `", "`.
    #[must_use]
    pub fn authors_display(&self) -> String {
        self.authors
            .iter()
            .map(|author| author.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Title truncated to `max` characters, ending in `...` when cut.
    #[must_use]
    pub fn short_title(&self, max: usize) -> String {
        if self.title.chars().count() <= max {
            return self.title.clone();
        }
        let keep = max.saturating_sub(2);
        let mut short: String = self.title.chars().take(keep).collect();
        short.push_str("...");
        short
    }

    /// The stored cover, or [`DEFAULT_COVER_URL`] when missing or blank.
    #[must_use]
    pub fn cover_or_default(&self) -> &str {
        match self.cover.as_deref() {
            Some(cover) if !cover.trim().is_empty() => cover,
            _ => DEFAULT_COVER_URL,
        }
    }
}

impl Entity for Book {
    const KIND: EntityKind = EntityKind::Book;

    fn id(&self) -> Option<EntityId> {
        self.id
    }

    fn display_name(&self) -> &str {
        &self.title
    }
}
