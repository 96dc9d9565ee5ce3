//! Write payloads sent to the API.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::entity::{Author, Book, Collection, EntityId, Genre, Language, Location};

/// A create/update payload.
///
/// Drafts without an id are submitted with `POST`; drafts carrying an id
/// are update payloads submitted with `PUT`.
pub trait Draft: Serialize {
    /// Id of the record being edited, if any.
    fn id(&self) -> Option<EntityId>;

    /// Turn this draft into an update payload for `id`.
    #[must_use]
    fn with_id(self, id: EntityId) -> Self;
}

/// Book payload: collection and location are referenced by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookDraft {
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
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_id: Option<EntityId>,
    pub location_id: EntityId,
    #[serde(default)]
    pub user_id: EntityId,
}

impl Draft for BookDraft {
    fn id(&self) -> Option<EntityId> {
        self.id
    }

    fn with_id(mut self, id: EntityId) -> Self {
        self.id = Some(id);
        self
    }
}

impl From<&Book> for BookDraft {
    fn from(book: &Book) -> Self {
        Self {
            id: book.id,
            title: book.title.clone(),
            authors: book.authors.clone(),
            publisher: book.publisher.clone(),
            languages: book.languages.clone(),
            edition: book.edition.clone(),
            isbn: book.isbn.clone(),
            year: book.year.clone(),
            genres: book.genres.clone(),
            cover: book.cover.clone(),
            collection_id: book.collection.as_ref().and_then(|c| c.id),
            location_id: book.location.id.unwrap_or_default(),
            user_id: book.user_id,
        }
    }
}

/// Collection payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    pub name: String,
    #[serde(default)]
    pub user_id: EntityId,
}

impl CollectionDraft {
    pub fn new(name: impl Into<String>, user_id: EntityId) -> Self {
        Self {
            id: None,
            name: name.into(),
            user_id,
        }
    }
}

impl Draft for CollectionDraft {
    fn id(&self) -> Option<EntityId> {
        self.id
    }

    fn with_id(mut self, id: EntityId) -> Self {
        self.id = Some(id);
        self
    }
}

impl From<&Collection> for CollectionDraft {
    fn from(collection: &Collection) -> Self {
        Self {
            id: collection.id,
            name: collection.name.clone(),
            user_id: collection.user_id,
        }
    }
}

/// Location payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    pub name: String,
    #[serde(default)]
    pub user_id: EntityId,
}

impl LocationDraft {
    pub fn new(name: impl Into<String>, user_id: EntityId) -> Self {
        Self {
            id: None,
            name: name.into(),
            user_id,
        }
    }
}

impl Draft for LocationDraft {
    fn id(&self) -> Option<EntityId> {
        self.id
    }

    fn with_id(mut self, id: EntityId) -> Self {
        self.id = Some(id);
        self
    }
}

impl From<&Location> for LocationDraft {
    fn from(location: &Location) -> Self {
        Self {
            id: location.id,
            name: location.name.clone(),
            user_id: location.user_id,
        }
    }
}

/// Login form.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Successful login response body.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken([REDACTED])")
    }
}
