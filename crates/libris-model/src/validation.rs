//! Form rules checked before a draft is submitted.
//!
//! The rules are plain data so a caller can tighten or relax them without
//! touching the request lifecycle. [`BookRules::default`] and
//! [`NameRules::default`] carry the limits the web forms enforce.

use std::collections::BTreeMap;

use crate::draft::{BookDraft, CollectionDraft, LocationDraft};
use crate::entity::EntityId;

/// Field name → message, for both local and server-side validation.
pub type FieldErrors = BTreeMap<String, String>;

/// Length and character constraints for one text field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule {
    /// Minimum number of characters.
    pub min_len: usize,
    /// Maximum number of characters.
    pub max_len: usize,
    /// Only ASCII digits are accepted.
    pub digits_only: bool,
}

impl FieldRule {
    #[must_use]
    pub const fn text(min_len: usize, max_len: usize) -> Self {
        Self {
            min_len,
            max_len,
            digits_only: false,
        }
    }

    #[must_use]
    pub const fn digits(min_len: usize, max_len: usize) -> Self {
        Self {
            min_len,
            max_len,
            digits_only: true,
        }
    }

    /// Message describing the first violated constraint.
    #[must_use]
    pub fn check(&self, value: &str) -> Option<String> {
        let len = value.chars().count();
        if self.digits_only && !value.chars().all(|c| c.is_ascii_digit()) {
            return Some("only digits are accepted".to_string());
        }
        if len < self.min_len {
            return Some(if self.min_len == 1 {
                "is required".to_string()
            } else {
                format!("must have at least {} characters", self.min_len)
            });
        }
        if len > self.max_len {
            return Some(format!("must have at most {} characters", self.max_len));
        }
        None
    }
}

/// Rules for the book form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookRules {
    pub title: FieldRule,
    pub author_name: FieldRule,
    pub author_url: FieldRule,
    pub language_name: FieldRule,
    pub language_code: FieldRule,
    pub publisher: FieldRule,
    pub edition: FieldRule,
    pub isbn: FieldRule,
    pub year: FieldRule,
    pub genre_name: FieldRule,
}

impl Default for BookRules {
    fn default() -> Self {
        Self {
            title: FieldRule::text(1, 255),
            author_name: FieldRule::text(1, 255),
            author_url: FieldRule::text(0, 500),
            language_name: FieldRule::text(1, 255),
            language_code: FieldRule::text(0, 4),
            publisher: FieldRule::text(1, 500),
            edition: FieldRule::digits(0, 50),
            isbn: FieldRule::digits(10, 14),
            year: FieldRule::digits(0, 4),
            genre_name: FieldRule::text(1, 255),
        }
    }
}

/// Rules for the single-field collection and location forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NameRules {
    pub name: FieldRule,
}

impl Default for NameRules {
    fn default() -> Self {
        Self {
            name: FieldRule::text(1, 255),
        }
    }
}

/// Local validation of a form payload.
pub trait Validate {
    /// Check against the default rules.
    fn validate(&self) -> Result<(), FieldErrors>;
}

#[derive(Default)]
struct Collector(FieldErrors);

impl Collector {
    fn required(&mut self, field: impl Into<String>, value: &str, rule: &FieldRule) {
        if let Some(message) = rule.check(value) {
            self.0.entry(field.into()).or_insert(message);
        }
    }

    /// Optional fields are only checked when filled in.
    fn optional(&mut self, field: impl Into<String>, value: Option<&str>, rule: &FieldRule) {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            self.required(field, value, rule);
        }
    }

    fn positive_id(&mut self, field: &str, id: EntityId) {
        if id <= 0 {
            self.0
                .insert(field.to_string(), "must be a positive number".to_string());
        }
    }

    fn finish(self) -> Result<(), FieldErrors> {
        if self.0.is_empty() { Ok(()) } else { Err(self.0) }
    }
}

impl BookDraft {
    /// Check this draft against `rules`.
    pub fn validate_with(&self, rules: &BookRules) -> Result<(), FieldErrors> {
        let mut errors = Collector::default();
        errors.required("title", &self.title, &rules.title);
        for (index, author) in self.authors.iter().enumerate() {
            errors.required(
                format!("authors[{index}].name"),
                &author.name,
                &rules.author_name,
            );
            errors.optional(
                format!("authors[{index}].url"),
                author.url.as_deref(),
                &rules.author_url,
            );
        }
        for (index, language) in self.languages.iter().enumerate() {
            errors.required(
                format!("languages[{index}].name"),
                &language.name,
                &rules.language_name,
            );
            errors.optional(
                format!("languages[{index}].code"),
                language.code.as_deref(),
                &rules.language_code,
            );
        }
        errors.required("publisher", &self.publisher, &rules.publisher);
        errors.optional("edition", self.edition.as_deref(), &rules.edition);
        errors.optional("isbn", self.isbn.as_deref(), &rules.isbn);
        errors.optional("year", self.year.as_deref(), &rules.year);
        for (index, genre) in self.genres.iter().enumerate() {
            errors.required(
                format!("genres[{index}].name"),
                &genre.name,
                &rules.genre_name,
            );
        }
        if let Some(collection_id) = self.collection_id {
            errors.positive_id("collection_id", collection_id);
        }
        errors.positive_id("location_id", self.location_id);
        errors.finish()
    }
}

impl Validate for BookDraft {
    fn validate(&self) -> Result<(), FieldErrors> {
        self.validate_with(&BookRules::default())
    }
}

fn validate_name(name: &str, rules: &NameRules) -> Result<(), FieldErrors> {
    let mut errors = Collector::default();
    errors.required("name", name, &rules.name);
    errors.finish()
}

impl CollectionDraft {
    pub fn validate_with(&self, rules: &NameRules) -> Result<(), FieldErrors> {
        validate_name(&self.name, rules)
    }
}

impl Validate for CollectionDraft {
    fn validate(&self) -> Result<(), FieldErrors> {
        self.validate_with(&NameRules::default())
    }
}

impl LocationDraft {
    pub fn validate_with(&self, rules: &NameRules) -> Result<(), FieldErrors> {
        validate_name(&self.name, rules)
    }
}

impl Validate for LocationDraft {
    fn validate(&self) -> Result<(), FieldErrors> {
        self.validate_with(&NameRules::default())
    }
}
