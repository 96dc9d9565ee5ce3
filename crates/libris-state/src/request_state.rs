//! The state of one asynchronous operation.

use std::fmt;

use libris_client::ClientError;
use libris_model::FieldErrors;

/// Phase of a request, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Idle,
    Loading,
    Success,
    Failure,
}

impl Status {
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Success => "success",
            Self::Failure => "failure",
        }
    }

    /// Success or failure: waiting to be acknowledged.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Success | Self::Failure)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Lifecycle of one request slot.
///
/// The payload lives inside the variant, so an idle or loading state can
/// never carry a stale result or error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestState<T, E> {
    Idle,
    Loading,
    Success(T),
    Failure(E),
}

impl<T, E> Default for RequestState<T, E> {
    fn default() -> Self {
        Self::Idle
    }
}

impl<T, E> RequestState<T, E> {
    #[must_use]
    pub fn status(&self) -> Status {
        match self {
            Self::Idle => Status::Idle,
            Self::Loading => Status::Loading,
            Self::Success(_) => Status::Success,
            Self::Failure(_) => Status::Failure,
        }
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    #[must_use]
    pub fn result(&self) -> Option<&T> {
        match self {
            Self::Success(result) => Some(result),
            _ => None,
        }
    }

    #[must_use]
    pub fn error(&self) -> Option<&E> {
        match self {
            Self::Failure(error) => Some(error),
            _ => None,
        }
    }

    /// Consume the state, keeping the result.
    #[must_use]
    pub fn into_result(self) -> Option<T> {
        match self {
            Self::Success(result) => Some(result),
            _ => None,
        }
    }
}

impl<T, E: FailureDetail> RequestState<T, E> {
    /// Banner message of a failure.
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        self.error().map(FailureDetail::message)
    }

    /// Per-field annotations of a validation failure.
    #[must_use]
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        self.error().and_then(FailureDetail::field_errors)
    }
}

/// Failure payload of a create or update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationError {
    pub message: String,
    /// Present only when the server sent `field_validations`.
    pub field_errors: Option<FieldErrors>,
}

impl MutationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            field_errors: None,
        }
    }
}

impl fmt::Display for MutationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// How a [`ClientError`] is captured into a failure state.
pub trait FailureDetail: Clone + Send + Sync + 'static {
    fn from_client_error(error: &ClientError) -> Self;

    fn message(&self) -> &str;

    fn field_errors(&self) -> Option<&FieldErrors> {
        None
    }
}

/// List, get and delete failures keep the message only.
impl FailureDetail for String {
    fn from_client_error(error: &ClientError) -> Self {
        error.message()
    }

    fn message(&self) -> &str {
        self
    }
}

impl FailureDetail for MutationError {
    fn from_client_error(error: &ClientError) -> Self {
        Self {
            message: error.message(),
            field_errors: error.field_errors().cloned(),
        }
    }

    fn message(&self) -> &str {
        &self.message
    }

    fn field_errors(&self) -> Option<&FieldErrors> {
        self.field_errors.as_ref()
    }
}
