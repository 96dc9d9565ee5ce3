//! Request lifecycles for the libris dashboard.
//!
//! Every (entity, operation) pair owns one [`Slot`] holding a
//! [`RequestState`]. Operations go `Idle → Loading → Success | Failure` and
//! stay there until the caller resets the slot, usually through
//! [`MutationRefresh::acknowledge`] after a create, update or delete.
//!
//! - [`EntityStore`] instantiates the slots for books, collections and
//!   locations; [`LoginStore`] handles the login form and the session.
//! - [`ListQueryCoordinator`] debounces search input and decides when the
//!   list must be fetched again; [`drive_list_queries`] runs it.
//! - [`Library`] bundles all stores over one [`libris_client::ApiClient`].

#![warn(clippy::all)]

pub mod coordinator;
pub mod refresh;
pub mod request_state;
pub mod slot;
pub mod store;

pub use coordinator::{
    CoordinatorConfig, DEFAULT_DEBOUNCE, ListQueryCoordinator, QueryEvent, drive_list_queries,
};
pub use refresh::{Acknowledgement, MutationRefresh};
pub use request_state::{FailureDetail, MutationError, RequestState, Status};
pub use slot::{LifecycleError, Slot, SlotPolicy, Ticket};
pub use store::{
    EntityStore, ItemState, Library, ListState, LoginState, LoginStore, Mutation, MutationState,
    Outcome,
};
