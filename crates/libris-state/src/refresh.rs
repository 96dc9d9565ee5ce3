//! Keeping the visible list in step with mutations.
//!
//! The lifecycle slots never refresh anything by themselves: a finished
//! create, update or delete stays in `Success` or `Failure` until the user
//! dismisses it. Dismissal goes through [`MutationRefresh::acknowledge`],
//! which re-issues the current list query on success and then resets the
//! mutation slot.

use libris_client::Resource;
use libris_model::ListQuery;

use crate::request_state::Status;
use crate::slot::LifecycleError;
use crate::store::{EntityStore, ListState, Mutation};

/// What an acknowledgement did.
#[derive(Debug, Clone, PartialEq)]
pub enum Acknowledgement<R: Resource> {
    /// The mutation succeeded; the list was fetched again.
    Refreshed(ListState<R>),
    /// The mutation failed; only the slot was reset.
    Dismissed,
    /// Nothing to acknowledge: the slot was idle or still loading.
    Pending(Status),
}

/// Refresh-and-reset for one entity store.
#[derive(Debug, Clone)]
pub struct MutationRefresh<'a, R: Resource> {
    store: &'a EntityStore<R>,
}

impl<'a, R: Resource> MutationRefresh<'a, R> {
    pub fn new(store: &'a EntityStore<R>) -> Self {
        Self { store }
    }

    /// Dismiss the outcome of `mutation`.
    ///
    /// On success the list is fetched again with `current_query` (if it is
    /// ready) before the mutation slot is reset, so the confirmation stays
    /// visible until fresh data is in.
    pub async fn acknowledge(
        &self,
        mutation: Mutation,
        current_query: &ListQuery,
    ) -> Result<Acknowledgement<R>, LifecycleError> {
        match self.store.mutation_status(mutation) {
            Status::Success => {
                let listed = if current_query.is_ready() {
                    self.store.list(current_query.clone()).await
                } else {
                    Ok(self.store.list_state())
                };
                self.store.reset_mutation(mutation);
                Ok(Acknowledgement::Refreshed(listed?))
            }
            Status::Failure => {
                self.store.reset_mutation(mutation);
                Ok(Acknowledgement::Dismissed)
            }
            status @ (Status::Idle | Status::Loading) => Ok(Acknowledgement::Pending(status)),
        }
    }
}
