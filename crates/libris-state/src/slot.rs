//! Lifecycle slots: one [`RequestState`] per (entity, operation) pair.
//!
//! A slot is the only writer of its state. Requests go through three calls:
//! [`Slot::begin`] moves the slot to `Loading` and hands out a [`Ticket`],
//! the caller performs the request, then [`Slot::finish`] applies the
//! outcome. Every ticket carries a sequence number; a completion is applied
//! only when its ticket is the most recently issued one, so a slow response
//! can never overwrite the answer to a later request. [`Slot::reset`]
//! invalidates every outstanding ticket.

use std::sync::{Mutex, PoisonError};

use thiserror::Error;
use tokio::sync::watch;

use crate::request_state::{RequestState, Status};

/// Errors raised by the lifecycle itself rather than captured into a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum LifecycleError {
    /// An exclusive slot already has a request in flight.
    #[error("{slot} is already in progress")]
    Busy { slot: &'static str },

    /// The server rejected the session; the slot went back to idle.
    #[error("session expired, please log in again")]
    SessionExpired,

    /// The caller cancelled the request; the slot went back to idle.
    #[error("request cancelled")]
    Cancelled,
}

/// How a slot treats a new request while one is still in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotPolicy {
    /// Accept it; only the newest request's response is applied.
    LatestWins,
    /// Reject it with [`LifecycleError::Busy`]; callers must serialize.
    Exclusive,
}

/// Proof that a request was started on a slot.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a ticket must be finished or abandoned"]
pub struct Ticket {
    seq: u64,
}

impl Ticket {
    #[must_use]
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

#[derive(Debug, Default)]
struct Sequence {
    /// Highest sequence number handed out.
    issued: u64,
    /// Tickets at or below this number are stale.
    floor: u64,
}

/// One observable request lifecycle.
#[derive(Debug)]
pub struct Slot<T, E> {
    name: &'static str,
    policy: SlotPolicy,
    state: watch::Sender<RequestState<T, E>>,
    sequence: Mutex<Sequence>,
}

impl<T, E> Slot<T, E>
where
    T: Clone,
    E: Clone,
{
    pub fn new(name: &'static str, policy: SlotPolicy) -> Self {
        let (state, _) = watch::channel(RequestState::Idle);
        Self {
            name,
            policy,
            state,
            sequence: Mutex::new(Sequence::default()),
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub fn policy(&self) -> SlotPolicy {
        self.policy
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> RequestState<T, E> {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn status(&self) -> Status {
        self.state.borrow().status()
    }

    /// Receiver notified on every transition.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<RequestState<T, E>> {
        self.state.subscribe()
    }

    fn sequence(&self) -> std::sync::MutexGuard<'_, Sequence> {
        self.sequence.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start a request: the slot is `Loading` when this returns.
    pub fn begin(&self) -> Result<Ticket, LifecycleError> {
        let mut sequence = self.sequence();
        if self.policy == SlotPolicy::Exclusive && self.state.borrow().is_loading() {
            tracing::debug!(slot = self.name, "rejected request while busy");
            return Err(LifecycleError::Busy { slot: self.name });
        }
        sequence.issued += 1;
        let seq = sequence.issued;
        self.state.send_replace(RequestState::Loading);
        tracing::trace!(slot = self.name, seq, "loading");
        Ok(Ticket { seq })
    }

    fn is_current(sequence: &Sequence, ticket: &Ticket) -> bool {
        ticket.seq == sequence.issued && ticket.seq > sequence.floor
    }

    /// Apply the outcome of `ticket`'s request.
    ///
    /// Returns `false` when the ticket was stale and the outcome discarded.
    pub fn finish(&self, ticket: Ticket, outcome: Result<T, E>) -> bool {
        let mut sequence = self.sequence();
        if !Self::is_current(&sequence, &ticket) {
            tracing::debug!(
                slot = self.name,
                seq = ticket.seq,
                latest = sequence.issued,
                "discarding stale response"
            );
            return false;
        }
        sequence.floor = ticket.seq;
        let next = match outcome {
            Ok(result) => RequestState::Success(result),
            Err(error) => RequestState::Failure(error),
        };
        tracing::trace!(slot = self.name, seq = ticket.seq, status = %next.status(), "finished");
        self.state.send_replace(next);
        true
    }

    /// Drop `ticket`'s request without a terminal state.
    ///
    /// If it is still the current request the slot returns to `Idle`.
    pub fn abandon(&self, ticket: Ticket) -> bool {
        let mut sequence = self.sequence();
        if !Self::is_current(&sequence, &ticket) {
            return false;
        }
        sequence.floor = ticket.seq;
        self.state.send_replace(RequestState::Idle);
        true
    }

    /// Return to `Idle` and invalidate every in-flight ticket.
    ///
    /// Resetting an idle slot changes nothing and notifies no one.
    pub fn reset(&self) {
        let mut sequence = self.sequence();
        sequence.floor = sequence.issued;
        self.state.send_if_modified(|state| {
            if state.is_idle() {
                false
            } else {
                *state = RequestState::Idle;
                true
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestSlot = Slot<u32, String>;

    #[test]
    fn begin_then_finish() {
        let slot = TestSlot::new("test", SlotPolicy::LatestWins);
        assert_eq!(slot.status(), Status::Idle);

        let ticket = slot.begin().unwrap();
        assert_eq!(slot.status(), Status::Loading);

        assert!(slot.finish(ticket, Ok(7)));
        assert_eq!(slot.state(), RequestState::Success(7));
    }

    #[test]
    fn older_response_is_discarded() {
        let slot = TestSlot::new("list", SlotPolicy::LatestWins);
        let first = slot.begin().unwrap();
        let second = slot.begin().unwrap();

        assert!(slot.finish(second, Ok(2)));
        assert!(!slot.finish(first, Ok(1)));
        assert_eq!(slot.state(), RequestState::Success(2));
    }

    #[test]
    fn older_response_does_not_end_newer_loading() {
        let slot = TestSlot::new("list", SlotPolicy::LatestWins);
        let first = slot.begin().unwrap();
        let second = slot.begin().unwrap();

        assert!(!slot.finish(first, Err("late".to_string())));
        assert_eq!(slot.status(), Status::Loading);
        assert!(slot.finish(second, Ok(2)));
    }

    #[test]
    fn exclusive_slot_rejects_overlap() {
        let slot = TestSlot::new("create", SlotPolicy::Exclusive);
        let ticket = slot.begin().unwrap();
        assert_eq!(slot.begin(), Err(LifecycleError::Busy { slot: "create" }));

        assert!(slot.finish(ticket, Ok(1)));
        // Terminal states do not block a new request.
        assert!(slot.begin().is_ok());
    }

    #[test]
    fn reset_invalidates_in_flight() {
        let slot = TestSlot::new("get", SlotPolicy::LatestWins);
        let ticket = slot.begin().unwrap();
        slot.reset();
        assert_eq!(slot.status(), Status::Idle);
        assert!(!slot.finish(ticket, Ok(5)));
        assert_eq!(slot.state(), RequestState::Idle);
    }

    #[test]
    fn reset_is_idempotent() {
        let slot = TestSlot::new("delete", SlotPolicy::Exclusive);
        let mut rx = slot.subscribe();
        slot.reset();
        assert!(!rx.has_changed().unwrap());

        let ticket = slot.begin().unwrap();
        slot.finish(ticket, Err("nope".to_string()));
        slot.reset();
        slot.reset();
        assert_eq!(slot.state(), RequestState::Idle);
    }

    #[test]
    fn abandon_returns_to_idle() {
        let slot = TestSlot::new("update", SlotPolicy::Exclusive);
        let ticket = slot.begin().unwrap();
        assert!(slot.abandon(ticket));
        assert_eq!(slot.status(), Status::Idle);
    }

    #[test]
    fn observers_see_every_transition() {
        let slot = TestSlot::new("list", SlotPolicy::LatestWins);
        let mut rx = slot.subscribe();

        let ticket = slot.begin().unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().status(), Status::Loading);

        slot.finish(ticket, Ok(1));
        assert_eq!(rx.borrow_and_update().status(), Status::Success);
    }
}
