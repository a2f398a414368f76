//! Lifecycle phases and the closed set of action signatures.
//!
//! Each command carries at most one action per phase. The signatures are
//! fixed aliases rather than `Any`-typed storage, so an after-failure action
//! always receives the error that failed the run and a before/do action
//! always receives the resolved [`Args`].

use std::fmt;

use serde::Serialize;

use crate::args::Args;
use crate::error::{BoxError, Error};
use crate::session::Session;

/// Result type returned by every application-supplied action.
pub type ActionResult = Result<(), BoxError>;

/// Predicate run before the before phase; an error marks the command
/// disabled for this invocation.
pub type DisableAction = Box<dyn Fn(&Session) -> ActionResult + Send + Sync>;

/// Action invoked in the before phase with the resolved arguments.
pub type BeforeAction = Box<dyn FnMut(&Session, &Args) -> ActionResult + Send>;

/// The command's primary effect.
pub type DoAction = Box<dyn FnMut(&Session, &Args) -> ActionResult + Send>;

/// Invoked when no earlier phase failed.
pub type AfterSuccessAction = Box<dyn FnMut(&Session) -> ActionResult + Send>;

/// Invoked with the error that failed the run.
pub type AfterFailureAction = Box<dyn FnMut(&Session, &Error) -> ActionResult + Send>;

/// Invoked unconditionally with the terminal error, if any.
pub type AfterAlwaysAction = Box<dyn FnMut(&Session, Option<&Error>) -> ActionResult + Send>;

/// Lifecycle phase names, used in diagnostics and configuration errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    Disable,
    Before,
    Do,
    AfterSuccess,
    AfterFailure,
    AfterAlways,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Disable => "disable",
            Phase::Before => "before",
            Phase::Do => "do",
            Phase::AfterSuccess => "after-success",
            Phase::AfterFailure => "after-failure",
            Phase::AfterAlways => "after-always",
        };
        f.write_str(name)
    }
}

/// Per-phase execution state.
///
/// Every phase moves `Pending → Invoked → Consumed` exactly once; a consumed
/// phase silently no-ops on re-invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PhaseState {
    #[default]
    Pending,
    Invoked,
    Consumed,
}

/// One-shot holder for a phase action.
///
/// `begin()` hands out the action exactly once and transitions to `Invoked`;
/// `consume()` finalizes the slot whether the action succeeded or failed,
/// so a failed phase is never retried.
pub(crate) struct PhaseSlot<A> {
    state: PhaseState,
    action: Option<A>,
}

impl<A> PhaseSlot<A> {
    pub(crate) fn new(action: Option<A>) -> Self {
        Self {
            state: PhaseState::Pending,
            action,
        }
    }

    /// Takes the action if the slot is still pending and an action exists.
    pub(crate) fn begin(&mut self) -> Option<A> {
        if self.state != PhaseState::Pending {
            return None;
        }
        match self.action.take() {
            Some(action) => {
                self.state = PhaseState::Invoked;
                Some(action)
            }
            None => None,
        }
    }

    pub(crate) fn consume(&mut self) {
        self.state = PhaseState::Consumed;
    }

    /// Whether an action exists and has not been handed out yet.
    pub(crate) fn is_armed(&self) -> bool {
        self.state == PhaseState::Pending && self.action.is_some()
    }

    #[cfg(test)]
    pub(crate) fn state(&self) -> PhaseState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_slot_hands_out_action_once() {
        let mut slot: PhaseSlot<u32> = PhaseSlot::new(Some(7));
        assert_eq!(slot.begin(), Some(7));
        slot.consume();
        assert_eq!(slot.state(), PhaseState::Consumed);
        assert_eq!(slot.begin(), None);
    }

    #[test]
    fn test_empty_phase_slot_stays_pending() {
        let mut slot: PhaseSlot<u32> = PhaseSlot::new(None);
        assert_eq!(slot.begin(), None);
        assert_eq!(slot.state(), PhaseState::Pending);
    }

    #[test]
    fn test_phase_display_names() {
        assert_eq!(Phase::Do.to_string(), "do");
        assert_eq!(Phase::AfterFailure.to_string(), "after-failure");
    }
}
