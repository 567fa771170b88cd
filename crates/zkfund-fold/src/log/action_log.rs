//! Append-only action log

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::action::{Action, ActionState};
use crate::error::{FoldError, FoldResult};

/// An action together with the log state right after it was appended
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "A: Action")]
pub struct LoggedAction<A> {
    pub action: A,
    pub state: ActionState,
}

/// Read-only view over actions that have not been settled yet
#[derive(Debug, Clone)]
pub struct PendingActions<'a, A> {
    entries: &'a [LoggedAction<A>],
}

impl<'a, A> PendingActions<'a, A> {
    pub fn new(entries: &'a [LoggedAction<A>]) -> Self {
        Self { entries }
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a A> + 'a {
        self.entries.iter().map(|entry| &entry.action)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Totally ordered, append-only log of dispatched actions
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound = "A: Action")]
pub struct ActionLog<A> {
    entries: Vec<LoggedAction<A>>,
}

impl<A: Action> Default for ActionLog<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Action> ActionLog<A> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// State after the most recent action (genesis for an empty log)
    pub fn tip(&self) -> ActionState {
        self.entries
            .last()
            .map(|entry| entry.state)
            .unwrap_or_else(ActionState::genesis)
    }

    /// Append `action` and return the new tip
    pub fn dispatch(&mut self, action: A) -> ActionState {
        let state = self.tip().append(&action);
        trace!(position = self.entries.len(), %state, "action appended");
        self.entries.push(LoggedAction { action, state });
        state
    }

    /// Number of actions covered by `state`, if it is a position of this log
    pub fn position_of(&self, state: &ActionState) -> Option<usize> {
        if *state == ActionState::genesis() {
            return Some(0);
        }
        self.entries
            .iter()
            .rposition(|entry| entry.state == *state)
            .map(|i| i + 1)
    }

    /// Every action appended after `state`
    pub fn entries_since(&self, state: &ActionState) -> FoldResult<&[LoggedAction<A>]> {
        let start = self
            .position_of(state)
            .ok_or(FoldError::UnknownActionState(state.digest()))?;
        Ok(&self.entries[start..])
    }

    /// Actions strictly after `from` up to and including `to`
    pub fn actions_between(
        &self,
        from: &ActionState,
        to: &ActionState,
    ) -> FoldResult<&[LoggedAction<A>]> {
        let start = self
            .position_of(from)
            .ok_or(FoldError::UnknownActionState(from.digest()))?;
        let end = self
            .position_of(to)
            .ok_or(FoldError::UnknownActionState(to.digest()))?;
        if end < start {
            return Err(FoldError::InvertedSpan {
                from: from.digest(),
                to: to.digest(),
            });
        }
        Ok(&self.entries[start..end])
    }

    /// Actions since `state`, cloned for handing to a prover
    pub fn actions_since(&self, state: &ActionState) -> FoldResult<Vec<A>> {
        Ok(self
            .entries_since(state)?
            .iter()
            .map(|entry| entry.action.clone())
            .collect())
    }

    pub fn pending_since(&self, state: &ActionState) -> FoldResult<PendingActions<'_, A>> {
        Ok(PendingActions::new(self.entries_since(state)?))
    }

    pub fn iter(&self) -> impl Iterator<Item = &LoggedAction<A>> {
        self.entries.iter()
    }
}
