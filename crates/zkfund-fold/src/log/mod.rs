//! Action log
//!
//! Dispatched actions are appended in arrival order and folded into a single
//! Rescue accumulator (`ActionState`). Dispatch never touches a map; map
//! effects are deferred to batch folding.

mod action;
mod action_log;

pub use action::{Action, ActionState};
pub use action_log::{ActionLog, LoggedAction, PendingActions};
