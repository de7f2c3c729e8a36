//! Request and ticket lifecycle rules
//!
//! Both lifecycles are flat tables of `(from statuses, actor role, to status)`
//! rows. Planning a transition is pure: it returns the side effects the
//! services must apply, so the tables can be checked without a database.
//!
//! Re-requesting the status an item already has is not an error when the
//! actor could legitimately have moved it there: the plan is
//! [`Plan::Unchanged`] and no side effect runs twice.

pub mod request;
pub mod ticket;

use std::fmt;

use crate::{error::AppError, models::enums::Role};

pub use request::{plan_request_transition, RequestEffect};
pub use ticket::{plan_ticket_transition, TicketEffect};

/// Outcome of planning a status change
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Plan<S, E> {
    /// The item already has the requested status
    Unchanged,
    Apply { from: S, to: S, effects: Vec<E> },
}

impl<S, E> Plan<S, E> {
    pub fn is_unchanged(&self) -> bool {
        matches!(self, Plan::Unchanged)
    }
}

/// Why a status change was refused
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    /// The actor's role may never set this status
    Forbidden { role: Role, to: String },
    /// The role may set this status, but not from the current one
    Illegal { from: String, to: String },
}

impl fmt::Display for TransitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransitionError::Forbidden { role, to } => {
                write!(f, "{} cannot set status {}", role, to)
            }
            TransitionError::Illegal { from, to } => {
                write!(f, "Cannot move from {} to {}", from, to)
            }
        }
    }
}

impl std::error::Error for TransitionError {}

impl From<TransitionError> for AppError {
    fn from(e: TransitionError) -> Self {
        match e {
            TransitionError::Forbidden { .. } => AppError::Authorization(e.to_string()),
            TransitionError::Illegal { .. } => AppError::BusinessRule(e.to_string()),
        }
    }
}

/// One row of a lifecycle table
pub(crate) struct Rule<S: 'static> {
    pub from: &'static [S],
    pub actor: Role,
    pub to: S,
}

/// Shared lookup over a rule table
pub(crate) fn lookup<S>(
    rules: &[Rule<S>],
    role: Role,
    current: S,
    target: S,
) -> Result<Option<(S, S)>, TransitionError>
where
    S: Copy + PartialEq + fmt::Display,
{
    let mut reachable = rules.iter().filter(|r| r.actor == role && r.to == target).peekable();

    if reachable.peek().is_none() {
        return Err(TransitionError::Forbidden {
            role,
            to: target.to_string(),
        });
    }

    if current == target {
        return Ok(None);
    }

    if reachable.any(|r| r.from.contains(&current)) {
        Ok(Some((current, target)))
    } else {
        Err(TransitionError::Illegal {
            from: current.to_string(),
            to: target.to_string(),
        })
    }
}
