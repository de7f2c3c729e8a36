//! Ticket lifecycle
//!
//! | From                  | Actor        | To         |
//! |-----------------------|--------------|------------|
//! | SUBMITTED             | Admin        | PROCESSING |
//! | SUBMITTED, PROCESSING | Admin        | RESOLVED   |
//! | SUBMITTED, PROCESSING | Admin        | CLOSED     |
//! | SUBMITTED             | Lab Incharge | CLOSED     |
//!
//! A Lab Incharge may only withdraw tickets they raised. A withdrawal is not a
//! resolution, so it leaves `resolved_at` unset.

use super::{lookup, Plan, Rule, TransitionError};
use crate::models::enums::{Role, TicketStatus};

use TicketStatus::*;

const RULES: &[Rule<TicketStatus>] = &[
    Rule { from: &[Submitted], actor: Role::Admin, to: Processing },
    Rule { from: &[Submitted, Processing], actor: Role::Admin, to: Resolved },
    Rule { from: &[Submitted, Processing], actor: Role::Admin, to: Closed },
    Rule { from: &[Submitted], actor: Role::LabIncharge, to: Closed },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketEffect {
    /// Assign the acting admin
    AssignToActor,
    /// Assign the acting admin when nobody is assigned yet
    ClaimIfUnassigned,
    StampResolution,
}

pub type TicketPlan = Plan<TicketStatus, TicketEffect>;

/// Plan a status change; `is_creator` tells whether the actor raised the ticket
pub fn plan_ticket_transition(
    role: Role,
    is_creator: bool,
    current: TicketStatus,
    target: TicketStatus,
) -> Result<TicketPlan, TransitionError> {
    if role == Role::LabIncharge && !is_creator {
        return Err(TransitionError::Forbidden {
            role,
            to: target.to_string(),
        });
    }

    let Some((from, to)) = lookup(RULES, role, current, target)? else {
        return Ok(Plan::Unchanged);
    };

    let effects = match (role, to) {
        (Role::Admin, Processing) => vec![TicketEffect::AssignToActor],
        (Role::Admin, Resolved | Closed) => {
            vec![TicketEffect::ClaimIfUnassigned, TicketEffect::StampResolution]
        }
        _ => Vec::new(),
    };

    Ok(Plan::Apply { from, to, effects })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_walks_the_happy_path() {
        let plan = plan_ticket_transition(Role::Admin, false, Submitted, Processing).unwrap();
        assert_eq!(
            plan,
            Plan::Apply { from: Submitted, to: Processing, effects: vec![TicketEffect::AssignToActor] }
        );

        let plan = plan_ticket_transition(Role::Admin, false, Processing, Resolved).unwrap();
        match plan {
            Plan::Apply { effects, .. } => assert!(effects.contains(&TicketEffect::StampResolution)),
            Plan::Unchanged => panic!("expected a transition"),
        }
    }

    #[test]
    fn resolved_tickets_stay_resolved() {
        for target in [Processing, Closed, Submitted] {
            assert!(plan_ticket_transition(Role::Admin, false, Resolved, target).is_err());
        }
        assert!(plan_ticket_transition(Role::Admin, false, Resolved, Resolved)
            .unwrap()
            .is_unchanged());
    }

    #[test]
    fn lab_incharge_can_only_withdraw_own_submitted_ticket() {
        let plan = plan_ticket_transition(Role::LabIncharge, true, Submitted, Closed).unwrap();
        assert_eq!(
            plan,
            Plan::Apply { from: Submitted, to: Closed, effects: vec![] }
        );

        let err = plan_ticket_transition(Role::LabIncharge, false, Submitted, Closed).unwrap_err();
        assert!(matches!(err, TransitionError::Forbidden { .. }));

        let err = plan_ticket_transition(Role::LabIncharge, true, Processing, Closed).unwrap_err();
        assert!(matches!(err, TransitionError::Illegal { .. }));

        let err = plan_ticket_transition(Role::LabIncharge, true, Submitted, Resolved).unwrap_err();
        assert!(matches!(err, TransitionError::Forbidden { .. }));
    }

    #[test]
    fn only_admin_closure_counts_as_resolution() {
        let withdrawn = plan_ticket_transition(Role::LabIncharge, true, Submitted, Closed).unwrap();
        let closed = plan_ticket_transition(Role::Admin, false, Submitted, Closed).unwrap();
        match (withdrawn, closed) {
            (Plan::Apply { effects: withdrawn, .. }, Plan::Apply { effects: closed, .. }) => {
                assert!(!withdrawn.contains(&TicketEffect::StampResolution));
                assert!(closed.contains(&TicketEffect::StampResolution));
            }
            other => panic!("expected transitions, got {:?}", other),
        }
    }

    #[test]
    fn deans_and_hods_do_not_touch_tickets() {
        for role in [Role::Dean, Role::Hod] {
            let err = plan_ticket_transition(role, false, Submitted, Processing).unwrap_err();
            assert!(matches!(err, TransitionError::Forbidden { .. }));
        }
    }
}
