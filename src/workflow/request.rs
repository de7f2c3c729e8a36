//! Request lifecycle
//!
//! | From                            | Actor | To          |
//! |---------------------------------|-------|-------------|
//! | PENDING                         | Dean  | APPROVED    |
//! | PENDING                         | Dean  | DECLINED    |
//! | APPROVED                        | Admin | ASSIGNED    |
//! | APPROVED, ASSIGNED              | Admin | IN_PROGRESS |
//! | APPROVED, ASSIGNED, IN_PROGRESS | Admin | COMPLETED   |
//!
//! ACCOUNT_APPROVAL requests stop at APPROVED or DECLINED.

use super::{lookup, Plan, Rule, TransitionError};
use crate::models::enums::{RequestStatus, RequestType, Role};

use RequestStatus::*;

const RULES: &[Rule<RequestStatus>] = &[
    Rule { from: &[Pending], actor: Role::Dean, to: Approved },
    Rule { from: &[Pending], actor: Role::Dean, to: Declined },
    Rule { from: &[Approved], actor: Role::Admin, to: Assigned },
    Rule { from: &[Approved, Assigned], actor: Role::Admin, to: InProgress },
    Rule { from: &[Approved, Assigned, InProgress], actor: Role::Admin, to: Completed },
];

/// Side effects of a request status change, in application order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestEffect {
    /// Record the deciding Dean and time
    StampDecision,
    /// Set the gated user ACTIVE
    ActivateAccount,
    /// Set the gated user REJECTED
    RejectAccount,
    /// Create the lab named after the request unless it exists
    ProvisionLab,
    /// Assign the admin named in the payload, or the actor
    AssignAdmin,
    /// Assign the actor when nobody is assigned yet
    ClaimIfUnassigned,
    StampCompletion,
    /// Copy supplied lab code, capacity and location onto the provisioned lab
    FinalizeLab,
}

pub type RequestPlan = Plan<RequestStatus, RequestEffect>;

/// Plan a status change on a request of `request_type` currently in `current`
pub fn plan_request_transition(
    role: Role,
    request_type: RequestType,
    current: RequestStatus,
    target: RequestStatus,
) -> Result<RequestPlan, TransitionError> {
    if request_type == RequestType::AccountApproval && !matches!(target, Approved | Declined | Pending) {
        return Err(TransitionError::Illegal {
            from: current.to_string(),
            to: target.to_string(),
        });
    }

    let Some((from, to)) = lookup(RULES, role, current, target)? else {
        return Ok(Plan::Unchanged);
    };

    Ok(Plan::Apply {
        from,
        to,
        effects: effects_for(request_type, to),
    })
}

fn effects_for(request_type: RequestType, to: RequestStatus) -> Vec<RequestEffect> {
    let mut effects = Vec::new();
    match to {
        Approved => {
            effects.push(RequestEffect::StampDecision);
            match request_type {
                RequestType::LabSetup => effects.push(RequestEffect::ProvisionLab),
                RequestType::AccountApproval => effects.push(RequestEffect::ActivateAccount),
                _ => {}
            }
        }
        Declined => {
            effects.push(RequestEffect::StampDecision);
            if request_type == RequestType::AccountApproval {
                effects.push(RequestEffect::RejectAccount);
            }
        }
        Assigned => effects.push(RequestEffect::AssignAdmin),
        InProgress => effects.push(RequestEffect::ClaimIfUnassigned),
        Completed => {
            effects.push(RequestEffect::ClaimIfUnassigned);
            effects.push(RequestEffect::StampCompletion);
            if request_type == RequestType::LabSetup {
                effects.push(RequestEffect::FinalizeLab);
            }
        }
        Pending => {}
    }
    effects
}
