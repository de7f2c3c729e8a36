//! Request workflow service
//!
//! Status changes run in one transaction: the request row is locked, the
//! transition planned, fields and side effects applied and the activity
//! appended before commit. Two Deans approving the same request therefore
//! serialize on the lock, and the second one sees an unchanged request.

use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        activity::{Entity, NewActivity},
        enums::{RequestType, Role, UserStatus},
        lab::{LabProvision, PENDING_LOCATION},
        request::{CreateRequest, NewRequest, Request, RequestDetails, UpdateRequestStatus},
        user::UserClaims,
    },
    repository::{
        requests::{RequestChange, RequestScope},
        Repository,
    },
    services::activity::ActivityService,
    workflow::{plan_request_transition, Plan, RequestEffect},
};

#[derive(Clone)]
pub struct RequestsService {
    repository: Repository,
    activity: ActivityService,
}

/// Requests a principal may see
pub fn request_scope(claims: &UserClaims) -> AppResult<RequestScope> {
    match claims.role {
        Role::Dean => Ok(RequestScope::All),
        Role::Admin => Ok(RequestScope::Actionable { admin_id: claims.user_id }),
        Role::Hod => Ok(RequestScope::Department(claims.require_department()?)),
        Role::LabIncharge => Err(AppError::Authorization(
            "Requests are not visible to lab incharges".to_string(),
        )),
    }
}

/// Code for a lab provisioned without one
fn generated_lab_code() -> String {
    format!("LAB-{}", Uuid::new_v4().simple().to_string()[..8].to_uppercase())
}

impl RequestsService {
    pub fn new(repository: Repository, activity: ActivityService) -> Self {
        Self { repository, activity }
    }

    pub async fn list(&self, claims: &UserClaims) -> AppResult<Vec<RequestDetails>> {
        self.repository.requests_list(request_scope(claims)?).await
    }

    pub async fn get(&self, claims: &UserClaims, id: Uuid) -> AppResult<RequestDetails> {
        self.repository.requests_get_details(id, request_scope(claims)?).await
    }

    /// File a request for the HOD's own department
    pub async fn create(&self, claims: &UserClaims, data: CreateRequest) -> AppResult<Request> {
        if data.request_type == RequestType::AccountApproval {
            return Err(AppError::BadRequest(
                "Account approvals are filed on registration".to_string(),
            ));
        }

        let own_department = claims.require_department()?;
        let department_id = data.department_id.unwrap_or(own_department);
        if department_id != own_department {
            return Err(AppError::Authorization(
                "Requests can only be filed for your own department".to_string(),
            ));
        }

        let new_request = NewRequest {
            title: data.title.trim().to_string(),
            description: data.description,
            request_type: data.request_type,
            priority: data.priority.unwrap_or_default(),
            department_id,
            created_by_id: claims.user_id,
        };
        let mut conn = self.repository.pool.acquire().await?;
        let request = self.repository.requests_insert(&mut conn, &new_request).await?;

        self.activity
            .record(
                NewActivity::new(claims.user_id, "CREATE", Entity::Request, request.id)
                    .details(format!("{}: {}", request.request_number, request.title))
                    .department(Some(request.department_id)),
            )
            .await;
        Ok(request)
    }

    /// Apply a status change and its side effects atomically
    pub async fn update_status(
        &self,
        claims: &UserClaims,
        id: Uuid,
        data: UpdateRequestStatus,
    ) -> AppResult<RequestDetails> {
        let mut tx = self.repository.begin().await?;
        let request = self.repository.requests_lock(&mut *tx, id).await?;

        let plan = plan_request_transition(claims.role, request.request_type, request.status, data.status)?;
        let Plan::Apply { from, to, effects } = plan else {
            tx.rollback().await?;
            tracing::debug!("Request {} already {}", request.request_number, request.status);
            return self.repository.requests_get_details(id, RequestScope::All).await;
        };

        let lab_fields = data.lab_fields();
        let mut change = RequestChange {
            remarks: data
                .remarks
                .as_deref()
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .map(str::to_string),
            ..Default::default()
        };
        let mut notes = Vec::new();

        for effect in effects {
            match effect {
                RequestEffect::StampDecision => change.decided_by = Some(claims.user_id),
                RequestEffect::ActivateAccount => {
                    self.repository
                        .users_set_status(&mut *tx, request.created_by_id, UserStatus::Active)
                        .await?;
                    notes.push("account activated".to_string());
                }
                RequestEffect::RejectAccount => {
                    self.repository
                        .users_set_status(&mut *tx, request.created_by_id, UserStatus::Rejected)
                        .await?;
                    notes.push("account rejected".to_string());
                }
                RequestEffect::ProvisionLab => {
                    let provision = LabProvision {
                        name: request.title.trim().to_string(),
                        code: lab_fields.code.clone().unwrap_or_else(generated_lab_code),
                        department_id: request.department_id,
                        capacity: lab_fields.capacity.unwrap_or(0),
                        location: lab_fields
                            .location
                            .clone()
                            .unwrap_or_else(|| PENDING_LOCATION.to_string()),
                    };
                    match self.repository.labs_provision(&mut *tx, &provision).await? {
                        Some(lab) => {
                            tracing::info!("Lab {} ({}) provisioned for {}", lab.name, lab.code, request.request_number);
                            notes.push(format!("lab {} created", lab.code));
                        }
                        None => {
                            tracing::info!("Lab {} already exists, nothing provisioned", provision.name);
                        }
                    }
                }
                RequestEffect::AssignAdmin => {
                    let admin_id = match data.assigned_admin_id {
                        Some(admin_id) => {
                            let admin = self.repository.users_get_by_id(admin_id).await?;
                            if admin.role != Role::Admin {
                                return Err(AppError::BadRequest(format!(
                                    "User {} is not a system admin",
                                    admin_id
                                )));
                            }
                            admin_id
                        }
                        None => claims.user_id,
                    };
                    change.assign_to = Some(admin_id);
                }
                RequestEffect::ClaimIfUnassigned => change.claim_for = Some(claims.user_id),
                RequestEffect::StampCompletion => change.completed = true,
                RequestEffect::FinalizeLab => {
                    if lab_fields.is_empty() {
                        continue;
                    }
                    let lab = self
                        .repository
                        .labs_finalize(&mut *tx, request.title.trim(), request.department_id, &lab_fields)
                        .await?;
                    match lab {
                        Some(lab) => notes.push(format!("lab {} finalized", lab.code)),
                        None => tracing::warn!(
                            "No lab named {} to finalize for {}",
                            request.title,
                            request.request_number
                        ),
                    }
                }
            }
        }

        let updated = self.repository.requests_apply(&mut *tx, id, to, &change).await?;

        let mut details = format!("{}: {} -> {}", updated.request_number, from, to);
        if !notes.is_empty() {
            details.push_str(&format!(" ({})", notes.join(", ")));
        }
        let entry = NewActivity::new(claims.user_id, to.as_str(), Entity::Request, id)
            .details(details)
            .department(Some(updated.department_id));
        self.repository.activities_insert(&mut *tx, &entry).await?;

        tx.commit().await?;
        tracing::info!(
            "Request {} moved {} -> {} by {} ({})",
            updated.request_number,
            from,
            to,
            claims.user_id,
            claims.role
        );

        self.repository.requests_get_details(id, RequestScope::All).await
    }
}
