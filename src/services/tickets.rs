//! Support ticket service

use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        activity::{Entity, NewActivity},
        enums::Role,
        ticket::{CreateTicket, Ticket, TicketDetails, UpdateTicketStatus},
        user::UserClaims,
    },
    repository::{
        tickets::{NewTicket, TicketChange, TicketScope},
        Repository,
    },
    services::activity::ActivityService,
    workflow::{plan_ticket_transition, Plan, TicketEffect},
};

#[derive(Clone)]
pub struct TicketsService {
    repository: Repository,
    activity: ActivityService,
}

/// Tickets a principal may see: admins all, HODs their department, lab
/// incharges the ones they raised. Deans have no ticket view.
pub fn ticket_scope(claims: &UserClaims) -> AppResult<TicketScope> {
    match claims.role {
        Role::Admin => Ok(TicketScope::All),
        Role::Hod => Ok(TicketScope::Department(claims.require_department()?)),
        Role::LabIncharge => Ok(TicketScope::CreatedBy(claims.user_id)),
        Role::Dean => Err(AppError::Authorization("Tickets are not visible to the Dean".to_string())),
    }
}

impl TicketsService {
    pub fn new(repository: Repository, activity: ActivityService) -> Self {
        Self { repository, activity }
    }

    pub async fn list(&self, claims: &UserClaims) -> AppResult<Vec<TicketDetails>> {
        self.repository.tickets_list(ticket_scope(claims)?).await
    }

    pub async fn get(&self, claims: &UserClaims, id: Uuid) -> AppResult<TicketDetails> {
        self.repository.tickets_get_details(id, ticket_scope(claims)?).await
    }

    /// Raise a ticket; the lab defaults to the incharge's own lab
    pub async fn create(&self, claims: &UserClaims, data: CreateTicket) -> AppResult<Ticket> {
        if let Some(asset_id) = data.asset_id {
            self.repository.assets_get_by_id(asset_id).await?;
        }

        let ticket = NewTicket {
            title: data.title.trim().to_string(),
            description: data.description,
            issue_type: data.issue_type,
            priority: data.priority.unwrap_or_default(),
            asset_id: data.asset_id,
            department_id: data.department_id,
            lab_id: data.lab_id.or(claims.lab_id),
            created_by_id: claims.user_id,
        };
        let ticket = self.repository.tickets_insert(&ticket).await?;

        self.activity
            .record(
                NewActivity::new(claims.user_id, "CREATE", Entity::Ticket, ticket.id)
                    .details(format!("{}: {}", ticket.ticket_number, ticket.title))
                    .department(Some(ticket.department_id))
                    .lab(ticket.lab_id),
            )
            .await;
        Ok(ticket)
    }

    /// Move a ticket through its lifecycle under a row lock
    pub async fn update_status(
        &self,
        claims: &UserClaims,
        id: Uuid,
        data: UpdateTicketStatus,
    ) -> AppResult<TicketDetails> {
        let mut tx = self.repository.begin().await?;
        let ticket = self.repository.tickets_lock(&mut *tx, id).await?;

        let is_creator = ticket.created_by_id == claims.user_id;
        let plan = plan_ticket_transition(claims.role, is_creator, ticket.status, data.status)?;
        let Plan::Apply { from, to, effects } = plan else {
            tx.rollback().await?;
            return self.repository.tickets_get_details(id, TicketScope::All).await;
        };

        let mut change = TicketChange {
            remarks: data
                .remarks
                .map(|r| r.trim().to_string())
                .filter(|r| !r.is_empty()),
            ..Default::default()
        };
        for effect in effects {
            match effect {
                TicketEffect::AssignToActor => change.assigned_to_id = Some(claims.user_id),
                TicketEffect::ClaimIfUnassigned => {
                    if ticket.assigned_to_id.is_none() {
                        change.assigned_to_id = Some(claims.user_id);
                    }
                }
                TicketEffect::StampResolution => change.resolved = true,
            }
        }

        let updated = self.repository.tickets_apply(&mut *tx, id, to, &change).await?;

        let entry = NewActivity::new(claims.user_id, to.as_str(), Entity::Ticket, id)
            .details(format!("{}: {} -> {}", updated.ticket_number, from, to))
            .department(Some(updated.department_id))
            .lab(updated.lab_id);
        self.repository.activities_insert(&mut *tx, &entry).await?;

        tx.commit().await?;
        tracing::info!(
            "Ticket {} moved {} -> {} by {} ({})",
            updated.ticket_number,
            from,
            to,
            claims.user_id,
            claims.role
        );

        self.repository.tickets_get_details(id, TicketScope::All).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(role: Role, department_id: Option<Uuid>) -> UserClaims {
        UserClaims {
            sub: "staff@example.edu".to_string(),
            user_id: Uuid::new_v4(),
            role,
            department_id,
            lab_id: None,
            exp: 0,
            iat: 0,
        }
    }

    #[test]
    fn scopes_follow_role() {
        let dept = Uuid::new_v4();
        assert_eq!(ticket_scope(&claims(Role::Admin, None)).unwrap(), TicketScope::All);
        assert_eq!(
            ticket_scope(&claims(Role::Hod, Some(dept))).unwrap(),
            TicketScope::Department(dept)
        );

        let incharge = claims(Role::LabIncharge, None);
        assert_eq!(ticket_scope(&incharge).unwrap(), TicketScope::CreatedBy(incharge.user_id));

        assert!(matches!(
            ticket_scope(&claims(Role::Dean, None)),
            Err(AppError::Authorization(_))
        ));
    }
}
