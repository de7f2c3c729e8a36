//! Ticket domain methods on Repository

use sqlx::{PgExecutor, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{yearly_number, NumberSequence, Repository};
use crate::{
    error::{AppError, AppResult},
    models::{
        enums::{IssueType, Priority, TicketStatus},
        ticket::{Ticket, TicketDetails},
    },
};

const DETAILS_SELECT: &str = r#"
    SELECT t.*,
           a.asset_number, a.name AS asset_name,
           l.name AS lab_name, l.code AS lab_code,
           d.name AS department_name,
           c.name AS created_by_name,
           s.name AS assigned_to_name
    FROM tickets t
    JOIN departments d ON d.id = t.department_id
    JOIN users c ON c.id = t.created_by_id
    LEFT JOIN assets a ON a.id = t.asset_id
    LEFT JOIN labs l ON l.id = t.lab_id
    LEFT JOIN users s ON s.id = t.assigned_to_id
"#;

/// Which tickets a principal may see
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketScope {
    All,
    CreatedBy(Uuid),
    Department(Uuid),
}

#[derive(Debug, Clone)]
pub struct NewTicket {
    pub title: String,
    pub description: String,
    pub issue_type: IssueType,
    pub priority: Priority,
    pub asset_id: Option<Uuid>,
    pub department_id: Uuid,
    pub lab_id: Option<Uuid>,
    pub created_by_id: Uuid,
}

/// Column changes produced by a ticket transition
#[derive(Debug, Clone, Default)]
pub struct TicketChange {
    pub assigned_to_id: Option<Uuid>,
    pub remarks: Option<String>,
    pub resolved: bool,
}

fn push_scope(qb: &mut QueryBuilder<'_, Postgres>, scope: TicketScope) {
    match scope {
        TicketScope::All => {}
        TicketScope::CreatedBy(user_id) => {
            qb.push(" AND t.created_by_id = ").push_bind(user_id);
        }
        TicketScope::Department(department_id) => {
            qb.push(" AND t.department_id = ").push_bind(department_id);
        }
    }
}

impl Repository {
    /// Tickets visible in `scope`, newest first
    pub async fn tickets_list(&self, scope: TicketScope) -> AppResult<Vec<TicketDetails>> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(DETAILS_SELECT);
        qb.push(" WHERE TRUE");
        push_scope(&mut qb, scope);
        qb.push(" ORDER BY t.created_at DESC");

        let tickets = qb.build_query_as::<TicketDetails>().fetch_all(&self.pool).await?;
        Ok(tickets)
    }

    /// One ticket, reported missing when outside `scope`
    pub async fn tickets_get_details(&self, id: Uuid, scope: TicketScope) -> AppResult<TicketDetails> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(DETAILS_SELECT);
        qb.push(" WHERE t.id = ").push_bind(id);
        push_scope(&mut qb, scope);

        qb.build_query_as::<TicketDetails>()
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Ticket {} not found", id)))
    }

    pub async fn tickets_insert(&self, ticket: &NewTicket) -> AppResult<Ticket> {
        let mut tx = self.begin().await?;
        let seq = self.next_number(&mut *tx, NumberSequence::Ticket).await?;

        let row = sqlx::query_as::<_, Ticket>(
            r#"
            INSERT INTO tickets (id, ticket_number, title, description, issue_type, priority,
                                 asset_id, department_id, lab_id, created_by_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(yearly_number("TKT", seq))
        .bind(&ticket.title)
        .bind(&ticket.description)
        .bind(ticket.issue_type)
        .bind(ticket.priority)
        .bind(ticket.asset_id)
        .bind(ticket.department_id)
        .bind(ticket.lab_id)
        .bind(ticket.created_by_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(row)
    }

    /// Load a ticket and lock its row until the transaction ends
    pub async fn tickets_lock<'e>(&self, executor: impl PgExecutor<'e>, id: Uuid) -> AppResult<Ticket> {
        sqlx::query_as::<_, Ticket>("SELECT * FROM tickets WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(executor)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Ticket {} not found", id)))
    }

    pub async fn tickets_apply<'e>(
        &self,
        executor: impl PgExecutor<'e>,
        id: Uuid,
        status: TicketStatus,
        change: &TicketChange,
    ) -> AppResult<Ticket> {
        let ticket = sqlx::query_as::<_, Ticket>(
            r#"
            UPDATE tickets
            SET status = $2,
                assigned_to_id = COALESCE($3, assigned_to_id),
                remarks = COALESCE($4, remarks),
                resolved_at = CASE WHEN $5 THEN NOW() ELSE resolved_at END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(change.assigned_to_id)
        .bind(&change.remarks)
        .bind(change.resolved)
        .fetch_one(executor)
        .await?;
        Ok(ticket)
    }
}
