//! Request domain methods on Repository

use sqlx::{PgConnection, PgExecutor, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{yearly_number, NumberSequence, Repository};
use crate::{
    error::{AppError, AppResult},
    models::{
        enums::{RequestStatus, RequestType},
        request::{NewRequest, Request, RequestDetails},
    },
};

const DETAILS_SELECT: &str = r#"
    SELECT r.*,
           d.name AS department_name,
           d.code AS department_code,
           c.name AS created_by_name,
           c.email AS created_by_email,
           a.name AS approved_by_name
    FROM requests r
    JOIN departments d ON d.id = r.department_id
    JOIN users c ON c.id = r.created_by_id
    LEFT JOIN users a ON a.id = r.approved_by_id
"#;

/// Which requests a principal may see
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestScope {
    /// Everything (Dean)
    All,
    /// Approved work in flight, plus anything assigned to this admin
    Actionable { admin_id: Uuid },
    /// One department's requests, account approvals excluded
    Department(Uuid),
}

/// Column changes produced by a request transition
#[derive(Debug, Clone, Default)]
pub struct RequestChange {
    pub remarks: Option<String>,
    /// Deciding Dean; stamps approved_at as well
    pub decided_by: Option<Uuid>,
    /// Explicit assignment, replaces the current admin
    pub assign_to: Option<Uuid>,
    /// Assignment that only applies when nobody is assigned
    pub claim_for: Option<Uuid>,
    pub completed: bool,
}

fn push_scope(qb: &mut QueryBuilder<'_, Postgres>, scope: RequestScope) {
    match scope {
        RequestScope::All => {}
        RequestScope::Actionable { admin_id } => {
            qb.push(" AND (r.status IN (");
            let mut statuses = qb.separated(", ");
            for status in [RequestStatus::Approved, RequestStatus::Assigned, RequestStatus::InProgress] {
                statuses.push_bind(status);
            }
            qb.push(") OR r.assigned_admin_id = ").push_bind(admin_id).push(")");
        }
        RequestScope::Department(department_id) => {
            qb.push(" AND r.department_id = ")
                .push_bind(department_id)
                .push(" AND r.request_type != ")
                .push_bind(RequestType::AccountApproval);
        }
    }
}

impl Repository {
    /// Requests visible in `scope`
    pub async fn requests_list(&self, scope: RequestScope) -> AppResult<Vec<RequestDetails>> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(DETAILS_SELECT);
        qb.push(" WHERE TRUE");
        push_scope(&mut qb, scope);
        match scope {
            RequestScope::Actionable { .. } => qb.push(" ORDER BY r.updated_at DESC"),
            _ => qb.push(" ORDER BY r.created_at DESC"),
        };

        let requests = qb.build_query_as::<RequestDetails>().fetch_all(&self.pool).await?;
        Ok(requests)
    }

    /// One request, reported missing when outside `scope`
    pub async fn requests_get_details(&self, id: Uuid, scope: RequestScope) -> AppResult<RequestDetails> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(DETAILS_SELECT);
        qb.push(" WHERE r.id = ").push_bind(id);
        push_scope(&mut qb, scope);

        qb.build_query_as::<RequestDetails>()
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Request {} not found", id)))
    }

    /// Insert a request, numbering it from the shared sequence
    pub async fn requests_insert(&self, conn: &mut PgConnection, request: &NewRequest) -> AppResult<Request> {
        let seq = self.next_number(&mut *conn, NumberSequence::Request).await?;
        let number = match request.request_type {
            RequestType::AccountApproval => format!("REQ-ACC-{:04}", seq),
            _ => yearly_number("REQ", seq),
        };

        let row = sqlx::query_as::<_, Request>(
            r#"
            INSERT INTO requests (id, request_number, title, description, request_type, priority,
                                  department_id, created_by_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(number)
        .bind(&request.title)
        .bind(&request.description)
        .bind(request.request_type)
        .bind(request.priority)
        .bind(request.department_id)
        .bind(request.created_by_id)
        .fetch_one(&mut *conn)
        .await?;
        Ok(row)
    }

    /// Load a request and lock its row until the transaction ends
    pub async fn requests_lock<'e>(&self, executor: impl PgExecutor<'e>, id: Uuid) -> AppResult<Request> {
        sqlx::query_as::<_, Request>("SELECT * FROM requests WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(executor)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Request {} not found", id)))
    }

    pub async fn requests_apply<'e>(
        &self,
        executor: impl PgExecutor<'e>,
        id: Uuid,
        status: RequestStatus,
        change: &RequestChange,
    ) -> AppResult<Request> {
        let request = sqlx::query_as::<_, Request>(
            r#"
            UPDATE requests
            SET status = $2,
                remarks = COALESCE($3, remarks),
                approved_by_id = COALESCE($4, approved_by_id),
                approved_at = CASE WHEN $4::uuid IS NULL THEN approved_at ELSE NOW() END,
                assigned_admin_id = COALESCE($5, assigned_admin_id, $6),
                completed_at = CASE WHEN $7 THEN NOW() ELSE completed_at END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(&change.remarks)
        .bind(change.decided_by)
        .bind(change.assign_to)
        .bind(change.claim_for)
        .bind(change.completed)
        .fetch_one(executor)
        .await?;
        Ok(request)
    }
}
