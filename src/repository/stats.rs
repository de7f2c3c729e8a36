//! Dashboard counters

use sqlx::FromRow;
use uuid::Uuid;

use super::Repository;
use crate::error::AppResult;

#[derive(Debug, Clone, Default, FromRow)]
pub struct DeanCounts {
    pub assets: i64,
    pub ready_for_use: i64,
    pub service: i64,
    pub open_tickets: i64,
    pub pending_requests: i64,
    pub departments: i64,
    pub labs: i64,
}

#[derive(Debug, Clone, Default, FromRow)]
pub struct HodCounts {
    pub total_systems: i64,
    pub working_systems: i64,
    pub under_maintenance: i64,
    pub active_requests: i64,
    pub pending_requests: i64,
    pub approved_requests: i64,
}

#[derive(Debug, Clone, Default, FromRow)]
pub struct AdminCounts {
    pub total_systems: i64,
    pub total_servers: i64,
    pub total_routers: i64,
    pub pending_tickets: i64,
    pub in_progress_tickets: i64,
    pub completed_today: i64,
}

#[derive(Debug, Clone, Default, FromRow)]
pub struct LabCounts {
    pub total_systems: i64,
    pub working_systems: i64,
    pub issues: i64,
    pub my_tickets: i64,
    pub pending_tickets: i64,
}

impl Repository {
    pub async fn stats_dean(&self) -> AppResult<DeanCounts> {
        let counts = sqlx::query_as::<_, DeanCounts>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM assets) AS assets,
                (SELECT COUNT(*) FROM assets WHERE status = 'ACTIVE') AS ready_for_use,
                (SELECT COUNT(*) FROM assets WHERE status IN ('UNDER_MAINTENANCE', 'DAMAGED')) AS service,
                (SELECT COUNT(*) FROM tickets WHERE status NOT IN ('RESOLVED', 'CLOSED')) AS open_tickets,
                (SELECT COUNT(*) FROM requests WHERE status = 'PENDING') AS pending_requests,
                (SELECT COUNT(*) FROM departments) AS departments,
                (SELECT COUNT(*) FROM labs) AS labs
            "#,
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(counts)
    }

    pub async fn stats_hod(&self, department_id: Uuid) -> AppResult<HodCounts> {
        let counts = sqlx::query_as::<_, HodCounts>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM assets WHERE department_id = $1) AS total_systems,
                (SELECT COUNT(*) FROM assets WHERE department_id = $1 AND status = 'ACTIVE') AS working_systems,
                (SELECT COUNT(*) FROM assets
                  WHERE department_id = $1 AND status = 'UNDER_MAINTENANCE') AS under_maintenance,
                COUNT(*) FILTER (WHERE r.status IN ('PENDING', 'APPROVED', 'ASSIGNED', 'IN_PROGRESS')) AS active_requests,
                COUNT(*) FILTER (WHERE r.status = 'PENDING') AS pending_requests,
                COUNT(*) FILTER (WHERE r.status = 'APPROVED') AS approved_requests
            FROM requests r
            WHERE r.department_id = $1 AND r.request_type != 'ACCOUNT_APPROVAL'
            "#,
        )
        .bind(department_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(counts)
    }

    pub async fn stats_admin(&self) -> AppResult<AdminCounts> {
        let counts = sqlx::query_as::<_, AdminCounts>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM assets WHERE asset_type IN ('DESKTOP', 'LAPTOP')) AS total_systems,
                (SELECT COUNT(*) FROM assets WHERE asset_type = 'SERVER') AS total_servers,
                (SELECT COUNT(*) FROM assets WHERE asset_type IN ('ROUTER', 'SWITCH')) AS total_routers,
                (SELECT COUNT(*) FROM tickets WHERE status = 'SUBMITTED')
                  + (SELECT COUNT(*) FROM requests WHERE status = 'APPROVED') AS pending_tickets,
                (SELECT COUNT(*) FROM tickets WHERE status = 'PROCESSING')
                  + (SELECT COUNT(*) FROM requests WHERE status IN ('ASSIGNED', 'IN_PROGRESS')) AS in_progress_tickets,
                (SELECT COUNT(*) FROM tickets
                  WHERE (resolved_at AT TIME ZONE 'UTC')::date = (NOW() AT TIME ZONE 'UTC')::date)
                  + (SELECT COUNT(*) FROM requests
                  WHERE (completed_at AT TIME ZONE 'UTC')::date = (NOW() AT TIME ZONE 'UTC')::date) AS completed_today
            "#,
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(counts)
    }

    pub async fn stats_lab(&self, lab_id: Uuid, user_id: Uuid) -> AppResult<LabCounts> {
        let counts = sqlx::query_as::<_, LabCounts>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM assets WHERE lab_id = $1) AS total_systems,
                (SELECT COUNT(*) FROM assets WHERE lab_id = $1 AND status = 'ACTIVE') AS working_systems,
                (SELECT COUNT(*) FROM assets WHERE lab_id = $1 AND status != 'ACTIVE') AS issues,
                (SELECT COUNT(*) FROM tickets WHERE created_by_id = $2) AS my_tickets,
                (SELECT COUNT(*) FROM tickets WHERE created_by_id = $2 AND status = 'SUBMITTED') AS pending_tickets
            "#,
        )
        .bind(lab_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(counts)
    }
}
