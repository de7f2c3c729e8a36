//! Dashboard statistics endpoint

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::AppResult;

use super::AuthenticatedUser;

/// Figures shown on the caller's dashboard; the shape depends on the role
#[derive(Debug, Serialize, ToSchema)]
#[serde(untagged)]
pub enum DashboardStats {
    Dean(DeanStats),
    Hod(HodStats),
    Admin(AdminStats),
    LabIncharge(LabInchargeStats),
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeanStats {
    /// From the inventory sheet when available, else the asset count
    pub total_systems: i64,
    /// Active assets
    pub ready_for_use: i64,
    /// Assets under maintenance or damaged
    pub service: i64,
    /// Open tickets plus pending requests
    pub priority_tasks: i64,
    pub departments: i64,
    pub labs: i64,
    pub pending_requests: i64,
    /// When the inventory sheet was last read
    pub last_sync: Option<DateTime<Utc>>,
}

/// Department figures, account approvals excluded
#[derive(Debug, Serialize, ToSchema)]
pub struct HodStats {
    pub total_systems: i64,
    pub working_systems: i64,
    pub under_maintenance: i64,
    pub active_requests: i64,
    pub pending_requests: i64,
    pub approved_requests: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminStats {
    /// Desktops and laptops
    pub total_systems: i64,
    pub total_servers: i64,
    /// Routers and switches
    pub total_routers: i64,
    /// Submitted tickets plus approved requests
    pub pending_tickets: i64,
    /// Tickets being processed plus requests assigned or in progress
    pub in_progress_tickets: i64,
    /// Tickets resolved and requests completed today (UTC)
    pub completed_today: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LabInchargeStats {
    pub total_systems: i64,
    pub working_systems: i64,
    /// Assets not active
    pub issues: i64,
    pub my_tickets: i64,
    pub pending_tickets: i64,
}

/// Get dashboard statistics for the caller's role
#[utoipa::path(
    get,
    path = "/stats",
    tag = "stats",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Dashboard statistics", body = DashboardStats),
        (status = 400, description = "No department or lab assigned"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn get_stats(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<DashboardStats>> {
    let stats = state.services.stats.for_principal(&claims).await?;
    Ok(Json(stats))
}
