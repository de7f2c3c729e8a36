//! Support ticket model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::enums::{IssueType, Priority, TicketStatus};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Ticket {
    pub id: Uuid,
    /// Human readable number (TKT-2025-0001)
    pub ticket_number: String,
    pub title: String,
    pub description: String,
    pub issue_type: IssueType,
    pub priority: Priority,
    pub status: TicketStatus,
    pub asset_id: Option<Uuid>,
    pub department_id: Uuid,
    pub lab_id: Option<Uuid>,
    pub created_by_id: Uuid,
    pub assigned_to_id: Option<Uuid>,
    pub remarks: Option<String>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Ticket with asset, lab, department and people labels
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct TicketDetails {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub ticket: Ticket,
    pub asset_number: Option<String>,
    pub asset_name: Option<String>,
    pub lab_name: Option<String>,
    pub lab_code: Option<String>,
    pub department_name: String,
    pub created_by_name: String,
    pub assigned_to_name: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateTicket {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    pub issue_type: IssueType,
    pub priority: Option<Priority>,
    pub asset_id: Option<Uuid>,
    pub department_id: Uuid,
    pub lab_id: Option<Uuid>,
}

/// Status change on a ticket
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateTicketStatus {
    pub status: TicketStatus,
    #[validate(length(max = 2000, message = "Remarks are limited to 2000 characters"))]
    pub remarks: Option<String>,
}
