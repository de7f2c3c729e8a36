//! Workflow request model (resource, lab setup and account approval requests)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::{
    enums::{Priority, RequestStatus, RequestType},
    lab::LabFinalization,
};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Request {
    pub id: Uuid,
    /// Human readable number (REQ-2025-0001, REQ-ACC-0001)
    pub request_number: String,
    pub title: String,
    pub description: String,
    pub request_type: RequestType,
    pub priority: Priority,
    pub status: RequestStatus,
    pub department_id: Uuid,
    /// Filing user; for ACCOUNT_APPROVAL this is the account under review
    pub created_by_id: Uuid,
    pub approved_by_id: Option<Uuid>,
    pub approved_at: Option<DateTime<Utc>>,
    pub assigned_admin_id: Option<Uuid>,
    pub completed_at: Option<DateTime<Utc>>,
    pub remarks: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct RequestDetails {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub request: Request,
    pub department_name: String,
    pub department_code: String,
    pub created_by_name: String,
    pub created_by_email: String,
    pub approved_by_name: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateRequest {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    pub request_type: RequestType,
    pub priority: Option<Priority>,
    /// Defaults to the filing HOD's department
    pub department_id: Option<Uuid>,
}

/// Status change on a request, with optional lab details for LAB_SETUP
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateRequestStatus {
    pub status: RequestStatus,
    #[validate(length(max = 2000, message = "Remarks are limited to 2000 characters"))]
    pub remarks: Option<String>,
    pub assigned_admin_id: Option<Uuid>,
    pub lab_code: Option<String>,
    #[validate(range(min = 0, message = "Lab capacity cannot be negative"))]
    pub lab_capacity: Option<i32>,
    pub lab_location: Option<String>,
}

impl UpdateRequestStatus {
    pub fn lab_fields(&self) -> LabFinalization {
        LabFinalization {
            code: non_blank(&self.lab_code),
            capacity: self.lab_capacity,
            location: non_blank(&self.lab_location),
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// New request row, built by the services
#[derive(Debug, Clone)]
pub struct NewRequest {
    pub title: String,
    pub description: String,
    pub request_type: RequestType,
    pub priority: Priority,
    pub department_id: Uuid,
    pub created_by_id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_lab_fields_are_ignored() {
        let update = UpdateRequestStatus {
            status: RequestStatus::Completed,
            remarks: None,
            assigned_admin_id: None,
            lab_code: Some("  ".to_string()),
            lab_capacity: None,
            lab_location: Some(" Block C, Room 12 ".to_string()),
        };
        let fields = update.lab_fields();
        assert_eq!(fields.code, None);
        assert_eq!(fields.location.as_deref(), Some("Block C, Room 12"));
        assert!(!fields.is_empty());
    }
}
