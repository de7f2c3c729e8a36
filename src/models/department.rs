//! Department model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Department {
    pub id: Uuid,
    pub name: String,
    /// Short unique code (e.g. "CSE")
    pub code: String,
    pub description: Option<String>,
    pub hod_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Department with its HOD name and inventory counts
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct DepartmentSummary {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub department: Department,
    pub hod_name: Option<String>,
    pub lab_count: i64,
    pub asset_count: i64,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateDepartment {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, max = 20, message = "Code must be 1-20 characters"))]
    pub code: String,
    pub description: Option<String>,
    pub hod_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateDepartment {
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 20, message = "Code must be 1-20 characters"))]
    pub code: Option<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>, nullable)]
    pub description: Option<Option<String>>,
    /// `null` removes the current HOD
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<Uuid>, nullable)]
    pub hod_id: Option<Option<Uuid>>,
}
