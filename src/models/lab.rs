//! Lab model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// Location given to labs provisioned from an approved request without one
pub const PENDING_LOCATION: &str = "Allocation Pending";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Lab {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub department_id: Uuid,
    pub incharge_id: Option<Uuid>,
    pub capacity: i32,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Lab with department, incharge and asset count
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct LabDetails {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub lab: Lab,
    pub department_name: String,
    pub department_code: String,
    pub incharge_name: Option<String>,
    pub asset_count: i64,
}

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct LabQuery {
    pub department_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateLab {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Code is required"))]
    pub code: String,
    pub department_id: Uuid,
    pub incharge_id: Option<Uuid>,
    #[validate(range(min = 0, message = "Capacity cannot be negative"))]
    pub capacity: Option<i32>,
    pub location: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateLab {
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    pub name: Option<String>,
    #[validate(length(min = 1, message = "Code cannot be empty"))]
    pub code: Option<String>,
    pub department_id: Option<Uuid>,
    /// `null` removes the current incharge
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<Uuid>, nullable)]
    pub incharge_id: Option<Option<Uuid>>,
    #[validate(range(min = 0, message = "Capacity cannot be negative"))]
    pub capacity: Option<i32>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>, nullable)]
    pub location: Option<Option<String>>,
}

/// Lab to provision when a LAB_SETUP request is approved
#[derive(Debug, Clone)]
pub struct LabProvision {
    pub name: String,
    pub code: String,
    pub department_id: Uuid,
    pub capacity: i32,
    pub location: String,
}

/// Lab fields supplied when an admin completes a LAB_SETUP request
#[derive(Debug, Clone, Default)]
pub struct LabFinalization {
    pub code: Option<String>,
    pub capacity: Option<i32>,
    pub location: Option<String>,
}

impl LabFinalization {
    pub fn is_empty(&self) -> bool {
        self.code.is_none() && self.capacity.is_none() && self.location.is_none()
    }
}
