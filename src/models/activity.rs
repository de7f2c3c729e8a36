//! Activity (audit) log model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::enums::Role;

/// Audited entity kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    User,
    Department,
    Lab,
    Asset,
    Ticket,
    Request,
}

impl Entity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Entity::User => "USER",
            Entity::Department => "DEPARTMENT",
            Entity::Lab => "LAB",
            Entity::Asset => "ASSET",
            Entity::Ticket => "TICKET",
            Entity::Request => "REQUEST",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ActivityLog {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub action: String,
    pub entity: String,
    pub entity_id: Option<Uuid>,
    pub details: Option<String>,
    pub department_id: Option<Uuid>,
    pub lab_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Log line with the actor's name and role
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct ActivityEntry {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub log: ActivityLog,
    pub user_name: Option<String>,
    pub user_role: Option<Role>,
}

/// Activity to append
#[derive(Debug, Clone)]
pub struct NewActivity {
    pub user_id: Uuid,
    pub action: String,
    pub entity: Entity,
    pub entity_id: Option<Uuid>,
    pub details: Option<String>,
    pub department_id: Option<Uuid>,
    pub lab_id: Option<Uuid>,
}

impl NewActivity {
    pub fn new(user_id: Uuid, action: impl Into<String>, entity: Entity, entity_id: Uuid) -> Self {
        Self {
            user_id,
            action: action.into(),
            entity,
            entity_id: Some(entity_id),
            details: None,
            department_id: None,
            lab_id: None,
        }
    }

    pub fn details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn department(mut self, department_id: Option<Uuid>) -> Self {
        self.department_id = department_id;
        self
    }

    pub fn lab(mut self, lab_id: Option<Uuid>) -> Self {
        self.lab_id = lab_id;
        self
    }
}

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct ActivityQuery {
    /// Number of entries (default 50, max 200)
    pub limit: Option<i64>,
}

impl ActivityQuery {
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(50).clamp(1, 200)
    }
}
