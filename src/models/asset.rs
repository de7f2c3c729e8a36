//! Asset (hardware inventory) model

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::enums::{AssetStatus, AssetType, Priority, TicketStatus};

static MAC_ADDRESS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9A-Fa-f]{2}[:-]){5}[0-9A-Fa-f]{2}$").unwrap());

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Asset {
    pub id: Uuid,
    pub name: String,
    /// Institution-wide unique inventory number
    pub asset_number: String,
    pub asset_type: AssetType,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub mac_address: Option<String>,
    pub status: AssetStatus,
    pub department_id: Uuid,
    pub lab_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Asset with department and lab labels
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct AssetListing {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub asset: Asset,
    pub department_name: String,
    pub department_code: String,
    pub lab_name: Option<String>,
    pub lab_code: Option<String>,
}

/// Ticket line shown on the asset page
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct AssetTicket {
    pub id: Uuid,
    pub ticket_number: String,
    pub title: String,
    pub status: TicketStatus,
    pub priority: Priority,
    pub created_by_name: String,
    pub created_at: DateTime<Utc>,
}

/// Single asset with its recent tickets
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AssetDetails {
    #[serde(flatten)]
    pub asset: AssetListing,
    pub recent_tickets: Vec<AssetTicket>,
}

/// Asset list filters and pagination
#[derive(Debug, Default, Clone, Deserialize, IntoParams, ToSchema)]
pub struct AssetQuery {
    #[serde(rename = "type")]
    pub asset_type: Option<AssetType>,
    pub status: Option<AssetStatus>,
    pub lab_id: Option<Uuid>,
    pub department_id: Option<Uuid>,
    /// Matches name, asset number or MAC address
    pub search: Option<String>,
    pub page: Option<i64>,
    #[serde(alias = "limit")]
    pub per_page: Option<i64>,
}

impl AssetQuery {
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn per_page(&self) -> i64 {
        self.per_page.unwrap_or(10).clamp(1, 100)
    }

    /// Rows to skip; saturates for absurd page numbers
    pub fn offset(&self) -> i64 {
        (self.page() - 1).saturating_mul(self.per_page())
    }
}

/// Page of assets
#[derive(Debug, Serialize, ToSchema)]
pub struct AssetPage {
    pub items: Vec<AssetListing>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

impl AssetPage {
    pub fn new(items: Vec<AssetListing>, total: i64, page: i64, per_page: i64) -> Self {
        Self {
            items,
            total,
            page,
            per_page,
            total_pages: (total + per_page - 1) / per_page,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateAsset {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Asset number is required"))]
    pub asset_number: String,
    pub asset_type: AssetType,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    #[validate(regex(path = *MAC_ADDRESS, message = "Invalid MAC address"))]
    pub mac_address: Option<String>,
    pub status: Option<AssetStatus>,
    pub department_id: Uuid,
    pub lab_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateAsset {
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    pub name: Option<String>,
    #[validate(length(min = 1, message = "Asset number cannot be empty"))]
    pub asset_number: Option<String>,
    pub asset_type: Option<AssetType>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    #[validate(regex(path = *MAC_ADDRESS, message = "Invalid MAC address"))]
    pub mac_address: Option<String>,
    pub status: Option<AssetStatus>,
    pub department_id: Option<Uuid>,
    /// `null` takes the asset out of its lab
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<Uuid>, nullable)]
    pub lab_id: Option<Option<Uuid>>,
}
