//! Shared domain enums
//!
//! Every enum is persisted as TEXT holding its SCREAMING_SNAKE_CASE name and
//! serialized to JSON the same way.

use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, Postgres};
use utoipa::ToSchema;

macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $text:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
        pub enum $name {
            $(
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.to_uppercase().as_str() {
                    $($text => Ok($name::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($name), s)),
                }
            }
        }

        impl sqlx::Type<Postgres> for $name {
            fn type_info() -> sqlx::postgres::PgTypeInfo {
                <String as sqlx::Type<Postgres>>::type_info()
            }

            fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
                <String as sqlx::Type<Postgres>>::compatible(ty)
            }
        }

        impl<'r> Decode<'r, Postgres> for $name {
            fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
                let s: &str = Decode::<Postgres>::decode(value)?;
                s.parse().map_err(|e: String| e.into())
            }
        }

        impl Encode<'_, Postgres> for $name {
            fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
                <&str as Encode<Postgres>>::encode(self.as_str(), buf)
            }
        }
    };
}

text_enum! {
    /// Account role
    Role {
        Admin => "ADMIN",
        Dean => "DEAN",
        Hod => "HOD",
        LabIncharge => "LAB_INCHARGE",
    }
}

text_enum! {
    /// Account status; only ACTIVE accounts may sign in
    UserStatus {
        Active => "ACTIVE",
        Pending => "PENDING",
        Rejected => "REJECTED",
    }
}

text_enum! {
    /// Hardware category
    AssetType {
        Desktop => "DESKTOP",
        Laptop => "LAPTOP",
        Server => "SERVER",
        Router => "ROUTER",
        Switch => "SWITCH",
        Printer => "PRINTER",
        Other => "OTHER",
    }
}

text_enum! {
    AssetStatus {
        Active => "ACTIVE",
        UnderMaintenance => "UNDER_MAINTENANCE",
        Damaged => "DAMAGED",
        Retired => "RETIRED",
    }
}

text_enum! {
    Priority {
        Low => "LOW",
        Normal => "NORMAL",
        High => "HIGH",
        Critical => "CRITICAL",
    }
}

text_enum! {
    /// Kind of problem a ticket reports
    IssueType {
        Hardware => "HARDWARE",
        Software => "SOFTWARE",
        Network => "NETWORK",
        Other => "OTHER",
    }
}

text_enum! {
    TicketStatus {
        Submitted => "SUBMITTED",
        Processing => "PROCESSING",
        Resolved => "RESOLVED",
        Closed => "CLOSED",
    }
}

text_enum! {
    RequestType {
        NewSystem => "NEW_SYSTEM",
        HardwareRepair => "HARDWARE_REPAIR",
        SoftwareInstallation => "SOFTWARE_INSTALLATION",
        NetworkUpgrade => "NETWORK_UPGRADE",
        LabSetup => "LAB_SETUP",
        AccountApproval => "ACCOUNT_APPROVAL",
    }
}

text_enum! {
    RequestStatus {
        Pending => "PENDING",
        Approved => "APPROVED",
        Declined => "DECLINED",
        Assigned => "ASSIGNED",
        InProgress => "IN_PROGRESS",
        Completed => "COMPLETED",
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Normal
    }
}

impl TicketStatus {
    /// Whether the ticket no longer needs attention
    pub fn is_terminal(&self) -> bool {
        matches!(self, TicketStatus::Resolved | TicketStatus::Closed)
    }
}

impl RequestStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RequestStatus::Declined | RequestStatus::Completed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("lab_incharge".parse::<Role>(), Ok(Role::LabIncharge));
        assert_eq!("IN_PROGRESS".parse::<RequestStatus>(), Ok(RequestStatus::InProgress));
        assert!("ARCHIVED".parse::<AssetStatus>().is_err());
    }

    #[test]
    fn text_and_json_forms_agree() {
        for status in RequestStatus::ALL {
            let json = serde_json::to_string(status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
        let parsed: AssetStatus = serde_json::from_str("\"UNDER_MAINTENANCE\"").unwrap();
        assert_eq!(parsed, AssetStatus::UnderMaintenance);
    }

    #[test]
    fn terminal_statuses() {
        assert!(TicketStatus::Closed.is_terminal());
        assert!(!TicketStatus::Processing.is_terminal());
        assert!(RequestStatus::Declined.is_terminal());
        assert!(!RequestStatus::Approved.is_terminal());
    }
}
