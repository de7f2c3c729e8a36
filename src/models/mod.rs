//! Data models for LabDesk

pub mod activity;
pub mod asset;
pub mod department;
pub mod enums;
pub mod lab;
pub mod request;
pub mod ticket;
pub mod user;

// Re-export commonly used types
pub use activity::{ActivityEntry, ActivityLog, Entity, NewActivity};
pub use asset::{Asset, AssetDetails, AssetListing};
pub use department::{Department, DepartmentSummary};
pub use enums::{
    AssetStatus, AssetType, IssueType, Priority, RequestStatus, RequestType, Role, TicketStatus,
    UserStatus,
};
pub use lab::{Lab, LabDetails};
pub use request::{Request, RequestDetails};
pub use ticket::{Ticket, TicketDetails};
pub use user::{User, UserClaims, UserDetails};
