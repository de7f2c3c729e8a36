//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{activities, assets, auth, departments, health, labs, requests, stats, tickets, users};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "LabDesk API",
        version = "1.0.0",
        description = "IT asset inventory and service request workflow REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api", description = "API")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::login,
        auth::me,
        auth::register,
        // Users
        users::list_users,
        users::get_user,
        users::create_user,
        users::update_user,
        users::delete_user,
        // Departments
        departments::list_departments,
        departments::get_department,
        departments::create_department,
        departments::update_department,
        departments::delete_department,
        // Labs
        labs::list_labs,
        labs::get_lab,
        labs::create_lab,
        labs::update_lab,
        labs::delete_lab,
        // Assets
        assets::list_assets,
        assets::get_asset,
        assets::create_asset,
        assets::update_asset,
        assets::delete_asset,
        // Tickets
        tickets::list_tickets,
        tickets::get_ticket,
        tickets::create_ticket,
        tickets::update_ticket,
        // Requests
        requests::list_requests,
        requests::get_request,
        requests::create_request,
        requests::update_request,
        // Activity
        activities::list_activities,
        // Stats
        stats::get_stats,
    ),
    components(
        schemas(
            // Enums
            crate::models::enums::Role,
            crate::models::enums::UserStatus,
            crate::models::enums::AssetType,
            crate::models::enums::AssetStatus,
            crate::models::enums::Priority,
            crate::models::enums::IssueType,
            crate::models::enums::TicketStatus,
            crate::models::enums::RequestType,
            crate::models::enums::RequestStatus,
            // Auth
            auth::LoginRequest,
            auth::LoginResponse,
            crate::models::user::RegisterUser,
            // Users
            crate::models::user::User,
            crate::models::user::UserDetails,
            crate::models::user::UserQuery,
            crate::models::user::CreateUser,
            crate::models::user::UpdateUser,
            // Departments
            crate::models::department::Department,
            crate::models::department::DepartmentSummary,
            crate::models::department::CreateDepartment,
            crate::models::department::UpdateDepartment,
            // Labs
            crate::models::lab::Lab,
            crate::models::lab::LabDetails,
            crate::models::lab::LabQuery,
            crate::models::lab::CreateLab,
            crate::models::lab::UpdateLab,
            // Assets
            crate::models::asset::Asset,
            crate::models::asset::AssetListing,
            crate::models::asset::AssetTicket,
            crate::models::asset::AssetDetails,
            crate::models::asset::AssetQuery,
            crate::models::asset::AssetPage,
            crate::models::asset::CreateAsset,
            crate::models::asset::UpdateAsset,
            // Tickets
            crate::models::ticket::Ticket,
            crate::models::ticket::TicketDetails,
            crate::models::ticket::CreateTicket,
            crate::models::ticket::UpdateTicketStatus,
            // Requests
            crate::models::request::Request,
            crate::models::request::RequestDetails,
            crate::models::request::CreateRequest,
            crate::models::request::UpdateRequestStatus,
            // Activity
            crate::models::activity::ActivityLog,
            crate::models::activity::ActivityEntry,
            crate::models::activity::ActivityQuery,
            // Stats
            stats::DashboardStats,
            stats::DeanStats,
            stats::HodStats,
            stats::AdminStats,
            stats::LabInchargeStats,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication and registration"),
        (name = "users", description = "User management"),
        (name = "departments", description = "Departments"),
        (name = "labs", description = "Labs"),
        (name = "assets", description = "Hardware inventory"),
        (name = "tickets", description = "Support tickets"),
        (name = "requests", description = "Resource, lab setup and account approval requests"),
        (name = "activities", description = "Activity log"),
        (name = "stats", description = "Dashboard statistics")
    )
)]
pub struct ApiDoc;

/// Registers the `bearer_auth` scheme referenced by the secured paths
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
