//! Support ticket endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::AppResult,
    models::{
        enums::Role,
        ticket::{CreateTicket, Ticket, TicketDetails, UpdateTicketStatus},
    },
};

use super::AuthenticatedUser;

/// Tickets visible to the caller
#[utoipa::path(
    get,
    path = "/tickets",
    tag = "tickets",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Tickets, newest first", body = Vec<TicketDetails>),
        (status = 403, description = "Role has no ticket view")
    )
)]
pub async fn list_tickets(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<TicketDetails>>> {
    claims.require_role(&[Role::Admin, Role::Hod, Role::LabIncharge])?;

    let tickets = state.services.tickets.list(&claims).await?;
    Ok(Json(tickets))
}

#[utoipa::path(
    get,
    path = "/tickets/{id}",
    tag = "tickets",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Ticket ID")
    ),
    responses(
        (status = 200, description = "Ticket", body = TicketDetails),
        (status = 404, description = "Ticket not found or not visible")
    )
)]
pub async fn get_ticket(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<TicketDetails>> {
    claims.require_role(&[Role::Admin, Role::Hod, Role::LabIncharge])?;

    let ticket = state.services.tickets.get(&claims, id).await?;
    Ok(Json(ticket))
}

/// Raise a ticket (lab incharge)
#[utoipa::path(
    post,
    path = "/tickets",
    tag = "tickets",
    security(("bearer_auth" = [])),
    request_body = CreateTicket,
    responses(
        (status = 201, description = "Ticket created", body = Ticket),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Only lab incharges raise tickets")
    )
)]
pub async fn create_ticket(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateTicket>,
) -> AppResult<(StatusCode, Json<Ticket>)> {
    claims.require_role(&[Role::LabIncharge])?;
    data.validate()?;

    let ticket = state.services.tickets.create(&claims, data).await?;
    Ok((StatusCode::CREATED, Json(ticket)))
}

/// Change a ticket's status
#[utoipa::path(
    patch,
    path = "/tickets/{id}",
    tag = "tickets",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Ticket ID")
    ),
    request_body = UpdateTicketStatus,
    responses(
        (status = 200, description = "Ticket updated", body = TicketDetails),
        (status = 403, description = "Role may not make this change"),
        (status = 404, description = "Ticket not found"),
        (status = 422, description = "Transition not allowed from the current status")
    )
)]
pub async fn update_ticket(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(data): Json<UpdateTicketStatus>,
) -> AppResult<Json<TicketDetails>> {
    claims.require_role(&[Role::Admin, Role::LabIncharge])?;
    data.validate()?;

    let ticket = state.services.tickets.update_status(&claims, id, data).await?;
    Ok(Json(ticket))
}
