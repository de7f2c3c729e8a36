//! Workflow request endpoints

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
        request::{CreateRequest, Request, RequestDetails, UpdateRequestStatus},
    },
};

use super::AuthenticatedUser;

/// Requests visible to the caller
#[utoipa::path(
    get,
    path = "/requests",
    tag = "requests",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Requests", body = Vec<RequestDetails>),
        (status = 403, description = "Role has no request view")
    )
)]
pub async fn list_requests(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<RequestDetails>>> {
    claims.require_role(&[Role::Dean, Role::Admin, Role::Hod])?;

    let requests = state.services.requests.list(&claims).await?;
    Ok(Json(requests))
}

#[utoipa::path(
    get,
    path = "/requests/{id}",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Request ID")
    ),
    responses(
        (status = 200, description = "Request", body = RequestDetails),
        (status = 404, description = "Request not found or not visible")
    )
)]
pub async fn get_request(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<RequestDetails>> {
    claims.require_role(&[Role::Dean, Role::Admin, Role::Hod])?;

    let request = state.services.requests.get(&claims, id).await?;
    Ok(Json(request))
}

/// File a request (HOD)
#[utoipa::path(
    post,
    path = "/requests",
    tag = "requests",
    security(("bearer_auth" = [])),
    request_body = CreateRequest,
    responses(
        (status = 201, description = "Request filed", body = Request),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Only HODs file requests, for their own department")
    )
)]
pub async fn create_request(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateRequest>,
) -> AppResult<(StatusCode, Json<Request>)> {
    claims.require_role(&[Role::Hod])?;
    data.validate()?;

    let request = state.services.requests.create(&claims, data).await?;
    Ok((StatusCode::CREATED, Json(request)))
}

/// Approve, decline, assign, start or complete a request
#[utoipa::path(
    patch,
    path = "/requests/{id}",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Request ID")
    ),
    request_body = UpdateRequestStatus,
    responses(
        (status = 200, description = "Request updated", body = RequestDetails),
        (status = 403, description = "Role may not make this change"),
        (status = 404, description = "Request not found"),
        (status = 409, description = "Lab code already in use"),
        (status = 422, description = "Transition not allowed from the current status")
    )
)]
pub async fn update_request(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(data): Json<UpdateRequestStatus>,
) -> AppResult<Json<RequestDetails>> {
    claims.require_role(&[Role::Dean, Role::Admin])?;
    data.validate()?;

    let request = state.services.requests.update_status(&claims, id, data).await?;
    Ok(Json(request))
}
