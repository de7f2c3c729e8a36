//! Lab endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::AppResult,
    models::{
        enums::Role,
        lab::{CreateLab, Lab, LabDetails, LabQuery, UpdateLab},
    },
};

use super::AuthenticatedUser;

/// List labs
#[utoipa::path(
    get,
    path = "/labs",
    tag = "labs",
    security(("bearer_auth" = [])),
    params(LabQuery),
    responses(
        (status = 200, description = "Labs with department, incharge and asset count", body = Vec<LabDetails>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_labs(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<LabQuery>,
) -> AppResult<Json<Vec<LabDetails>>> {
    let labs = state.services.labs.list(&claims, &query).await?;
    Ok(Json(labs))
}

#[utoipa::path(
    get,
    path = "/labs/{id}",
    tag = "labs",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Lab ID")
    ),
    responses(
        (status = 200, description = "Lab", body = LabDetails),
        (status = 404, description = "Lab not found")
    )
)]
pub async fn get_lab(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<LabDetails>> {
    let lab = state.services.labs.get(&claims, id).await?;
    Ok(Json(lab))
}

#[utoipa::path(
    post,
    path = "/labs",
    tag = "labs",
    security(("bearer_auth" = [])),
    request_body = CreateLab,
    responses(
        (status = 201, description = "Lab created", body = Lab),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Code or name already used")
    )
)]
pub async fn create_lab(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateLab>,
) -> AppResult<(StatusCode, Json<Lab>)> {
    claims.require_role(&[Role::Admin, Role::Dean])?;
    data.validate()?;

    let lab = state.services.labs.create(&claims, data).await?;
    Ok((StatusCode::CREATED, Json(lab)))
}

#[utoipa::path(
    put,
    path = "/labs/{id}",
    tag = "labs",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Lab ID")
    ),
    request_body = UpdateLab,
    responses(
        (status = 200, description = "Lab updated", body = Lab),
        (status = 403, description = "Lab belongs to another department"),
        (status = 404, description = "Lab not found")
    )
)]
pub async fn update_lab(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(data): Json<UpdateLab>,
) -> AppResult<Json<Lab>> {
    claims.require_role(&[Role::Admin, Role::Dean, Role::Hod])?;
    data.validate()?;

    let lab = state.services.labs.update(&claims, id, data).await?;
    Ok(Json(lab))
}

#[utoipa::path(
    delete,
    path = "/labs/{id}",
    tag = "labs",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Lab ID")
    ),
    responses(
        (status = 204, description = "Lab deleted, its assets are kept without a lab"),
        (status = 404, description = "Lab not found")
    )
)]
pub async fn delete_lab(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    claims.require_role(&[Role::Admin, Role::Dean])?;

    state.services.labs.delete(&claims, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
