//! Department endpoints

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
        department::{CreateDepartment, Department, DepartmentSummary, UpdateDepartment},
        enums::Role,
    },
};

use super::AuthenticatedUser;

/// List departments with HOD and inventory counts
#[utoipa::path(
    get,
    path = "/departments",
    tag = "departments",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Departments", body = Vec<DepartmentSummary>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_departments(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<Vec<DepartmentSummary>>> {
    let departments = state.services.departments.list().await?;
    Ok(Json(departments))
}

#[utoipa::path(
    get,
    path = "/departments/{id}",
    tag = "departments",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Department ID")
    ),
    responses(
        (status = 200, description = "Department", body = DepartmentSummary),
        (status = 404, description = "Department not found")
    )
)]
pub async fn get_department(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<DepartmentSummary>> {
    let department = state.services.departments.get(id).await?;
    Ok(Json(department))
}

#[utoipa::path(
    post,
    path = "/departments",
    tag = "departments",
    security(("bearer_auth" = [])),
    request_body = CreateDepartment,
    responses(
        (status = 201, description = "Department created", body = Department),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Code already exists")
    )
)]
pub async fn create_department(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateDepartment>,
) -> AppResult<(StatusCode, Json<Department>)> {
    claims.require_role(&[Role::Admin, Role::Dean])?;
    data.validate()?;

    let department = state.services.departments.create(&claims, data).await?;
    Ok((StatusCode::CREATED, Json(department)))
}

/// Partial update (served on both PUT and PATCH)
#[utoipa::path(
    put,
    path = "/departments/{id}",
    tag = "departments",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Department ID")
    ),
    request_body = UpdateDepartment,
    responses(
        (status = 200, description = "Department updated", body = Department),
        (status = 404, description = "Department not found"),
        (status = 409, description = "Code already exists")
    )
)]
pub async fn update_department(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(data): Json<UpdateDepartment>,
) -> AppResult<Json<Department>> {
    claims.require_role(&[Role::Admin, Role::Dean])?;
    data.validate()?;

    let department = state.services.departments.update(&claims, id, data).await?;
    Ok(Json(department))
}

#[utoipa::path(
    delete,
    path = "/departments/{id}",
    tag = "departments",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Department ID")
    ),
    responses(
        (status = 204, description = "Department deleted"),
        (status = 404, description = "Department not found"),
        (status = 409, description = "Department still has labs, assets, tickets or requests")
    )
)]
pub async fn delete_department(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    claims.require_role(&[Role::Admin, Role::Dean])?;

    state.services.departments.delete(&claims, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
