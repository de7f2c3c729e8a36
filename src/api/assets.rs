//! Asset inventory endpoints

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
        asset::{Asset, AssetDetails, AssetPage, AssetQuery, CreateAsset, UpdateAsset},
        enums::Role,
    },
};

use super::AuthenticatedUser;

/// Search assets with filters and pagination
#[utoipa::path(
    get,
    path = "/assets",
    tag = "assets",
    security(("bearer_auth" = [])),
    params(AssetQuery),
    responses(
        (status = 200, description = "Page of assets", body = AssetPage),
        (status = 400, description = "No department or lab assigned"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_assets(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<AssetQuery>,
) -> AppResult<Json<AssetPage>> {
    let page = state.services.assets.search(&claims, query).await?;
    Ok(Json(page))
}

/// Asset with its five most recent tickets
#[utoipa::path(
    get,
    path = "/assets/{id}",
    tag = "assets",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Asset ID")
    ),
    responses(
        (status = 200, description = "Asset", body = AssetDetails),
        (status = 404, description = "Asset not found")
    )
)]
pub async fn get_asset(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<AssetDetails>> {
    let asset = state.services.assets.get(&claims, id).await?;
    Ok(Json(asset))
}

#[utoipa::path(
    post,
    path = "/assets",
    tag = "assets",
    security(("bearer_auth" = [])),
    request_body = CreateAsset,
    responses(
        (status = 201, description = "Asset created", body = Asset),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Asset number already exists")
    )
)]
pub async fn create_asset(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateAsset>,
) -> AppResult<(StatusCode, Json<Asset>)> {
    claims.require_role(&[Role::Admin, Role::Dean])?;
    data.validate()?;

    let asset = state.services.assets.create(&claims, data).await?;
    Ok((StatusCode::CREATED, Json(asset)))
}

#[utoipa::path(
    put,
    path = "/assets/{id}",
    tag = "assets",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Asset ID")
    ),
    request_body = UpdateAsset,
    responses(
        (status = 200, description = "Asset updated", body = Asset),
        (status = 404, description = "Asset not found"),
        (status = 409, description = "Asset number already exists")
    )
)]
pub async fn update_asset(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(data): Json<UpdateAsset>,
) -> AppResult<Json<Asset>> {
    claims.require_role(&[Role::Admin, Role::Dean])?;
    data.validate()?;

    let asset = state.services.assets.update(&claims, id, data).await?;
    Ok(Json(asset))
}

#[utoipa::path(
    delete,
    path = "/assets/{id}",
    tag = "assets",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Asset ID")
    ),
    responses(
        (status = 204, description = "Asset deleted"),
        (status = 404, description = "Asset not found")
    )
)]
pub async fn delete_asset(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    claims.require_role(&[Role::Admin, Role::Dean])?;

    state.services.assets.delete(&claims, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
