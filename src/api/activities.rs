//! Activity feed

use axum::{
    extract::{Query, State},
    Json,
};

use crate::{
    error::AppResult,
    models::activity::{ActivityEntry, ActivityQuery},
};

use super::AuthenticatedUser;

#[utoipa::path(
    get,
    path = "/activities",
    tag = "activities",
    security(("bearer_auth" = [])),
    params(ActivityQuery),
    responses(
        (status = 200, description = "Latest activity, newest first", body = Vec<ActivityEntry>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_activities(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Query(query): Query<ActivityQuery>,
) -> AppResult<Json<Vec<ActivityEntry>>> {
    let entries = state.services.activity.recent(query.limit()).await?;
    Ok(Json(entries))
}
