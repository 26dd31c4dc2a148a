//! Group and membership endpoints.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use api_types::group::{
    GroupCreated, GroupNew, GroupView, GroupsResponse, MemberAdd, MembersResponse,
};

use crate::{ServerError, server::ServerState, user};

/// Handle requests for creating a new group owned by the caller
pub async fn group_new(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<GroupNew>,
) -> Result<(StatusCode, Json<GroupCreated>), ServerError> {
    let id = state
        .engine
        .create_group(&payload.name, &user.username)
        .await?;
    Ok((StatusCode::CREATED, Json(GroupCreated { id })))
}

/// Handle requests for listing the caller's groups
pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<GroupsResponse>, ServerError> {
    let groups = state
        .engine
        .list_groups(&user.username)
        .await?
        .into_iter()
        .map(|group| GroupView {
            id: group.id,
            name: group.name,
            created_by: group.created_by,
            created_at: group.created_at,
        })
        .collect();

    Ok(Json(GroupsResponse { groups }))
}

pub async fn list_members(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(group_id): Path<Uuid>,
) -> Result<Json<MembersResponse>, ServerError> {
    let members = state
        .engine
        .list_group_members(group_id, &user.username)
        .await?;
    Ok(Json(MembersResponse { members }))
}

pub async fn add_member(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(group_id): Path<Uuid>,
    Json(payload): Json<MemberAdd>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .add_group_member(group_id, &payload.username, &user.username)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
