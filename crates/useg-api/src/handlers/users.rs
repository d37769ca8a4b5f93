//! User handlers

use axum::{extract::State, http::StatusCode};
use useg_core::UserId;
use useg_service::{UserRequest, UserService};
use validator::Validate;

use crate::extractors::JsonBody;
use crate::response::ApiResult;
use crate::state::AppState;

/// Register users
///
/// POST /users
///
/// Body: `[{"id": 1}, {"id": 2}]`
pub async fn create_users(
    State(state): State<AppState>,
    JsonBody(users): JsonBody<Vec<UserRequest>>,
) -> ApiResult<StatusCode> {
    for user in &users {
        user.validate()?;
    }
    let ids: Vec<UserId> = users.iter().map(UserRequest::user_id).collect();

    UserService::new(state.service_context()).create_users(&ids).await?;
    Ok(StatusCode::OK)
}
