//! User segment handlers
//!
//! Query, assign, and remove the segments of a single user.

use axum::{extract::State, http::StatusCode, Json};
use useg_service::{MembershipService, SegmentResponse, UserRequest, UserSegmentsRequest};

use crate::extractors::ValidatedJson;
use crate::response::ApiResult;
use crate::state::AppState;

/// Current segments of a user
///
/// GET /users/segments
///
/// Body: `{"id": 7}`
pub async fn get_user_segments(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<UserRequest>,
) -> ApiResult<Json<Vec<SegmentResponse>>> {
    let segments = MembershipService::new(state.service_context())
        .user_segments(request.user_id())
        .await?;
    Ok(Json(segments))
}

/// Assign segments to a user, all or nothing
///
/// POST /users/segments
///
/// Body: `{"id": 7, "segments": [{"name": "VIP"}], "date_end": "2030-01-01T00:00:00Z"}`
pub async fn assign_user_segments(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<UserSegmentsRequest>,
) -> ApiResult<StatusCode> {
    MembershipService::new(state.service_context())
        .assign_segments_to_user(request.user_id(), &request.segment_names(), request.date_end)
        .await?;
    Ok(StatusCode::OK)
}

/// Remove segments from a user; unknown segment names are skipped
///
/// DELETE /users/segments
pub async fn remove_user_segments(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<UserSegmentsRequest>,
) -> ApiResult<StatusCode> {
    MembershipService::new(state.service_context())
        .remove_segments_from_user(request.user_id(), &request.segment_names())
        .await?;
    Ok(StatusCode::OK)
}
