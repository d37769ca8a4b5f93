//! Segment handlers
//!
//! Segment creation (with optional percentage assignment) and deletion.

use axum::{
    extract::{Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::debug;
use useg_service::{SegmentRequest, SegmentService};

use crate::extractors::ValidatedJson;
use crate::response::ApiResult;
use crate::state::AppState;

/// Query parameters of `POST /segments`
#[derive(Debug, Default, Deserialize)]
pub struct CreateSegmentParams {
    /// Share of all users to assign, kept raw so that garbage is ignored
    pub percent: Option<String>,
}

impl CreateSegmentParams {
    /// The percent as an integer; absent or unparsable values yield `None`
    pub fn percent(&self) -> Option<i64> {
        self.percent.as_deref().and_then(|p| p.parse().ok())
    }
}

/// Create segment
///
/// POST /segments?percent=N
pub async fn create_segment(
    State(state): State<AppState>,
    Query(params): Query<CreateSegmentParams>,
    ValidatedJson(request): ValidatedJson<SegmentRequest>,
) -> ApiResult<StatusCode> {
    let percent = params.percent();
    if percent.is_none() && params.percent.is_some() {
        debug!(raw = ?params.percent, "Ignoring unparsable percent");
    }

    SegmentService::new(state.service_context())
        .create_segment(&request.segment_name(), percent)
        .await?;
    Ok(StatusCode::OK)
}

/// Delete segment
///
/// DELETE /segments
pub async fn delete_segment(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<SegmentRequest>,
) -> ApiResult<StatusCode> {
    SegmentService::new(state.service_context())
        .delete_segment(&request.segment_name())
        .await?;
    Ok(StatusCode::OK)
}
