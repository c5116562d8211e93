//! Attendance API Handlers

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use shared::models::{AttendanceStatus, PunchOutcome, PunchRequest};
use shared::util::now_millis;

use crate::api::ApiResult;
use crate::auth::{Principal, gate};
use crate::core::ServerState;
use crate::utils::ApiResponse;

#[derive(Debug, Default, Deserialize)]
pub struct StatusQuery {
    pub staff_id: Option<i64>,
}

/// Whose attendance a request is about: the caller, unless an elevated
/// caller names someone else
fn target_staff(principal: &Principal, requested: Option<i64>) -> Result<i64, gate::GateRejection> {
    gate::reject_admin_clock(principal)?;
    match requested {
        Some(id) if id != principal.id => {
            gate::require_self_or_elevated(principal, id)?;
            Ok(id)
        }
        _ => Ok(principal.id),
    }
}

pub async fn punch(
    State(state): State<ServerState>,
    principal: Principal,
    Json(req): Json<PunchRequest>,
) -> ApiResult<PunchOutcome> {
    let staff_id = target_staff(&principal, req.staff_id)?;
    let outcome = state.attendance.punch(staff_id, &req, now_millis()).await?;
    let message = if outcome.created { "Clocked in" } else { "Clocked out" };
    Ok(ApiResponse::success_with_message(message, outcome))
}

pub async fn status(
    State(state): State<ServerState>,
    principal: Principal,
    Query(query): Query<StatusQuery>,
) -> ApiResult<AttendanceStatus> {
    let staff_id = target_staff(&principal, query.staff_id)?;
    Ok(ApiResponse::success(
        state.attendance.status(staff_id, now_millis()).await?,
    ))
}
