//! Staff API Handlers

use axum::{
    Json,
    extract::{Path, Query, Request, State},
};
use serde::Deserialize;
use serde_json::{Map, Value};
use shared::models::{ScheduleAssignment, Staff, StaffCreate, StaffCreated, StaffSearch, TimeLog};

use crate::api::{ApiResult, form};
use crate::auth::{Principal, gate};
use crate::core::ServerState;
use crate::db::repository::staff::StaffKey;
use crate::services::StaffListing;
use crate::services::staff_directory::parse_update;
use crate::utils::{ApiResponse, AppResult, ok, ok_with_message};

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub with_references: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<i64>,
}

pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<ApiResponse<StaffListing>> {
    ok(state.staff.list(query.with_references).await?)
}

/// JSON body, or multipart with a `data` part and an optional `picture`
pub async fn create(
    State(state): State<ServerState>,
    req: Request,
) -> AppResult<ApiResponse<StaffCreated>> {
    let (data, picture) = form::read_body::<StaffCreate>(req, &state).await?;
    let created = state.staff.add(data, picture).await?;
    ok_with_message("Staff registered", created)
}

pub async fn search(
    State(state): State<ServerState>,
    Json(search): Json<StaffSearch>,
) -> AppResult<ApiResponse<Vec<Map<String, Value>>>> {
    ok(state.staff.fetch(&search).await?)
}

pub async fn get_by_id(
    State(state): State<ServerState>,
    principal: Principal,
    Path(id): Path<i64>,
) -> ApiResult<Staff> {
    gate::require_self_or_elevated(&principal, id)?;
    Ok(ApiResponse::success(state.staff.get(&StaffKey::Id(id)).await?))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    req: Request,
) -> AppResult<ApiResponse<Staff>> {
    let (body, picture) = form::read_body::<Map<String, Value>>(req, &state).await?;
    let changes = parse_update(body)?;
    let unchanged = changes.is_empty() && !picture.as_ref().is_some_and(|p| p.is_present());
    let staff = state.staff.update(&StaffKey::Id(id), changes, picture).await?;
    if unchanged {
        return Ok(ApiResponse::warning("Nothing to update", staff));
    }
    ok(staff)
}

pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<Staff>> {
    let removed = state.staff.remove(&StaffKey::Id(id)).await?;
    ok_with_message("Staff removed", removed)
}

pub async fn assign_schedule(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(body): Json<ScheduleAssignment>,
) -> AppResult<ApiResponse<Staff>> {
    ok(state.schedules.assign(id, body.schedule_id).await?)
}

pub async fn timelogs(
    State(state): State<ServerState>,
    principal: Principal,
    Path(id): Path<i64>,
    Query(query): Query<HistoryQuery>,
) -> ApiResult<Vec<TimeLog>> {
    gate::require_self_or_elevated(&principal, id)?;
    Ok(ApiResponse::success(
        state.attendance.history(id, query.limit).await?,
    ))
}
