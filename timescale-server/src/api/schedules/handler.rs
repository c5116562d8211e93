//! Schedule API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use serde_json::{Map, Value};
use shared::models::{Schedule, ScheduleCreate, ScheduleSearch, ScheduleUpdate};

use crate::core::ServerState;
use crate::utils::{ApiResponse, AppResult, ok, ok_with_message};

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// Include each schedule's day offs
    #[serde(default)]
    pub with_references: bool,
}

pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<ApiResponse<Vec<Schedule>>> {
    ok(state.schedules.list(query.with_references).await?)
}

pub async fn search(
    State(state): State<ServerState>,
    Json(search): Json<ScheduleSearch>,
) -> AppResult<ApiResponse<Vec<Map<String, Value>>>> {
    ok(state.schedules.fetch(&search).await?)
}

pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<Schedule>> {
    ok(state.schedules.get(id).await?)
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<ScheduleCreate>,
) -> AppResult<ApiResponse<Schedule>> {
    let schedule = state.schedules.add(payload).await?;
    ok_with_message("Schedule created", schedule)
}

pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<ScheduleUpdate>,
) -> AppResult<ApiResponse<Schedule>> {
    let unchanged = payload.is_empty();
    let schedule = state.schedules.update(id, payload).await?;
    if unchanged {
        return Ok(ApiResponse::warning("Nothing to update", schedule));
    }
    ok(schedule)
}

pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<Schedule>> {
    let removed = state.schedules.remove(id).await?;
    ok_with_message("Schedule removed", removed)
}
