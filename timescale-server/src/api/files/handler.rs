//! File reference handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::models::{FileRef, FileRemoval, FilesRemoved};

use crate::core::ServerState;
use crate::utils::{ApiResponse, AppResult, ok};

/// Metadata and a presigned URI, renewed first if it is about to lapse
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<FileRef>> {
    ok(state.files.get(&state.pool, id).await?)
}

pub async fn remove(
    State(state): State<ServerState>,
    Json(body): Json<FileRemoval>,
) -> AppResult<ApiResponse<FilesRemoved>> {
    let removed = state.files.remove(&state.pool, &body.file_names).await?;
    ok(FilesRemoved { removed })
}
