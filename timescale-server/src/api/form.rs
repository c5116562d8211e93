//! Request bodies that may come as JSON or as multipart
//!
//! A multipart body carries the JSON document in a `data` part and an
//! optional file in a `picture` part. Other parts are ignored.

use axum::Json;
use axum::extract::{FromRequest, Multipart, Request};
use http::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::core::ServerState;
use crate::services::Upload;
use crate::utils::{AppError, AppResult};

const DATA_PART: &str = "data";
const PICTURE_PART: &str = "picture";

fn is_multipart(req: &Request) -> bool {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("multipart/form-data"))
}

/// Read `T` and an optional upload from either body shape
pub async fn read_body<T: DeserializeOwned>(
    req: Request,
    state: &ServerState,
) -> AppResult<(T, Option<Upload>)> {
    if !is_multipart(&req) {
        let Json(data) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| AppError::invalid_request(e.body_text()))?;
        return Ok((data, None));
    }

    let multipart = Multipart::from_request(req, state)
        .await
        .map_err(|e| AppError::invalid_request(e.body_text()))?;
    let (data, picture) = read_multipart(multipart).await?;
    let data = serde_json::from_value(data)
        .map_err(|e| AppError::validation(format!("Invalid {DATA_PART} part: {e}")))?;
    Ok((data, picture))
}

async fn read_multipart(mut multipart: Multipart) -> AppResult<(Value, Option<Upload>)> {
    let mut data = Value::Object(Map::new());
    let mut picture = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::invalid_request(format!("Invalid multipart request: {e}")))?
    {
        match field.name() {
            Some(DATA_PART) => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::invalid_request(format!("Multipart error: {e}")))?;
                if !bytes.is_empty() {
                    data = serde_json::from_slice(&bytes).map_err(|e| {
                        AppError::validation(format!("Invalid {DATA_PART} part: {e}"))
                    })?;
                }
            }
            Some(PICTURE_PART) => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::invalid_request(format!("Multipart error: {e}")))?;
                picture = Some(Upload {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            other => {
                tracing::debug!(part = ?other, "Ignoring multipart part");
            }
        }
    }

    Ok((data, picture))
}
