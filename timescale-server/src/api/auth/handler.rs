//! Sign-in handlers

use std::time::Duration;

use axum::{Json, extract::State};
use shared::client::{LoginRequest, LoginResponse, Role, UserInfo};

use crate::core::ServerState;
use crate::db::repository::{admin, staff};
use crate::security_log;
use crate::utils::credentials::verify_password;
use crate::utils::{ApiResponse, AppError, AppResult, ok};

/// Every sign-in attempt takes at least this long, found or not
const AUTH_FIXED_DELAY_MS: u64 = 300;

/// What a sign-in lookup found: id, name, email, password hash and role
struct Account {
    id: i64,
    name: String,
    email: String,
    password: String,
    role: Role,
}

pub async fn admin_signin(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<ApiResponse<LoginResponse>> {
    let account = admin::find_by_email(&state.pool, req.email.trim())
        .await?
        .map(|a| Account {
            id: a.id,
            name: a.name,
            email: a.email,
            password: a.password,
            role: Role::Admin,
        });
    sign_in(&state, account, &req).await
}

pub async fn staff_signin(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<ApiResponse<LoginResponse>> {
    let account = staff::find_by_email(&state.pool, req.email.trim())
        .await?
        .map(|s| Account {
            id: s.id,
            role: if s.is_manager { Role::Manager } else { Role::Staff },
            name: s.name,
            email: s.email,
            password: s.password,
        });
    sign_in(&state, account, &req).await
}

async fn sign_in(
    state: &ServerState,
    account: Option<Account>,
    req: &LoginRequest,
) -> AppResult<ApiResponse<LoginResponse>> {
    tokio::time::sleep(Duration::from_millis(AUTH_FIXED_DELAY_MS)).await;

    // Same error for an unknown email and a wrong password
    let account = match account {
        Some(a) if verify_password(&req.password, &a.password) => a,
        Some(a) => {
            security_log!("WARN", "login_failed", email = req.email, reason = "bad_password", user_id = a.id);
            return Err(AppError::invalid_credentials());
        }
        None => {
            security_log!("WARN", "login_failed", email = req.email, reason = "unknown_email");
            return Err(AppError::invalid_credentials());
        }
    };

    let token = state
        .jwt
        .generate_token(account.id, &account.name, account.role)
        .map_err(|e| AppError::internal(format!("Failed to generate token: {e}")))?;

    security_log!("INFO", "login_success", user_id = account.id, role = format!("{:?}", account.role));
    tracing::info!(user_id = account.id, role = ?account.role, "Signed in");

    ok(LoginResponse {
        token,
        expires_in: state.jwt.expires_in_seconds(),
        user: UserInfo {
            id: account.id,
            name: account.name,
            email: account.email,
            role: account.role,
        },
    })
}
