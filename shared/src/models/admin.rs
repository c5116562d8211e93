//! Admin Model

use serde::{Deserialize, Serialize};

use super::staff::Gender;

/// Administrator account, created once by the bootstrap command
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Admin {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub gender: Gender,
    /// argon2 hash, never sent to clients
    #[serde(skip_serializing, default)]
    pub password: String,
}

/// Bootstrap payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminCreate {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub gender: Gender,
}
