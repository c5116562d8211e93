//! Time Log Model

use serde::{Deserialize, Serialize};

/// One day's attendance entry for a staff member.
///
/// Times are Unix millis (UTC).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct TimeLog {
    pub id: i64,
    pub staff_id: i64,
    pub clock_in: Option<i64>,
    pub clock_out: Option<i64>,
    pub picture_id: Option<i64>,
    pub updated_at: i64,
}

/// Clock submission
///
/// `clock_in`/`clock_out` are corrections in local business time
/// (`YYYY-MM-DDTHH:MM`, seconds optional, or RFC 3339). Unparseable values
/// count as absent. `picture` is an inline `data:image/...;base64,` URL.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PunchRequest {
    /// Act on behalf of another staff member (managers only)
    pub staff_id: Option<i64>,
    pub clock_in: Option<String>,
    pub clock_out: Option<String>,
    pub picture: Option<String>,
}

/// Where a staff member stands for the current day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayState {
    NoEntry,
    ClockedIn,
    ClockedOut,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceStatus {
    pub state: DayState,
    pub entry: Option<TimeLog>,
}

/// Result of a clock submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PunchOutcome {
    /// True when a new entry was opened for the day
    pub created: bool,
    pub state: DayState,
    pub entry: TimeLog,
}
