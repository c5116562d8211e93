//! Schedule Model

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl From<chrono::Weekday> for Weekday {
    fn from(day: chrono::Weekday) -> Self {
        match day {
            chrono::Weekday::Mon => Weekday::Monday,
            chrono::Weekday::Tue => Weekday::Tuesday,
            chrono::Weekday::Wed => Weekday::Wednesday,
            chrono::Weekday::Thu => Weekday::Thursday,
            chrono::Weekday::Fri => Weekday::Friday,
            chrono::Weekday::Sat => Weekday::Saturday,
            chrono::Weekday::Sun => Weekday::Sunday,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum ShiftType {
    Day,
    Night,
    Afternoon,
    Evening,
    Morning,
}

/// Work schedule shared by any number of staff
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Schedule {
    pub id: i64,
    pub name: String,
    pub shift_type: ShiftType,
    pub shift_start: NaiveTime,
    pub shift_ends: NaiveTime,
    pub updated_at: i64,
    /// Filled in only when references are requested
    #[cfg_attr(feature = "db", sqlx(skip))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dayoffs: Option<Vec<Weekday>>,
}

/// Create schedule payload; all fields required, reported together
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScheduleCreate {
    pub name: Option<String>,
    pub shift_type: Option<ShiftType>,
    pub shift_start: Option<NaiveTime>,
    pub shift_ends: Option<NaiveTime>,
    pub dayoffs: Option<Vec<Weekday>>,
}

/// Update schedule payload; `dayoffs` replaces the whole set
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduleUpdate {
    pub name: Option<String>,
    pub shift_type: Option<ShiftType>,
    pub shift_start: Option<NaiveTime>,
    pub shift_ends: Option<NaiveTime>,
    pub dayoffs: Option<Vec<Weekday>>,
}

impl ScheduleUpdate {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Columns that may be filtered on or projected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleField {
    Id,
    Name,
    ShiftType,
    ShiftStart,
    ShiftEnds,
    UpdatedAt,
}

impl ScheduleField {
    pub const ALL: [ScheduleField; 6] = [
        ScheduleField::Id,
        ScheduleField::Name,
        ScheduleField::ShiftType,
        ScheduleField::ShiftStart,
        ScheduleField::ShiftEnds,
        ScheduleField::UpdatedAt,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ScheduleField::Id => "id",
            ScheduleField::Name => "name",
            ScheduleField::ShiftType => "shift_type",
            ScheduleField::ShiftStart => "shift_start",
            ScheduleField::ShiftEnds => "shift_ends",
            ScheduleField::UpdatedAt => "updated_at",
        }
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, ScheduleField::Id | ScheduleField::UpdatedAt)
    }
}

/// Query body for `POST /api/schedules/search`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScheduleSearch {
    pub criteria: Vec<(ScheduleField, String)>,
    #[serde(default)]
    pub filter_type: super::FilterType,
    #[serde(default)]
    pub first_only: bool,
    pub fields: Option<Vec<ScheduleField>>,
}
