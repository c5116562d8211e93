//! Staff Model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    #[default]
    Other,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
        }
    }
}

impl std::str::FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            "other" => Ok(Gender::Other),
            other => Err(format!("unknown gender: {other}")),
        }
    }
}

/// Role name that grants manager rights; any other role is plain staff
pub const MANAGER_ROLE: &str = "Manager";

/// Staff record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Staff {
    pub id: i64,
    pub registration_id: String,
    pub name: String,
    pub email: String,
    pub dob: NaiveDate,
    pub gender: Gender,
    pub mobile: String,
    pub alternate_mobile: Option<String>,
    pub address: String,
    pub pincode: String,
    pub city: String,
    /// argon2 hash, never sent to clients
    #[serde(skip_serializing, default)]
    pub password: String,
    pub picture_id: Option<i64>,
    pub registration_date: i64,
    pub aadhar: String,
    pub is_manager: bool,
    pub schedule_id: Option<i64>,
    pub updated_at: i64,
}

/// Staff row joined with its picture reference, picture columns prefixed
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct StaffWithPicture {
    #[serde(flatten)]
    #[cfg_attr(feature = "db", sqlx(flatten))]
    pub staff: Staff,
    pub picture_bucket_name: Option<String>,
    pub picture_file_path: Option<String>,
    pub picture_file_name: Option<String>,
    pub picture_file_uri: Option<String>,
    pub picture_file_type: Option<String>,
    pub picture_expired_at: Option<i64>,
    pub picture_created_at: Option<i64>,
}

/// Create staff payload
///
/// Every field is optional on the wire so that all missing ones can be
/// reported together.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StaffCreate {
    pub name: Option<String>,
    pub registration_id: Option<String>,
    pub aadhar: Option<String>,
    pub password: Option<String>,
    pub dob: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub email: Option<String>,
    pub mobile: Option<String>,
    pub alternate_mobile: Option<String>,
    /// "Manager" or any other role name
    pub role: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub pincode: Option<String>,
    pub schedule_id: Option<i64>,
}

/// Update staff payload (mutable fields only)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StaffUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub dob: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub mobile: Option<String>,
    /// Absent keeps the number, `null` clears it
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub alternate_mobile: Option<Option<String>>,
    pub address: Option<String>,
    pub pincode: Option<String>,
    pub city: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

impl StaffUpdate {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Present-but-null becomes `Some(None)`; a missing key stays `None`
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Create response; `initial_password` is only set when the server
/// generated one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffCreated {
    pub staff: Staff,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_password: Option<String>,
}

/// Columns that may be filtered on or projected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaffField {
    Id,
    RegistrationId,
    Name,
    Email,
    Dob,
    Gender,
    Mobile,
    AlternateMobile,
    Address,
    Pincode,
    City,
    PictureId,
    RegistrationDate,
    Aadhar,
    IsManager,
    ScheduleId,
    UpdatedAt,
}

impl StaffField {
    pub const ALL: [StaffField; 17] = [
        StaffField::Id,
        StaffField::RegistrationId,
        StaffField::Name,
        StaffField::Email,
        StaffField::Dob,
        StaffField::Gender,
        StaffField::Mobile,
        StaffField::AlternateMobile,
        StaffField::Address,
        StaffField::Pincode,
        StaffField::City,
        StaffField::PictureId,
        StaffField::RegistrationDate,
        StaffField::Aadhar,
        StaffField::IsManager,
        StaffField::ScheduleId,
        StaffField::UpdatedAt,
    ];

    /// Column name
    pub fn as_str(&self) -> &'static str {
        match self {
            StaffField::Id => "id",
            StaffField::RegistrationId => "registration_id",
            StaffField::Name => "name",
            StaffField::Email => "email",
            StaffField::Dob => "dob",
            StaffField::Gender => "gender",
            StaffField::Mobile => "mobile",
            StaffField::AlternateMobile => "alternate_mobile",
            StaffField::Address => "address",
            StaffField::Pincode => "pincode",
            StaffField::City => "city",
            StaffField::PictureId => "picture_id",
            StaffField::RegistrationDate => "registration_date",
            StaffField::Aadhar => "aadhar",
            StaffField::IsManager => "is_manager",
            StaffField::ScheduleId => "schedule_id",
            StaffField::UpdatedAt => "updated_at",
        }
    }

    /// Integer-typed columns compare numerically
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            StaffField::Id
                | StaffField::PictureId
                | StaffField::RegistrationDate
                | StaffField::ScheduleId
                | StaffField::UpdatedAt
        )
    }
}

impl std::str::FromStr for StaffField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StaffField::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| format!("unknown staff field: {s}"))
    }
}

/// How fetch criteria combine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterType {
    /// Every criterion must match
    #[default]
    All,
    /// At least one criterion must match
    Any,
}

/// Query body for `POST /api/staff/search`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StaffSearch {
    pub criteria: Vec<(StaffField, String)>,
    #[serde(default)]
    pub filter_type: FilterType,
    #[serde(default)]
    pub first_only: bool,
    pub fields: Option<Vec<StaffField>>,
}

/// Body for `PUT /api/staff/{id}/schedule`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleAssignment {
    pub schedule_id: Option<i64>,
}
