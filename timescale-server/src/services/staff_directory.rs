//! Staff Directory
//!
//! Registration, lookup, editing and removal of staff members. Writes run in
//! one transaction each; picture objects of removed rows are deleted after
//! commit on a best-effort basis.

use chrono_tz::Tz;
use serde::Serialize;
use serde_json::{Map, Value};
use shared::models::{
    FilterType, MANAGER_ROLE, Staff, StaffCreate, StaffCreated, StaffField, StaffSearch,
    StaffUpdate, StaffWithPicture,
};
use sqlx::SqlitePool;

use super::file_store::{FileStore, Upload};
use crate::db::repository::staff::{NewStaff, StaffChanges, StaffKey};
use crate::db::repository::{RepoError, schedule, staff, time_log};
use crate::utils::credentials::{generate_password, generate_registration_id, hash_password};
use crate::utils::time::today;
use crate::utils::validation::{
    MAX_ADDRESS_LEN, MAX_CITY_LEN, validate_aadhar, validate_age, validate_email, validate_mobile,
    validate_name, validate_password, validate_picture, validate_pincode, validate_required_text,
};
use crate::utils::{AppError, AppResult, ErrorCode};

/// Key prefix for staff pictures inside the images bucket
pub const PICTURE_PATH: &str = "staff";

/// Fields an update may carry
const UPDATABLE: [&str; 11] = [
    "name",
    "email",
    "dob",
    "gender",
    "mobile",
    "alternate_mobile",
    "address",
    "pincode",
    "city",
    "password",
    "role",
];

/// Identity fields that can never change once registered
const IMMUTABLE: [&str; 3] = ["id", "registration_id", "aadhar"];

/// Staff listing, optionally joined with picture references
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum StaffListing {
    Plain(Vec<Staff>),
    WithPictures(Vec<StaffWithPicture>),
}

#[derive(Clone)]
pub struct StaffDirectory {
    pool: SqlitePool,
    files: FileStore,
    bucket: String,
    tz: Tz,
}

impl StaffDirectory {
    pub fn new(pool: SqlitePool, files: FileStore, bucket: impl Into<String>, tz: Tz) -> Self {
        Self {
            pool,
            files,
            bucket: bucket.into(),
            tz,
        }
    }

    /// Register a staff member.
    ///
    /// A missing registration id or password is generated; a generated
    /// password is returned once in the result.
    pub async fn add(&self, data: StaffCreate, picture: Option<Upload>) -> AppResult<StaffCreated> {
        let mut missing = Vec::new();
        let name = required(non_blank(data.name), "name", &mut missing);
        let aadhar = required(non_blank(data.aadhar), "aadhar", &mut missing);
        let dob = required(data.dob, "dob", &mut missing);
        let gender = required(data.gender, "gender", &mut missing);
        let email = required(non_blank(data.email), "email", &mut missing);
        let mobile = required(non_blank(data.mobile), "mobile", &mut missing);
        let role = required(non_blank(data.role), "role", &mut missing);
        let address = required(non_blank(data.address), "address", &mut missing);
        let city = required(non_blank(data.city), "city", &mut missing);
        let pincode = required(non_blank(data.pincode), "pincode", &mut missing);
        let (
            Some(name),
            Some(aadhar),
            Some(dob),
            Some(gender),
            Some(email),
            Some(mobile),
            Some(role),
            Some(address),
            Some(city),
            Some(pincode),
        ) = (name, aadhar, dob, gender, email, mobile, role, address, city, pincode)
        else {
            return Err(RepoError::MissingFields(missing).into());
        };

        let registration_id = non_blank(data.registration_id).unwrap_or_else(generate_registration_id);
        let (password, initial_password) = match non_blank(data.password) {
            Some(p) => (p, None),
            None => {
                let generated = generate_password();
                (generated.clone(), Some(generated))
            }
        };
        let alternate_mobile = non_blank(data.alternate_mobile);

        validate_name(&name)?;
        validate_email(&email)?;
        validate_mobile(&mobile, "mobile")?;
        if let Some(alt) = &alternate_mobile {
            validate_mobile(alt, "alternate_mobile")?;
        }
        validate_aadhar(&aadhar)?;
        validate_pincode(&pincode)?;
        validate_required_text(&address, "address", MAX_ADDRESS_LEN)?;
        validate_required_text(&city, "city", MAX_CITY_LEN)?;
        validate_password(&password)?;
        validate_age(dob, today(self.tz))?;
        if let Some(upload) = picture.as_ref().filter(|u| u.is_present()) {
            validate_picture(&upload.file_name, upload.bytes.len())?;
        }

        self.ensure_unique(&aadhar, &email, &registration_id).await?;
        if let Some(schedule_id) = data.schedule_id {
            schedule::get(&self.pool, schedule_id).await?;
        }

        let password_hash =
            hash_password(&password).map_err(|e| AppError::internal(format!("Hash error: {e}")))?;

        let mut tx = self.pool.begin().await.map_err(RepoError::from)?;
        let picture_id = self
            .files
            .add_file(&mut tx, picture.as_ref(), &self.bucket, PICTURE_PATH)
            .await?
            .map(|f| f.id);
        let created = staff::insert(
            &mut tx,
            &NewStaff {
                registration_id,
                name,
                email,
                dob,
                gender,
                mobile,
                alternate_mobile,
                address,
                pincode,
                city,
                password_hash,
                picture_id,
                aadhar,
                is_manager: role == MANAGER_ROLE,
                schedule_id: data.schedule_id,
            },
        )
        .await?;
        tx.commit().await.map_err(RepoError::from)?;

        tracing::info!(
            staff_id = created.id,
            registration_id = %created.registration_id,
            is_manager = created.is_manager,
            "Staff registered"
        );
        Ok(StaffCreated {
            staff: created,
            initial_password,
        })
    }

    /// Duplicate pre-check: aadhar and email, then registration id
    async fn ensure_unique(&self, aadhar: &str, email: &str, registration_id: &str) -> AppResult<()> {
        let existing = staff::fetch(
            &self.pool,
            &[
                (StaffField::Aadhar, aadhar.to_string()),
                (StaffField::Email, email.to_string()),
            ],
            FilterType::Any,
            true,
            Some(&[StaffField::Aadhar][..]),
        )
        .await?;
        if let Some(row) = existing.first() {
            return Err(if row.get("aadhar").and_then(Value::as_str) == Some(aadhar) {
                AppError::with_message(
                    ErrorCode::AadharAlreadyRegistered,
                    format!("Aadhar {aadhar} is already registered"),
                )
            } else {
                AppError::with_message(
                    ErrorCode::EmailAlreadyRegistered,
                    format!("Email {email} is already registered"),
                )
            });
        }

        let key = StaffKey::RegistrationId(registration_id.to_string());
        if staff::find(&self.pool, &key).await?.is_some() {
            return Err(AppError::with_message(
                ErrorCode::RegistrationIdExists,
                format!("Registration id {registration_id} already exists"),
            ));
        }
        Ok(())
    }

    pub async fn get(&self, key: &StaffKey) -> AppResult<Staff> {
        Ok(staff::get(&self.pool, key).await?)
    }

    /// Criteria lookup with projection
    pub async fn fetch(&self, search: &StaffSearch) -> AppResult<Vec<Map<String, Value>>> {
        Ok(staff::fetch(
            &self.pool,
            &search.criteria,
            search.filter_type,
            search.first_only,
            search.fields.as_deref(),
        )
        .await?)
    }

    /// All staff; with references, picture URIs are refreshed and joined in
    pub async fn list(&self, with_references: bool) -> AppResult<StaffListing> {
        if !with_references {
            return Ok(StaffListing::Plain(staff::list(&self.pool).await?));
        }

        let picture_ids: Vec<i64> = staff::list(&self.pool)
            .await?
            .iter()
            .filter_map(|s| s.picture_id)
            .collect();
        let mut conn = self.pool.acquire().await.map_err(RepoError::from)?;
        self.files.refresh_expiring(&mut conn, &picture_ids).await?;
        drop(conn);

        Ok(StaffListing::WithPictures(
            staff::list_with_pictures(&self.pool).await?,
        ))
    }

    /// Apply an update to a staff member.
    ///
    /// An update with no mutable field and no new picture changes nothing.
    pub async fn update(
        &self,
        key: &StaffKey,
        changes: StaffUpdate,
        picture: Option<Upload>,
    ) -> AppResult<Staff> {
        let current = staff::get(&self.pool, key).await?;
        let picture = picture.filter(|u| u.is_present());
        if changes.is_empty() && picture.is_none() {
            tracing::warn!(staff_id = current.id, "Staff update carried no changes");
            return Ok(current);
        }

        if let Some(name) = &changes.name {
            validate_name(name)?;
        }
        if let Some(email) = &changes.email {
            validate_email(email)?;
            if let Some(other) = staff::find_by_email(&self.pool, email).await?
                && other.id != current.id
            {
                return Err(AppError::with_message(
                    ErrorCode::EmailAlreadyRegistered,
                    format!("Email {email} is already registered"),
                ));
            }
        }
        if let Some(mobile) = &changes.mobile {
            validate_mobile(mobile, "mobile")?;
        }
        let alternate_mobile = changes.alternate_mobile.clone().map(non_blank);
        if let Some(Some(alt)) = &alternate_mobile {
            validate_mobile(alt, "alternate_mobile")?;
        }
        if let Some(pincode) = &changes.pincode {
            validate_pincode(pincode)?;
        }
        if let Some(address) = &changes.address {
            validate_required_text(address, "address", MAX_ADDRESS_LEN)?;
        }
        if let Some(city) = &changes.city {
            validate_required_text(city, "city", MAX_CITY_LEN)?;
        }
        if let Some(dob) = changes.dob {
            validate_age(dob, today(self.tz))?;
        }
        if let Some(upload) = &picture {
            validate_picture(&upload.file_name, upload.bytes.len())?;
        }
        let password_hash = match &changes.password {
            Some(p) => {
                validate_password(p)?;
                Some(hash_password(p).map_err(|e| AppError::internal(format!("Hash error: {e}")))?)
            }
            None => None,
        };

        let mut tx = self.pool.begin().await.map_err(RepoError::from)?;
        let new_picture = self
            .files
            .add_file(&mut tx, picture.as_ref(), &self.bucket, PICTURE_PATH)
            .await?;
        let replaced = match (&new_picture, current.picture_id) {
            (Some(_), Some(old)) => Some(old),
            _ => None,
        };
        let updated = staff::update(
            &mut tx,
            current.id,
            &StaffChanges {
                name: changes.name,
                email: changes.email,
                dob: changes.dob,
                gender: changes.gender,
                mobile: changes.mobile,
                alternate_mobile,
                address: changes.address,
                pincode: changes.pincode,
                city: changes.city,
                password_hash,
                picture_id: new_picture.map(|f| f.id),
                is_manager: changes.role.map(|role| role == MANAGER_ROLE),
            },
        )
        .await?;
        let stale = match replaced {
            Some(old) => self.files.detach(&mut tx, &[old]).await?,
            None => Vec::new(),
        };
        tx.commit().await.map_err(RepoError::from)?;
        self.files.delete_objects(&stale).await;

        tracing::info!(staff_id = updated.id, "Staff updated");
        Ok(updated)
    }

    /// Remove a staff member with their time logs and every picture they own.
    ///
    /// The assigned schedule is left alone.
    pub async fn remove(&self, key: &StaffKey) -> AppResult<Staff> {
        let mut tx = self.pool.begin().await.map_err(RepoError::from)?;
        let member = staff::get(&mut *tx, key).await?;

        let mut picture_ids = time_log::picture_ids_for_staff(&mut *tx, member.id).await?;
        picture_ids.extend(member.picture_id);

        staff::delete(&mut *tx, member.id).await?;
        let files = self.files.detach(&mut tx, &picture_ids).await?;
        tx.commit().await.map_err(RepoError::from)?;
        self.files.delete_objects(&files).await;

        tracing::info!(
            staff_id = member.id,
            registration_id = %member.registration_id,
            files = files.len(),
            "Staff removed"
        );
        Ok(member)
    }
}

/// Read a free-form update body against the allow-list
pub fn parse_update(body: Map<String, Value>) -> AppResult<StaffUpdate> {
    for key in body.keys() {
        if IMMUTABLE.contains(&key.as_str()) {
            return Err(AppError::with_message(
                ErrorCode::ImmutableField,
                format!("{key} cannot be changed"),
            )
            .with_detail("field", key.as_str()));
        }
        if !UPDATABLE.contains(&key.as_str()) {
            return Err(AppError::invalid_request(format!("Unknown field: {key}"))
                .with_detail("field", key.as_str()));
        }
    }
    serde_json::from_value(Value::Object(body))
        .map_err(|e| AppError::validation(format!("Invalid update: {e}")))
}

fn required<T>(value: Option<T>, field: &'static str, missing: &mut Vec<&'static str>) -> Option<T> {
    if value.is_none() {
        missing.push(field);
    }
    value
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::db::repository::test_support::test_pool;
    use crate::storage::MemoryStore;
    use chrono::NaiveDate;
    use shared::models::Gender;
    use std::sync::Arc;

    pub(crate) fn form(aadhar: &str, email: &str) -> StaffCreate {
        StaffCreate {
            name: Some("Ravi Kumar".into()),
            registration_id: None,
            aadhar: Some(aadhar.into()),
            password: Some("s3cret-pass".into()),
            dob: NaiveDate::from_ymd_opt(1991, 6, 15),
            gender: Some(Gender::Male),
            email: Some(email.into()),
            mobile: Some("+91 9876543210".into()),
            alternate_mobile: None,
            role: Some("Cashier".into()),
            address: Some("4 Park Street".into()),
            city: Some("Kolkata".into()),
            pincode: Some("700016".into()),
            schedule_id: None,
        }
    }

    fn photo() -> Upload {
        Upload {
            file_name: "me.jpg".into(),
            content_type: Some("image/jpeg".into()),
            bytes: vec![0xff, 0xd8, 0xff],
        }
    }

    async fn setup() -> (SqlitePool, Arc<MemoryStore>, StaffDirectory) {
        let pool = test_pool().await;
        let memory = Arc::new(MemoryStore::new());
        let directory =
            StaffDirectory::new(pool.clone(), FileStore::new(memory.clone()), "images", Tz::UTC);
        (pool, memory, directory)
    }

    #[tokio::test]
    async fn test_missing_fields_are_all_reported() {
        let (_pool, _memory, directory) = setup().await;
        let mut data = form("111122223333", "ravi@example.com");
        data.name = None;
        data.city = Some("  ".into());
        data.dob = None;

        let err = directory.add(data, None).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::RequiredField);
        assert_eq!(err.message, "Missing required fields: name, dob, city");
    }

    #[tokio::test]
    async fn test_add_then_fetch_round_trip() {
        let (_pool, _memory, directory) = setup().await;
        let mut data = form("111122223333", "ravi@example.com");
        data.role = Some(MANAGER_ROLE.into());
        let created = directory.add(data, None).await.unwrap();
        assert!(created.staff.is_manager);
        assert!(created.staff.registration_id.starts_with("STF-"));
        assert!(created.initial_password.is_none());

        let rows = directory
            .fetch(&StaffSearch {
                criteria: vec![(StaffField::Aadhar, "111122223333".into())],
                first_only: true,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["email"], "ravi@example.com");
        assert_eq!(rows[0]["mobile"], "+91 9876543210");
        assert_eq!(rows[0]["dob"], "1991-06-15");
        assert_eq!(rows[0]["is_manager"], true);
    }

    #[tokio::test]
    async fn test_duplicate_aadhar_rejected() {
        let (_pool, _memory, directory) = setup().await;
        directory
            .add(form("111122223333", "ravi@example.com"), None)
            .await
            .unwrap();
        let err = directory
            .add(form("111122223333", "other@example.com"), None)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::AadharAlreadyRegistered);

        let err = directory
            .add(form("999988887777", "ravi@example.com"), None)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::EmailAlreadyRegistered);
    }

    #[tokio::test]
    async fn test_generated_password_returned_once() {
        let (_pool, _memory, directory) = setup().await;
        let mut data = form("111122223333", "ravi@example.com");
        data.password = None;
        let created = directory.add(data, None).await.unwrap();
        let password = created.initial_password.unwrap();
        assert_eq!(password.len(), crate::utils::credentials::GENERATED_PASSWORD_LEN);
        assert!(crate::utils::credentials::verify_password(&password, &created.staff.password));
    }

    #[tokio::test]
    async fn test_validation_rejects_bad_input() {
        let (_pool, _memory, directory) = setup().await;
        let mut data = form("1234", "ravi@example.com");
        assert_eq!(
            directory.add(data.clone(), None).await.unwrap_err().code,
            ErrorCode::ValidationFailed
        );
        data.aadhar = Some("111122223333".into());
        data.dob = NaiveDate::from_ymd_opt(2020, 1, 1);
        assert_eq!(
            directory.add(data, None).await.unwrap_err().code,
            ErrorCode::ValueOutOfRange
        );
    }

    #[tokio::test]
    async fn test_parse_update_allow_list() {
        let body = |v: Value| v.as_object().cloned().unwrap();
        let parsed = parse_update(body(serde_json::json!({"city": "Delhi", "role": "Manager"})))
            .unwrap();
        assert_eq!(parsed.city.as_deref(), Some("Delhi"));

        let err = parse_update(body(serde_json::json!({"aadhar": "111122223333"}))).unwrap_err();
        assert_eq!(err.code, ErrorCode::ImmutableField);
        let err = parse_update(body(serde_json::json!({"salary": 10}))).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidRequest);
    }

    #[tokio::test]
    async fn test_update_role_and_picture_replacement() {
        let (_pool, memory, directory) = setup().await;
        let created = directory
            .add(form("111122223333", "ravi@example.com"), Some(photo()))
            .await
            .unwrap();
        let old_picture = created.staff.picture_id.unwrap();
        let key = StaffKey::Id(created.staff.id);

        let unchanged = directory.update(&key, StaffUpdate::default(), None).await.unwrap();
        assert_eq!(unchanged, created.staff);

        let changes = StaffUpdate {
            role: Some(MANAGER_ROLE.into()),
            ..Default::default()
        };
        let updated = directory.update(&key, changes, Some(photo())).await.unwrap();
        assert!(updated.is_manager);
        assert_ne!(updated.picture_id, Some(old_picture));
        assert_eq!(memory.len().await, 1);
        assert_eq!(memory.delete_count(), 1);
    }

    #[tokio::test]
    async fn test_remove_cascades_pictures_and_time_logs() {
        let (pool, memory, directory) = setup().await;
        let created = directory
            .add(form("111122223333", "ravi@example.com"), Some(photo()))
            .await
            .unwrap();
        let mut conn = pool.acquire().await.unwrap();
        time_log::insert(&mut conn, created.staff.id, Some(1), None, None)
            .await
            .unwrap();
        drop(conn);

        directory.remove(&StaffKey::Id(created.staff.id)).await.unwrap();
        assert!(memory.is_empty().await);
        let logs: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM time_log")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(logs, 0);
    }

    #[tokio::test]
    async fn test_remove_deletes_every_punch_picture() {
        use crate::services::Attendance;
        use base64::Engine;
        use base64::engine::general_purpose::STANDARD;
        use shared::models::PunchRequest;

        let (pool, memory, directory) = setup().await;
        let attendance =
            Attendance::new(pool.clone(), FileStore::new(memory.clone()), "images", Tz::UTC);
        let created = directory
            .add(form("111122223333", "ravi@example.com"), Some(photo()))
            .await
            .unwrap();
        let staff_id = created.staff.id;

        let with_photo = PunchRequest {
            picture: Some(format!("data:image/png;base64,{}", STANDARD.encode([1u8, 2, 3]))),
            ..Default::default()
        };
        let day = 24 * 60 * 60 * 1000;
        let first_morning = 1_710_234_000_000;
        for now in [first_morning, first_morning + 8 * 3_600_000, first_morning + day] {
            attendance.punch(staff_id, &with_photo, now).await.unwrap();
        }

        async fn count_files(pool: &SqlitePool) -> i64 {
            sqlx::query_scalar("SELECT COUNT(*) FROM files")
                .fetch_one(pool)
                .await
                .unwrap()
        }
        // Profile photo, the second photo of day one, and day two's photo
        assert_eq!(memory.put_count(), 4);
        assert_eq!(count_files(&pool).await, 3);
        assert_eq!(memory.delete_count(), 1);

        directory.remove(&StaffKey::Id(staff_id)).await.unwrap();
        assert_eq!(count_files(&pool).await, 0);
        assert_eq!(memory.delete_count(), 4);
        assert!(memory.is_empty().await);
    }

    #[tokio::test]
    async fn test_update_clears_alternate_mobile() {
        let (_pool, _memory, directory) = setup().await;
        let mut data = form("111122223333", "ravi@example.com");
        data.alternate_mobile = Some("9123456780".into());
        let created = directory.add(data, None).await.unwrap();
        assert_eq!(created.staff.alternate_mobile.as_deref(), Some("9123456780"));
        let key = StaffKey::Id(created.staff.id);

        let body = serde_json::json!({"alternate_mobile": null});
        let changes = parse_update(body.as_object().cloned().unwrap()).unwrap();
        let updated = directory.update(&key, changes, None).await.unwrap();
        assert_eq!(updated.alternate_mobile, None);

        let bad = StaffUpdate {
            alternate_mobile: Some(Some("12".into())),
            ..Default::default()
        };
        assert_eq!(
            directory.update(&key, bad, None).await.unwrap_err().code,
            ErrorCode::ValidationFailed
        );
    }

    #[tokio::test]
    async fn test_remove_unknown_is_not_found() {
        let (pool, _memory, directory) = setup().await;
        directory
            .add(form("111122223333", "ravi@example.com"), None)
            .await
            .unwrap();
        let err = directory.remove(&StaffKey::Id(4242)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::StaffNotFound);
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM staff")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_list_with_references_flattens_picture() {
        let (_pool, _memory, directory) = setup().await;
        directory
            .add(form("111122223333", "ravi@example.com"), Some(photo()))
            .await
            .unwrap();
        let listing = directory.list(true).await.unwrap();
        let json = serde_json::to_value(&listing).unwrap();
        assert_eq!(json[0]["picture_bucket_name"], "images");
        assert_eq!(json[0]["picture_file_type"], "image/jpeg");
        assert_eq!(json[0]["picture_file_path"], PICTURE_PATH);
        assert!(json[0]["picture_created_at"].as_i64().unwrap() > 0);
        assert!(json[0].get("password").is_none());

        let plain = serde_json::to_value(directory.list(false).await.unwrap()).unwrap();
        assert!(plain[0].get("picture_file_uri").is_none());
    }
}
