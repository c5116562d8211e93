//! Administrator bootstrap
//!
//! The only way an admin account comes into being. Name, email and password
//! are given together or not at all; giving none is a no-op.

use shared::error::ErrorCode;
use shared::models::{Admin, AdminCreate, Gender};
use sqlx::SqlitePool;

use crate::db::repository::admin;
use crate::utils::credentials::hash_password;
use crate::utils::validation::MAX_EMAIL_LEN;
use crate::utils::{AppError, AppResult};

/// Superuser arguments as they arrive from the command line
#[derive(Debug, Clone, Default)]
pub struct SuperuserArgs {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub gender: Option<Gender>,
}

impl SuperuserArgs {
    /// `None` when no argument was given at all
    pub fn into_create(self) -> AppResult<Option<AdminCreate>> {
        let given = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        if !given(&self.name) && !given(&self.email) && !given(&self.password) {
            return Ok(None);
        }

        let missing: Vec<&str> = [("name", &self.name), ("email", &self.email), ("password", &self.password)]
            .into_iter()
            .filter(|(_, v)| !given(v))
            .map(|(field, _)| field)
            .collect();
        match (self.name, self.email, self.password) {
            (Some(name), Some(email), Some(password)) if missing.is_empty() => {
                let email = email.trim().to_string();
                if email.chars().count() > MAX_EMAIL_LEN {
                    return Err(AppError::validation(format!(
                        "email length should be at most {MAX_EMAIL_LEN} characters"
                    ))
                    .with_detail("field", "email"));
                }
                Ok(Some(AdminCreate {
                    name: name.trim().to_string(),
                    email,
                    password,
                    gender: self.gender.unwrap_or_default(),
                }))
            }
            _ => Err(AppError::required_fields(&missing)),
        }
    }
}

/// Create the admin unless one already holds the name or email
pub async fn create_superuser(pool: &SqlitePool, data: AdminCreate) -> AppResult<Admin> {
    if admin::find_by_name_or_email(pool, &data.name, &data.email)
        .await?
        .is_some()
    {
        return Err(AppError::with_message(
            ErrorCode::AlreadyExists,
            "An admin with this name/email already exists",
        )
        .with_detail("fields", vec!["name", "email"]));
    }

    let hash = hash_password(&data.password)
        .map_err(|e| AppError::internal(format!("Failed to hash password: {e}")))?;
    let created = admin::create(pool, &data.name, &data.email, data.gender, &hash).await?;

    tracing::info!(admin_id = created.id, name = %created.name, "Superuser created");
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::test_support::test_pool;
    use crate::utils::credentials::verify_password;

    fn args(name: Option<&str>, email: Option<&str>, password: Option<&str>) -> SuperuserArgs {
        SuperuserArgs {
            name: name.map(Into::into),
            email: email.map(Into::into),
            password: password.map(Into::into),
            gender: None,
        }
    }

    #[test]
    fn test_no_arguments_is_noop() {
        assert!(args(None, None, None).into_create().unwrap().is_none());
    }

    #[test]
    fn test_partial_arguments_rejected() {
        let err = args(Some("root"), None, Some("secret"))
            .into_create()
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::RequiredField);
        assert!(err.message.contains("email"));
    }

    #[test]
    fn test_long_email_rejected() {
        let email = format!("{}@example.com", "a".repeat(150));
        let err = args(Some("root"), Some(&email), Some("secret"))
            .into_create()
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }

    #[tokio::test]
    async fn test_create_once() {
        let pool = test_pool().await;
        let data = args(Some("root"), Some("root@example.com"), Some("s3cret!"))
            .into_create()
            .unwrap()
            .unwrap();

        let admin = create_superuser(&pool, data.clone()).await.unwrap();
        assert_eq!(admin.gender, Gender::Other);
        assert!(verify_password("s3cret!", &admin.password));

        let err = create_superuser(&pool, data).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::AlreadyExists);

        let other_email = AdminCreate {
            name: "root".into(),
            email: "other@example.com".into(),
            password: "x".into(),
            gender: Gender::Male,
        };
        assert!(create_superuser(&pool, other_email).await.is_err());
    }
}
