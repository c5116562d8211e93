//! Admin Repository

use super::RepoResult;
use shared::models::{Admin, Gender};
use sqlx::SqliteExecutor;

const COLUMNS: &str = "id, name, email, gender, password";

pub async fn find_by_id<'e>(ex: impl SqliteExecutor<'e>, id: i64) -> RepoResult<Option<Admin>> {
    let admin = sqlx::query_as::<_, Admin>(&format!("SELECT {COLUMNS} FROM admin WHERE id = ?"))
        .bind(id)
        .fetch_optional(ex)
        .await?;
    Ok(admin)
}

pub async fn find_by_email<'e>(
    ex: impl SqliteExecutor<'e>,
    email: &str,
) -> RepoResult<Option<Admin>> {
    let admin =
        sqlx::query_as::<_, Admin>(&format!("SELECT {COLUMNS} FROM admin WHERE email = ?"))
            .bind(email)
            .fetch_optional(ex)
            .await?;
    Ok(admin)
}

/// Any admin already holding `name` or `email`
pub async fn find_by_name_or_email<'e>(
    ex: impl SqliteExecutor<'e>,
    name: &str,
    email: &str,
) -> RepoResult<Option<Admin>> {
    let admin = sqlx::query_as::<_, Admin>(&format!(
        "SELECT {COLUMNS} FROM admin WHERE name = ?1 OR email = ?2 LIMIT 1"
    ))
    .bind(name)
    .bind(email)
    .fetch_optional(ex)
    .await?;
    Ok(admin)
}

/// Insert with an already hashed password
pub async fn create<'e>(
    ex: impl SqliteExecutor<'e>,
    name: &str,
    email: &str,
    gender: Gender,
    password_hash: &str,
) -> RepoResult<Admin> {
    let admin = sqlx::query_as::<_, Admin>(&format!(
        "INSERT INTO admin (name, email, gender, password) VALUES (?1, ?2, ?3, ?4) RETURNING {COLUMNS}"
    ))
    .bind(name)
    .bind(email)
    .bind(gender)
    .bind(password_hash)
    .fetch_one(ex)
    .await?;
    Ok(admin)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::RepoError;
    use crate::db::repository::test_support::test_pool;

    #[tokio::test]
    async fn test_create_and_find() {
        let pool = test_pool().await;
        let admin = create(&pool, "root", "root@example.com", Gender::Other, "hash")
            .await
            .unwrap();
        assert_eq!(admin.gender, Gender::Other);

        let found = find_by_email(&pool, "root@example.com").await.unwrap().unwrap();
        assert_eq!(found.id, admin.id);
        assert!(find_by_id(&pool, admin.id).await.unwrap().is_some());
        assert!(
            find_by_name_or_email(&pool, "root", "other@example.com")
                .await
                .unwrap()
                .is_some()
        );
        assert!(
            find_by_name_or_email(&pool, "nobody", "nobody@example.com")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let pool = test_pool().await;
        create(&pool, "root", "root@example.com", Gender::Male, "hash")
            .await
            .unwrap();
        let err = create(&pool, "second", "root@example.com", Gender::Male, "hash")
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(_, _)));
    }
}
