use time::OffsetDateTime;
use uuid::Uuid;

use common::workspace::User;

use super::{DUuid, Database};

/// A user row with its credentials
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub user: User,
    pub password_hash: String,
    pub salt: String,
    pub created_at: OffsetDateTime,
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: DUuid,
    login: String,
    password_hash: String,
    salt: String,
    created_at: OffsetDateTime,
}

impl From<UserRow> for UserRecord {
    fn from(row: UserRow) -> Self {
        UserRecord {
            user: User {
                id: row.id.into(),
                login: row.login,
            },
            password_hash: row.password_hash,
            salt: row.salt,
            created_at: row.created_at,
        }
    }
}

impl Database {
    pub async fn create_user(
        &self,
        login: &str,
        password_hash: &str,
        salt: &str,
    ) -> Result<UserRecord, sqlx::Error> {
        let row: UserRow = sqlx::query_as(
            r#"
            INSERT INTO users (id, login, password_hash, salt)
            VALUES (?, ?, ?, ?)
            RETURNING id, login, password_hash, salt, created_at
            "#,
        )
        .bind(DUuid::from(Uuid::new_v4()))
        .bind(login)
        .bind(password_hash)
        .bind(salt)
        .fetch_one(&**self)
        .await?;

        Ok(row.into())
    }

    pub async fn find_user_by_login(&self, login: &str) -> Result<Option<UserRecord>, sqlx::Error> {
        let row: Option<UserRow> = sqlx::query_as(
            r#"
            SELECT id, login, password_hash, salt, created_at
            FROM users
            WHERE login = ?
            "#,
        )
        .bind(login)
        .fetch_optional(&**self)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Resolve a session token to its user.
    pub async fn find_user_by_token(&self, token: &str) -> Result<Option<User>, sqlx::Error> {
        let row: Option<UserRow> = sqlx::query_as(
            r#"
            SELECT id, login, password_hash, salt, created_at
            FROM users
            WHERE token = ?
            "#,
        )
        .bind(token)
        .fetch_optional(&**self)
        .await?;

        Ok(row.map(|r| UserRecord::from(r).user))
    }

    /// Set or clear the session token. Fails with a unique violation when
    /// another user already holds `token`.
    pub async fn set_user_token(&self, id: Uuid, token: Option<&str>) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET token = ? WHERE id = ?")
            .bind(token)
            .bind(DUuid::from(id))
            .execute(&**self)
            .await?;
        Ok(())
    }

    /// Clear whichever session `token` belongs to. Returns false when no
    /// user held it.
    pub async fn clear_token(&self, token: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET token = NULL WHERE token = ?")
            .bind(token)
            .execute(&**self)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
