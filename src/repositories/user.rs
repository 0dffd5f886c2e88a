use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;

use crate::models::User;
use crate::repositories::{DirectoryError, UserDirectory};

/// PostgreSQL 上のユーザーディレクトリ
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for UserRepository {
    /// # Note
    /// DB セットアップ後は `query_as!` マクロに変更してコンパイル時SQL検証を有効にすること
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DirectoryError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT username, password_hash, reset_token, reset_token_expires_at,
                   created_at, updated_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_reset_token(
        &self,
        token: &str,
        now: OffsetDateTime,
    ) -> Result<Option<User>, DirectoryError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT username, password_hash, reset_token, reset_token_expires_at,
                   created_at, updated_at
            FROM users
            WHERE reset_token = $1 AND reset_token_expires_at > $2
            "#,
        )
        .bind(token)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn store_reset_token(
        &self,
        username: &str,
        token: &str,
        expires_at: OffsetDateTime,
    ) -> Result<bool, DirectoryError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET reset_token = $2, reset_token_expires_at = $3, updated_at = NOW()
            WHERE username = $1
            "#,
        )
        .bind(username)
        .bind(token)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// # Note
    /// password_hash はログに出力しないこと
    async fn redeem_reset_token(
        &self,
        token: &str,
        new_password_hash: &str,
        now: OffsetDateTime,
    ) -> Result<Option<String>, DirectoryError> {
        let username = sqlx::query_scalar::<_, String>(
            r#"
            UPDATE users
            SET password_hash = $2,
                reset_token = NULL,
                reset_token_expires_at = NULL,
                updated_at = NOW()
            WHERE reset_token = $1 AND reset_token_expires_at > $3
            RETURNING username
            "#,
        )
        .bind(token)
        .bind(new_password_hash)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        Ok(username)
    }

    async fn delete_expired_tokens(&self, now: OffsetDateTime) -> Result<u64, DirectoryError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET reset_token = NULL, reset_token_expires_at = NULL, updated_at = NOW()
            WHERE reset_token_expires_at <= $1
            "#,
        )
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
