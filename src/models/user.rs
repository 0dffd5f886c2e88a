use sqlx::FromRow;
use time::OffsetDateTime;

/// ユーザー
///
/// `reset_token` と `reset_token_expires_at` は常にペアで設定・クリアされる
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub username: String,
    pub password_hash: String,
    pub reset_token: Option<String>,
    pub reset_token_expires_at: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl User {
    /// 指定時刻において有効なリセットトークンを保持しているか
    pub fn has_pending_reset(&self, now: OffsetDateTime) -> bool {
        matches!(
            (&self.reset_token, self.reset_token_expires_at),
            (Some(_), Some(expires_at)) if expires_at > now
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration;

    fn user(token: Option<&str>, expires_at: Option<OffsetDateTime>) -> User {
        let now = OffsetDateTime::now_utc();
        User {
            username: "alice".to_string(),
            password_hash: "hash".to_string(),
            reset_token: token.map(str::to_string),
            reset_token_expires_at: expires_at,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_pending_reset() {
        let now = OffsetDateTime::now_utc();
        assert!(user(Some("t"), Some(now + Duration::minutes(5))).has_pending_reset(now));
        assert!(!user(Some("t"), Some(now)).has_pending_reset(now));
        assert!(!user(None, None).has_pending_reset(now));
    }
}
