use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;

use crate::models::User;
use crate::repositories::{DirectoryError, UserDirectory};

/// メモリ上のユーザーディレクトリ（テスト・ローカル開発用）
///
/// 各操作は書き込みロックを保持したまま読み取りと更新を行う
#[derive(Clone, Default)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<String, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// ユーザーをそのまま登録（既存なら置き換え）
    pub async fn insert(&self, user: User) {
        self.users.write().await.insert(user.username.clone(), user);
    }

    /// 新しいユーザーを作成
    ///
    /// # Returns
    /// ユーザー名が既に使われている場合は None
    pub async fn create_user(&self, username: &str, password_hash: &str) -> Option<User> {
        let now = OffsetDateTime::now_utc();
        let user = User {
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            reset_token: None,
            reset_token_expires_at: None,
            created_at: now,
            updated_at: now,
        };

        let mut users = self.users.write().await;
        if users.contains_key(username) {
            return None;
        }
        users.insert(user.username.clone(), user.clone());

        Some(user)
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DirectoryError> {
        Ok(self.users.read().await.get(username).cloned())
    }

    async fn find_by_reset_token(
        &self,
        token: &str,
        now: OffsetDateTime,
    ) -> Result<Option<User>, DirectoryError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|user| user.reset_token.as_deref() == Some(token) && user.has_pending_reset(now))
            .cloned())
    }

    async fn store_reset_token(
        &self,
        username: &str,
        token: &str,
        expires_at: OffsetDateTime,
    ) -> Result<bool, DirectoryError> {
        let mut users = self.users.write().await;
        let Some(user) = users.get_mut(username) else {
            return Ok(false);
        };

        user.reset_token = Some(token.to_string());
        user.reset_token_expires_at = Some(expires_at);
        user.updated_at = OffsetDateTime::now_utc();

        Ok(true)
    }

    async fn redeem_reset_token(
        &self,
        token: &str,
        new_password_hash: &str,
        now: OffsetDateTime,
    ) -> Result<Option<String>, DirectoryError> {
        let mut users = self.users.write().await;
        let Some(user) = users
            .values_mut()
            .find(|user| user.reset_token.as_deref() == Some(token) && user.has_pending_reset(now))
        else {
            return Ok(None);
        };

        user.password_hash = new_password_hash.to_string();
        user.reset_token = None;
        user.reset_token_expires_at = None;
        user.updated_at = OffsetDateTime::now_utc();

        Ok(Some(user.username.clone()))
    }

    async fn delete_expired_tokens(&self, now: OffsetDateTime) -> Result<u64, DirectoryError> {
        let mut users = self.users.write().await;
        let mut cleared = 0;
        for user in users.values_mut() {
            if user.reset_token_expires_at.is_some_and(|at| at <= now) {
                user.reset_token = None;
                user.reset_token_expires_at = None;
                user.updated_at = OffsetDateTime::now_utc();
                cleared += 1;
            }
        }

        Ok(cleared)
    }
}
