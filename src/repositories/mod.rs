pub mod memory;
pub mod user;

pub use memory::InMemoryUserRepository;
pub use user::UserRepository;

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::models::User;

/// ユーザーディレクトリのエラー
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("データベースエラー: {0}")]
    Database(#[from] sqlx::Error),
}

/// ユーザーディレクトリ（ユーザー名をキーとするユーザーストア）
///
/// 各操作は1レコードに対する読み取りと書き込みを不可分に行うこと。
/// アプリケーション側でのロックは前提にしない。
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// ユーザー名でユーザーを検索
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DirectoryError>;

    /// 有効なリセットトークンを保持するユーザーを検索（更新はしない）
    async fn find_by_reset_token(
        &self,
        token: &str,
        now: OffsetDateTime,
    ) -> Result<Option<User>, DirectoryError>;

    /// リセットトークンと有効期限を保存（既存のトークンは上書き）
    ///
    /// # Returns
    /// ユーザーが存在しない場合は `false`
    async fn store_reset_token(
        &self,
        username: &str,
        token: &str,
        expires_at: OffsetDateTime,
    ) -> Result<bool, DirectoryError>;

    /// 有効なトークンを消費してパスワードを更新
    ///
    /// トークン一致と `expires_at > now` の確認、パスワード更新、
    /// トークンのクリアを1回の更新で行う。
    ///
    /// # Returns
    /// 更新したユーザー名（一致する有効なトークンがない場合は None）
    async fn redeem_reset_token(
        &self,
        token: &str,
        new_password_hash: &str,
        now: OffsetDateTime,
    ) -> Result<Option<String>, DirectoryError>;

    /// 期限切れトークンをクリア
    ///
    /// # Returns
    /// クリアされたユーザー数
    async fn delete_expired_tokens(&self, now: OffsetDateTime) -> Result<u64, DirectoryError>;
}
