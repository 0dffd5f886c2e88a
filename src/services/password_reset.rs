use std::sync::Arc;

use time::{Duration, OffsetDateTime};

use crate::error::AppError;
use crate::repositories::UserDirectory;
use crate::services::auth::hash_password;

/// トークンのバイト長（256ビット）
const TOKEN_BYTES: usize = 32;

/// 発行されたリセットリンク
#[derive(Debug, Clone)]
pub struct ResetLink {
    pub token: String,
    pub expires_at: OffsetDateTime,
    pub url: String,
}

/// パスワードリセット完了後の遷移
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Redemption {
    /// リダイレクトなしで完了
    Completed,
    /// 指定先へリダイレクト
    Redirect(String),
}

/// パスワードリセットサービス
#[derive(Clone)]
pub struct PasswordResetService {
    directory: Arc<dyn UserDirectory>,
    reset_link_base: String,
    token_ttl: Duration,
}

impl PasswordResetService {
    /// 新しい PasswordResetService を作成
    pub fn new(
        directory: Arc<dyn UserDirectory>,
        reset_link_base: impl Into<String>,
        token_ttl: Duration,
    ) -> Self {
        Self {
            directory,
            reset_link_base: reset_link_base.into(),
            token_ttl,
        }
    }

    /// パスワードリセットをリクエスト
    ///
    /// 既存のトークンは新しいトークンで上書きされる。
    ///
    /// # Security
    /// - トークン（平文）はログに出力しない
    /// - `redirect_to` は検証せずリンクに埋め込む
    pub async fn request_reset(
        &self,
        username: &str,
        redirect_to: &str,
    ) -> Result<ResetLink, AppError> {
        let token = generate_token();
        let expires_at = OffsetDateTime::now_utc() + self.token_ttl;

        // 検索と保存を1回の更新で行う
        let stored = self
            .directory
            .store_reset_token(username, &token, expires_at)
            .await?;

        if !stored {
            tracing::warn!(username = %username, "パスワードリセット: ユーザー不在");
            return Err(AppError::UserNotFound);
        }

        tracing::info!(username = %username, "パスワードリセットリクエスト");

        let url = self.build_reset_url(&token, redirect_to);

        tracing::info!(
            username = %username,
            redirect_to = %redirect_to,
            "リセットリンク生成"
        );

        Ok(ResetLink {
            token,
            expires_at,
            url,
        })
    }

    /// パスワードをリセット
    ///
    /// # Security
    /// - トークン・新パスワードはログに出力しない
    pub async fn redeem_reset(
        &self,
        token: &str,
        new_password: &str,
        redirect_to: Option<&str>,
    ) -> Result<Redemption, AppError> {
        let now = OffsetDateTime::now_utc();

        // 空パスワードはトークンの検証後に弾く
        if new_password.is_empty() {
            return match self.directory.find_by_reset_token(token, now).await? {
                Some(_) => Err(AppError::Validation("New password is required".to_string())),
                None => Err(invalid_token()),
            };
        }

        // 照合と更新を1文で行うため、トークン検証より先にハッシュ化が必要
        let password_hash = hash_password(new_password)?;

        let username = self
            .directory
            .redeem_reset_token(token, &password_hash, now)
            .await?
            .ok_or_else(invalid_token)?;

        tracing::info!(username = %username, "パスワードリセット完了");

        match redirect_to {
            Some(target) => {
                tracing::info!(username = %username, redirect_to = %target, "リセット後リダイレクト");
                Ok(Redemption::Redirect(target.to_string()))
            }
            None => Ok(Redemption::Completed),
        }
    }

    /// 期限切れトークンをクリア
    pub async fn purge_expired_tokens(&self) -> Result<u64, AppError> {
        let cleared = self
            .directory
            .delete_expired_tokens(OffsetDateTime::now_utc())
            .await?;
        Ok(cleared)
    }

    /// リセットURLを構築
    fn build_reset_url(&self, token: &str, redirect_to: &str) -> String {
        format!(
            "{}?token={}&redirectTo={}",
            self.reset_link_base,
            token,
            urlencoding::encode(redirect_to)
        )
    }
}

fn invalid_token() -> AppError {
    tracing::warn!("無効または期限切れのリセットトークン");
    AppError::InvalidOrExpiredToken
}

/// 32バイトのランダムトークンを生成（16進64文字）
fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::RngCore::fill_bytes(&mut rand::thread_rng(), &mut bytes);
    hex::encode(bytes)
}
