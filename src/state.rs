use std::sync::Arc;

use time::Duration;

use crate::config::Config;
use crate::repositories::UserDirectory;
use crate::services::PasswordResetService;

/// アプリケーション共有状態
///
/// axum の State として全ハンドラーで共有される。
/// Clone は必須（axum が内部で clone するため）。
#[derive(Clone)]
pub struct AppState {
    /// パスワードリセットサービス
    pub password_reset_service: PasswordResetService,
}

impl AppState {
    /// 新しい AppState を作成
    pub fn new(directory: Arc<dyn UserDirectory>, config: &Config) -> Self {
        let password_reset_service = PasswordResetService::new(
            directory,
            config.reset_link_base.clone(),
            Duration::seconds(config.password_reset_token_ttl_secs),
        );

        Self {
            password_reset_service,
        }
    }
}
