use std::time::Duration;

use tokio::task::JoinHandle;

use crate::services::PasswordResetService;

/// 期限切れリセットトークンの定期掃除を開始
///
/// 有効期限の判定は常にリデンプション時に行われるため、
/// このタスクは古いトークンを片付けるだけ。
pub fn spawn(service: PasswordResetService, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // 初回の即時 tick を読み捨てる
        ticker.tick().await;

        loop {
            ticker.tick().await;
            sweep_once(&service).await;
        }
    })
}

/// 1回分の掃除を実行
pub async fn sweep_once(service: &PasswordResetService) {
    tracing::debug!("期限切れトークン掃除: 開始");
    match service.purge_expired_tokens().await {
        Ok(0) => {}
        Ok(cleared) => tracing::info!(cleared = cleared, "期限切れトークン掃除: 完了"),
        Err(e) => tracing::error!(error = ?e, "期限切れトークン掃除に失敗"),
    }
}
