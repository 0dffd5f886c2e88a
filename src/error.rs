use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::repositories::DirectoryError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("ユーザーが見つかりません")]
    UserNotFound,

    #[error("無効または期限切れのリセットトークン")]
    InvalidOrExpiredToken,

    #[error("バリデーションエラー: {0}")]
    Validation(String),

    #[error("永続化エラー")]
    Persistence(#[from] DirectoryError),

    #[error("内部エラー")]
    Internal(#[from] anyhow::Error),
}

const INTERNAL_SERVER_ERROR_BODY: &str = "Internal Server Error";

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::UserNotFound => (StatusCode::NOT_FOUND, "User not found".to_string()),
            Self::InvalidOrExpiredToken => (
                StatusCode::BAD_REQUEST,
                "Invalid or expired reset token".to_string(),
            ),
            Self::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::Persistence(e) => {
                tracing::error!(error = ?e, "永続化エラー");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    INTERNAL_SERVER_ERROR_BODY.to_string(),
                )
            }
            Self::Internal(e) => {
                tracing::error!(error = ?e, "内部エラー");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    INTERNAL_SERVER_ERROR_BODY.to_string(),
                )
            }
        };

        (status, message).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::UserNotFound.into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::InvalidOrExpiredToken.into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Validation("x".to_string()).into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Internal(anyhow::anyhow!("boom"))
                .into_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_persistence_error_hides_detail() {
        let response = AppError::from(DirectoryError::Database(sqlx::Error::PoolTimedOut))
            .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"Internal Server Error");
    }
}
