use axum::{
    extract::{Form, State},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::error::AppError;
use crate::services::Redemption;
use crate::state::AppState;

// === リセットリクエスト ===

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetRequestForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub redirect_to: String,
}

/// POST /request-reset
///
/// リセットリンクを本文で返す（配送は行わない）
pub async fn request_password_reset(
    State(state): State<AppState>,
    Form(form): Form<ResetRequestForm>,
) -> Result<String, AppError> {
    let link = state
        .password_reset_service
        .request_reset(&form.username, &form.redirect_to)
        .await?;

    Ok(format!("Password reset link: {}", link.url))
}

// === パスワードリセット実行 ===

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordForm {
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub new_password: String,
    #[serde(default)]
    pub redirect_to: Option<String>,
}

/// POST /reset-password
///
/// # Security
/// - token, new_password はログに出力しない
/// - redirect_to は検証せずそのまま Location に使う
///
/// トークンと新パスワードの検証はサービス側で行う（トークンが先）
pub async fn reset_password(
    State(state): State<AppState>,
    Form(form): Form<ResetPasswordForm>,
) -> Result<Response, AppError> {
    // バリデーション
    let location = validate_reset_password_form(&form)?;

    let redemption = state
        .password_reset_service
        .redeem_reset(
            &form.token,
            &form.new_password,
            redirect_target(&form),
        )
        .await?;

    let response = match (redemption, location) {
        (Redemption::Redirect(_), Some(location)) => {
            (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
        }
        _ => "Password successfully reset!".into_response(),
    };

    Ok(response)
}

/// 空文字の redirectTo は未指定として扱う
fn redirect_target(form: &ResetPasswordForm) -> Option<&str> {
    form.redirect_to.as_deref().filter(|target| !target.is_empty())
}

/// リセットパスワードフォームのバリデーション
///
/// # Returns
/// リダイレクト先の Location ヘッダー値（指定時のみ）
fn validate_reset_password_form(
    form: &ResetPasswordForm,
) -> Result<Option<HeaderValue>, AppError> {
    redirect_target(form)
        .map(|target| {
            HeaderValue::from_str(target)
                .map_err(|_| AppError::Validation("Invalid redirect target".to_string()))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(token: &str, new_password: &str, redirect_to: Option<&str>) -> ResetPasswordForm {
        ResetPasswordForm {
            token: token.to_string(),
            new_password: new_password.to_string(),
            redirect_to: redirect_to.map(str::to_string),
        }
    }

    #[test]
    fn test_validate_leaves_token_and_password_to_service() {
        // 空トークン・空パスワードはここでは弾かない
        let result = validate_reset_password_form(&form("", "", None));
        assert!(result.unwrap().is_none());
    }

    #[test]
    fn test_missing_fields_default_to_empty() {
        let form: ResetPasswordForm = serde_urlencoded::from_str("redirectTo=%2Fhome").unwrap();
        assert_eq!(form.token, "");
        assert_eq!(form.new_password, "");
        assert_eq!(form.redirect_to.as_deref(), Some("/home"));

        let form: ResetRequestForm = serde_urlencoded::from_str("").unwrap();
        assert_eq!(form.username, "");
        assert_eq!(form.redirect_to, "");
    }

    #[test]
    fn test_validate_invalid_redirect() {
        let result = validate_reset_password_form(&form("valid-token", "pw", Some("/a\nb")));
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_valid_form() {
        let location = validate_reset_password_form(&form("valid-token", "pw", Some("/dashboard")))
            .unwrap()
            .unwrap();
        assert_eq!(location, "/dashboard");
    }

    #[test]
    fn test_empty_redirect_is_absent() {
        let form = form("valid-token", "pw", Some(""));
        assert!(redirect_target(&form).is_none());
        assert!(validate_reset_password_form(&form).unwrap().is_none());
    }
}
