use secrecy::SecretBox;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub database_url: SecretBox<String>,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_database_max_connections")]
    pub database_max_connections: u32,

    // パスワードリセット設定
    /// リセットリンクのベースURL（`?token=...&redirectTo=...` が付与される）
    #[serde(default = "default_reset_link_base")]
    pub reset_link_base: String,
    #[serde(default = "default_password_reset_token_ttl_secs")]
    pub password_reset_token_ttl_secs: i64,
    /// 期限切れトークン掃除の間隔（未設定または0で無効）
    #[serde(default)]
    pub token_sweep_interval_secs: Option<u64>,
}

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_RESET_LINK_BASE: &str = "http://localhost:3000/reset-password";
const DEFAULT_PASSWORD_RESET_TOKEN_TTL_SECS: i64 = 3600;

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_database_max_connections() -> u32 {
    DEFAULT_DATABASE_MAX_CONNECTIONS
}

fn default_reset_link_base() -> String {
    DEFAULT_RESET_LINK_BASE.to_string()
}

fn default_password_reset_token_ttl_secs() -> i64 {
    DEFAULT_PASSWORD_RESET_TOKEN_TTL_SECS
}

impl Config {
    pub fn load() -> Result<Self, envy::Error> {
        envy::from_env()
    }

    /// 掃除タスクの間隔（無効の場合は None）
    pub fn token_sweep_interval(&self) -> Option<std::time::Duration> {
        self.token_sweep_interval_secs
            .filter(|secs| *secs > 0)
            .map(std::time::Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load_from(vars: &[(&str, &str)]) -> Result<Config, envy::Error> {
        envy::from_iter(
            vars.iter()
                .map(|(k, v)| (k.to_string(), v.to_string())),
        )
    }

    #[test]
    fn test_defaults_applied() {
        let config = load_from(&[("DATABASE_URL", "postgres://localhost/test")]).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.password_reset_token_ttl_secs, 3600);
        assert_eq!(config.reset_link_base, "http://localhost:3000/reset-password");
        assert!(config.token_sweep_interval().is_none());
    }

    #[test]
    fn test_missing_database_url() {
        let result = load_from(&[("PORT", "8080")]);
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_sweep_interval_disables_sweep() {
        let config = load_from(&[
            ("DATABASE_URL", "postgres://localhost/test"),
            ("TOKEN_SWEEP_INTERVAL_SECS", "0"),
        ])
        .unwrap();
        assert!(config.token_sweep_interval().is_none());

        let config = load_from(&[
            ("DATABASE_URL", "postgres://localhost/test"),
            ("TOKEN_SWEEP_INTERVAL_SECS", "600"),
        ])
        .unwrap();
        assert_eq!(
            config.token_sweep_interval(),
            Some(std::time::Duration::from_secs(600))
        );
    }
}
