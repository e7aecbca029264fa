// =============================================================================
// 共通設定・定数モジュール
// =============================================================================
// 固定の定数値と、起動時にフラグ／環境変数から読み込むプロセス設定を定義
// =============================================================================

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// HTTPリクエストのタイムアウト（秒）
///
/// Twitch API、YouTubeページ・APIへの全リクエストで使用。
/// 応答しない上流があっても更新サイクル全体を止めないよう短めに設定する。
pub const HTTP_TIMEOUT_SECS: u64 = 5;

/// 更新サイクルの間隔（秒）
pub const REFRESH_INTERVAL_SECS: u64 = 60;

/// Helix `GET /streams` の1リクエストあたりの最大ID数
pub const TWITCH_MAX_IDS_PER_REQUEST: usize = 100;

/// YouTube `videos.list` の1リクエストあたりの最大ID数
pub const YOUTUBE_MAX_IDS_PER_REQUEST: usize = 50;

/// ライブページ取得の同時実行数
pub const SCRAPE_CONCURRENCY: usize = 4;

/// HTTPリクエストのタイムアウト（Duration）
pub fn http_timeout() -> Duration {
    Duration::from_secs(HTTP_TIMEOUT_SECS)
}

/// タイムアウト付きのHTTPクライアントを構築
///
/// 全ての上流リクエストで共有する。リトライはせず、
/// タイムアウトしたデータは次のサイクルで取り直す。
pub fn build_http_client() -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder().timeout(http_timeout()).build()
}

/// 更新サイクルの間隔（Duration）
pub fn refresh_interval() -> Duration {
    Duration::from_secs(REFRESH_INTERVAL_SECS)
}

/// 設定エラー
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Required credential is empty: {0}")]
    EmptyCredential(&'static str),
}

/// プロセス設定（フラグまたは環境変数）
#[derive(Debug, Clone, Parser)]
#[command(name = "live-roster", version, about)]
pub struct Config {
    /// Twitch アプリのクライアントID
    #[arg(long, env = "TWITCH_CLIENT_ID")]
    pub twitch_client_id: String,

    /// Twitch アプリのクライアントシークレット
    #[arg(long, env = "TWITCH_CLIENT_SECRET", hide_env_values = true)]
    pub twitch_client_secret: String,

    /// YouTube Data API v3 のAPIキー
    #[arg(long, env = "YOUTUBE_API_KEY", hide_env_values = true)]
    pub youtube_api_key: String,

    /// メンバー名簿ファイル（YAML）
    #[arg(long, env = "DATA_PATH", default_value = "data.yaml")]
    pub data_path: PathBuf,

    /// HTTPサーバーの待ち受けアドレス
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// HTTPサーバーの待ち受けポート
    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// 1サイクル全体の制限時間（秒）。未指定なら無制限
    #[arg(long, env = "CYCLE_TIMEOUT_SECS")]
    pub cycle_timeout_secs: Option<u64>,
}

impl Config {
    /// 空文字の認証情報を起動前に弾く
    pub fn validate(&self) -> Result<(), ConfigError> {
        let credentials = [
            ("twitch-client-id", &self.twitch_client_id),
            ("twitch-client-secret", &self.twitch_client_secret),
            ("youtube-api-key", &self.youtube_api_key),
        ];

        for (name, value) in credentials {
            if value.trim().is_empty() {
                return Err(ConfigError::EmptyCredential(name));
            }
        }

        Ok(())
    }

    /// HTTPサーバーのバインドアドレス
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// サイクル制限時間（未設定ならNone）
    pub fn cycle_timeout(&self) -> Option<Duration> {
        self.cycle_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Config, clap::Error> {
        Config::try_parse_from(std::iter::once("live-roster").chain(args.iter().copied()))
    }

    #[test]
    fn test_http_timeout_duration() {
        assert_eq!(http_timeout(), Duration::from_secs(5));
        assert_eq!(refresh_interval(), Duration::from_secs(60));
    }

    #[test]
    fn test_defaults() {
        let config = parse(&[
            "--twitch-client-id",
            "cid",
            "--twitch-client-secret",
            "secret",
            "--youtube-api-key",
            "key",
        ])
        .unwrap();

        assert_eq!(config.data_path, PathBuf::from("data.yaml"));
        assert_eq!(config.port, 3000);
        assert_eq!(config.listen_addr(), "0.0.0.0:3000");
        assert!(config.cycle_timeout().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_credential_rejected() {
        let config = parse(&[
            "--twitch-client-id",
            "",
            "--twitch-client-secret",
            "secret",
            "--youtube-api-key",
            "key",
        ])
        .unwrap();

        assert!(matches!(
            config.validate(),
            Err(ConfigError::EmptyCredential("twitch-client-id"))
        ));
    }

    #[test]
    fn test_cycle_timeout_zero_is_disabled() {
        let config = parse(&[
            "--twitch-client-id",
            "cid",
            "--twitch-client-secret",
            "secret",
            "--youtube-api-key",
            "key",
            "--cycle-timeout-secs",
            "0",
        ])
        .unwrap();

        assert!(config.cycle_timeout().is_none());
    }
}
