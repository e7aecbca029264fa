use chrono::{DateTime, Utc};
use serde::Deserialize;

// Twitch API レスポンス型

/// `POST /oauth2/token`（client_credentials）のレスポンス
#[derive(Debug, Deserialize)]
pub struct AppAccessTokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: u64,
    #[serde(default)]
    pub token_type: String,
}

/// `GET /helix/streams` のレスポンス
#[derive(Debug, Deserialize)]
pub struct StreamsResponse {
    pub data: Vec<StreamData>,
}

/// 配信中ストリーム1件
#[derive(Debug, Clone, Deserialize)]
pub struct StreamData {
    pub id: String,
    pub user_id: String,
    pub user_login: String,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub game_name: String,
    pub title: String,
    pub viewer_count: u64,
    pub started_at: DateTime<Utc>,
}
