use reqwest::Client;
use tokio::sync::RwLock;

use super::{errors::TwitchError, types::*};
use crate::config::TWITCH_MAX_IDS_PER_REQUEST;
use crate::util::chunk_ids;

const AUTH_BASE: &str = "https://id.twitch.tv";
const API_BASE: &str = "https://api.twitch.tv/helix";

/// Twitch Helix APIクライアント
pub struct TwitchClient {
    client: Client,
    client_id: String,
    client_secret: String,
    auth_base: String,
    api_base: String,
    access_token: RwLock<Option<String>>,
}

impl TwitchClient {
    /// 本番エンドポイント向けのクライアントを作成
    pub fn new(client: Client, client_id: String, client_secret: String) -> Self {
        Self::with_base_urls(client, client_id, client_secret, AUTH_BASE, API_BASE)
    }

    /// エンドポイントを指定してクライアントを作成（テスト用モックサーバー等）
    pub fn with_base_urls(
        client: Client,
        client_id: String,
        client_secret: String,
        auth_base: impl Into<String>,
        api_base: impl Into<String>,
    ) -> Self {
        Self {
            client,
            client_id,
            client_secret,
            auth_base: auth_base.into(),
            api_base: api_base.into(),
            access_token: RwLock::new(None),
        }
    }

    /// アプリアクセストークンを（再）取得
    ///
    /// 失敗時は以前のトークンを破棄する。
    pub async fn refresh_app_access_token(&self) -> Result<(), TwitchError> {
        let result = self.request_app_access_token().await;

        let mut token = self.access_token.write().await;
        match result {
            Ok(data) => {
                log::debug!(
                    "Twitch app access token acquired (type: {}, expires in {}s)",
                    data.token_type,
                    data.expires_in
                );
                *token = Some(data.access_token);
                Ok(())
            }
            Err(e) => {
                *token = None;
                Err(e)
            }
        }
    }

    async fn request_app_access_token(&self) -> Result<AppAccessTokenResponse, TwitchError> {
        let url = format!("{}/oauth2/token", self.auth_base);

        let response = self
            .client
            .post(&url)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("grant_type", "client_credentials"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            log::error!("Twitch token request rejected: {} - {}", status, message);
            return Err(TwitchError::TokenRejected {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body)
            .map_err(|e| TwitchError::ParseError(format!("token response: {}", e)))
    }

    /// 指定ユーザーのうち配信中のストリームを取得
    ///
    /// 空入力ではリクエストを送らない。上限を超えるIDは分割して問い合わせる。
    pub async fn get_streams(&self, user_ids: &[String]) -> Result<Vec<StreamData>, TwitchError> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }

        let token = self
            .access_token
            .read()
            .await
            .clone()
            .ok_or(TwitchError::NotAuthenticated)?;

        let mut streams = Vec::new();
        for chunk in chunk_ids(user_ids, TWITCH_MAX_IDS_PER_REQUEST) {
            streams.extend(self.get_streams_page(&token, &chunk).await?);
        }

        log::info!(
            "Twitch: {} of {} users are live",
            streams.len(),
            user_ids.len()
        );
        Ok(streams)
    }

    async fn get_streams_page(
        &self,
        token: &str,
        user_ids: &[&str],
    ) -> Result<Vec<StreamData>, TwitchError> {
        let url = format!("{}/streams", self.api_base);

        let first = TWITCH_MAX_IDS_PER_REQUEST.to_string();
        let mut query: Vec<(&str, &str)> = user_ids.iter().map(|id| ("user_id", *id)).collect();
        query.push(("first", first.as_str()));

        let response = self
            .client
            .get(&url)
            .header("Client-Id", &self.client_id)
            .header("Authorization", format!("Bearer {}", token))
            .query(&query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            log::error!("Helix streams request failed: {} - {}", status, message);
            return Err(TwitchError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        let data: StreamsResponse = serde_json::from_str(&body)
            .map_err(|e| TwitchError::ParseError(format!("streams response: {}", e)))?;

        Ok(data.data)
    }
}

impl std::fmt::Debug for TwitchClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwitchClient")
            .field("client_id", &self.client_id)
            .field("api_base", &self.api_base)
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use mockito::{Matcher, Server, ServerGuard};

    pub(crate) const TOKEN_BODY: &str =
        r#"{"access_token":"tok","expires_in":5000,"token_type":"bearer"}"#;

    pub(crate) fn streams_body(entries: &[(&str, &str, u64)]) -> String {
        let data: Vec<serde_json::Value> = entries
            .iter()
            .map(|(id, user_id, viewers)| {
                serde_json::json!({
                    "id": id,
                    "user_id": user_id,
                    "user_login": format!("login_{}", user_id),
                    "user_name": format!("Name {}", user_id),
                    "game_id": "509658",
                    "game_name": "Just Chatting",
                    "type": "live",
                    "title": format!("stream {}", id),
                    "viewer_count": viewers,
                    "started_at": "2024-05-01T12:00:00Z",
                    "language": "en",
                    "thumbnail_url": "",
                    "tag_ids": [],
                    "is_mature": false
                })
            })
            .collect();
        serde_json::json!({ "data": data, "pagination": {} }).to_string()
    }

    fn client_for(server: &ServerGuard) -> TwitchClient {
        TwitchClient::with_base_urls(
            crate::config::build_http_client().unwrap(),
            "cid".to_string(),
            "secret".to_string(),
            server.url(),
            format!("{}/helix", server.url()),
        )
    }

    #[tokio::test]
    async fn test_empty_input_makes_no_request() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/helix/streams")
            .match_query(Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let client = client_for(&server);
        let streams = client.get_streams(&[]).await.unwrap();

        assert!(streams.is_empty());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_get_streams_without_token() {
        let server = Server::new_async().await;
        let client = client_for(&server);

        let result = client.get_streams(&["u1".to_string()]).await;
        assert!(matches!(result, Err(TwitchError::NotAuthenticated)));
    }

    #[tokio::test]
    async fn test_token_then_streams() {
        let mut server = Server::new_async().await;
        let token_mock = server
            .mock("POST", "/oauth2/token")
            .match_body(Matcher::UrlEncoded(
                "grant_type".into(),
                "client_credentials".into(),
            ))
            .with_status(200)
            .with_body(TOKEN_BODY)
            .create_async()
            .await;
        let streams_mock = server
            .mock("GET", "/helix/streams")
            .match_query(Matcher::Regex(
                "^user_id=u1&user_id=u2&first=100$".into(),
            ))
            .match_header("authorization", "Bearer tok")
            .match_header("client-id", "cid")
            .with_status(200)
            .with_body(streams_body(&[("s1", "u1", 42)]))
            .create_async()
            .await;

        let client = client_for(&server);
        client.refresh_app_access_token().await.unwrap();
        let streams = client
            .get_streams(&["u1".to_string(), "u2".to_string()])
            .await
            .unwrap();

        assert_eq!(streams.len(), 1);
        assert_eq!(streams[0].user_id, "u1");
        assert_eq!(streams[0].viewer_count, 42);
        assert_eq!(streams[0].game_name, "Just Chatting");
        token_mock.assert_async().await;
        streams_mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_token_rejected() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/oauth2/token")
            .with_status(400)
            .with_body(r#"{"status":400,"message":"invalid client secret"}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let result = client.refresh_app_access_token().await;

        assert!(matches!(
            result,
            Err(TwitchError::TokenRejected { status: 400, .. })
        ));
    }

    #[tokio::test]
    async fn test_large_id_set_is_chunked() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/oauth2/token")
            .with_status(200)
            .with_body(TOKEN_BODY)
            .create_async()
            .await;
        let streams_mock = server
            .mock("GET", "/helix/streams")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(streams_body(&[("s1", "u1", 1)]))
            .expect(2)
            .create_async()
            .await;

        let client = client_for(&server);
        client.refresh_app_access_token().await.unwrap();

        let ids: Vec<String> = (0..150).map(|i| format!("u{}", i)).collect();
        let streams = client.get_streams(&ids).await.unwrap();

        // 2ページ分の結果が連結される
        assert_eq!(streams.len(), 2);
        streams_mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_streams_api_error() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/oauth2/token")
            .with_status(200)
            .with_body(TOKEN_BODY)
            .create_async()
            .await;
        server
            .mock("GET", "/helix/streams")
            .match_query(Matcher::Any)
            .with_status(401)
            .with_body("unauthorized")
            .create_async()
            .await;

        let client = client_for(&server);
        client.refresh_app_access_token().await.unwrap();
        let result = client.get_streams(&["u1".to_string()]).await;

        assert!(matches!(
            result,
            Err(TwitchError::ApiError { status: 401, .. })
        ));
    }
}
