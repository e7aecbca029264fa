//! YouTube公開ページのスクレイパー
//!
//! 同意画面へのリダイレクトを避けるため、全リクエストにCONSENTクッキーを付与する。

use reqwest::header::COOKIE;
use reqwest::Client;

use super::errors::YouTubeError;
use super::extract::{extract_game_name, extract_live_video_id};

const WEB_BASE: &str = "https://www.youtube.com";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const CONSENT_COOKIE: &str = "CONSENT=YES+42";

/// チャンネル／視聴ページ取得クライアント
#[derive(Debug, Clone)]
pub struct PageScraper {
    client: Client,
    web_base: String,
}

impl PageScraper {
    pub fn new(client: Client) -> Self {
        Self::with_base_url(client, WEB_BASE)
    }

    /// 取得先を指定して作成（テスト用）
    pub fn with_base_url(client: Client, web_base: impl Into<String>) -> Self {
        Self {
            client,
            web_base: web_base.into(),
        }
    }

    /// チャンネルのライブページから配信中の動画IDを取得
    ///
    /// 配信していない（またはページ構造が変わった）場合は `Ok(None)`。
    pub async fn fetch_live_video_id(&self, channel_id: &str) -> Result<Option<String>, YouTubeError> {
        let url = format!("{}/channel/{}/live", self.web_base, channel_id);
        let html = self.fetch_page(&url).await?;

        let video_id = extract_live_video_id(&html);
        match &video_id {
            Some(id) => log::debug!("Channel {} is live: {}", channel_id, id),
            None => log::debug!("Channel {} is not live", channel_id),
        }
        Ok(video_id)
    }

    /// 視聴ページからゲーム名を取得
    ///
    /// 取得できない場合は空文字列（エラーにはしない）。
    pub async fn fetch_game_name(&self, video_id: &str) -> String {
        let url = format!("{}/watch?v={}", self.web_base, video_id);

        match self.fetch_page(&url).await {
            Ok(html) => extract_game_name(&html).unwrap_or_default(),
            Err(e) => {
                log::warn!("Failed to fetch watch page for {}: {}", video_id, e);
                String::new()
            }
        }
    }

    async fn fetch_page(&self, url: &str) -> Result<String, YouTubeError> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .header(COOKIE, CONSENT_COOKIE)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(YouTubeError::PageError {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response.text().await?)
    }
}
