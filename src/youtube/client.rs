use reqwest::Client;

use super::{errors::YouTubeError, types::*};
use crate::config::YOUTUBE_MAX_IDS_PER_REQUEST;
use crate::util::chunk_ids;

const API_BASE: &str = "https://www.googleapis.com/youtube/v3";

/// YouTube Data API v3 クライアント
#[derive(Clone)]
pub struct YouTubeClient {
    client: Client,
    api_key: String,
    api_base: String,
}

impl YouTubeClient {
    pub fn new(client: Client, api_key: String) -> Self {
        Self::with_base_url(client, api_key, API_BASE)
    }

    /// エンドポイントを指定してクライアントを作成（テスト用）
    pub fn with_base_url(client: Client, api_key: String, api_base: impl Into<String>) -> Self {
        Self {
            client,
            api_key,
            api_base: api_base.into(),
        }
    }

    /// 動画メタデータを一括取得（snippet + liveStreamingDetails）
    ///
    /// 1リクエストあたりクォータ1消費。上限を超えるIDは分割して問い合わせる。
    pub async fn list_videos(&self, video_ids: &[String]) -> Result<Vec<VideoItem>, YouTubeError> {
        if video_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut videos = Vec::new();
        for chunk in chunk_ids(video_ids, YOUTUBE_MAX_IDS_PER_REQUEST) {
            videos.extend(self.list_videos_page(&chunk.join(",")).await?);
        }

        log::info!(
            "YouTube: fetched metadata for {} of {} videos",
            videos.len(),
            video_ids.len()
        );
        Ok(videos)
    }

    async fn list_videos_page(&self, ids: &str) -> Result<Vec<VideoItem>, YouTubeError> {
        log::debug!("Fetching video metadata: {} (quota cost: 1 unit)", ids);

        let url = format!("{}/videos", self.api_base);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("part", "snippet,liveStreamingDetails"),
                ("id", ids),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await?;

        match response.status() {
            reqwest::StatusCode::OK => {
                let body = response.text().await?;
                let data: VideoListResponse = serde_json::from_str(&body)
                    .map_err(|e| YouTubeError::ParseError(format!("videos response: {}", e)))?;
                Ok(data.items)
            }
            reqwest::StatusCode::BAD_REQUEST => {
                let error_text = response.text().await.unwrap_or_default();
                if error_text.contains("keyInvalid") {
                    log::error!("YouTube API key is invalid");
                    Err(YouTubeError::InvalidApiKey)
                } else {
                    log::error!("YouTube API bad request: {}", error_text);
                    Err(YouTubeError::ApiError {
                        status: 400,
                        message: error_text,
                    })
                }
            }
            reqwest::StatusCode::UNAUTHORIZED => {
                log::error!("Unauthorized - API key invalid");
                Err(YouTubeError::InvalidApiKey)
            }
            reqwest::StatusCode::FORBIDDEN => {
                let error_text = response.text().await.unwrap_or_default();

                if error_text.contains("quotaExceeded") {
                    log::error!("Quota exceeded - daily limit reached");
                    Err(YouTubeError::QuotaExceeded)
                } else if error_text.contains("rateLimitExceeded") {
                    log::warn!("Rate limit exceeded");
                    Err(YouTubeError::RateLimitExceeded)
                } else {
                    log::error!("API key invalid or insufficient permissions");
                    Err(YouTubeError::InvalidApiKey)
                }
            }
            status => {
                let error_text = response.text().await.unwrap_or_default();
                log::error!(
                    "Unexpected API response - status: {}, body: {}",
                    status,
                    error_text
                );
                Err(YouTubeError::ApiError {
                    status: status.as_u16(),
                    message: error_text,
                })
            }
        }
    }
}

impl std::fmt::Debug for YouTubeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YouTubeClient")
            .field("api_key", &crate::util::mask_secret(&self.api_key))
            .field("api_base", &self.api_base)
            .finish()
    }
}
