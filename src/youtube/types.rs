use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

// YouTube Data API v3 レスポンス型（videos.list）

#[derive(Debug, Deserialize)]
pub struct VideoListResponse {
    #[serde(default)]
    pub items: Vec<VideoItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VideoItem {
    pub id: String,
    pub snippet: Option<VideoSnippet>,
    #[serde(rename = "liveStreamingDetails")]
    pub live_streaming_details: Option<LiveStreamingDetails>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VideoSnippet {
    #[serde(rename = "channelId")]
    pub channel_id: String,
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LiveStreamingDetails {
    #[serde(rename = "actualStartTime")]
    pub actual_start_time: Option<String>,
    /// APIは文字列で返すが、数値でも受け付ける
    #[serde(
        rename = "concurrentViewers",
        default,
        deserialize_with = "deserialize_viewer_count"
    )]
    pub concurrent_viewers: Option<u64>,
}

impl VideoItem {
    /// 配信の実開始時刻（未開始・不正値ならNone）
    pub fn actual_start_time(&self) -> Option<DateTime<Utc>> {
        let raw = self
            .live_streaming_details
            .as_ref()?
            .actual_start_time
            .as_deref()
            .filter(|s| !s.is_empty())?;

        match DateTime::parse_from_rfc3339(raw) {
            Ok(t) => Some(t.with_timezone(&Utc)),
            Err(e) => {
                log::warn!("Invalid actualStartTime for video {}: {} ({})", self.id, raw, e);
                None
            }
        }
    }

    pub fn concurrent_viewers(&self) -> u64 {
        self.live_streaming_details
            .as_ref()
            .and_then(|d| d.concurrent_viewers)
            .unwrap_or(0)
    }

    pub fn channel_id(&self) -> Option<&str> {
        self.snippet.as_ref().map(|s| s.channel_id.as_str())
    }
}

fn deserialize_viewer_count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Count {
        Number(u64),
        Text(String),
    }

    Ok(match Option::<Count>::deserialize(deserializer)? {
        Some(Count::Number(n)) => Some(n),
        Some(Count::Text(s)) => s.trim().parse().ok(),
        None => None,
    })
}
