use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// チャンネル種別
///
/// 未知の種別はそのまま保持し、どのリゾルバーにも一致させない。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ChannelKind {
    Twitch,
    YouTube,
    Unknown(String),
}

impl ChannelKind {
    pub fn as_str(&self) -> &str {
        match self {
            ChannelKind::Twitch => "twitch",
            ChannelKind::YouTube => "youtube",
            ChannelKind::Unknown(tag) => tag,
        }
    }
}

impl From<String> for ChannelKind {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "twitch" => ChannelKind::Twitch,
            "youtube" => ChannelKind::YouTube,
            _ => ChannelKind::Unknown(tag),
        }
    }
}

impl From<ChannelKind> for String {
    fn from(kind: ChannelKind) -> String {
        match kind {
            ChannelKind::Unknown(tag) => tag,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// メンバーに紐づくチャンネル（読み込み後は不変）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    #[serde(rename = "type")]
    pub kind: ChannelKind,
    pub value: String,
}

/// 配信中ストリームの正規化表現
///
/// サイクルごとに作り直され、サイクルをまたいだ同一性は持たない。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stream {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ChannelKind,
    pub title: String,
    pub game_name: String,
    pub url: String,
    pub embed_url: String,
    pub viewer_count: u64,
    pub started_at: DateTime<Utc>,
}

/// メンバー
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub name: String,
    /// 任意の付加情報（加工せずそのまま出力）
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub data: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub channels: Vec<Channel>,
    /// 配信中のストリーム（オフライン時は空配列）
    #[serde(default)]
    pub streams: Vec<Stream>,
}

impl Member {
    /// 指定種別のチャンネルIDを列挙
    pub fn channel_ids(&self, kind: &ChannelKind) -> impl Iterator<Item = &str> + '_ {
        let kind = kind.clone();
        self.channels
            .iter()
            .filter(move |c| c.kind == kind)
            .map(|c| c.value.as_str())
    }

    /// ストリームのみ差し替えた新しいメンバーを作る
    pub fn with_streams(&self, streams: Vec<Stream>) -> Self {
        Self {
            name: self.name.clone(),
            data: self.data.clone(),
            channels: self.channels.clone(),
            streams,
        }
    }
}
