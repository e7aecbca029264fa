use futures::stream::{self, StreamExt};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::time::{Duration, Instant};

use super::RefreshError;
use crate::config::SCRAPE_CONCURRENCY;
use crate::roster::{ChannelKind, Member, RosterStore, Stream};
use crate::twitch::{StreamData, TwitchClient};
use crate::youtube::{PageScraper, VideoItem, YouTubeClient};

/// 1サイクルの結果
#[derive(Debug, Clone, PartialEq)]
pub struct CycleSummary {
    pub members: usize,
    pub live_streams: usize,
    pub elapsed: Duration,
}

/// 配信状況の突き合わせエンジン
///
/// 名簿の全チャンネルを解決し、メンバーごとのストリーム一覧を作り直して
/// ストアに一括で公開する。ネットワークI/O中はストアのロックを保持しない。
pub struct Reconciler {
    store: RosterStore,
    twitch: TwitchClient,
    youtube: YouTubeClient,
    scraper: PageScraper,
    cycle_timeout: Option<Duration>,
}

impl Reconciler {
    pub fn new(
        store: RosterStore,
        twitch: TwitchClient,
        youtube: YouTubeClient,
        scraper: PageScraper,
    ) -> Self {
        Self {
            store,
            twitch,
            youtube,
            scraper,
            cycle_timeout: None,
        }
    }

    /// サイクル全体の制限時間を設定
    pub fn with_cycle_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.cycle_timeout = timeout;
        self
    }

    /// 更新サイクルを1回実行
    ///
    /// 失敗した場合、ストアは前回公開した状態のまま残る。
    pub async fn run_cycle(&self) -> Result<CycleSummary, RefreshError> {
        match self.cycle_timeout {
            Some(limit) => tokio::time::timeout(limit, self.refresh())
                .await
                .map_err(|_| RefreshError::Timeout(limit))?,
            None => self.refresh().await,
        }
    }

    async fn refresh(&self) -> Result<CycleSummary, RefreshError> {
        let started = Instant::now();
        log::info!("Refresh cycle started");

        self.twitch
            .refresh_app_access_token()
            .await
            .map_err(RefreshError::TokenRefresh)?;

        let roster = self.store.snapshot().await;
        let twitch_ids = collect_channel_ids(&roster, &ChannelKind::Twitch);
        let youtube_channels = collect_channel_ids(&roster, &ChannelKind::YouTube);

        let twitch_streams = self
            .twitch
            .get_streams(&twitch_ids)
            .await
            .map_err(RefreshError::StreamQuery)?;

        let videos = self.resolve_youtube_videos(&youtube_channels).await;
        let game_names = self.fetch_game_names(&youtube_channels, &videos).await;

        let members: Vec<Member> = roster
            .iter()
            .map(|member| {
                member.with_streams(build_member_streams(
                    member,
                    &twitch_streams,
                    &videos,
                    &game_names,
                ))
            })
            .collect();

        let summary = CycleSummary {
            members: members.len(),
            live_streams: members.iter().map(|m| m.streams.len()).sum(),
            elapsed: started.elapsed(),
        };

        self.store.publish(members).await;

        log::info!(
            "Refresh cycle finished: {} members, {} live streams ({:?})",
            summary.members,
            summary.live_streams,
            summary.elapsed
        );
        Ok(summary)
    }

    /// ライブページから動画IDを集め、メタデータを一括取得
    ///
    /// チャンネル単位の失敗は握りつぶして「配信なし」扱いにする。
    async fn resolve_youtube_videos(&self, channel_ids: &[String]) -> Vec<VideoItem> {
        if channel_ids.is_empty() {
            return Vec::new();
        }

        let discovered: Vec<Option<String>> = stream::iter(channel_ids.to_vec())
            .map(|channel_id: String| async move {
                match self.scraper.fetch_live_video_id(&channel_id).await {
                    Ok(video_id) => video_id,
                    Err(e) => {
                        log::warn!("Live page lookup failed for channel {}: {}", channel_id, e);
                        None
                    }
                }
            })
            .buffered(SCRAPE_CONCURRENCY)
            .collect()
            .await;

        let video_ids: Vec<String> = discovered
            .into_iter()
            .flatten()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        match self.youtube.list_videos(&video_ids).await {
            Ok(videos) => videos,
            Err(e) => {
                log::warn!(
                    "YouTube video lookup failed, skipping YouTube this cycle: {}",
                    e
                );
                Vec::new()
            }
        }
    }

    /// 実際に配信中と判定された動画だけゲーム名を取得（動画ごとに1回）
    async fn fetch_game_names(
        &self,
        channel_ids: &[String],
        videos: &[VideoItem],
    ) -> HashMap<String, String> {
        let bound: HashSet<&str> = channel_ids.iter().map(String::as_str).collect();
        let live_ids: BTreeSet<String> = videos
            .iter()
            .filter(|v| v.actual_start_time().is_some())
            .filter(|v| v.channel_id().is_some_and(|c| bound.contains(c)))
            .map(|v| v.id.clone())
            .collect();

        stream::iter(live_ids)
            .map(|video_id: String| async move {
                let game_name = self.scraper.fetch_game_name(&video_id).await;
                (video_id, game_name)
            })
            .buffered(SCRAPE_CONCURRENCY)
            .collect()
            .await
    }
}

/// 名簿全体から指定種別のチャンネルIDを重複なく集める
fn collect_channel_ids(members: &[Member], kind: &ChannelKind) -> Vec<String> {
    members
        .iter()
        .flat_map(|m| m.channel_ids(kind))
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// メンバーのチャンネルごとに解決結果を突き合わせ、ストリーム一覧を作る
fn build_member_streams(
    member: &Member,
    twitch_streams: &[StreamData],
    videos: &[VideoItem],
    game_names: &HashMap<String, String>,
) -> Vec<Stream> {
    let mut seen: HashSet<(ChannelKind, String)> = HashSet::new();
    let mut streams = Vec::new();

    for channel in &member.channels {
        let matched: Vec<Stream> = match channel.kind {
            ChannelKind::Twitch => twitch_streams
                .iter()
                .filter(|s| s.user_id == channel.value)
                .map(twitch_stream)
                .collect(),
            ChannelKind::YouTube => videos
                .iter()
                .filter(|v| v.channel_id() == Some(channel.value.as_str()))
                .filter_map(|v| youtube_stream(v, game_names))
                .collect(),
            ChannelKind::Unknown(_) => Vec::new(),
        };

        for stream in matched {
            if seen.insert((stream.kind.clone(), stream.id.clone())) {
                streams.push(stream);
            }
        }
    }

    streams
}

fn twitch_stream(stream: &StreamData) -> Stream {
    Stream {
        id: stream.id.clone(),
        kind: ChannelKind::Twitch,
        title: stream.title.clone(),
        game_name: stream.game_name.clone(),
        url: format!("https://twitch.tv/{}", stream.user_login),
        embed_url: format!("https://player.twitch.tv/?channel={}", stream.user_login),
        viewer_count: stream.viewer_count,
        started_at: stream.started_at,
    }
}

/// 実開始時刻の無い動画（配信予約など）はNone
fn youtube_stream(video: &VideoItem, game_names: &HashMap<String, String>) -> Option<Stream> {
    let started_at = video.actual_start_time()?;

    Some(Stream {
        id: video.id.clone(),
        kind: ChannelKind::YouTube,
        title: video
            .snippet
            .as_ref()
            .map(|s| s.title.clone())
            .unwrap_or_default(),
        game_name: game_names.get(&video.id).cloned().unwrap_or_default(),
        url: format!("https://youtube.com/watch?v={}", video.id),
        embed_url: format!("https://youtube.com/embed/{}", video.id),
        viewer_count: video.concurrent_viewers(),
        started_at,
    })
}
