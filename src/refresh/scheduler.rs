// =============================================================================
// 定期更新スケジューラー
// =============================================================================
// 起動直後に1回、その後は前回サイクル完了から一定間隔ごとに更新する。
// サイクルが重なることはなく、失敗してもログを出して次回に回す。
// =============================================================================

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

use super::Reconciler;

/// 定期更新タスク
pub struct RefreshScheduler {
    /// 実行中フラグ
    is_running: Arc<AtomicBool>,
    /// 停止通知（待機中のsleepを中断する）
    stop_signal: Arc<Notify>,
    handle: Option<JoinHandle<()>>,
}

impl RefreshScheduler {
    /// 更新ループを開始する
    ///
    /// # Arguments
    /// * `reconciler` - 突き合わせエンジン
    /// * `interval` - サイクル完了から次サイクル開始までの待機時間
    pub fn start(reconciler: Arc<Reconciler>, interval: Duration) -> Self {
        let is_running = Arc::new(AtomicBool::new(true));
        let stop_signal = Arc::new(Notify::new());

        let is_running_clone = Arc::clone(&is_running);
        let stop_signal_clone = Arc::clone(&stop_signal);

        let handle = tokio::spawn(async move {
            Self::refresh_loop(reconciler, interval, is_running_clone, stop_signal_clone).await;
        });

        log::info!("Refresh scheduler started (interval: {:?})", interval);

        Self {
            is_running,
            stop_signal,
            handle: Some(handle),
        }
    }

    async fn refresh_loop(
        reconciler: Arc<Reconciler>,
        interval: Duration,
        is_running: Arc<AtomicBool>,
        stop_signal: Arc<Notify>,
    ) {
        while is_running.load(Ordering::SeqCst) {
            if let Err(e) = reconciler.run_cycle().await {
                log::error!("Refresh cycle failed: {}", e);
            }

            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                _ = stop_signal.notified() => {
                    log::debug!("Refresh scheduler wake-up by stop signal");
                }
            }
        }

        log::info!("Refresh scheduler stopped");
    }

    /// 更新ループを停止する（実行中のサイクルは最後まで走る）
    pub fn stop(&self) {
        self.is_running.store(false, Ordering::SeqCst);
        self.stop_signal.notify_one();
    }

    /// 停止してループの終了を待つ
    pub async fn shutdown(mut self) {
        self.stop();
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                log::error!("Refresh scheduler task failed: {}", e);
            }
        }
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::{parse_roster, RosterStore};
    use crate::twitch::client::tests::{streams_body, TOKEN_BODY};
    use crate::twitch::TwitchClient;
    use crate::youtube::{PageScraper, YouTubeClient};
    use mockito::{Matcher, Server, ServerGuard};

    fn reconciler_for(server: &ServerGuard, store: RosterStore) -> Arc<Reconciler> {
        let http = crate::config::build_http_client().unwrap();
        Arc::new(Reconciler::new(
            store,
            TwitchClient::with_base_urls(
                http.clone(),
                "cid".to_string(),
                "secret".to_string(),
                server.url(),
                format!("{}/helix", server.url()),
            ),
            YouTubeClient::with_base_url(http.clone(), "key".to_string(), server.url()),
            PageScraper::with_base_url(http, server.url()),
        ))
    }

    fn store() -> RosterStore {
        RosterStore::new(
            parse_roster("members: [{name: Alex, channels: [{type: twitch, value: u1}]}]").unwrap(),
        )
    }

    #[tokio::test]
    async fn test_first_cycle_runs_immediately() {
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
            .with_status(200)
            .with_body(streams_body(&[("s1", "u1", 42)]))
            .create_async()
            .await;

        let store = store();
        let scheduler =
            RefreshScheduler::start(reconciler_for(&server, store.clone()), Duration::from_secs(3600));

        let published = tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                if !store.snapshot().await[0].streams.is_empty() {
                    break;
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await;

        assert!(published.is_ok());

        // 長い待機中でも停止通知ですぐに終了する
        let stopped = tokio::time::timeout(Duration::from_secs(5), scheduler.shutdown()).await;
        assert!(stopped.is_ok());
    }

    #[tokio::test]
    async fn test_youtube_cycle_on_background_task() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/oauth2/token")
            .with_status(200)
            .with_body(TOKEN_BODY)
            .create_async()
            .await;
        server
            .mock("GET", "/channel/c1/live")
            .with_status(200)
            .with_body(r#"<link rel="canonical" href="https://www.youtube.com/watch?v=v9">"#)
            .create_async()
            .await;
        server
            .mock("GET", "/videos")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(
                serde_json::json!({
                    "items": [{
                        "id": "v9",
                        "snippet": { "channelId": "c1", "title": "live" },
                        "liveStreamingDetails": {
                            "actualStartTime": "2024-05-01T12:00:00Z",
                            "concurrentViewers": "12"
                        }
                    }]
                })
                .to_string(),
            )
            .create_async()
            .await;
        let watch = server
            .mock("GET", "/watch")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#""title":{"simpleText":"Minecraft"},"subtitle""#)
            .expect(1)
            .create_async()
            .await;

        let store = RosterStore::new(
            parse_roster("members: [{name: Sam, channels: [{type: youtube, value: c1}]}]").unwrap(),
        );
        let scheduler =
            RefreshScheduler::start(reconciler_for(&server, store.clone()), Duration::from_secs(3600));

        let published = tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                let roster = store.snapshot().await;
                if let Some(stream) = roster[0].streams.first() {
                    break stream.clone();
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap();

        assert_eq!(published.id, "v9");
        assert_eq!(published.game_name, "Minecraft");
        assert_eq!(published.viewer_count, 12);

        scheduler.shutdown().await;
        watch.assert_async().await;
    }

    #[tokio::test]
    async fn test_failed_cycles_keep_scheduling() {
        let mut server = Server::new_async().await;
        let token = server
            .mock("POST", "/oauth2/token")
            .with_status(500)
            .expect_at_least(3)
            .create_async()
            .await;

        let scheduler =
            RefreshScheduler::start(reconciler_for(&server, store()), Duration::from_millis(10));

        tokio::time::sleep(Duration::from_millis(500)).await;
        scheduler.shutdown().await;

        token.assert_async().await;
    }
}
