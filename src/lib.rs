pub mod config;
pub mod refresh;
pub mod roster;
pub mod server;
pub mod twitch;
pub mod util;
pub mod youtube;

use std::sync::Arc;

use config::Config;
use refresh::{Reconciler, RefreshScheduler};
use roster::RosterStore;
use twitch::TwitchClient;
use youtube::{PageScraper, YouTubeClient};

/// 起動処理のエラー
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// アプリケーションを起動し、Ctrl-Cで停止するまで動かす
///
/// 名簿ストアとHTTPクライアントはここで組み立て、各コンポーネントに渡す。
pub async fn run(config: Config) -> Result<(), BoxError> {
    config.validate()?;

    log::info!(
        "Starting live-roster (twitch client: {}, youtube key: {})",
        util::mask_secret(&config.twitch_client_id),
        util::mask_secret(&config.youtube_api_key)
    );

    let members = roster::load_roster(&config.data_path)?;
    let store = RosterStore::new(members);

    // 全上流で同じタイムアウト付きクライアントを共有
    let http = config::build_http_client()?;

    let reconciler = Reconciler::new(
        store.clone(),
        TwitchClient::new(
            http.clone(),
            config.twitch_client_id.clone(),
            config.twitch_client_secret.clone(),
        ),
        YouTubeClient::new(http.clone(), config.youtube_api_key.clone()),
        PageScraper::new(http),
    )
    .with_cycle_timeout(config.cycle_timeout());

    if let Some(limit) = config.cycle_timeout() {
        log::info!("Refresh cycle deadline: {:?}", limit);
    }

    // 待ち受けに失敗したら更新ループを始める前に終了する
    let listener = tokio::net::TcpListener::bind(config.listen_addr()).await?;

    let scheduler = RefreshScheduler::start(Arc::new(reconciler), config::refresh_interval());

    let served = server::start_http_server(listener, store, shutdown_signal()).await;

    scheduler.shutdown().await;
    served
}

/// Ctrl-Cを待つ
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => log::info!("Shutdown signal received"),
        Err(e) => {
            log::error!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
