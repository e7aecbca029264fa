use clap::Parser;
use tracing_subscriber::EnvFilter;

use live_roster_lib::config::Config;

#[tokio::main]
async fn main() {
    // .envがあれば読み込む（無くてもよい）
    dotenvy::dotenv().ok();

    // logクレートの出力もtracing-subscriber経由で表示される
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();

    if let Err(e) = live_roster_lib::run(config).await {
        log::error!("live-roster failed: {}", e);
        std::process::exit(1);
    }
}
