//! YouTube モジュール
//!
//! 公式APIはチャンネルの配信状況を直接返さないため、次の3段階で解決する。
//! 1. チャンネルのライブページから動画IDを抽出
//! 2. Data API v3（videos.list）で題名・開始時刻・視聴者数を一括取得
//! 3. 視聴ページからゲーム名を抽出（APIに無い項目、取れなければ空）

mod client;
pub mod errors;
pub mod extract;
mod scraper;
pub mod types;

pub use client::YouTubeClient;
pub use errors::YouTubeError;
pub use scraper::PageScraper;
pub use types::VideoItem;
