//! Twitch Helix API モジュール
//!
//! アプリアクセストークンを取得し、ユーザーIDの一覧から
//! 配信中のストリームを一括取得する。

pub(crate) mod client;
pub mod errors;
pub mod types;

pub use client::TwitchClient;
pub use errors::TwitchError;
pub use types::StreamData;
