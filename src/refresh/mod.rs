//! 配信状況の定期更新モジュール
//!
//! `Reconciler` が1サイクル分の突き合わせを行い、
//! `RefreshScheduler` がそれを固定間隔で繰り返す。

mod reconciler;
mod scheduler;

pub use reconciler::{CycleSummary, Reconciler};
pub use scheduler::RefreshScheduler;

use std::time::Duration;
use thiserror::Error;

use crate::twitch::TwitchError;

/// サイクル全体を中断するエラー
///
/// YouTube側の失敗はチャンネル・動画単位で吸収されるため、ここには含まれない。
#[derive(Debug, Error)]
pub enum RefreshError {
    #[error("Twitch token refresh failed: {0}")]
    TokenRefresh(#[source] TwitchError),

    #[error("Twitch stream query failed: {0}")]
    StreamQuery(#[source] TwitchError),

    #[error("Refresh cycle exceeded {0:?}")]
    Timeout(Duration),
}
