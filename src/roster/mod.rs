//! メンバー名簿モジュール
//!
//! メンバーとチャンネルの対応、および最新の配信状況を保持する。

mod loader;
mod store;
pub mod types;

pub use loader::{load_roster, parse_roster, RosterError};
pub use store::RosterStore;
pub use types::{Channel, ChannelKind, Member, Stream};
