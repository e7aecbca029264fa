//! 名簿ファイルの読み込み

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

use super::types::Member;

/// 名簿読み込みエラー
#[derive(Debug, Error)]
pub enum RosterError {
    #[error("Failed to read roster file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse roster file: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// 名簿ファイルのトップレベル構造
#[derive(Debug, Deserialize)]
struct RosterFile {
    #[serde(default)]
    members: Vec<Member>,
}

/// YAML文字列から名簿を読み込む（JSONも可）
///
/// 読み込み時点のストリームは信用せず、常に空から開始する。
pub fn parse_roster(source: &str) -> Result<Vec<Member>, RosterError> {
    let file: RosterFile = serde_yaml::from_str(source)?;

    Ok(file
        .members
        .into_iter()
        .map(|member| member.with_streams(Vec::new()))
        .collect())
}

/// 名簿ファイルを読み込む
pub fn load_roster(path: impl AsRef<Path>) -> Result<Vec<Member>, RosterError> {
    let path = path.as_ref();
    let source = std::fs::read_to_string(path)?;
    let members = parse_roster(&source)?;

    let channel_count: usize = members.iter().map(|m| m.channels.len()).sum();
    log::info!(
        "Loaded roster from {}: {} members, {} channels",
        path.display(),
        members.len(),
        channel_count
    );

    Ok(members)
}
