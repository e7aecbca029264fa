//! YouTubeページHTMLからの値抽出
//!
//! ページ構造の変化で一致しなくなった場合はNoneを返す（エラーにはしない）。
//! マークアップが変わった時はこのファイルの正規表現だけを直せばよい。

use once_cell::sync::Lazy;
use regex::Regex;

/// ライブページのcanonicalリンク（配信中なら視聴ページを指す）
static CANONICAL_VIDEO_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)rel="canonical" href="https://www\.youtube\.com/watch\?v=([^"]+)""#)
        .expect("Failed to compile canonical video regex")
});

/// 視聴ページのゲーム（カテゴリ）カード
static GAME_TITLE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)"title":\{"simpleText":"([^"]+)"\},"subtitle""#)
        .expect("Failed to compile game title regex")
});

/// チャンネルのライブページから配信中の動画IDを抽出
pub fn extract_live_video_id(html: &str) -> Option<String> {
    CANONICAL_VIDEO_REGEX
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// 視聴ページからゲーム名を抽出
///
/// ytInitialData内のJSON文字列なので、エスケープ（`\u0026` 等）を戻す。
pub fn extract_game_name(html: &str) -> Option<String> {
    let raw = GAME_TITLE_REGEX
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())?;

    Some(unescape_json_string(raw))
}

fn unescape_json_string(raw: &str) -> String {
    serde_json::from_str::<String>(&format!("\"{}\"", raw)).unwrap_or_else(|_| raw.to_string())
}
