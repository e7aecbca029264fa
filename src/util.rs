/// 認証情報をマスキングしてログ出力用の文字列を生成
///
/// 先頭4文字と末尾4文字のみを残し、中間を`***`に置き換える。
/// 8文字以下の値は全体をマスクする。
///
/// # Examples
/// ```
/// use live_roster_lib::util::mask_secret;
///
/// assert_eq!(mask_secret("AIzaSyABC123def456GHI789"), "AIza***I789");
/// ```
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "***".to_string();
    }

    let prefix: String = chars[..4].iter().collect();
    let suffix: String = chars[chars.len() - 4..].iter().collect();
    format!("{}***{}", prefix, suffix)
}

/// 件数上限ごとにIDを分割する（バッチAPI用）
pub fn chunk_ids<S: AsRef<str>>(ids: &[S], size: usize) -> Vec<Vec<&str>> {
    ids.chunks(size.max(1))
        .map(|chunk| chunk.iter().map(AsRef::<str>::as_ref).collect())
        .collect()
}
