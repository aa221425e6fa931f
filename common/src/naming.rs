//! 出力ファイル名の生成
//!
//! 結果フォルダに書き出すファイル名はマニフェスト生成時に再パースされるため、
//! フォーマットを変更する場合は `manifest::parse_frame_metadata` も合わせて更新すること。

use lazy_static::lazy_static;
use regex::Regex;

/// ファイル名の最大文字数
pub const MAX_FILENAME_CHARS: usize = 200;

lazy_static! {
    static ref UNSAFE_CHARS: Regex = Regex::new(r"[^\w\s-]").unwrap();
    static ref SEPARATOR_RUNS: Regex = Regex::new(r"[-\s]+").unwrap();
}

/// 文字列を安全なファイル名に変換
///
/// 英数字・アンダースコア・空白・ハイフン以外を除去し、
/// 連続する空白/ハイフンを1つのハイフンにまとめて200文字で切り詰める。
pub fn sanitize_filename(name: &str) -> String {
    let stripped = UNSAFE_CHARS.replace_all(name, "");
    let collapsed = SEPARATOR_RUNS.replace_all(&stripped, "-");
    collapsed.chars().take(MAX_FILENAME_CHARS).collect()
}

/// フレーム番号とfpsから再生位置（秒）を計算
///
/// fpsが0以下の場合はすべてのフレームを0秒とみなす。
pub fn frame_timestamp(frame_index: u64, fps: f64) -> f64 {
    if fps > 0.0 {
        frame_index as f64 / fps
    } else {
        0.0
    }
}

/// 再生位置を `MMmSSsFFms` 形式のタイムコードに変換
///
/// 末尾の2桁は1/100秒（切り捨て）。
pub fn format_timecode(seconds: f64) -> String {
    let seconds = seconds.max(0.0);
    let minutes = (seconds / 60.0).floor() as u64;
    let whole = (seconds % 60.0).floor() as u64;
    let hundredths = ((seconds % 1.0) * 100.0).floor() as u64;
    format!("{:02}m{:02}s{:02}ms", minutes, whole, hundredths)
}

/// 静止画マッチの出力ファイル名
///
/// `extension` は元ファイルの拡張子（ドット付き、なければ空文字）。
pub fn image_match_name(asset_stem: &str, reference_stem: &str, score: f64, extension: &str) -> String {
    let base = sanitize_filename(&format!("{}_match_{}_{:.3}", asset_stem, reference_stem, score));
    format!("{}{}", base, extension)
}

/// 動画フレームマッチの出力ファイル名（常にPNG）
pub fn frame_match_name(
    asset_stem: &str,
    frame_number: u64,
    timecode: &str,
    reference_stem: &str,
    score: f64,
) -> String {
    let base = sanitize_filename(&format!(
        "{}_frame_{}_t{}_match_{}_{:.3}",
        asset_stem, frame_number, timecode, reference_stem, score
    ));
    format!("{}.png", base)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_strips_and_collapses() {
        let name = sanitize_filename("A/B: test  --name");
        assert!(!name.contains('/'));
        assert!(!name.contains(':'));
        assert_eq!(name, "AB-test-name");
    }

    #[test]
    fn test_sanitize_keeps_underscores_and_drops_dots() {
        assert_eq!(sanitize_filename("clip_frame_3_match_ref_0.873"), "clip_frame_3_match_ref_0873");
    }

    #[test]
    fn test_sanitize_truncates() {
        let long = "x".repeat(500);
        assert_eq!(sanitize_filename(&long).chars().count(), MAX_FILENAME_CHARS);
    }

    #[test]
    fn test_sanitize_unicode_word_chars() {
        assert_eq!(sanitize_filename("現場 写真"), "現場-写真");
    }

    #[test]
    fn test_timecode_whole_seconds() {
        let ts = frame_timestamp(150, 30.0);
        assert_eq!(ts, 5.0);
        assert_eq!(format_timecode(ts), "00m05s00ms");
    }

    #[test]
    fn test_timecode_minutes_and_hundredths() {
        assert_eq!(format_timecode(125.5), "02m05s50ms");
    }

    #[test]
    fn test_timestamp_without_fps() {
        assert_eq!(frame_timestamp(90, 0.0), 0.0);
        assert_eq!(frame_timestamp(90, -1.0), 0.0);
    }

    #[test]
    fn test_image_match_name() {
        let name = image_match_name("IMG_0001", "tree", 0.5, ".jpg");
        assert_eq!(name, "IMG_0001_match_tree_0500.jpg");
    }

    #[test]
    fn test_frame_match_name() {
        let name = frame_match_name("walk", 150, "00m05s00ms", "tree", 0.26);
        assert_eq!(name, "walk_frame_150_t00m05s00ms_match_tree_0260.png");
    }

    #[test]
    fn test_score_rounding_uses_double_precision() {
        // 3/80 = 0.0375 は倍精度では 0.03749999... なので切り下がる（単精度だと 0.038）
        let score = 3.0 / 80.0;
        assert_eq!(image_match_name("clip", "tree", score, ".jpg"), "clip_match_tree_0037.jpg");
        assert!(frame_match_name("clip", 3, "00m00s10ms", "tree", score).ends_with("_0037.png"));
    }
}

