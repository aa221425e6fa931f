//! 動画パイプライン
//!
//! フレームを先頭から順に読み、`frame_interval` の倍数番目だけを照合する。

use super::{MatchEngine, MatchResult, ResultSink};
use crate::policy::MediaKind;
use crate::reference::ReferenceSet;
use crate::scanner::AssetInfo;
use crate::video::{FfmpegVideo, FrameSource};
use frame_match_common::{format_timecode, frame_match_name, frame_timestamp};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;

/// 既定のフレーム間引き間隔
pub const DEFAULT_FRAME_INTERVAL: u64 = 3;

/// 動画ファイルを開いてフレーム照合する
///
/// 開けない動画はログを出してマッチ0件とする。
pub fn process_video(
    asset: &AssetInfo,
    engine: &MatchEngine,
    references: &ReferenceSet,
    sink: &mut dyn ResultSink,
    frame_interval: u64,
) -> Vec<PathBuf> {
    let source = match FfmpegVideo::open(&asset.path) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("  ⚠ {}", e);
            return Vec::new();
        }
    };

    let stem = asset
        .path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();

    scan_frames(source, &stem, engine, references, sink, frame_interval)
}

fn progress_bar(frame_count: Option<u64>) -> ProgressBar {
    match frame_count {
        Some(n) => {
            let bar = ProgressBar::new(n);
            bar.set_style(
                ProgressStyle::with_template("  {bar:40.green/white} {pos}/{len} フレーム ({eta})")
                    .unwrap_or_else(|_| ProgressStyle::default_bar()),
            );
            bar
        }
        None => ProgressBar::new_spinner(),
    }
}

/// フレームソースを最後まで走査して照合する
///
/// `source` はこの関数が所有し、終了時（途中の読み込みエラーを含む）に解放される。
pub fn scan_frames<S: FrameSource>(
    mut source: S,
    asset_stem: &str,
    engine: &MatchEngine,
    references: &ReferenceSet,
    sink: &mut dyn ResultSink,
    frame_interval: u64,
) -> Vec<PathBuf> {
    let interval = frame_interval.max(1);
    let fps = source.fps();
    let frame_count = source.frame_count();
    let duration = match frame_count {
        Some(n) if fps > 0.0 => n as f64 / fps,
        _ => 0.0,
    };
    println!(
        "  {} フレーム, {:.2} fps, {:.2} 秒",
        frame_count.map(|n| n.to_string()).unwrap_or_else(|| "?".into()),
        fps,
        duration
    );

    let bar = progress_bar(frame_count);
    let mut saved = Vec::new();
    let mut frame_number: u64 = 0;

    loop {
        let frame = match source.next_frame() {
            Ok(Some(frame)) => frame,
            Ok(None) => break,
            Err(e) => {
                bar.println(format!("  ⚠ フレーム {} の読み込みに失敗: {}", frame_number, e));
                break;
            }
        };

        if frame_number % interval == 0 {
            let candidate = engine.candidate(frame);
            let hits = engine.evaluate(MediaKind::VideoFrame, &candidate, references);

            if !hits.is_empty() {
                let timestamp = frame_timestamp(frame_number, fps);
                let timecode = format_timecode(timestamp);

                for hit in hits {
                    let result = MatchResult {
                        candidate: asset_stem.to_string(),
                        reference: hit.reference.name.clone(),
                        score: hit.score,
                        frame_index: Some(frame_number),
                        timestamp: Some(timestamp),
                        file_name: frame_match_name(
                            asset_stem,
                            frame_number,
                            &timecode,
                            &hit.reference.stem,
                            hit.score,
                        ),
                    };

                    match sink.accept(&result, &candidate.image) {
                        Ok(path) => {
                            bar.println(format!(
                                "  ✔ マッチ: フレーム {} ({}) ↔ {} (score: {:.3})",
                                frame_number, timecode, result.reference, result.score
                            ));
                            saved.push(path);
                        }
                        Err(e) => bar.println(format!("  ⚠ 書き出し失敗: {}", e)),
                    }
                }
            }
        }

        frame_number += 1;
        bar.inc(1);
    }

    bar.finish_and_clear();
    drop(source);
    saved
}
