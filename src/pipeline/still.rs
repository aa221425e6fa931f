//! 静止画パイプライン

use super::{decode_image, MatchEngine, MatchResult, ResultSink};
use crate::policy::MediaKind;
use crate::reference::ReferenceSet;
use crate::scanner::AssetInfo;
use frame_match_common::image_match_name;
use std::path::PathBuf;

/// 1枚の静止画を全参照画像と照合して結果を書き出す
///
/// 読み込めない画像はマッチ0件として扱う（バッチは継続）。
pub fn process_image(
    asset: &AssetInfo,
    engine: &MatchEngine,
    references: &ReferenceSet,
    sink: &mut dyn ResultSink,
) -> Vec<PathBuf> {
    let image = match decode_image(&asset.path) {
        Ok(img) => img,
        Err(e) => {
            eprintln!("  ⚠ {}", e);
            return Vec::new();
        }
    };

    let candidate = engine.candidate(image);
    if engine.verbose {
        println!("  特徴点: {}個", candidate.descriptors.len());
    }

    let stem = asset
        .path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let extension = asset
        .path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let mut saved = Vec::new();
    for hit in engine.evaluate(MediaKind::Image, &candidate, references) {
        let result = MatchResult {
            candidate: asset.file_name.clone(),
            reference: hit.reference.name.clone(),
            score: hit.score,
            frame_index: None,
            timestamp: None,
            file_name: image_match_name(&stem, &hit.reference.stem, hit.score, &extension),
        };

        match sink.accept(&result, &candidate.image) {
            Ok(path) => {
                println!(
                    "  ✔ マッチ: {} ↔ {} (score: {:.3})",
                    asset.file_name, result.reference, result.score
                );
                saved.push(path);
            }
            Err(e) => eprintln!("  ⚠ 書き出し失敗: {}", e),
        }
    }

    saved
}
