//! 実行エントリポイント
//!
//! `run` は素材フォルダ1つ分の照合、`rebuild_manifests` は結果・参照画像の
//! マニフェストをディスク上の内容から作り直す。

use crate::config::RunConfig;
use crate::error::{FrameMatchError, Result};
use crate::pipeline::{process_image, process_video, FolderSink, MatchEngine};
use crate::reference::ReferenceSet;
use crate::scanner::{self, AssetKind};
use frame_match_common::{Dataset, ResultsManifest, SearchManifest, MANIFEST_FILE_NAME};
use std::path::{Path, PathBuf};

/// 実行結果の集計
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub dataset_id: String,
    pub references: usize,
    pub images_processed: usize,
    pub videos_processed: usize,
    pub image_matches: usize,
    pub video_matches: usize,
    pub results_dir: PathBuf,
}

impl RunSummary {
    pub fn total_matches(&self) -> usize {
        self.image_matches + self.video_matches
    }
}

/// 照合を実行
///
/// 参照画像フォルダ・素材フォルダの欠落、読み込める参照画像が0枚の場合のみ
/// エラーを返す。個々の素材の失敗はログを出して続行する。
pub fn run(config: &RunConfig) -> Result<RunSummary> {
    if !config.search_dir.is_dir() {
        return Err(FrameMatchError::SearchDirNotFound(
            config.search_dir.display().to_string(),
        ));
    }
    if !config.assets_dir.is_dir() {
        return Err(FrameMatchError::AssetsDirNotFound(
            config.assets_dir.display().to_string(),
        ));
    }

    std::fs::create_dir_all(&config.results_dir)?;

    let engine = MatchEngine::new(config.orb_config(), config.verbose);

    println!("[1/2] 参照画像を読み込み中...");
    let references = ReferenceSet::load(&config.search_dir, &engine)?;
    println!("✔ {}枚の参照画像\n", references.len());

    println!("[2/2] データセット '{}' を処理中", config.dataset_id);
    println!("  素材フォルダ: {}", config.assets_dir.display());
    let assets = scanner::scan_assets(&config.assets_dir)?;

    let mut sink = FolderSink::with_manifest(&config.results_dir, &config.manifest_path);
    let mut summary = RunSummary {
        dataset_id: config.dataset_id.clone(),
        references: references.len(),
        results_dir: config.results_dir.clone(),
        ..Default::default()
    };

    for asset in &assets {
        match asset.kind {
            AssetKind::Image => {
                println!("\n画像: {}", asset.file_name);
                let saved = process_image(asset, &engine, &references, &mut sink);
                summary.images_processed += 1;
                summary.image_matches += saved.len();
            }
            AssetKind::Video => {
                println!("\n動画: {}", asset.file_name);
                let saved =
                    process_video(asset, &engine, &references, &mut sink, config.frame_interval);
                summary.videos_processed += 1;
                summary.video_matches += saved.len();
            }
        }
    }

    Ok(summary)
}

/// サマリーを表示
pub fn print_summary(summary: &RunSummary) {
    println!("\n{}", "=".repeat(60));
    println!("✅ 処理完了: {}件のマッチ", summary.total_matches());
    println!(
        "  画像: {}件 ({}ファイル) / 動画フレーム: {}件 ({}ファイル)",
        summary.image_matches,
        summary.images_processed,
        summary.video_matches,
        summary.videos_processed
    );
    println!("  結果フォルダ: {}", summary.results_dir.display());
    println!("{}", "=".repeat(60));
}

/// マニフェスト再生成の対象
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManifestTargets {
    pub results: bool,
    pub search: bool,
}

impl ManifestTargets {
    /// どちらも指定されていなければ両方
    pub fn from_flags(results: bool, search: bool) -> Self {
        if !results && !search {
            Self { results: true, search: true }
        } else {
            Self { results, search }
        }
    }
}

/// 全データセットのマニフェストを再生成し、書き出したファイルを返す
///
/// フォルダがないデータセットは警告を出して飛ばす。
pub fn rebuild_manifests(
    root: &Path,
    datasets: &[Dataset],
    targets: ManifestTargets,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();

    for dataset in datasets {
        if targets.results {
            let dir = root.join(&dataset.results_dir);
            if dir.is_dir() {
                let manifest = ResultsManifest::rebuild(&dir)?;
                let path = dir.join(MANIFEST_FILE_NAME);
                manifest.save(&path)?;
                println!("✔ [{}] 結果マニフェスト: {}件 → {}", dataset.id, manifest.count, path.display());
                written.push(path);
            } else {
                eprintln!("⚠ [{}] 結果フォルダがありません: {}", dataset.id, dir.display());
            }
        }

        if targets.search {
            let dir = root.join(&dataset.search_dir);
            if dir.is_dir() {
                let manifest = SearchManifest::build(&dir)?;
                let path = dir.join(MANIFEST_FILE_NAME);
                manifest.save(&path)?;
                println!("✔ [{}] 参照画像マニフェスト: {}件 → {}", dataset.id, manifest.count, path.display());
                written.push(path);
            } else {
                eprintln!("⚠ [{}] 参照画像フォルダがありません: {}", dataset.id, dir.display());
            }
        }
    }

    Ok(written)
}
