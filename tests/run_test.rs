//! 照合実行テスト
//!
//! 一時フォルダに参照画像と素材を用意して `runner::run` を通す

use frame_match::config::RunConfig;
use frame_match::runner;
use frame_match_common::{Dataset, ResultsManifest};
use image::{Rgb, RgbImage};
use std::path::Path;
use tempfile::tempdir;

/// 緑を含む高テクスチャ画像
fn textured(seed: u32) -> RgbImage {
    RgbImage::from_fn(240, 240, |x, y| {
        let h = (x.wrapping_mul(73_856_093) ^ y.wrapping_mul(19_349_663) ^ seed)
            .wrapping_mul(2_654_435_761);
        let v = (h >> 24) as u8;
        if y < 120 {
            Rgb([v / 4, 120u8.saturating_add(v / 2), v / 4])
        } else {
            Rgb([v, v, v])
        }
    })
}

fn setup(root: &Path) {
    std::fs::create_dir_all(root.join("data/search")).unwrap();
    std::fs::create_dir_all(root.join("assets")).unwrap();
}

fn result_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().to_string())
        .filter(|n| n != "manifest.json")
        .collect();
    names.sort();
    names
}

/// 同一画像の静止画は1件マッチし、マニフェストには載らない
#[test]
fn test_identical_still_matches_once() {
    let dir = tempdir().expect("Failed to create temp dir");
    setup(dir.path());
    textured(7).save(dir.path().join("data/search/tree.png")).unwrap();
    textured(7).save(dir.path().join("assets/photo.png")).unwrap();

    let config = RunConfig::resolve(dir.path(), &Dataset::default(), None);
    let summary = runner::run(&config).unwrap();

    assert_eq!(summary.references, 1);
    assert_eq!(summary.images_processed, 1);
    assert_eq!(summary.image_matches, 1);
    assert_eq!(summary.total_matches(), 1);

    let files = result_files(&config.results_dir);
    assert_eq!(files.len(), 1);
    assert!(files[0].starts_with("photo_match_tree_"));
    assert!(files[0].ends_with(".png"));

    let manifest = ResultsManifest::load(&config.manifest_path);
    assert!(manifest.is_empty());
}

/// 無関係な画像・壊れた画像はマッチしないがバッチは継続
#[test]
fn test_unrelated_and_broken_assets() {
    let dir = tempdir().expect("Failed to create temp dir");
    setup(dir.path());
    textured(7).save(dir.path().join("data/search/tree.png")).unwrap();
    RgbImage::from_pixel(240, 240, Rgb([30, 30, 30]))
        .save(dir.path().join("assets/flat.png"))
        .unwrap();
    std::fs::write(dir.path().join("assets/broken.jpg"), b"garbage").unwrap();
    std::fs::write(dir.path().join("assets/readme.txt"), b"skip me").unwrap();

    let config = RunConfig::resolve(dir.path(), &Dataset::default(), None);
    let summary = runner::run(&config).unwrap();

    assert_eq!(summary.images_processed, 2);
    assert_eq!(summary.total_matches(), 0);
    assert!(result_files(&config.results_dir).is_empty());
}

/// 結果フォルダは自動作成される
#[test]
fn test_results_dir_created() {
    let dir = tempdir().expect("Failed to create temp dir");
    setup(dir.path());
    textured(1).save(dir.path().join("data/search/a.png")).unwrap();

    let config = RunConfig::resolve(dir.path(), &Dataset::default(), None);
    assert!(!config.results_dir.exists());
    runner::run(&config).unwrap();
    assert!(config.results_dir.is_dir());
}
