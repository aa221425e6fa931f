//! エラーケーステスト
//!
//! 致命的エラーと素材単位の失敗の扱いを検証

use frame_match::config::RunConfig;
use frame_match::error::FrameMatchError;
use frame_match::{runner, scanner};
use frame_match_common::Dataset;
use std::path::Path;
use tempfile::tempdir;

/// 存在しない素材フォルダをスキャンした場合
#[test]
fn test_scan_nonexistent_assets() {
    let result = scanner::scan_assets(Path::new("/nonexistent/path/12345"));
    assert!(matches!(result, Err(FrameMatchError::AssetsDirNotFound(_))));
}

/// 対応外のファイルだけのフォルダ
#[test]
fn test_scan_folder_no_media() {
    let dir = tempdir().expect("Failed to create temp dir");
    std::fs::write(dir.path().join("notes.txt"), "hello").unwrap();
    std::fs::write(dir.path().join("data.json"), "{}").unwrap();

    let assets = scanner::scan_assets(dir.path()).unwrap();
    assert!(assets.is_empty());
}

/// 参照画像がすべて壊れている場合は致命的
#[test]
fn test_all_references_broken_is_fatal() {
    let dir = tempdir().expect("Failed to create temp dir");
    let search = dir.path().join("data/search");
    std::fs::create_dir_all(&search).unwrap();
    std::fs::create_dir_all(dir.path().join("assets")).unwrap();
    std::fs::write(search.join("broken.png"), b"not a png").unwrap();

    let config = RunConfig::resolve(dir.path(), &Dataset::default(), None);
    let err = runner::run(&config).unwrap_err();
    assert!(matches!(err, FrameMatchError::NoReferenceImages(_)));
}

/// FrameMatchErrorのDisplay実装確認
#[test]
fn test_error_display() {
    let errors = vec![
        FrameMatchError::ImageLoad("photo.png".to_string()),
        FrameMatchError::SearchDirNotFound("data/search".to_string()),
        FrameMatchError::VideoDecode("broken".to_string()),
    ];

    for err in errors {
        let msg = err.to_string();
        assert!(!msg.is_empty());
    }
}
