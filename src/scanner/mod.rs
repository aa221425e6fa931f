use crate::error::{FrameMatchError, Result};
use frame_match_common::{is_image_path, is_video_path};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// 素材の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Image,
    Video,
}

#[derive(Debug, Clone)]
pub struct AssetInfo {
    pub path: PathBuf,
    pub file_name: String,
    pub kind: AssetKind,
}

impl AssetInfo {
    fn from_path(path: &Path) -> Option<Self> {
        let kind = if is_image_path(path) {
            AssetKind::Image
        } else if is_video_path(path) {
            AssetKind::Video
        } else {
            return None;
        };

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        Some(Self {
            path: path.to_path_buf(),
            file_name,
            kind,
        })
    }
}

/// フォルダ直下のファイルをファイル名順に列挙
fn sorted_files(folder: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(folder)
        .max_depth(1) // 直下のみ（再帰しない）
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .collect();
    files.sort();
    files
}

/// 素材フォルダをスキャン（対応拡張子以外は無視）
pub fn scan_assets(folder: &Path) -> Result<Vec<AssetInfo>> {
    if !folder.is_dir() {
        return Err(FrameMatchError::AssetsDirNotFound(folder.display().to_string()));
    }

    Ok(sorted_files(folder)
        .iter()
        .filter_map(|p| AssetInfo::from_path(p))
        .collect())
}

/// 参照画像フォルダをスキャン
pub fn scan_search_images(folder: &Path) -> Result<Vec<PathBuf>> {
    if !folder.is_dir() {
        return Err(FrameMatchError::SearchDirNotFound(folder.display().to_string()));
    }

    Ok(sorted_files(folder)
        .into_iter()
        .filter(|p| is_image_path(p))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::tempdir;

    #[test]
    fn test_scan_assets_not_found() {
        let result = scan_assets(Path::new("/nonexistent/assets"));
        assert!(matches!(result, Err(FrameMatchError::AssetsDirNotFound(_))));
    }

    #[test]
    fn test_scan_search_not_found() {
        let result = scan_search_images(Path::new("/nonexistent/search"));
        assert!(matches!(result, Err(FrameMatchError::SearchDirNotFound(_))));
    }

    #[test]
    fn test_scan_assets_routes_by_extension() {
        let dir = tempdir().unwrap();
        File::create(dir.path().join("c.mp4")).unwrap();
        File::create(dir.path().join("a.JPG")).unwrap();
        File::create(dir.path().join("b.MOV")).unwrap();
        File::create(dir.path().join("readme.txt")).unwrap();
        std::fs::create_dir(dir.path().join("nested.png")).unwrap();

        let assets = scan_assets(dir.path()).unwrap();
        let names: Vec<_> = assets.iter().map(|a| (a.file_name.as_str(), a.kind)).collect();
        assert_eq!(
            names,
            vec![
                ("a.JPG", AssetKind::Image),
                ("b.MOV", AssetKind::Video),
                ("c.mp4", AssetKind::Video),
            ]
        );
    }

    #[test]
    fn test_scan_search_images_only() {
        let dir = tempdir().unwrap();
        File::create(dir.path().join("tree.webp")).unwrap();
        File::create(dir.path().join("clip.mp4")).unwrap();
        File::create(dir.path().join("bush.png")).unwrap();

        let images = scan_search_images(dir.path()).unwrap();
        assert_eq!(images.len(), 2);
        assert!(images[0].ends_with("bush.png"));
        assert!(images[1].ends_with("tree.webp"));
    }
}
