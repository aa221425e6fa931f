//! 対応メディア拡張子

use std::path::Path;

/// 静止画として扱う拡張子（小文字）
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "tiff", "tif", "webp"];

/// 動画として扱う拡張子（小文字）
pub const VIDEO_EXTENSIONS: &[&str] = &["mov", "mp4", "avi", "mkv", "flv", "wmv", "webm", "m4v"];

fn lowercase_extension(path: &Path) -> Option<String> {
    path.extension().map(|e| e.to_string_lossy().to_lowercase())
}

/// 静止画拡張子か（大文字小文字を区別しない）
pub fn is_image_path(path: &Path) -> bool {
    lowercase_extension(path)
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

/// 動画拡張子か（大文字小文字を区別しない）
pub fn is_video_path(path: &Path) -> bool {
    lowercase_extension(path)
        .map(|ext| VIDEO_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_extensions() {
        assert!(is_image_path(Path::new("a.png")));
        assert!(is_image_path(Path::new("a.JPG")));
        assert!(is_image_path(Path::new("dir/b.TIF")));
        assert!(!is_image_path(Path::new("a.mp4")));
        assert!(!is_image_path(Path::new("noext")));
    }

    #[test]
    fn test_video_extensions() {
        assert!(is_video_path(Path::new("clip.MOV")));
        assert!(is_video_path(Path::new("clip.m4v")));
        assert!(!is_video_path(Path::new("clip.gif")));
    }
}
