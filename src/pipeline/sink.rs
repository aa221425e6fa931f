//! マッチ結果の書き出し先

use super::MatchResult;
use crate::error::{FrameMatchError, Result};
use frame_match_common::ResultsManifest;
use image::codecs::jpeg::JpegEncoder;
use image::{ImageError, RgbImage};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// 確定したマッチを受け取る
pub trait ResultSink {
    /// 画像を書き出し、マニフェストを更新する。書き出したパスを返す
    fn accept(&mut self, result: &MatchResult, image: &RgbImage) -> Result<PathBuf>;
}

/// JPEGで書き出す場合の品質
pub const JPEG_QUALITY: u8 = 95;

/// 結果フォルダへの書き出し
///
/// マッチごとに `manifest.json` を読み込み→追記→書き戻しする。
/// 同じフォルダに対して複数プロセスを同時に走らせると追記が失われる可能性がある。
pub struct FolderSink {
    results_dir: PathBuf,
    manifest_path: PathBuf,
}

impl FolderSink {
    pub fn with_manifest(results_dir: &Path, manifest_path: &Path) -> Self {
        Self {
            results_dir: results_dir.to_path_buf(),
            manifest_path: manifest_path.to_path_buf(),
        }
    }
}

/// 拡張子に応じて画像を保存（JPEGは品質を指定してエンコード）
fn save_image(path: &Path, image: &RgbImage) -> Result<()> {
    let is_jpeg = path
        .extension()
        .map(|e| {
            let e = e.to_string_lossy().to_lowercase();
            e == "jpg" || e == "jpeg"
        })
        .unwrap_or(false);

    let result = if is_jpeg {
        File::create(path)
            .map_err(ImageError::IoError)
            .and_then(|file| {
                let mut writer = BufWriter::new(file);
                JpegEncoder::new_with_quality(&mut writer, JPEG_QUALITY).encode_image(image)?;
                writer.flush().map_err(ImageError::IoError)
            })
    } else {
        image.save(path)
    };

    result.map_err(|e| FrameMatchError::ImageWrite(format!("{}: {}", path.display(), e)))
}

impl ResultSink for FolderSink {
    fn accept(&mut self, result: &MatchResult, image: &RgbImage) -> Result<PathBuf> {
        let output_path = self.results_dir.join(&result.file_name);
        save_image(&output_path, image)?;

        // 静止画（フレームマーカーなし）はマニフェストに載らない
        if let Err(e) = ResultsManifest::append_to_file(&self.manifest_path, &result.file_name) {
            eprintln!("  ⚠ マニフェスト更新失敗: {}", e);
        }

        Ok(output_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use frame_match_common::MANIFEST_FILE_NAME;
    use image::Rgb;
    use tempfile::tempdir;

    fn sink_in(dir: &Path) -> FolderSink {
        FolderSink::with_manifest(dir, &dir.join(MANIFEST_FILE_NAME))
    }

    fn result(file_name: &str) -> MatchResult {
        MatchResult {
            candidate: "clip.mp4".into(),
            reference: "tree.png".into(),
            score: 0.4,
            frame_index: Some(30),
            timestamp: Some(1.0),
            file_name: file_name.into(),
        }
    }

    #[test]
    fn test_folder_sink_writes_file_and_manifest() {
        let dir = tempdir().unwrap();
        let mut sink = sink_in(dir.path());
        let image = RgbImage::from_pixel(8, 8, Rgb([0, 255, 0]));

        let name = "clip_frame_30_t00m01s00ms_match_tree_0400.png";
        let path = sink.accept(&result(name), &image).unwrap();
        assert!(path.exists());

        let manifest = ResultsManifest::load(&dir.path().join(MANIFEST_FILE_NAME));
        assert_eq!(manifest.len(), 1);
        assert_eq!(manifest.count, 1);
    }

    #[test]
    fn test_still_match_not_in_manifest() {
        let dir = tempdir().unwrap();
        let mut sink = sink_in(dir.path());
        let image = RgbImage::from_pixel(8, 8, Rgb([0, 255, 0]));

        let path = sink.accept(&result("photo_match_tree_0400.png"), &image).unwrap();
        assert!(path.exists());
        assert!(ResultsManifest::load(&dir.path().join(MANIFEST_FILE_NAME)).is_empty());
    }

    #[test]
    fn test_jpeg_match_written_at_high_quality() {
        let dir = tempdir().unwrap();
        let mut sink = sink_in(dir.path());
        let image = RgbImage::from_fn(64, 64, |x, y| {
            let v = ((x * 31 + y * 17) ^ (x * y)) as u8;
            Rgb([v, v.wrapping_mul(3), v.wrapping_add(90)])
        });

        let path = sink.accept(&result("photo_match_tree_0400.jpg"), &image).unwrap();
        let default_quality = dir.path().join("default.jpg");
        image.save(&default_quality).unwrap();

        let high = std::fs::metadata(&path).unwrap().len();
        let default = std::fs::metadata(&default_quality).unwrap().len();
        assert!(high > default, "{} <= {}", high, default);
        assert_eq!(image::open(&path).unwrap().width(), 64);
    }
}
