//! 参照画像（検索対象）の読み込み
//!
//! 実行開始時に一度だけ読み込み、以後は読み取り専用で両パイプラインに渡す。

use crate::error::{FrameMatchError, Result};
use crate::features::DescriptorSet;
use crate::pipeline::{decode_image, MatchEngine};
use crate::scanner;
use image::{imageops, RgbImage};
use std::path::Path;

/// 参照画像
#[derive(Debug, Clone)]
pub struct ReferenceImage {
    pub name: String,
    pub stem: String,
    pub image: RgbImage,
    pub descriptors: DescriptorSet,
    pub green_ratio: f64,
}

impl ReferenceImage {
    pub fn new(name: &str, image: RgbImage, engine: &MatchEngine) -> Self {
        let gray = imageops::grayscale(&image);
        let descriptors = engine.extractor.extract(&gray);
        let green_ratio = engine.gate.green_ratio(&image);
        let stem = Path::new(name)
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| name.to_string());

        Self {
            name: name.to_string(),
            stem,
            image,
            descriptors,
            green_ratio,
        }
    }
}

/// 参照画像の集合
#[derive(Debug, Clone, Default)]
pub struct ReferenceSet {
    images: Vec<ReferenceImage>,
}

impl ReferenceSet {
    pub fn new(images: Vec<ReferenceImage>) -> Self {
        Self { images }
    }

    /// 参照画像フォルダを読み込む
    ///
    /// フォルダがない、または1枚も読み込めない場合は致命的エラー。
    /// 個別の画像の読み込み失敗は警告を出して飛ばす。
    pub fn load(search_dir: &Path, engine: &MatchEngine) -> Result<Self> {
        let paths = scanner::scan_search_images(search_dir)?;

        let mut images = Vec::new();
        for path in paths {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();

            match decode_image(&path) {
                Ok(img) => {
                    let reference = ReferenceImage::new(&name, img, engine);
                    println!(
                        "  参照画像を読み込み: {} (特徴点 {}個)",
                        name,
                        reference.descriptors.len()
                    );
                    images.push(reference);
                }
                Err(e) => eprintln!("  ⚠ 参照画像をスキップ: {}", e),
            }
        }

        if images.is_empty() {
            return Err(FrameMatchError::NoReferenceImages(search_dir.display().to_string()));
        }

        Ok(Self { images })
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ReferenceImage> {
        self.images.iter()
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}
