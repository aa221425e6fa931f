//! 特徴量抽出モジュール
//!
//! ORB方式（FAST-9 + Harris順位付け + 強度重心の方向 + 回転補正BRIEF）で
//! グレースケール画像から256bitのバイナリ記述子を取り出す。
//! 構造のない画像では空の記述子集合を返し、エラーにはしない。

mod brief;
mod fast;

use image::imageops::{self, FilterType};
use image::GrayImage;

/// 記述子のバイト数（256bit）
pub const DESCRIPTOR_BYTES: usize = 32;

/// 256bitバイナリ記述子
pub type Descriptor = [u8; DESCRIPTOR_BYTES];

/// 回転後のサンプリング点と方向推定パッチが画像内に収まる余白
const EDGE_MARGIN: u32 = brief::HALF_PATCH as u32 + 7;

/// 1画像分の記述子（キーポイント順）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DescriptorSet {
    descriptors: Vec<Descriptor>,
}

impl DescriptorSet {
    pub fn new(descriptors: Vec<Descriptor>) -> Self {
        Self { descriptors }
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Descriptor> {
        self.descriptors.iter()
    }

    pub fn as_slice(&self) -> &[Descriptor] {
        &self.descriptors
    }
}

/// ORB抽出の設定
#[derive(Debug, Clone)]
pub struct OrbConfig {
    /// 1画像あたりの最大キーポイント数
    pub max_features: usize,
    /// ピラミッド段数
    pub levels: usize,
    /// ピラミッドの縮小率
    pub scale_factor: f32,
    /// FASTの輝度差しきい値
    pub fast_threshold: u8,
    /// BRIEF前の平滑化（ガウシアンσ）
    pub blur_sigma: f32,
}

impl Default for OrbConfig {
    fn default() -> Self {
        Self {
            max_features: 2000,
            levels: 8,
            scale_factor: 1.2,
            fast_threshold: 20,
            blur_sigma: 2.0,
        }
    }
}

impl OrbConfig {
    pub fn with_max_features(max_features: usize) -> Self {
        Self {
            max_features,
            ..Default::default()
        }
    }

    /// 各ピラミッド段に割り当てるキーポイント数（等比配分）
    fn features_per_level(&self) -> Vec<usize> {
        let levels = self.levels.max(1);
        if levels == 1 || self.scale_factor <= 1.0 {
            let each = self.max_features / levels;
            let mut quotas = vec![each; levels];
            quotas[levels - 1] += self.max_features - each * levels;
            return quotas;
        }

        let factor = 1.0 / self.scale_factor as f64;
        let mut desired = self.max_features as f64 * (1.0 - factor) / (1.0 - factor.powi(levels as i32));
        let mut quotas = Vec::with_capacity(levels);
        let mut assigned = 0;
        for _ in 0..levels - 1 {
            let n = (desired.round() as usize).min(self.max_features - assigned);
            quotas.push(n);
            assigned += n;
            desired *= factor;
        }
        quotas.push(self.max_features - assigned);
        quotas
    }
}

/// ORB特徴量抽出器
#[derive(Debug, Clone, Default)]
pub struct OrbExtractor {
    config: OrbConfig,
}

struct ScoredPoint {
    x: u32,
    y: u32,
    response: f32,
    fast_score: f32,
}

/// Harris応答の降順、同点ならFASTスコアの降順に並べる
fn rank_points(points: &mut [ScoredPoint]) {
    points.sort_by(|a, b| {
        b.response
            .total_cmp(&a.response)
            .then(b.fast_score.total_cmp(&a.fast_score))
    });
}

impl OrbExtractor {
    pub fn new(config: OrbConfig) -> Self {
        Self { config }
    }

    /// グレースケール画像から記述子を抽出
    pub fn extract(&self, gray: &GrayImage) -> DescriptorSet {
        let (width, height) = gray.dimensions();
        let mut descriptors = Vec::new();

        for (level, quota) in self.config.features_per_level().into_iter().enumerate() {
            if quota == 0 {
                continue;
            }

            let scale = self.config.scale_factor.powi(level as i32);
            let level_w = (width as f32 / scale).round() as u32;
            let level_h = (height as f32 / scale).round() as u32;
            if level_w <= EDGE_MARGIN * 2 || level_h <= EDGE_MARGIN * 2 {
                break;
            }

            let level_image = if level == 0 {
                gray.clone()
            } else {
                imageops::resize(gray, level_w, level_h, FilterType::Triangle)
            };

            self.extract_level(&level_image, quota, &mut descriptors);
        }

        descriptors.truncate(self.config.max_features);
        DescriptorSet::new(descriptors)
    }

    fn extract_level(&self, image: &GrayImage, quota: usize, out: &mut Vec<Descriptor>) {
        let corners = fast::detect(image, self.config.fast_threshold, EDGE_MARGIN);
        if corners.is_empty() {
            return;
        }

        let mut points: Vec<ScoredPoint> = corners
            .into_iter()
            .map(|c| ScoredPoint {
                x: c.x,
                y: c.y,
                response: fast::harris_response(image, c.x, c.y),
                fast_score: c.score,
            })
            .collect();
        rank_points(&mut points);
        points.truncate(quota);

        let smoothed = imageops::blur(image, self.config.blur_sigma);
        for p in &points {
            let angle = brief::orientation(image, p.x, p.y);
            out.push(brief::describe(&smoothed, p.x, p.y, angle));
        }
    }
}
