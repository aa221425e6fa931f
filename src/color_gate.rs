//! 緑色一致ゲート
//!
//! 特徴点照合の誤検出を抑えるための補助判定。HSV空間で緑色帯域の画素割合を
//! 2画像で比較する。どちらも緑が少ない場合は不一致として棄却し、
//! 片方だけ緑が多い場合は判定しない（通す）。

use image::RgbImage;

/// 緑色一致ゲートの設定
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GreenGate {
    /// HSV下限（H: 0-180, S/V: 0-255）
    pub lower: [u8; 3],
    /// HSV上限
    pub upper: [u8; 3],
    /// 「緑がある」とみなす画素割合
    pub threshold: f64,
    /// 両方に緑がある場合に許す相対差
    pub max_relative_diff: f64,
}

impl Default for GreenGate {
    fn default() -> Self {
        Self {
            lower: [35, 40, 40],
            upper: [85, 255, 255],
            threshold: 0.10,
            max_relative_diff: 0.7,
        }
    }
}

impl GreenGate {
    /// 緑色帯域に入る画素の割合
    pub fn green_ratio(&self, image: &RgbImage) -> f64 {
        let total = image.width() as u64 * image.height() as u64;
        if total == 0 {
            return 0.0;
        }

        let green = image
            .pixels()
            .filter(|p| {
                let hsv = rgb_to_hsv(p[0], p[1], p[2]);
                (0..3).all(|i| hsv[i] >= self.lower[i] && hsv[i] <= self.upper[i])
            })
            .count() as u64;

        green as f64 / total as f64
    }

    /// 画素割合同士で判定
    pub fn check_ratios(&self, ratio1: f64, ratio2: f64) -> bool {
        let green1 = ratio1 >= self.threshold;
        let green2 = ratio2 >= self.threshold;

        match (green1, green2) {
            (false, false) => false,
            (true, true) => {
                let diff = (ratio1 - ratio2).abs() / ratio1.max(ratio2).max(0.001);
                diff < self.max_relative_diff
            }
            _ => true,
        }
    }

    /// 2画像の緑色の出方が整合するか
    pub fn check(&self, image1: &RgbImage, image2: &RgbImage) -> bool {
        self.check_ratios(self.green_ratio(image1), self.green_ratio(image2))
    }
}

/// 8bit RGB → HSV（H: 0-180, S/V: 0-255）
pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> [u8; 3] {
    let (rf, gf, bf) = (r as f32, g as f32, b as f32);
    let max = rf.max(gf).max(bf);
    let min = rf.min(gf).min(bf);
    let delta = max - min;

    let s = if max > 0.0 { 255.0 * delta / max } else { 0.0 };

    let mut h = if delta == 0.0 {
        0.0
    } else if max == rf {
        60.0 * (gf - bf) / delta
    } else if max == gf {
        120.0 + 60.0 * (bf - rf) / delta
    } else {
        240.0 + 60.0 * (rf - gf) / delta
    };
    if h < 0.0 {
        h += 360.0;
    }

    [
        ((h / 2.0).round() as u32).min(180) as u8,
        s.round() as u8,
        max as u8,
    ]
}
