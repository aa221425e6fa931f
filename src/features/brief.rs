//! 回転補正付きBRIEF記述子

use super::{Descriptor, DESCRIPTOR_BYTES};
use image::GrayImage;
use lazy_static::lazy_static;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// 方向推定に使う円形パッチの半径
pub const HALF_PATCH: i32 = 15;

/// サンプリング点の最大オフセット（回転後も `HALF_PATCH * √2` 以内に収まる）
const SAMPLE_LIMIT: f32 = 13.0;

const PATTERN_SEED: u64 = 0x0bb1_2017;
const PATTERN_SIGMA: f32 = 31.0 / 5.0;

lazy_static! {
    /// 比較点ペア（パッチ中心からのオフセット）
    static ref PATTERN: Vec<[(f32, f32); 2]> = build_pattern();

    /// 円形パッチの各行の最大 |dx|
    static ref UMAX: Vec<i32> = (0..=HALF_PATCH)
        .map(|v| (((HALF_PATCH * HALF_PATCH - v * v) as f32).sqrt()).floor() as i32)
        .collect();
}

fn build_pattern() -> Vec<[(f32, f32); 2]> {
    let mut rng = StdRng::seed_from_u64(PATTERN_SEED);
    let mut gauss = || {
        // Box-Muller
        let u1: f32 = rng.gen_range(f32::EPSILON..1.0);
        let u2: f32 = rng.gen_range(0.0..1.0);
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f32::consts::PI * u2).cos();
        (z * PATTERN_SIGMA).clamp(-SAMPLE_LIMIT, SAMPLE_LIMIT).round()
    };

    (0..DESCRIPTOR_BYTES * 8)
        .map(|_| [(gauss(), gauss()), (gauss(), gauss())])
        .collect()
}

/// 強度重心法によるキーポイントの方向（ラジアン）
pub fn orientation(image: &GrayImage, x: u32, y: u32) -> f32 {
    let (cx, cy) = (x as i32, y as i32);
    let px = |dx: i32, dy: i32| image.get_pixel((cx + dx) as u32, (cy + dy) as u32)[0] as f32;

    let mut m01 = 0f32;
    let mut m10 = 0f32;
    for dy in -HALF_PATCH..=HALF_PATCH {
        let reach = UMAX[dy.unsigned_abs() as usize];
        for dx in -reach..=reach {
            let v = px(dx, dy);
            m10 += dx as f32 * v;
            m01 += dy as f32 * v;
        }
    }

    m01.atan2(m10)
}

/// 平滑化済み画像からキーポイントの256bit記述子を計算
pub fn describe(smoothed: &GrayImage, x: u32, y: u32, angle: f32) -> Descriptor {
    let (width, height) = smoothed.dimensions();
    let (sin, cos) = angle.sin_cos();
    let sample = |(px, py): (f32, f32)| {
        let rx = (px * cos - py * sin).round() as i64 + x as i64;
        let ry = (px * sin + py * cos).round() as i64 + y as i64;
        let rx = rx.clamp(0, width as i64 - 1) as u32;
        let ry = ry.clamp(0, height as i64 - 1) as u32;
        smoothed.get_pixel(rx, ry)[0]
    };

    let mut descriptor = [0u8; DESCRIPTOR_BYTES];
    for (bit, [a, b]) in PATTERN.iter().enumerate() {
        if sample(*a) < sample(*b) {
            descriptor[bit / 8] |= 1 << (bit % 8);
        }
    }
    descriptor
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn test_pattern_is_deterministic() {
        assert_eq!(PATTERN.len(), 256);
        assert_eq!(*PATTERN, build_pattern());
        for [a, b] in PATTERN.iter() {
            assert!(a.0.abs() <= SAMPLE_LIMIT && a.1.abs() <= SAMPLE_LIMIT);
            assert!(b.0.abs() <= SAMPLE_LIMIT && b.1.abs() <= SAMPLE_LIMIT);
        }
    }

    #[test]
    fn test_orientation_points_to_bright_side() {
        // 右半分が明るい → 方向はほぼ0rad
        let img = GrayImage::from_fn(64, 64, |x, _| if x >= 32 { Luma([200]) } else { Luma([10]) });
        let angle = orientation(&img, 32, 32);
        assert!(angle.abs() < 0.1, "angle = {}", angle);

        // 下半分が明るい → ほぼ π/2
        let img = GrayImage::from_fn(64, 64, |_, y| if y >= 32 { Luma([200]) } else { Luma([10]) });
        let angle = orientation(&img, 32, 32);
        assert!((angle - std::f32::consts::FRAC_PI_2).abs() < 0.1, "angle = {}", angle);
    }

    #[test]
    fn test_flat_patch_gives_zero_descriptor() {
        let img = GrayImage::from_pixel(64, 64, Luma([90]));
        assert_eq!(describe(&img, 32, 32, 0.7), [0u8; DESCRIPTOR_BYTES]);
    }
}
