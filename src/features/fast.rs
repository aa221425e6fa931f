//! FAST-9 コーナー検出とHarris応答

use image::GrayImage;

/// 半径3のBresenham円（時計回り）
const CIRCLE: [(i32, i32); 16] = [
    (0, -3), (1, -3), (2, -2), (3, -1),
    (3, 0), (3, 1), (2, 2), (1, 3),
    (0, 3), (-1, 3), (-2, 2), (-3, 1),
    (-3, 0), (-3, -1), (-2, -2), (-1, -3),
];

/// 連続して明るい/暗い必要がある画素数
const ARC_LENGTH: usize = 9;

const HARRIS_K: f32 = 0.04;
const HARRIS_RADIUS: i32 = 3;

/// 検出されたコーナー（レベル画像座標）
#[derive(Debug, Clone, Copy)]
pub struct Corner {
    pub x: u32,
    pub y: u32,
    pub score: f32,
}

#[derive(Clone, Copy, PartialEq)]
enum Ring {
    Brighter,
    Darker,
    Similar,
}

/// FAST-9でコーナーを検出し、3x3の非極大抑制をかける
///
/// `border` より内側の画素だけを対象にする。
pub fn detect(image: &GrayImage, threshold: u8, border: u32) -> Vec<Corner> {
    let (width, height) = image.dimensions();
    if width <= border * 2 || height <= border * 2 {
        return Vec::new();
    }

    let w = width as usize;
    let mut scores = vec![0f32; w * height as usize];
    let mut candidates = Vec::new();

    for y in border..height - border {
        for x in border..width - border {
            if let Some(score) = corner_score(image, x, y, threshold) {
                scores[y as usize * w + x as usize] = score;
                candidates.push((x, y));
            }
        }
    }

    candidates
        .into_iter()
        .filter_map(|(x, y)| {
            let idx = y as usize * w + x as usize;
            let score = scores[idx];
            for dy in -1i32..=1 {
                for dx in -1i32..=1 {
                    if dx == 0 && dy == 0 {
                        continue;
                    }
                    let n = (y as i32 + dy) as usize * w + (x as i32 + dx) as usize;
                    // 同点はラスタ順で先の画素を残す
                    let beaten = if n < idx { scores[n] >= score } else { scores[n] > score };
                    if beaten {
                        return None;
                    }
                }
            }
            Some(Corner { x, y, score })
        })
        .collect()
}

fn corner_score(image: &GrayImage, x: u32, y: u32, threshold: u8) -> Option<f32> {
    let center = image.get_pixel(x, y)[0] as i32;
    let t = threshold as i32;

    let mut ring = [Ring::Similar; 16];
    let mut diffs = [0i32; 16];
    for (i, (dx, dy)) in CIRCLE.iter().enumerate() {
        let v = image.get_pixel((x as i32 + dx) as u32, (y as i32 + dy) as u32)[0] as i32;
        diffs[i] = v - center;
        ring[i] = if v > center + t {
            Ring::Brighter
        } else if v < center - t {
            Ring::Darker
        } else {
            Ring::Similar
        };
    }

    // 9連続なら4方位のうち少なくとも2点が同じ状態になる
    let compass = [ring[0], ring[4], ring[8], ring[12]];
    let bright = compass.iter().filter(|&&r| r == Ring::Brighter).count();
    let dark = compass.iter().filter(|&&r| r == Ring::Darker).count();
    if bright < 2 && dark < 2 {
        return None;
    }

    let is_bright = has_arc(&ring, Ring::Brighter);
    let is_dark = has_arc(&ring, Ring::Darker);
    if !is_bright && !is_dark {
        return None;
    }

    let bright_sum: i32 = diffs.iter().filter(|&&d| d > t).map(|&d| d - t).sum();
    let dark_sum: i32 = diffs.iter().filter(|&&d| d < -t).map(|&d| -d - t).sum();
    Some(bright_sum.max(dark_sum) as f32)
}

fn has_arc(ring: &[Ring; 16], state: Ring) -> bool {
    let mut run = 0;
    for i in 0..(16 + ARC_LENGTH - 1) {
        if ring[i % 16] == state {
            run += 1;
            if run >= ARC_LENGTH {
                return true;
            }
        } else {
            run = 0;
        }
    }
    false
}

/// 7x7ブロックのHarrisコーナー応答
///
/// 呼び出し側は `x`,`y` が画像端から `HARRIS_RADIUS + 1` 以上離れていることを保証すること。
pub fn harris_response(image: &GrayImage, x: u32, y: u32) -> f32 {
    let px = |xx: i32, yy: i32| image.get_pixel(xx as u32, yy as u32)[0] as f32;

    let (mut a, mut b, mut c) = (0f32, 0f32, 0f32);
    for dy in -HARRIS_RADIUS..=HARRIS_RADIUS {
        for dx in -HARRIS_RADIUS..=HARRIS_RADIUS {
            let cx = x as i32 + dx;
            let cy = y as i32 + dy;
            let ix = px(cx + 1, cy) - px(cx - 1, cy);
            let iy = px(cx, cy + 1) - px(cx, cy - 1);
            a += ix * ix;
            b += iy * iy;
            c += ix * iy;
        }
    }

    a * b - c * c - HARRIS_K * (a + b) * (a + b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn square_image() -> GrayImage {
        GrayImage::from_fn(64, 64, |x, y| {
            if (24..40).contains(&x) && (24..40).contains(&y) {
                Luma([255])
            } else {
                Luma([0])
            }
        })
    }

    #[test]
    fn test_flat_image_has_no_corners() {
        let img = GrayImage::from_pixel(64, 64, Luma([128]));
        assert!(detect(&img, 20, 8).is_empty());
    }

    #[test]
    fn test_square_corners_detected() {
        let corners = detect(&square_image(), 20, 8);
        assert!(!corners.is_empty());
        // 正方形の角付近でのみ検出される
        for c in &corners {
            let near_x = (c.x as i32 - 24).abs() <= 2 || (c.x as i32 - 39).abs() <= 2;
            let near_y = (c.y as i32 - 24).abs() <= 2 || (c.y as i32 - 39).abs() <= 2;
            assert!(near_x && near_y, "unexpected corner at {},{}", c.x, c.y);
        }
    }

    #[test]
    fn test_tiny_image_is_skipped() {
        let img = GrayImage::from_pixel(10, 10, Luma([0]));
        assert!(detect(&img, 20, 8).is_empty());
    }

    #[test]
    fn test_harris_prefers_corner_over_edge() {
        let img = square_image();
        let corner = harris_response(&img, 24, 24);
        let edge = harris_response(&img, 32, 24);
        assert!(corner > edge);
    }
}
