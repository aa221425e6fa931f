//! マッチングパイプライン
//!
//! 1枚の候補（静止画または動画の1フレーム）を全参照画像と照合し、
//! 判定ポリシーを通過したものを `ResultSink` に渡す。
//! 候補単位・ペア単位の失敗はログを出して「マッチなし」として扱う。

pub mod sink;
pub mod still;
pub mod video;

pub use sink::{FolderSink, ResultSink};
pub use still::process_image;
pub use video::{process_video, scan_frames, DEFAULT_FRAME_INTERVAL};

use crate::color_gate::GreenGate;
use crate::error::{FrameMatchError, Result};
use crate::features::{DescriptorSet, OrbConfig, OrbExtractor};
use crate::matcher::{score_or_zero, DescriptorMatcher, MatchOutcome};
use crate::policy::{Decision, MatchPolicy, MediaKind};
use crate::reference::{ReferenceImage, ReferenceSet};
use image::{imageops, RgbImage};
use std::cell::OnceCell;
use std::path::Path;

/// 画像ファイルを読み込んでRGBに変換
pub fn decode_image(path: &Path) -> Result<RgbImage> {
    image::open(path)
        .map(|img| img.to_rgb8())
        .map_err(|e| FrameMatchError::ImageLoad(format!("{}: {}", path.display(), e)))
}

/// 確定したマッチ
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    /// 候補の識別名（素材ファイル名、動画はファイル名の拡張子なし）
    pub candidate: String,
    /// 参照画像のファイル名
    pub reference: String,
    pub score: f64,
    pub frame_index: Option<u64>,
    pub timestamp: Option<f64>,
    /// 結果フォルダに書き出すファイル名
    pub file_name: String,
}

/// 照合中の候補（静止画または1フレーム）
pub struct Candidate {
    pub image: RgbImage,
    pub descriptors: DescriptorSet,
    green_ratio: OnceCell<f64>,
}

impl Candidate {
    pub fn green_ratio(&self, gate: &GreenGate) -> f64 {
        *self.green_ratio.get_or_init(|| gate.green_ratio(&self.image))
    }
}

/// 照合で採用された参照画像とスコア
#[derive(Debug, Clone, Copy)]
pub struct Hit<'r> {
    pub reference: &'r ReferenceImage,
    pub score: f64,
}

/// 特徴抽出・照合・色ゲート・判定ポリシーの組
#[derive(Debug, Clone, Default)]
pub struct MatchEngine {
    pub extractor: OrbExtractor,
    pub matcher: DescriptorMatcher,
    pub gate: GreenGate,
    pub policy: MatchPolicy,
    pub verbose: bool,
}

impl MatchEngine {
    pub fn new(orb: OrbConfig, verbose: bool) -> Self {
        Self {
            extractor: OrbExtractor::new(orb),
            verbose,
            ..Default::default()
        }
    }

    /// カラー画像から候補を作る（グレースケール化して特徴抽出）
    pub fn candidate(&self, image: RgbImage) -> Candidate {
        let gray = imageops::grayscale(&image);
        let descriptors = self.extractor.extract(&gray);
        Candidate {
            image,
            descriptors,
            green_ratio: OnceCell::new(),
        }
    }

    /// 候補を全参照画像と照合し、採用されたものを参照画像順に返す
    pub fn evaluate<'r>(
        &self,
        kind: MediaKind,
        candidate: &Candidate,
        references: &'r ReferenceSet,
    ) -> Vec<Hit<'r>> {
        if candidate.descriptors.is_empty() {
            return Vec::new();
        }

        let index = self.matcher.index(&candidate.descriptors);
        let mut hits = Vec::new();

        for reference in references.iter() {
            if reference.descriptors.is_empty() {
                continue;
            }

            let outcome: MatchOutcome = match &index {
                Ok(index) => self.matcher.score_against(&reference.descriptors, index),
                Err(e) => Err(e.clone()),
            };
            if let Err(e) = &outcome {
                if self.verbose {
                    println!("    [照合] {}: {}", reference.name, e);
                }
            }

            let score = score_or_zero(&outcome);
            let decision = self.policy.decide(kind, score, || {
                self.gate
                    .check_ratios(reference.green_ratio, candidate.green_ratio(&self.gate))
            });

            match decision {
                Decision::Accepted => hits.push(Hit { reference, score }),
                Decision::GateRejected if self.verbose => {
                    println!("    [色ゲート] {} を棄却 (score: {:.3})", reference.name, score);
                }
                _ => {}
            }
        }

        hits
    }
}
