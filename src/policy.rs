//! マッチ判定ポリシー
//!
//! 静止画: スコア >= 0.15 かつ 緑色ゲート通過
//! 動画フレーム: スコア >= 0.12 かつ（緑色ゲート通過 または スコア >= 0.25）
//!
//! 強いスコアでゲートを上書きできるのは動画フレームだけ。静止画には適用しない。

/// 候補の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    VideoFrame,
}

/// 判定結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// マッチとして採用
    Accepted,
    /// スコアがしきい値未満
    BelowThreshold,
    /// 緑色ゲートで棄却
    GateRejected,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchPolicy {
    pub image_threshold: f64,
    pub video_threshold: f64,
    /// 動画フレームでゲート結果を無視できるスコア
    pub video_gate_override: f64,
}

impl Default for MatchPolicy {
    fn default() -> Self {
        Self {
            image_threshold: 0.15,
            video_threshold: 0.12,
            video_gate_override: 0.25,
        }
    }
}

impl MatchPolicy {
    pub fn threshold(&self, kind: MediaKind) -> f64 {
        match kind {
            MediaKind::Image => self.image_threshold,
            MediaKind::VideoFrame => self.video_threshold,
        }
    }

    /// スコアとゲートから採否を決める
    ///
    /// ゲートはスコアがしきい値を超えた場合にだけ評価される。
    pub fn decide(&self, kind: MediaKind, score: f64, gate: impl FnOnce() -> bool) -> Decision {
        if score < self.threshold(kind) {
            return Decision::BelowThreshold;
        }

        let passed = match kind {
            MediaKind::Image => gate(),
            MediaKind::VideoFrame => gate() || score >= self.video_gate_override,
        };

        if passed {
            Decision::Accepted
        } else {
            Decision::GateRejected
        }
    }
}
