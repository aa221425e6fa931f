use thiserror::Error;

/// 比率テストのしきい値（最近傍 < 0.75 × 第2近傍）
pub const RATIO_THRESHOLD: f64 = 0.75;

/// LSHインデックスのパラメータ
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LshParams {
    /// ハッシュテーブル数
    pub table_number: usize,
    /// 1テーブルのキーに使うビット数
    pub key_size: usize,
    /// 近傍バケット探索の反転ビット数
    pub multi_probe_level: usize,
}

impl Default for LshParams {
    fn default() -> Self {
        Self {
            table_number: 6,
            key_size: 12,
            multi_probe_level: 1,
        }
    }
}

/// 1ペアの照合が失敗した理由
///
/// 呼び出し側ではスコア0と同じ扱いになるが、診断ログでは区別する。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MatcherError {
    #[error("記述子が不足しています (参照: {reference}, 候補: {candidate})")]
    TooFewDescriptors { reference: usize, candidate: usize },

    #[error("LSHパラメータが不正: {0}")]
    InvalidIndexParams(String),

    #[error("インデックスが空です")]
    EmptyIndex,
}

/// 1ペアの照合結果
pub type MatchOutcome = std::result::Result<f64, MatcherError>;

/// 失敗をスコア0に畳み込む
pub fn score_or_zero(outcome: &MatchOutcome) -> f64 {
    match outcome {
        Ok(score) => *score,
        Err(_) => 0.0,
    }
}
