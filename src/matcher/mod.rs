//! 記述子照合モジュール
//!
//! 候補画像の記述子にLSHインデックスを張り、参照画像の各記述子について
//! 最近傍・第2近傍を求めて比率テストを通過した割合をスコアとする。

pub mod lsh;
pub mod types;

pub use lsh::{hamming_distance, LshIndex, Neighbor};
pub use types::{score_or_zero, LshParams, MatchOutcome, MatcherError, RATIO_THRESHOLD};

use crate::features::DescriptorSet;

/// 比率テスト付きの記述子照合器
#[derive(Debug, Clone)]
pub struct DescriptorMatcher {
    params: LshParams,
    ratio_threshold: f64,
}

impl Default for DescriptorMatcher {
    fn default() -> Self {
        Self {
            params: LshParams::default(),
            ratio_threshold: RATIO_THRESHOLD,
        }
    }
}

impl DescriptorMatcher {
    pub fn new(params: LshParams, ratio_threshold: f64) -> Self {
        Self {
            params,
            ratio_threshold,
        }
    }

    /// 候補側のインデックスを構築
    ///
    /// 1つの候補を複数の参照画像と照合する場合はこれを使い回す。
    pub fn index<'a>(&self, candidate: &'a DescriptorSet) -> Result<LshIndex<'a>, MatcherError> {
        LshIndex::build(candidate.as_slice(), &self.params)
    }

    /// 参照記述子と構築済みインデックスを照合
    pub fn score_against(&self, reference: &DescriptorSet, index: &LshIndex<'_>) -> MatchOutcome {
        if reference.len() < 2 || index.len() < 2 {
            return Err(MatcherError::TooFewDescriptors {
                reference: reference.len(),
                candidate: index.len(),
            });
        }

        let mut pairs = 0usize;
        let mut good = 0usize;
        for query in reference.iter() {
            if let Some((m, n)) = index.nearest_two(query) {
                pairs += 1;
                if (m.distance as f64) < self.ratio_threshold * n.distance as f64 {
                    good += 1;
                }
            }
        }

        if pairs == 0 {
            return Ok(0.0);
        }
        Ok(good as f64 / pairs as f64)
    }

    /// 参照（A）と候補（B）の類似度を計算
    pub fn try_score(&self, reference: &DescriptorSet, candidate: &DescriptorSet) -> MatchOutcome {
        if reference.len() < 2 || candidate.len() < 2 {
            return Err(MatcherError::TooFewDescriptors {
                reference: reference.len(),
                candidate: candidate.len(),
            });
        }
        let index = self.index(candidate)?;
        self.score_against(reference, &index)
    }

    /// 類似度（失敗時は0）
    pub fn score(&self, reference: &DescriptorSet, candidate: &DescriptorSet) -> f64 {
        score_or_zero(&self.try_score(reference, candidate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{Descriptor, DESCRIPTOR_BYTES};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn random_set(seed: u64, count: usize) -> DescriptorSet {
        let mut rng = StdRng::seed_from_u64(seed);
        let descriptors = (0..count)
            .map(|_| {
                let mut d: Descriptor = [0u8; DESCRIPTOR_BYTES];
                rng.fill(&mut d[..]);
                d
            })
            .collect();
        DescriptorSet::new(descriptors)
    }

    #[test]
    fn test_fewer_than_two_descriptors_scores_zero() {
        let matcher = DescriptorMatcher::default();
        let one = random_set(1, 1);
        let many = random_set(2, 50);
        let empty = DescriptorSet::default();

        assert_eq!(matcher.score(&one, &many), 0.0);
        assert_eq!(matcher.score(&many, &one), 0.0);
        assert_eq!(matcher.score(&empty, &many), 0.0);
        assert_eq!(matcher.score(&many, &empty), 0.0);
        assert!(matches!(
            matcher.try_score(&one, &many),
            Err(MatcherError::TooFewDescriptors { reference: 1, candidate: 50 })
        ));
    }

    #[test]
    fn test_identical_sets_score_high() {
        let matcher = DescriptorMatcher::default();
        let set = random_set(7, 400);
        let score = matcher.score(&set, &set);
        assert!(score > 0.9, "score = {}", score);
    }

    #[test]
    fn test_unrelated_sets_score_low() {
        let matcher = DescriptorMatcher::default();
        let a = random_set(11, 400);
        let b = random_set(12, 400);
        let score = matcher.score(&a, &b);
        assert!(score < 0.15, "score = {}", score);
    }

    #[test]
    fn test_score_in_unit_range() {
        let matcher = DescriptorMatcher::default();
        for seed in 0..5 {
            let a = random_set(seed, 10 + seed as usize * 30);
            let b = random_set(seed + 100, 5 + seed as usize * 20);
            let score = matcher.score(&a, &b);
            assert!((0.0..=1.0).contains(&score));
        }
    }

    #[test]
    fn test_invalid_params_degrade_to_zero() {
        let params = LshParams {
            table_number: 0,
            ..Default::default()
        };
        let matcher = DescriptorMatcher::new(params, RATIO_THRESHOLD);
        let set = random_set(3, 20);
        assert!(matches!(
            matcher.try_score(&set, &set),
            Err(MatcherError::InvalidIndexParams(_))
        ));
        assert_eq!(matcher.score(&set, &set), 0.0);
    }
}
