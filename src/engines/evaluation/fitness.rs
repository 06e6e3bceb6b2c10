use super::model::ModelAdapter;
use crate::config::CoevolutionConfig;
use crate::data::Dataset;
use crate::error::{CcfsError, Result};
use crate::types::{FitnessRecord, FullMask, EMPTY_MASK_FITNESS};

/// Scores full masks through the model adapter and applies the subset-size penalty:
/// `fitness = alpha * score - (1 - alpha) * selected / total`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitnessEvaluator {
    pub alpha: f64,
    /// Score reported for a mask that selects nothing. The adapter is not called
    /// and the fitness is always `EMPTY_MASK_FITNESS`.
    pub empty_mask_score: f64,
    pub max_retries: usize,
}

impl Default for FitnessEvaluator {
    fn default() -> Self {
        Self {
            alpha: 0.95,
            empty_mask_score: 0.0,
            max_retries: 1,
        }
    }
}

impl FitnessEvaluator {
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha,
            ..Self::default()
        }
    }

    pub fn from_config(config: &CoevolutionConfig) -> Self {
        Self {
            alpha: config.alpha,
            empty_mask_score: config.empty_mask_score,
            max_retries: config.max_retries,
        }
    }

    pub fn combine(&self, score: f64, selected: usize, total_features: usize) -> f64 {
        let ratio = if total_features == 0 {
            0.0
        } else {
            selected as f64 / total_features as f64
        };
        self.alpha * score - (1.0 - self.alpha) * ratio
    }

    /// One scoring attempt. Adapter failures and out-of-range scores come back
    /// as `CcfsError::Evaluation`.
    pub fn evaluate<D, M>(
        &self,
        mask: &FullMask,
        dataset: &D,
        model: &M,
        seed: u64,
    ) -> Result<FitnessRecord>
    where
        D: Dataset + ?Sized,
        M: ModelAdapter + ?Sized,
    {
        let selected = mask.selected_count();
        if selected == 0 {
            return Ok(FitnessRecord {
                selected: 0,
                score: self.empty_mask_score,
                fitness: EMPTY_MASK_FITNESS,
                failed: false,
            });
        }

        let reduced = dataset.select_columns(&mask.bits)?;
        let score = model
            .score(&reduced, dataset.labels(), seed)
            .map_err(|e| CcfsError::Evaluation(format!("{:#}", e)))?;

        if !score.is_finite() || !(0.0..=1.0).contains(&score) {
            return Err(CcfsError::Evaluation(format!(
                "Model score {} is outside [0, 1]",
                score
            )));
        }

        Ok(FitnessRecord {
            selected,
            score,
            fitness: self.combine(score, selected, mask.len()),
            failed: false,
        })
    }

    /// Evaluate, retrying evaluation failures up to `max_retries` times with a
    /// perturbed seed. When every attempt fails the worst-fitness sentinel is
    /// returned; only non-evaluation errors propagate.
    pub fn evaluate_with_retry<D, M>(
        &self,
        mask: &FullMask,
        dataset: &D,
        model: &M,
        seed: u64,
    ) -> Result<FitnessRecord>
    where
        D: Dataset + ?Sized,
        M: ModelAdapter + ?Sized,
    {
        let mut attempt_seed = seed;
        for attempt in 0..=self.max_retries {
            match self.evaluate(mask, dataset, model, attempt_seed) {
                Ok(record) => {
                    if attempt > 0 {
                        log::debug!("Evaluation recovered on retry {}", attempt);
                    }
                    return Ok(record);
                }
                Err(CcfsError::Evaluation(msg)) => {
                    log::warn!(
                        "Evaluation attempt {}/{} failed (seed {}): {}",
                        attempt + 1,
                        self.max_retries + 1,
                        attempt_seed,
                        msg
                    );
                    attempt_seed = perturb_seed(seed, attempt as u64 + 1);
                }
                Err(e) => return Err(e),
            }
        }
        Ok(FitnessRecord::worst(mask.selected_count()))
    }
}

/// Seed used for the n-th retry of an evaluation.
pub fn perturb_seed(seed: u64, retry: u64) -> u64 {
    seed ^ retry.wrapping_mul(0x9E37_79B9_7F4A_7C15)
}
