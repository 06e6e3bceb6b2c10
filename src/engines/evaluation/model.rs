use crate::data::FeatureMatrix;
use std::sync::Arc;

/// Wrapped predictive model used to judge a feature subset.
pub trait ModelAdapter: Send + Sync {
    /// Validation performance in [0, 1] (e.g. k-fold cross-validated accuracy)
    /// of a model trained on `features` against `labels`. Must be deterministic
    /// for a fixed `seed`; a retry after a failure passes a different seed.
    fn score(&self, features: &FeatureMatrix, labels: &[f64], seed: u64) -> anyhow::Result<f64>;
}

impl<M: ModelAdapter + ?Sized> ModelAdapter for Arc<M> {
    fn score(&self, features: &FeatureMatrix, labels: &[f64], seed: u64) -> anyhow::Result<f64> {
        (**self).score(features, labels, seed)
    }
}

impl<M: ModelAdapter + ?Sized> ModelAdapter for Box<M> {
    fn score(&self, features: &FeatureMatrix, labels: &[f64], seed: u64) -> anyhow::Result<f64> {
        (**self).score(features, labels, seed)
    }
}
