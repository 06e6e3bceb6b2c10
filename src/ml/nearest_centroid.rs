use super::metrics::{class_of, ClassificationMetrics};
use crate::config::{ScoreMetric, WrapperConfig};
use crate::data::FeatureMatrix;
use crate::engines::evaluation::ModelAdapter;
use anyhow::{bail, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::BTreeMap;

/// k-fold cross-validated nearest-centroid classifier on standardized features.
///
/// Samples are shuffled with the evaluation seed before being dealt into folds,
/// so scores are deterministic for a given seed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearestCentroidModel {
    pub kfolds: usize,
    pub metric: ScoreMetric,
}

impl Default for NearestCentroidModel {
    fn default() -> Self {
        Self::from_config(&WrapperConfig::default())
    }
}

impl NearestCentroidModel {
    pub fn from_config(config: &WrapperConfig) -> Self {
        Self {
            kfolds: config.kfolds,
            metric: config.metric,
        }
    }

    /// Cross-validated predictions, one per sample in row order.
    pub fn cross_val_predict(
        &self,
        features: &FeatureMatrix,
        labels: &[f64],
        seed: u64,
    ) -> Result<Vec<i64>> {
        let n = features.n_rows();
        if labels.len() != n {
            bail!("{} labels for {} samples", labels.len(), n);
        }
        if features.n_cols() == 0 {
            bail!("cannot fit a model without features");
        }
        if n < self.kfolds {
            bail!("{} samples are not enough for {}-fold cross-validation", n, self.kfolds);
        }

        let classes: Vec<i64> = labels.iter().map(|&l| class_of(l)).collect();
        let mut order: Vec<usize> = (0..n).collect();
        order.shuffle(&mut StdRng::seed_from_u64(seed));

        let mut fold_of = vec![0usize; n];
        for (pos, &sample) in order.iter().enumerate() {
            fold_of[sample] = pos % self.kfolds;
        }

        let mut predictions = vec![0i64; n];
        for fold in 0..self.kfolds {
            let train: Vec<usize> = (0..n).filter(|&i| fold_of[i] != fold).collect();
            let fitted = FittedCentroids::fit(features, &classes, &train)?;
            for i in (0..n).filter(|&i| fold_of[i] == fold) {
                predictions[i] = fitted.predict(features.row(i));
            }
        }
        Ok(predictions)
    }
}

impl ModelAdapter for NearestCentroidModel {
    fn score(&self, features: &FeatureMatrix, labels: &[f64], seed: u64) -> Result<f64> {
        let predictions = self.cross_val_predict(features, labels, seed)?;
        let truth: Vec<i64> = labels.iter().map(|&l| class_of(l)).collect();
        let metrics = ClassificationMetrics::compute(&truth, &predictions);
        Ok(match self.metric {
            ScoreMetric::Accuracy => metrics.accuracy,
            ScoreMetric::MacroF1 => metrics.f1_score,
        })
    }
}

struct FittedCentroids {
    mean: Vec<f64>,
    scale: Vec<f64>,
    centroids: BTreeMap<i64, Vec<f64>>,
}

impl FittedCentroids {
    fn fit(features: &FeatureMatrix, classes: &[i64], train: &[usize]) -> Result<Self> {
        if train.is_empty() {
            bail!("empty training fold");
        }
        let d = features.n_cols();
        let m = train.len() as f64;

        let mut mean = vec![0.0; d];
        for &i in train {
            for (acc, v) in mean.iter_mut().zip(features.row(i)) {
                *acc += v;
            }
        }
        mean.iter_mut().for_each(|v| *v /= m);

        let mut scale = vec![0.0; d];
        for &i in train {
            for ((acc, v), mu) in scale.iter_mut().zip(features.row(i)).zip(&mean) {
                *acc += (v - mu) * (v - mu);
            }
        }
        // Constant columns keep unit scale so they contribute nothing.
        scale
            .iter_mut()
            .for_each(|v| *v = if *v > 0.0 { (*v / m).sqrt() } else { 1.0 });

        let mut sums: BTreeMap<i64, (Vec<f64>, usize)> = BTreeMap::new();
        for &i in train {
            let entry = sums.entry(classes[i]).or_insert_with(|| (vec![0.0; d], 0));
            for (j, v) in features.row(i).iter().enumerate() {
                entry.0[j] += (v - mean[j]) / scale[j];
            }
            entry.1 += 1;
        }
        let centroids = sums
            .into_iter()
            .map(|(class, (sum, count))| {
                (class, sum.into_iter().map(|s| s / count as f64).collect())
            })
            .collect();

        Ok(Self {
            mean,
            scale,
            centroids,
        })
    }

    fn predict(&self, row: &[f64]) -> i64 {
        let mut best_class = 0;
        let mut best_dist = f64::INFINITY;
        for (&class, centroid) in &self.centroids {
            let dist: f64 = row
                .iter()
                .zip(&self.mean)
                .zip(&self.scale)
                .zip(centroid)
                .map(|(((v, mu), s), c)| {
                    let z = (v - mu) / s - c;
                    z * z
                })
                .sum();
            if dist < best_dist {
                best_dist = dist;
                best_class = class;
            }
        }
        best_class
    }
}
