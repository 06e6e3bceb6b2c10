#![allow(dead_code)]

use anyhow::{anyhow, bail};
use ccfs::config::CoevolutionConfig;
use ccfs::data::{FeatureMatrix, InMemoryDataset};
use ccfs::engines::ModelAdapter;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// Dataset whose column `j` holds the value `j` in every row, so a model can
/// tell which original features survived `select_columns`.
pub fn indexed_dataset(n_features: usize, n_samples: usize) -> InMemoryDataset {
    let rows: Vec<Vec<f64>> = (0..n_samples)
        .map(|_| (0..n_features).map(|j| j as f64).collect())
        .collect();
    let labels = (0..n_samples).map(|i| (i % 2) as f64).collect();
    InMemoryDataset::from_rows(&rows, labels).unwrap()
}

fn selected_features(features: &FeatureMatrix) -> Vec<usize> {
    if features.n_rows() == 0 {
        return Vec::new();
    }
    features.row(0).iter().map(|&v| v as usize).collect()
}

/// Scores the fraction of the informative features present in the subset.
pub struct IndexAwareModel {
    pub informative: Vec<usize>,
    pub calls: Arc<AtomicUsize>,
}

impl IndexAwareModel {
    pub fn new(informative: Vec<usize>) -> Self {
        Self {
            informative,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl ModelAdapter for IndexAwareModel {
    fn score(&self, features: &FeatureMatrix, _labels: &[f64], _seed: u64) -> anyhow::Result<f64> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let selected = selected_features(features);
        let hits = self
            .informative
            .iter()
            .filter(|f| selected.contains(f))
            .count();
        Ok(hits as f64 / self.informative.len() as f64)
    }
}

/// Always returns the same score and counts its calls.
pub struct ConstantModel {
    pub score: f64,
    pub calls: Arc<AtomicUsize>,
}

impl ConstantModel {
    pub fn new(score: f64) -> Self {
        Self {
            score,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl ModelAdapter for ConstantModel {
    fn score(&self, _features: &FeatureMatrix, _labels: &[f64], _seed: u64) -> anyhow::Result<f64> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.score)
    }
}

/// Fails on the very first call, then scores `score`.
pub struct FlakyModel {
    pub score: f64,
    failed_once: AtomicBool,
    pub seeds: std::sync::Mutex<Vec<u64>>,
}

impl FlakyModel {
    pub fn new(score: f64) -> Self {
        Self {
            score,
            failed_once: AtomicBool::new(false),
            seeds: std::sync::Mutex::new(Vec::new()),
        }
    }
}

impl ModelAdapter for FlakyModel {
    fn score(&self, _features: &FeatureMatrix, _labels: &[f64], seed: u64) -> anyhow::Result<f64> {
        self.seeds.lock().unwrap().push(seed);
        if !self.failed_once.swap(true, Ordering::SeqCst) {
            bail!("fold failed to fit");
        }
        Ok(self.score)
    }
}

/// Never succeeds.
pub struct FailingModel;

impl ModelAdapter for FailingModel {
    fn score(&self, _features: &FeatureMatrix, _labels: &[f64], _seed: u64) -> anyhow::Result<f64> {
        Err(anyhow!("model exploded"))
    }
}

/// Fails whenever the evaluation seed is a multiple of three, so roughly one
/// individual in nine ends as a sentinel after its retry.
pub struct SeedSensitiveModel {
    pub inner: IndexAwareModel,
    pub failures: Arc<AtomicUsize>,
}

impl SeedSensitiveModel {
    pub fn new(informative: Vec<usize>) -> Self {
        Self {
            inner: IndexAwareModel::new(informative),
            failures: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl ModelAdapter for SeedSensitiveModel {
    fn score(&self, features: &FeatureMatrix, labels: &[f64], seed: u64) -> anyhow::Result<f64> {
        if seed % 3 == 0 {
            self.failures.fetch_add(1, Ordering::SeqCst);
            bail!("fit diverged for seed {}", seed);
        }
        self.inner.score(features, labels, seed)
    }
}

/// Behaves like `IndexAwareModel` for the first `budget` calls, then fails forever.
pub struct ExhaustingModel {
    pub inner: IndexAwareModel,
    pub budget: usize,
}

impl ModelAdapter for ExhaustingModel {
    fn score(&self, features: &FeatureMatrix, labels: &[f64], seed: u64) -> anyhow::Result<f64> {
        if self.inner.calls.load(Ordering::SeqCst) >= self.budget {
            bail!("budget exhausted");
        }
        self.inner.score(features, labels, seed)
    }
}

pub fn small_config() -> CoevolutionConfig {
    CoevolutionConfig {
        num_subpopulations: 3,
        population_size: 8,
        max_generations: 6,
        patience: 0,
        workers: 2,
        ..CoevolutionConfig::default()
    }
}
