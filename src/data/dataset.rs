use crate::error::{CcfsError, Result};

/// Dense row-major matrix of feature values.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    n_rows: usize,
    n_cols: usize,
    values: Vec<f64>,
}

impl FeatureMatrix {
    pub fn new(n_rows: usize, n_cols: usize, values: Vec<f64>) -> Result<Self> {
        if values.len() != n_rows * n_cols {
            return Err(CcfsError::DataLoading(format!(
                "Matrix of {}x{} needs {} values, got {}",
                n_rows,
                n_cols,
                n_rows * n_cols,
                values.len()
            )));
        }
        Ok(Self {
            n_rows,
            n_cols,
            values,
        })
    }

    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let n_cols = rows.first().map(|r| r.len()).unwrap_or(0);
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != n_cols) {
            return Err(CcfsError::DataLoading(format!(
                "Row {} has {} values, expected {}",
                i,
                row.len(),
                n_cols
            )));
        }
        let values = rows.iter().flatten().copied().collect();
        Self::new(rows.len(), n_cols, values)
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.values[i * self.n_cols..(i + 1) * self.n_cols]
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[row * self.n_cols + col]
    }

    pub fn column(&self, col: usize) -> Vec<f64> {
        (0..self.n_rows).map(|r| self.get(r, col)).collect()
    }
}

/// Source of the feature matrix and labels the engine selects from.
pub trait Dataset: Send + Sync {
    fn n_samples(&self) -> usize;
    fn n_features(&self) -> usize;
    fn labels(&self) -> &[f64];

    /// Values of one feature across all samples, in row order.
    fn column(&self, feature: usize) -> Vec<f64>;

    /// Reduced matrix holding only the columns where `mask` is true, rows in
    /// their original order. An all-false mask yields zero columns.
    fn select_columns(&self, mask: &[bool]) -> Result<FeatureMatrix>;
}

/// Dataset held fully in memory.
#[derive(Debug, Clone)]
pub struct InMemoryDataset {
    features: FeatureMatrix,
    labels: Vec<f64>,
    feature_names: Vec<String>,
}

impl InMemoryDataset {
    pub fn new(features: FeatureMatrix, labels: Vec<f64>) -> Result<Self> {
        let names = (0..features.n_cols()).map(|i| format!("f{}", i)).collect();
        Self::with_names(features, labels, names)
    }

    pub fn with_names(
        features: FeatureMatrix,
        labels: Vec<f64>,
        feature_names: Vec<String>,
    ) -> Result<Self> {
        if labels.len() != features.n_rows() {
            return Err(CcfsError::DataLoading(format!(
                "{} labels for {} samples",
                labels.len(),
                features.n_rows()
            )));
        }
        if feature_names.len() != features.n_cols() {
            return Err(CcfsError::DataLoading(format!(
                "{} feature names for {} features",
                feature_names.len(),
                features.n_cols()
            )));
        }
        if features.values.iter().chain(labels.iter()).any(|v| !v.is_finite()) {
            return Err(CcfsError::DataLoading(
                "Dataset contains non-finite values".to_string(),
            ));
        }
        Ok(Self {
            features,
            labels,
            feature_names,
        })
    }

    pub fn from_rows(rows: &[Vec<f64>], labels: Vec<f64>) -> Result<Self> {
        Self::new(FeatureMatrix::from_rows(rows)?, labels)
    }

    pub fn features(&self) -> &FeatureMatrix {
        &self.features
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }
}

impl Dataset for InMemoryDataset {
    fn n_samples(&self) -> usize {
        self.features.n_rows()
    }

    fn n_features(&self) -> usize {
        self.features.n_cols()
    }

    fn labels(&self) -> &[f64] {
        &self.labels
    }

    fn column(&self, feature: usize) -> Vec<f64> {
        self.features.column(feature)
    }

    fn select_columns(&self, mask: &[bool]) -> Result<FeatureMatrix> {
        if mask.len() != self.n_features() {
            return Err(CcfsError::State(format!(
                "Mask of length {} applied to {} features",
                mask.len(),
                self.n_features()
            )));
        }
        let selected: Vec<usize> = mask
            .iter()
            .enumerate()
            .filter_map(|(i, &keep)| keep.then_some(i))
            .collect();

        let mut values = Vec::with_capacity(self.n_samples() * selected.len());
        for r in 0..self.n_samples() {
            let row = self.features.row(r);
            values.extend(selected.iter().map(|&c| row[c]));
        }
        FeatureMatrix::new(self.n_samples(), selected.len(), values)
    }
}
