use super::dataset::{FeatureMatrix, InMemoryDataset};
use crate::error::{CcfsError, Result};
use polars::prelude::*;
use std::collections::HashMap;
use std::path::Path;

pub struct CsvConnector;

impl CsvConnector {
    /// Load CSV file into DataFrame
    pub fn load_frame<P: AsRef<Path>>(path: P) -> Result<DataFrame> {
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .try_into_reader_with_file_path(Some(path.as_ref().to_path_buf()))?
            .finish()
            .map_err(|e| CcfsError::DataLoading(format!("Failed to read CSV: {}", e)))?;

        Ok(df)
    }

    /// Load a CSV file as a dataset. Every column except `label_column`
    /// (the last column when `None`) becomes a numeric feature.
    pub fn load<P: AsRef<Path>>(path: P, label_column: Option<&str>) -> Result<InMemoryDataset> {
        let df = Self::load_frame(&path)?;
        let dataset = Self::from_frame(&df, label_column)?;
        log::info!(
            "Loaded {} samples with {} features from {}",
            df.height(),
            df.width().saturating_sub(1),
            path.as_ref().display()
        );
        Ok(dataset)
    }

    pub fn from_frame(df: &DataFrame, label_column: Option<&str>) -> Result<InMemoryDataset> {
        let columns: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
        if columns.len() < 2 {
            return Err(CcfsError::DataLoading(
                "Dataset needs at least one feature column and a label column".to_string(),
            ));
        }

        let label_name = match label_column {
            Some(name) => {
                if !columns.iter().any(|c| c == name) {
                    return Err(CcfsError::DataLoading(format!(
                        "Label column '{}' not found",
                        name
                    )));
                }
                name.to_string()
            }
            None => columns[columns.len() - 1].clone(),
        };

        let feature_names: Vec<String> =
            columns.into_iter().filter(|c| *c != label_name).collect();

        let n_rows = df.height();
        let mut feature_columns = Vec::with_capacity(feature_names.len());
        for name in &feature_names {
            feature_columns.push(Self::numeric_column(df, name)?);
        }

        let mut values = Vec::with_capacity(n_rows * feature_names.len());
        for r in 0..n_rows {
            values.extend(feature_columns.iter().map(|col| col[r]));
        }

        let labels = Self::label_column(df, &label_name)?;
        let features = FeatureMatrix::new(n_rows, feature_names.len(), values)?;
        InMemoryDataset::with_names(features, labels, feature_names)
    }

    fn numeric_column(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
        let series = df.column(name)?.cast(&DataType::Float64)?;
        let values = series.f64()?;
        values
            .into_iter()
            .enumerate()
            .map(|(row, v)| {
                v.ok_or_else(|| {
                    CcfsError::DataLoading(format!(
                        "Missing or non-numeric value in column '{}' at row {}",
                        name, row
                    ))
                })
            })
            .collect()
    }

    /// Numeric labels are used as they are; text labels are mapped to class
    /// ids in order of first appearance.
    fn label_column(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
        let series = df.column(name)?;
        if let DataType::String = series.dtype() {
            let mut classes: HashMap<String, f64> = HashMap::new();
            let mut labels = Vec::with_capacity(df.height());
            for (row, v) in series.str()?.into_iter().enumerate() {
                let v = v.ok_or_else(|| {
                    CcfsError::DataLoading(format!("Missing label at row {}", row))
                })?;
                let next = classes.len() as f64;
                labels.push(*classes.entry(v.to_string()).or_insert(next));
            }
            Ok(labels)
        } else {
            Self::numeric_column(df, name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::dataset::Dataset;

    #[test]
    fn test_from_frame_uses_last_column_as_label() {
        let df = df! {
            "a" => &[1.0, 2.0, 3.0],
            "b" => &[4i64, 5, 6],
            "class" => &["x", "y", "x"],
        }
        .unwrap();

        let dataset = CsvConnector::from_frame(&df, None).unwrap();
        assert_eq!(dataset.n_features(), 2);
        assert_eq!(dataset.labels(), &[0.0, 1.0, 0.0]);
        assert_eq!(dataset.column(1), vec![4.0, 5.0, 6.0]);
        assert_eq!(dataset.feature_names(), &["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_from_frame_named_label() {
        let df = df! {
            "target" => &[1.0, 0.0],
            "a" => &[0.5, 0.25],
        }
        .unwrap();

        let dataset = CsvConnector::from_frame(&df, Some("target")).unwrap();
        assert_eq!(dataset.labels(), &[1.0, 0.0]);
        assert_eq!(dataset.column(0), vec![0.5, 0.25]);
    }

    #[test]
    fn test_missing_label_column() {
        let df = df! {
            "a" => &[1.0],
            "b" => &[2.0],
        }
        .unwrap();
        assert!(CsvConnector::from_frame(&df, Some("nope")).is_err());
    }
}
