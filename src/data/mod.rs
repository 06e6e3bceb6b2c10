pub mod dataset;
pub mod csv;

pub use csv::CsvConnector;
pub use dataset::{Dataset, FeatureMatrix, InMemoryDataset};
