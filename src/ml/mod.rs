pub mod metrics;
pub mod nearest_centroid;

pub use metrics::ClassificationMetrics;
pub use nearest_centroid::NearestCentroidModel;
