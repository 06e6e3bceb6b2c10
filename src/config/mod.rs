pub mod traits;
pub mod coevolution;
pub mod wrapper;
pub mod data;
pub mod manager;

pub use manager::{AppConfig, ConfigManager};
pub use coevolution::{CoevolutionConfig, CollaborationStrategy, DecompositionStrategy};
pub use wrapper::{ScoreMetric, WrapperConfig};
pub use data::DataConfig;
pub use traits::ConfigSection;
