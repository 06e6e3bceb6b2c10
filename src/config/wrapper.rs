use super::traits::ConfigSection;
use crate::error::CcfsError;
use serde::{Deserialize, Serialize};

/// Settings of the built-in wrapper model.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WrapperConfig {
    pub kfolds: usize,
    pub metric: ScoreMetric,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScoreMetric {
    Accuracy,
    MacroF1,
}

impl Default for WrapperConfig {
    fn default() -> Self {
        Self {
            kfolds: 5,
            metric: ScoreMetric::Accuracy,
        }
    }
}

impl ConfigSection for WrapperConfig {
    fn section_name() -> &'static str {
        "wrapper"
    }

    fn validate(&self) -> Result<(), CcfsError> {
        if self.kfolds < 2 {
            return Err(CcfsError::Configuration(
                "Cross-validation needs at least 2 folds".to_string(),
            ));
        }
        Ok(())
    }
}
