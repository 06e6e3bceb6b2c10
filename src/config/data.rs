use super::traits::ConfigSection;
use crate::error::CcfsError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub path: Option<PathBuf>,
    /// Defaults to the last column of the file
    pub label_column: Option<String>,
}

impl ConfigSection for DataConfig {
    fn section_name() -> &'static str {
        "data"
    }

    fn validate(&self) -> Result<(), CcfsError> {
        if let Some(label) = &self.label_column {
            if label.trim().is_empty() {
                return Err(CcfsError::Configuration(
                    "Label column name must not be empty".to_string(),
                ));
            }
        }
        Ok(())
    }
}
