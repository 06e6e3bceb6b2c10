use crate::error::CcfsError;
use serde::{Deserialize, Serialize};

/// Trait for configuration sections
pub trait ConfigSection: Serialize + for<'de> Deserialize<'de> + Default + Clone {
    fn section_name() -> &'static str;
    fn validate(&self) -> Result<(), CcfsError>;
}

/// Shared check for probabilities and weights.
pub(crate) fn ensure_unit_interval(name: &str, value: f64) -> Result<(), CcfsError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(CcfsError::Configuration(format!(
            "{} must be between 0 and 1, got {}",
            name, value
        )));
    }
    Ok(())
}
