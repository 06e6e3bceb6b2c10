//! Cooperative co-evolutionary feature selection.
//!
//! The feature set is decomposed into disjoint subcomponents, each evolved by
//! its own subpopulation of binary masks. Subpopulations are evaluated in a
//! fixed round-robin order against the representatives of all others, and
//! complete masks are scored by a wrapped predictive model with a penalty on
//! subset size.

pub mod config;
pub mod data;
pub mod engines;
pub mod error;
pub mod ml;
pub mod types;

pub use error::{CcfsError, Result};
