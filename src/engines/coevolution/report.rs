use crate::error::{CcfsError, ErrorKind, Result};
use crate::types::GlobalBest;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TerminalState {
    MaxGenerationsReached,
    /// No improvement above epsilon for `patience` generations
    Stagnated,
    /// Every population collapsed to a single genotype
    Converged,
    Cancelled,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunPhase {
    Initializing,
    Evolving,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunFailure {
    pub phase: RunPhase,
    pub kind: ErrorKind,
    pub message: String,
}

impl RunFailure {
    pub fn new(phase: RunPhase, error: &CcfsError) -> Self {
        Self {
            phase,
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

/// Outcome of one controller run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub state: TerminalState,
    pub failure: Option<RunFailure>,
    pub best: Option<GlobalBest>,
    pub selected_features: Vec<usize>,
    /// Global best fitness after initialization (entry 0) and after each generation
    pub history: Vec<f64>,
    pub generations_completed: usize,
    pub evaluations: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunReport {
    pub fn is_failed(&self) -> bool {
        self.state == TerminalState::Failed
    }

    pub fn best_fitness(&self) -> Option<f64> {
        self.best.as_ref().map(|b| b.record.fitness)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
