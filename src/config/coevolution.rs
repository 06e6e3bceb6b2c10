use super::traits::{ensure_unit_interval, ConfigSection};
use crate::error::CcfsError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoevolutionConfig {
    pub num_subpopulations: usize,
    pub decomposition_strategy: DecompositionStrategy,
    pub population_size: usize,
    /// Size of each subpopulation in order; overrides `population_size` when set
    pub subpopulation_sizes: Option<Vec<usize>>,
    pub max_generations: usize,
    pub crossover_rate: f64,
    pub mutation_rate: f64,
    /// Weight of the model score against the subset-size penalty
    pub alpha: f64,
    pub collaboration_strategy: CollaborationStrategy,
    /// Generations without improvement before the run stops (0 disables)
    pub patience: usize,
    pub epsilon: f64,
    pub random_seed: u64,

    pub tournament_size: usize,
    pub init_density: f64,
    pub elitism: usize,
    /// Extra attempts (with perturbed seeds) after an adapter failure
    pub max_retries: usize,
    pub empty_mask_score: f64,
    /// Collaborator sets drawn per individual by `RandomAverage`
    pub collaborator_samples: usize,
    /// Worker threads for an evaluation pass; 0 uses one per CPU
    pub workers: usize,
    pub cache_evaluations: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DecompositionStrategy {
    /// Random permutation followed by a contiguous split
    Random,
    /// Feature i goes to subcomponent i mod n
    RoundRobin,
    /// Greedy correlation clustering; needs a dataset
    Similarity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CollaborationStrategy {
    /// Current representative of every other subpopulation
    Best,
    /// One random member of every other subpopulation
    Random,
    /// Several random collaborator sets, fitness averaged
    RandomAverage,
}

impl Default for CoevolutionConfig {
    fn default() -> Self {
        Self {
            num_subpopulations: 4,
            decomposition_strategy: DecompositionStrategy::Random,
            population_size: 30,
            subpopulation_sizes: None,
            max_generations: 50,
            crossover_rate: 0.9,
            mutation_rate: 0.05,
            alpha: 0.95,
            collaboration_strategy: CollaborationStrategy::Best,
            patience: 10,
            epsilon: 1e-6,
            random_seed: 42,
            tournament_size: 2,
            init_density: 0.5,
            elitism: 1,
            max_retries: 1,
            empty_mask_score: 0.0,
            collaborator_samples: 2,
            workers: 0,
            cache_evaluations: false,
        }
    }
}

impl CoevolutionConfig {
    /// Population size of subpopulation `k`.
    pub fn population_size_of(&self, k: usize) -> usize {
        self.subpopulation_sizes
            .as_ref()
            .and_then(|sizes| sizes.get(k).copied())
            .unwrap_or(self.population_size)
    }

    fn smallest_population(&self) -> usize {
        match &self.subpopulation_sizes {
            Some(sizes) => sizes.iter().copied().min().unwrap_or(self.population_size),
            None => self.population_size,
        }
    }
}

impl ConfigSection for CoevolutionConfig {
    fn section_name() -> &'static str {
        "coevolution"
    }

    fn validate(&self) -> Result<(), CcfsError> {
        if self.num_subpopulations < 1 {
            return Err(CcfsError::Configuration(
                "At least one subpopulation is required".to_string(),
            ));
        }
        if self.population_size < 2 {
            return Err(CcfsError::Configuration(
                "Population size must be at least 2".to_string(),
            ));
        }
        if self.max_generations < 1 {
            return Err(CcfsError::Configuration(
                "Maximum number of generations must be at least 1".to_string(),
            ));
        }
        ensure_unit_interval("Crossover rate", self.crossover_rate)?;
        ensure_unit_interval("Mutation rate", self.mutation_rate)?;
        ensure_unit_interval("Alpha", self.alpha)?;
        ensure_unit_interval("Empty mask score", self.empty_mask_score)?;
        if !(self.init_density > 0.0 && self.init_density <= 1.0) {
            return Err(CcfsError::Configuration(format!(
                "Initialization density must be in (0, 1], got {}",
                self.init_density
            )));
        }
        if let Some(sizes) = &self.subpopulation_sizes {
            if sizes.len() != self.num_subpopulations {
                return Err(CcfsError::Configuration(format!(
                    "{} subpopulation sizes given for {} subpopulations",
                    sizes.len(),
                    self.num_subpopulations
                )));
            }
            if let Some(&size) = sizes.iter().find(|&&s| s < 2) {
                return Err(CcfsError::Configuration(format!(
                    "Subpopulation size must be at least 2, got {}",
                    size
                )));
            }
        }
        let smallest = self.smallest_population();
        if self.tournament_size < 1 || self.tournament_size > smallest {
            return Err(CcfsError::Configuration(format!(
                "Tournament size must be between 1 and the smallest population size ({}), got {}",
                smallest, self.tournament_size
            )));
        }
        if self.elitism < 1 || self.elitism >= smallest {
            return Err(CcfsError::Configuration(format!(
                "Elitism must be at least 1 and smaller than the smallest population size ({}), got {}",
                smallest, self.elitism
            )));
        }
        if !self.epsilon.is_finite() || self.epsilon < 0.0 {
            return Err(CcfsError::Configuration(format!(
                "Epsilon must be a non-negative finite number, got {}",
                self.epsilon
            )));
        }
        if self.collaborator_samples < 1 {
            return Err(CcfsError::Configuration(
                "At least one collaborator sample is required".to_string(),
            ));
        }
        Ok(())
    }
}
