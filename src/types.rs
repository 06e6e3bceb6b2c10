use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Fitness assigned to candidates whose evaluation could not be completed.
/// Lies below every value the penalised objective can produce (its floor is -1).
pub const WORST_FITNESS: f64 = f64::MIN;

/// Fitness of a mask that selects no features. Ranks below every scored subset
/// (the penalised objective bottoms out at -1) but above failed evaluations.
pub const EMPTY_MASK_FITNESS: f64 = -1.0 - f64::EPSILON;

/// Ordered feature positions owned by one subpopulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subcomponent {
    pub indices: Vec<usize>,
}

impl Subcomponent {
    pub fn new(indices: Vec<usize>) -> Self {
        Self { indices }
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Outcome of scoring one full mask.
///
/// Under random-average collaboration an individual's record is an aggregate:
/// `score` and `fitness` are means over its successful trials while `selected`
/// is that of its best trial, so `fitness` need not equal the penalised
/// objective of `score` and `selected`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitnessRecord {
    /// Number of selected features in the evaluated full mask
    pub selected: usize,
    /// Raw validation score reported by the model adapter, in [0, 1]
    pub score: f64,
    /// Penalised scalar that drives selection
    pub fitness: f64,
    /// True when the adapter failed on every attempt and the record is a sentinel
    pub failed: bool,
}

impl FitnessRecord {
    pub fn worst(selected: usize) -> Self {
        Self {
            selected,
            score: 0.0,
            fitness: WORST_FITNESS,
            failed: true,
        }
    }
}

/// Candidate partial selection over one subcomponent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Individual {
    pub genes: Vec<bool>,
    pub fitness: Option<FitnessRecord>,
}

impl Individual {
    pub fn new(genes: Vec<bool>) -> Self {
        Self {
            genes,
            fitness: None,
        }
    }

    pub fn len(&self) -> usize {
        self.genes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    pub fn selected_count(&self) -> usize {
        self.genes.iter().filter(|&&g| g).count()
    }

    /// Fitness value used for ranking; unevaluated individuals rank last.
    pub fn fitness_value(&self) -> f64 {
        self.fitness.map(|f| f.fitness).unwrap_or(WORST_FITNESS)
    }
}

/// Complete feature-selection mask over all features.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FullMask {
    pub bits: Vec<bool>,
}

impl FullMask {
    pub fn empty(total_features: usize) -> Self {
        Self {
            bits: vec![false; total_features],
        }
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn selected_count(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }

    pub fn selected_indices(&self) -> Vec<usize> {
        self.bits
            .iter()
            .enumerate()
            .filter_map(|(i, &b)| b.then_some(i))
            .collect()
    }
}

/// Best full mask observed over a whole run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalBest {
    pub mask: FullMask,
    pub record: FitnessRecord,
    /// Generation in which this mask was found (0 = initialization pass)
    pub generation: usize,
}

/// Total order on fitness values; NaN sorts below everything.
pub fn cmp_fitness(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}
