use super::subpopulation::Subpopulation;
use crate::config::CollaborationStrategy;
use crate::error::{CcfsError, Result};
use crate::types::{cmp_fitness, FitnessRecord, FullMask, Subcomponent};
use rand::Rng;

/// Genes each subpopulation currently exposes to the others.
///
/// Written once per subpopulation per generation (after its own evaluation
/// pass) and read by every later pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Representatives {
    members: Vec<Vec<bool>>,
}

impl Representatives {
    pub fn new(members: Vec<Vec<bool>>) -> Self {
        Self { members }
    }

    pub fn get(&self, subpop: usize) -> &[bool] {
        &self.members[subpop]
    }

    pub fn set(&mut self, subpop: usize, genes: Vec<bool>) {
        self.members[subpop] = genes;
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Assembles full-length masks from per-subcomponent genes.
#[derive(Debug, Clone)]
pub struct ContextBuilder {
    subcomponents: Vec<Subcomponent>,
    total_features: usize,
}

impl ContextBuilder {
    /// Fails unless `subcomponents` partition `[0, total_features)`.
    pub fn new(subcomponents: Vec<Subcomponent>, total_features: usize) -> Result<Self> {
        let mut seen = vec![false; total_features];
        for (k, sub) in subcomponents.iter().enumerate() {
            for &f in &sub.indices {
                if f >= total_features {
                    return Err(CcfsError::Configuration(format!(
                        "Subcomponent {} holds feature {} outside 0..{}",
                        k, f, total_features
                    )));
                }
                if seen[f] {
                    return Err(CcfsError::Configuration(format!(
                        "Feature {} assigned to more than one subcomponent",
                        f
                    )));
                }
                seen[f] = true;
            }
        }
        if let Some(missing) = seen.iter().position(|&s| !s) {
            return Err(CcfsError::Configuration(format!(
                "Feature {} is not assigned to any subcomponent",
                missing
            )));
        }
        Ok(Self {
            subcomponents,
            total_features,
        })
    }

    pub fn subcomponents(&self) -> &[Subcomponent] {
        &self.subcomponents
    }

    pub fn total_features(&self) -> usize {
        self.total_features
    }

    /// Place `candidate` at the active subcomponent's positions and every other
    /// collaborator's genes at theirs. Gene vectors must match their
    /// subcomponent's length.
    pub fn build_mask(
        &self,
        active: usize,
        candidate: &[bool],
        collaborators: &Representatives,
    ) -> Result<FullMask> {
        if collaborators.len() != self.subcomponents.len() {
            return Err(CcfsError::State(format!(
                "{} collaborators for {} subcomponents",
                collaborators.len(),
                self.subcomponents.len()
            )));
        }
        let mut mask = FullMask::empty(self.total_features);
        for (k, sub) in self.subcomponents.iter().enumerate() {
            let genes = if k == active {
                candidate
            } else {
                collaborators.get(k)
            };
            if genes.len() != sub.len() {
                return Err(CcfsError::State(format!(
                    "Subcomponent {} has {} features but received {} genes",
                    k,
                    sub.len(),
                    genes.len()
                )));
            }
            for (&feature, &bit) in sub.indices.iter().zip(genes) {
                mask.bits[feature] = bit;
            }
        }
        Ok(mask)
    }

    /// Mask made purely of the representatives.
    pub fn representative_mask(&self, representatives: &Representatives) -> Result<FullMask> {
        match self.subcomponents.len() {
            0 => Ok(FullMask::empty(self.total_features)),
            _ => self.build_mask(0, representatives.get(0), representatives),
        }
    }
}

/// Chooses the collaborator sets an individual is evaluated with. The
/// strategy is fixed for a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollaboratorSelector {
    pub strategy: CollaborationStrategy,
    pub samples: usize,
}

impl CollaboratorSelector {
    pub fn new(strategy: CollaborationStrategy, samples: usize) -> Self {
        Self {
            strategy,
            samples: samples.max(1),
        }
    }

    /// Collaborator tables for one individual of subpopulation `active`.
    /// The active slot is left as the representative; `build_mask` overrides it.
    pub fn select<R: Rng>(
        &self,
        active: usize,
        subpops: &[Subpopulation],
        representatives: &Representatives,
        rng: &mut R,
    ) -> Vec<Representatives> {
        match self.strategy {
            CollaborationStrategy::Best => vec![representatives.clone()],
            CollaborationStrategy::Random => {
                vec![random_collaborators(active, subpops, representatives, rng)]
            }
            CollaborationStrategy::RandomAverage => (0..self.samples)
                .map(|_| random_collaborators(active, subpops, representatives, rng))
                .collect(),
        }
    }
}

fn random_collaborators<R: Rng>(
    active: usize,
    subpops: &[Subpopulation],
    representatives: &Representatives,
    rng: &mut R,
) -> Representatives {
    let mut table = representatives.clone();
    for (k, subpop) in subpops.iter().enumerate() {
        if k == active || subpop.is_empty() {
            continue;
        }
        let pick = rng.gen_range(0..subpop.len());
        table.set(k, subpop.individuals()[pick].genes.clone());
    }
    table
}

/// Fold the records of one individual's collaboration trials into a single
/// record. Failed trials are ignored unless all of them failed. Score and
/// fitness are averaged; `selected` is taken from the best trial, whose index
/// is returned alongside.
pub fn aggregate_trials(trials: &[FitnessRecord]) -> Option<(FitnessRecord, usize)> {
    let best = trials
        .iter()
        .enumerate()
        .max_by(|(i, a), (j, b)| cmp_fitness(a.fitness, b.fitness).then(j.cmp(i)))
        .map(|(i, _)| i)?;

    if trials.len() == 1 {
        return Some((trials[0], 0));
    }

    let ok: Vec<&FitnessRecord> = trials.iter().filter(|t| !t.failed).collect();
    if ok.is_empty() {
        return Some((trials[best], best));
    }

    let n = ok.len() as f64;
    let record = FitnessRecord {
        selected: trials[best].selected,
        score: ok.iter().map(|t| t.score).sum::<f64>() / n,
        fitness: ok.iter().map(|t| t.fitness).sum::<f64>() / n,
        failed: false,
    };
    Some((record, best))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(fitness: f64, failed: bool) -> FitnessRecord {
        FitnessRecord {
            selected: 1,
            score: fitness,
            fitness,
            failed,
        }
    }

    #[test]
    fn test_build_mask_places_genes() {
        let builder = ContextBuilder::new(
            vec![Subcomponent::new(vec![0, 2]), Subcomponent::new(vec![1, 3])],
            4,
        )
        .unwrap();
        let reps = Representatives::new(vec![vec![false, false], vec![true, false]]);
        let mask = builder.build_mask(0, &[true, true], &reps).unwrap();
        assert_eq!(mask.bits, vec![true, true, true, false]);
    }

    #[test]
    fn test_build_mask_rejects_wrong_gene_length() {
        let builder = ContextBuilder::new(
            vec![Subcomponent::new(vec![0, 2]), Subcomponent::new(vec![1, 3])],
            4,
        )
        .unwrap();
        let reps = Representatives::new(vec![vec![false, false], vec![true]]);
        let err = builder.build_mask(0, &[true, true], &reps).unwrap_err();
        assert!(matches!(err, CcfsError::State(_)));

        let reps = Representatives::new(vec![vec![false, false], vec![true, true]]);
        assert!(builder.build_mask(1, &[true, false, true], &reps).is_err());
        assert!(builder.representative_mask(&reps).is_ok());
    }

    #[test]
    fn test_context_builder_rejects_overlap() {
        let result = ContextBuilder::new(
            vec![Subcomponent::new(vec![0, 1]), Subcomponent::new(vec![1])],
            2,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_aggregate_ignores_failed_trials() {
        let trials = [record(0.4, false), record(f64::MIN, true), record(0.8, false)];
        let (combined, best) = aggregate_trials(&trials).unwrap();
        assert_eq!(best, 2);
        assert!((combined.fitness - 0.6).abs() < 1e-12);
        assert!(!combined.failed);
    }

    #[test]
    fn test_aggregate_takes_selected_from_best_trial() {
        let mut small = record(0.3, false);
        small.selected = 2;
        let mut large = record(0.9, false);
        large.selected = 7;
        let (combined, best) = aggregate_trials(&[small, large]).unwrap();
        assert_eq!(best, 1);
        assert_eq!(combined.selected, 7);
        assert!((combined.score - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_aggregate_all_failed() {
        let trials = [record(f64::MIN, true), record(f64::MIN, true)];
        let (combined, _) = aggregate_trials(&trials).unwrap();
        assert!(combined.failed);
    }
}
