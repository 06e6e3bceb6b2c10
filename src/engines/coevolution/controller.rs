use super::collaboration::{aggregate_trials, CollaboratorSelector, ContextBuilder, Representatives};
use super::progress::{LogProgressCallback, ProgressCallback};
use super::report::{RunFailure, RunPhase, RunReport, TerminalState};
use super::subpopulation::{GeneticOperators, Subpopulation};
use crate::config::{CoevolutionConfig, ConfigSection};
use crate::data::Dataset;
use crate::engines::decomposition::decompose;
use crate::engines::evaluation::{FitnessEvaluator, ModelAdapter};
use crate::error::{CcfsError, Result};
use crate::types::{FitnessRecord, FullMask, GlobalBest, WORST_FITNESS};
use chrono::Utc;
use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use rayon::prelude::*;
use rayon::ThreadPool;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Lifecycle of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Uninitialized,
    Initializing,
    Evolving,
    Terminated(TerminalState),
}

/// Mixes a base seed with two stream coordinates (splitmix64 finalizer).
fn derive_seed(seed: u64, a: u64, b: u64) -> u64 {
    let mut z = seed
        .wrapping_add(a.wrapping_mul(0x9E37_79B9_7F4A_7C15))
        .wrapping_add(b.wrapping_mul(0xD1B5_4A32_D192_ED03));
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

const INIT_STREAM: u64 = 1;
const COLLABORATION_STREAM: u64 = 2;
const EVALUATION_STREAM: u64 = 3;
const GLOBAL_STREAM: u64 = 4;

/// State owned by a single run; dropped when the run terminates.
struct Run {
    builder: ContextBuilder,
    subpops: Vec<Subpopulation>,
    representatives: Representatives,
    rng: StdRng,
    pool: ThreadPool,
    cache: Option<HashMap<FullMask, FitnessRecord>>,
    /// Best context of each pass since the last global-best update
    pass_bests: Vec<(FullMask, FitnessRecord)>,
    global_best: Option<GlobalBest>,
    history: Vec<f64>,
    evaluations: usize,
}

impl Run {
    fn best_fitness(&self) -> f64 {
        self.global_best
            .as_ref()
            .map(|b| b.record.fitness)
            .unwrap_or(WORST_FITNESS)
    }
}

/// One scoring job of an evaluation pass.
struct EvalJob {
    mask: FullMask,
    seed: u64,
}

/// Drives cooperative coevolution: decomposition, round-robin evaluation and
/// evolution of every subpopulation, global-best tracking and stopping.
pub struct CoevolutionController<D: Dataset, M: ModelAdapter> {
    config: CoevolutionConfig,
    dataset: D,
    model: M,
    evaluator: FitnessEvaluator,
    operators: GeneticOperators,
    selector: CollaboratorSelector,
    state: RunState,
    cancel: Arc<AtomicBool>,
}

impl<D: Dataset, M: ModelAdapter> CoevolutionController<D, M> {
    pub fn new(config: CoevolutionConfig, dataset: D, model: M) -> Self {
        let evaluator = FitnessEvaluator::from_config(&config);
        let operators = GeneticOperators::from_config(&config);
        let selector =
            CollaboratorSelector::new(config.collaboration_strategy, config.collaborator_samples);
        Self {
            config,
            dataset,
            model,
            evaluator,
            operators,
            selector,
            state: RunState::Uninitialized,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn config(&self) -> &CoevolutionConfig {
        &self.config
    }

    pub fn dataset(&self) -> &D {
        &self.dataset
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Flag checked at every generation boundary; setting it stops the run
    /// with `TerminalState::Cancelled` once the current generation is done.
    ///
    /// The controller never clears the flag. Later runs on the same controller
    /// stop right after initialization until the caller stores `false` again.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    pub fn run(&mut self) -> RunReport {
        self.run_with_callback(&mut LogProgressCallback)
    }

    /// Execute a full run. Every call starts from scratch with the configured
    /// seed, so repeated calls with a deterministic model give identical reports.
    pub fn run_with_callback<C: ProgressCallback>(&mut self, callback: &mut C) -> RunReport {
        let started_at = Utc::now();
        self.state = RunState::Initializing;
        log::info!(
            "Initializing cooperative coevolution: {} subpopulations, sizes {:?}",
            self.config.num_subpopulations,
            (0..self.config.num_subpopulations)
                .map(|k| self.config.population_size_of(k))
                .collect::<Vec<_>>()
        );

        let mut run = match self.initialize(callback) {
            Ok(run) => run,
            Err(e) => {
                log::error!("Initialization failed: {}", e);
                self.state = RunState::Terminated(TerminalState::Failed);
                return RunReport {
                    state: TerminalState::Failed,
                    failure: Some(RunFailure::new(RunPhase::Initializing, &e)),
                    best: None,
                    selected_features: Vec::new(),
                    history: Vec::new(),
                    generations_completed: 0,
                    evaluations: 0,
                    started_at,
                    finished_at: Utc::now(),
                };
            }
        };

        self.state = RunState::Evolving;
        let mut failure = None;
        let mut last_improvement = run.best_fitness();
        let mut stale = 0usize;

        let terminal = loop {
            let generation = run.history.len();

            if self.cancel.load(Ordering::SeqCst) {
                log::info!("Run cancelled before generation {}", generation);
                break TerminalState::Cancelled;
            }

            callback.on_generation_start(generation);
            if let Err(e) = self.run_generation(&mut run, generation, callback) {
                log::error!("Generation {} failed: {}", generation, e);
                failure = Some(RunFailure::new(RunPhase::Evolving, &e));
                break TerminalState::Failed;
            }

            let best = run.best_fitness();
            run.history.push(best);
            callback.on_generation_complete(generation, best, run.evaluations);

            if best > last_improvement + self.config.epsilon {
                last_improvement = best;
                stale = 0;
            } else {
                stale += 1;
            }

            if let Some(state) = self.stopping_criterion(&run, generation, stale) {
                break state;
            }
        };

        self.state = RunState::Terminated(terminal);
        let generations_completed = run.history.len().saturating_sub(1);
        log::info!(
            "Run finished ({:?}) after {} generations, best fitness {:.4}",
            terminal,
            generations_completed,
            run.best_fitness()
        );

        let selected_features = run
            .global_best
            .as_ref()
            .map(|b| b.mask.selected_indices())
            .unwrap_or_default();

        RunReport {
            state: terminal,
            failure,
            best: run.global_best,
            selected_features,
            history: run.history,
            generations_completed,
            evaluations: run.evaluations,
            started_at,
            finished_at: Utc::now(),
        }
    }

    fn stopping_criterion(&self, run: &Run, generation: usize, stale: usize) -> Option<TerminalState> {
        if run.subpops.iter().all(|s| s.is_converged()) {
            log::info!("All populations converged at generation {}", generation);
            return Some(TerminalState::Converged);
        }
        if self.config.patience > 0 && stale >= self.config.patience {
            log::info!(
                "No improvement above {} for {} generations",
                self.config.epsilon,
                stale
            );
            return Some(TerminalState::Stagnated);
        }
        if generation >= self.config.max_generations {
            return Some(TerminalState::MaxGenerationsReached);
        }
        None
    }

    fn initialize<C: ProgressCallback>(&self, callback: &mut C) -> Result<Run> {
        self.config.validate()?;

        let total_features = self.dataset.n_features();
        if total_features == 0 {
            return Err(CcfsError::Configuration("Dataset has no features".to_string()));
        }
        if self.dataset.labels().len() != self.dataset.n_samples() {
            return Err(CcfsError::Configuration(format!(
                "Dataset has {} labels for {} samples",
                self.dataset.labels().len(),
                self.dataset.n_samples()
            )));
        }

        let seed = self.config.random_seed;
        let subcomponents = decompose(
            total_features,
            self.config.num_subpopulations,
            self.config.decomposition_strategy,
            seed,
            Some(&self.dataset as &dyn Dataset),
        )?;
        let builder = ContextBuilder::new(subcomponents.clone(), total_features)?;

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.workers)
            .build()
            .map_err(|e| CcfsError::Configuration(format!("Failed to build worker pool: {}", e)))?;

        let subpops: Vec<Subpopulation> = subcomponents
            .into_iter()
            .enumerate()
            .map(|(k, sub)| {
                Subpopulation::initialize(
                    k,
                    sub,
                    self.config.population_size_of(k),
                    self.config.init_density,
                    derive_seed(seed, INIT_STREAM, k as u64),
                )
            })
            .collect();

        // No representative exists yet: start from a random member of each subpopulation.
        let mut rng = StdRng::seed_from_u64(derive_seed(seed, COLLABORATION_STREAM, 0));
        let representatives = Representatives::new(
            subpops
                .iter()
                .map(|s| s.individuals()[rng.gen_range(0..s.len())].genes.clone())
                .collect(),
        );

        let mut run = Run {
            builder,
            subpops,
            representatives,
            rng,
            pool,
            cache: self.config.cache_evaluations.then(HashMap::new),
            pass_bests: Vec::new(),
            global_best: None,
            history: Vec::new(),
            evaluations: 0,
        };

        for k in 0..run.subpops.len() {
            self.evaluation_pass(&mut run, k, 0, callback)?;
        }
        self.update_global_best(&mut run, 0)?;
        run.history.push(run.best_fitness());

        log::info!(
            "Initialization complete. Global best fitness: {:.4}",
            run.best_fitness()
        );
        Ok(run)
    }

    /// One generation: strictly sequential round-robin over subpopulations,
    /// each evaluated (in parallel internally) and then evolved.
    fn run_generation<C: ProgressCallback>(
        &self,
        run: &mut Run,
        generation: usize,
        callback: &mut C,
    ) -> Result<()> {
        for k in 0..run.subpops.len() {
            self.evaluation_pass(run, k, generation, callback)?;
            run.subpops[k].evolve(&self.operators)?;
        }
        self.update_global_best(run, generation)
    }

    /// Evaluate every individual of subpopulation `k` in its collaboration
    /// context, attach the records and publish the new representative. Returns
    /// only after every individual has a record.
    fn evaluation_pass<C: ProgressCallback>(
        &self,
        run: &mut Run,
        k: usize,
        generation: usize,
        callback: &mut C,
    ) -> Result<()> {
        let pass_seed = derive_seed(
            derive_seed(self.config.random_seed, EVALUATION_STREAM, generation as u64),
            k as u64,
            0,
        );
        let population_len = run.subpops[k].len();

        // Collaborator draws stay on the controlling thread so the random
        // stream does not depend on worker scheduling.
        let mut jobs = Vec::new();
        let mut trials_per_individual = Vec::with_capacity(population_len);
        for i in 0..population_len {
            let tables = self
                .selector
                .select(k, &run.subpops, &run.representatives, &mut run.rng);
            trials_per_individual.push(tables.len());
            let candidate = &run.subpops[k].individuals()[i].genes;
            for (t, table) in tables.iter().enumerate() {
                jobs.push(EvalJob {
                    mask: run.builder.build_mask(k, candidate, table)?,
                    seed: derive_seed(pass_seed, i as u64, t as u64),
                });
            }
        }

        let cached: Vec<Option<FitnessRecord>> = jobs
            .iter()
            .map(|job| run.cache.as_ref().and_then(|c| c.get(&job.mask).copied()))
            .collect();

        let evaluator = &self.evaluator;
        let dataset = &self.dataset;
        let model = &self.model;
        let records: Vec<FitnessRecord> = run.pool.install(|| {
            jobs.par_iter()
                .zip(cached.par_iter())
                .map(|(job, hit)| match hit {
                    Some(record) => Ok(*record),
                    None => evaluator.evaluate_with_retry(&job.mask, dataset, model, job.seed),
                })
                .collect::<Result<Vec<_>>>()
        })?;

        run.evaluations += cached.iter().filter(|c| c.is_none()).count();
        if let Some(cache) = run.cache.as_mut() {
            for (job, record) in jobs.iter().zip(&records) {
                if !record.failed {
                    cache.entry(job.mask.clone()).or_insert(*record);
                }
            }
        }

        let mut individual_records = Vec::with_capacity(population_len);
        let mut best_trials = Vec::with_capacity(population_len);
        let mut offset = 0;
        for &n in &trials_per_individual {
            let trials = &records[offset..offset + n];
            let (record, best) = aggregate_trials(trials).ok_or_else(|| {
                CcfsError::State("Individual evaluated without any collaborator".to_string())
            })?;
            individual_records.push(record);
            best_trials.push(offset + best);
            offset += n;
        }

        if individual_records.iter().all(|r| r.failed) {
            return Err(CcfsError::Evaluation(format!(
                "Every individual of subpopulation {} failed evaluation in generation {}",
                k, generation
            )));
        }
        let failures = individual_records.iter().filter(|r| r.failed).count();
        if failures > 0 {
            log::warn!(
                "Subpopulation {} generation {}: {} individuals scored as worst after failed retries",
                k,
                generation,
                failures
            );
        }

        let subpop = &mut run.subpops[k];
        subpop.assign_fitness(&individual_records)?;
        let best = subpop
            .best_index()
            .ok_or_else(|| CcfsError::State(format!("Subpopulation {} has no best individual", k)))?;
        run.representatives.set(k, subpop.individuals()[best].genes.clone());

        let best_job = best_trials[best];
        run.pass_bests.push((jobs[best_job].mask.clone(), records[best_job]));

        callback.on_subpopulation_evaluated(generation, k, individual_records[best].fitness);
        Ok(())
    }

    /// Re-evaluate the mask made of all representatives and keep the best of
    /// it and the pass bests if it beats the current global best.
    fn update_global_best(&self, run: &mut Run, generation: usize) -> Result<()> {
        let mask = run.builder.representative_mask(&run.representatives)?;
        let record = match run.cache.as_ref().and_then(|c| c.get(&mask).copied()) {
            Some(record) => record,
            None => {
                run.evaluations += 1;
                self.evaluator.evaluate_with_retry(
                    &mask,
                    &self.dataset,
                    &self.model,
                    derive_seed(self.config.random_seed, GLOBAL_STREAM, generation as u64),
                )?
            }
        };

        let mut candidates = std::mem::take(&mut run.pass_bests);
        candidates.push((mask, record));

        for (mask, record) in candidates {
            if record.failed {
                continue;
            }
            let improves = run
                .global_best
                .as_ref()
                .map_or(true, |best| record.fitness > best.record.fitness);
            if improves {
                run.global_best = Some(GlobalBest {
                    mask,
                    record,
                    generation,
                });
            }
        }
        Ok(())
    }
}
