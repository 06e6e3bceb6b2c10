use super::operators::{bit_flip_mutation, random_genes, tournament_selection, uniform_crossover};
use crate::config::CoevolutionConfig;
use crate::error::{CcfsError, Result};
use crate::types::{cmp_fitness, FitnessRecord, Individual, Subcomponent};
use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;

/// Parameters of the per-subpopulation genetic algorithm.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeneticOperators {
    pub tournament_size: usize,
    pub crossover_rate: f64,
    pub mutation_rate: f64,
    pub elitism: usize,
}

impl GeneticOperators {
    pub fn from_config(config: &CoevolutionConfig) -> Self {
        Self {
            tournament_size: config.tournament_size,
            crossover_rate: config.crossover_rate,
            mutation_rate: config.mutation_rate,
            elitism: config.elitism,
        }
    }
}

impl Default for GeneticOperators {
    fn default() -> Self {
        Self {
            tournament_size: 2,
            crossover_rate: 0.9,
            mutation_rate: 0.05,
            elitism: 1,
        }
    }
}

/// Random population of `size` individuals over `length` genes. All-zero
/// individuals are kept; the fitness evaluator handles empty subsets.
pub fn initialize_population<R: Rng>(
    size: usize,
    length: usize,
    init_density: f64,
    rng: &mut R,
) -> Vec<Individual> {
    (0..size)
        .map(|_| Individual::new(random_genes(length, init_density, rng)))
        .collect()
}

/// Produce the next generation from a fully evaluated population.
///
/// The `elitism` best individuals are copied unchanged; the rest are bred by
/// tournament selection, uniform crossover and bit-flip mutation. Offspring
/// carry no fitness record.
pub fn evolve_population<R: Rng>(
    population: &[Individual],
    operators: &GeneticOperators,
    rng: &mut R,
) -> Result<Vec<Individual>> {
    if population.is_empty() {
        return Err(CcfsError::State("Cannot evolve an empty population".to_string()));
    }
    if let Some(idx) = population.iter().position(|ind| ind.fitness.is_none()) {
        return Err(CcfsError::State(format!(
            "Individual {} has no fitness record; evaluate the population before evolving it",
            idx
        )));
    }

    let size = population.len();
    let mut ranked: Vec<usize> = (0..size).collect();
    ranked.sort_by(|&a, &b| {
        cmp_fitness(population[b].fitness_value(), population[a].fitness_value())
    });

    let mut next_generation: Vec<Individual> = ranked
        .iter()
        .take(operators.elitism.min(size))
        .map(|&i| Individual::new(population[i].genes.clone()))
        .collect();

    let tournament_size = operators.tournament_size.clamp(1, size);
    while next_generation.len() < size {
        let first = tournament_selection(population, tournament_size, rng);

        if rng.gen::<f64>() < operators.crossover_rate {
            let second = tournament_selection(population, tournament_size, rng);
            let (mut child1, mut child2) =
                uniform_crossover(&population[first].genes, &population[second].genes, rng);

            bit_flip_mutation(&mut child1, operators.mutation_rate, rng);
            bit_flip_mutation(&mut child2, operators.mutation_rate, rng);

            next_generation.push(Individual::new(child1));
            if next_generation.len() < size {
                next_generation.push(Individual::new(child2));
            }
        } else {
            // Reproduction (copy)
            let mut child = population[first].genes.clone();
            bit_flip_mutation(&mut child, operators.mutation_rate, rng);
            next_generation.push(Individual::new(child));
        }
    }

    Ok(next_generation)
}

/// One subcomponent's population together with its private random stream.
pub struct Subpopulation {
    id: usize,
    subcomponent: Subcomponent,
    individuals: Vec<Individual>,
    rng: StdRng,
}

impl Subpopulation {
    pub fn initialize(
        id: usize,
        subcomponent: Subcomponent,
        size: usize,
        init_density: f64,
        seed: u64,
    ) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let individuals = initialize_population(size, subcomponent.len(), init_density, &mut rng);
        Self {
            id,
            subcomponent,
            individuals,
            rng,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn subcomponent(&self) -> &Subcomponent {
        &self.subcomponent
    }

    pub fn individuals(&self) -> &[Individual] {
        &self.individuals
    }

    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    /// Attach one record per individual, in population order.
    pub fn assign_fitness(&mut self, records: &[FitnessRecord]) -> Result<()> {
        if records.len() != self.individuals.len() {
            return Err(CcfsError::State(format!(
                "Subpopulation {} received {} fitness records for {} individuals",
                self.id,
                records.len(),
                self.individuals.len()
            )));
        }
        for (individual, record) in self.individuals.iter_mut().zip(records) {
            individual.fitness = Some(*record);
        }
        Ok(())
    }

    /// Index of the best evaluated individual; earliest wins ties.
    pub fn best_index(&self) -> Option<usize> {
        self.individuals
            .iter()
            .enumerate()
            .filter(|(_, ind)| ind.fitness.is_some())
            .fold(None, |best: Option<(usize, f64)>, (i, ind)| match best {
                Some((_, f)) if cmp_fitness(ind.fitness_value(), f).is_le() => best,
                _ => Some((i, ind.fitness_value())),
            })
            .map(|(i, _)| i)
    }

    pub fn best(&self) -> Option<&Individual> {
        self.best_index().map(|i| &self.individuals[i])
    }

    /// True when every individual carries the same genes.
    pub fn is_converged(&self) -> bool {
        match self.individuals.split_first() {
            Some((first, rest)) => rest.iter().all(|ind| ind.genes == first.genes),
            None => true,
        }
    }

    pub fn evolve(&mut self, operators: &GeneticOperators) -> Result<()> {
        self.individuals = evolve_population(&self.individuals, operators, &mut self.rng)?;
        Ok(())
    }
}
