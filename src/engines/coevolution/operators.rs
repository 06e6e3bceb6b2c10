use crate::types::{cmp_fitness, Individual};
use rand::Rng;

/// Tournament selection: index of the best of K random candidates
pub fn tournament_selection<R: Rng>(
    population: &[Individual],
    tournament_size: usize,
    rng: &mut R,
) -> usize {
    let mut best_idx = rng.gen_range(0..population.len());
    let mut best_fitness = population[best_idx].fitness_value();

    for _ in 1..tournament_size {
        let idx = rng.gen_range(0..population.len());
        let fitness = population[idx].fitness_value();
        if cmp_fitness(fitness, best_fitness).is_gt() {
            best_idx = idx;
            best_fitness = fitness;
        }
    }

    best_idx
}

/// Uniform crossover: each gene comes from either parent with probability 0.5
pub fn uniform_crossover<R: Rng>(
    parent1: &[bool],
    parent2: &[bool],
    rng: &mut R,
) -> (Vec<bool>, Vec<bool>) {
    let mut child1 = parent1.to_vec();
    let mut child2 = parent2.to_vec();

    for i in 0..parent1.len().min(parent2.len()) {
        if rng.gen_bool(0.5) {
            child1[i] = parent2[i];
            child2[i] = parent1[i];
        }
    }

    (child1, child2)
}

/// Bit-flip mutation: each gene flips independently with `mutation_rate`
pub fn bit_flip_mutation<R: Rng>(genes: &mut [bool], mutation_rate: f64, rng: &mut R) {
    for gene in genes.iter_mut() {
        if rng.gen::<f64>() < mutation_rate {
            *gene = !*gene;
        }
    }
}

/// Generate random genes, each set with probability `density`
pub fn random_genes<R: Rng>(length: usize, density: f64, rng: &mut R) -> Vec<bool> {
    (0..length).map(|_| rng.gen::<f64>() < density).collect()
}
