//! Variation and selection operators over real-valued [`Individual`]s.
//!
//! All operators are free functions that take the RNG explicitly, so the
//! engine stays reproducible from a single seed.

use crate::{EvolutionConfig, Individual};
use rand::Rng;
use rand::prelude::IndexedRandom;
use rand_distr::StandardNormal;
use std::cmp::Ordering;

/// Order two individuals for minimisation.
/// `Less` means `a` is fitter. Unevaluated and NaN fitness rank last.
pub fn cmp_fitness(a: &Individual, b: &Individual) -> Ordering {
    let key = |ind: &Individual| ind.fitness.filter(|f| !f.is_nan());
    match (key(a), key(b)) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// `size` unevaluated individuals with genes drawn uniformly from `[lower, upper]`.
pub fn init_population<R: Rng + ?Sized>(
    size: usize,
    gene_count: usize,
    lower: f64,
    upper: f64,
    rng: &mut R,
) -> Vec<Individual> {
    (0..size)
        .map(|_| {
            Individual::new(
                (0..gene_count)
                    .map(|_| rng.random_range(lower..=upper))
                    .collect(),
            )
        })
        .collect()
}

/// Blend crossover (BLX-α), in place.
///
/// For each gene pair a factor `gamma` is drawn from `[-alpha, 1 + alpha)`
/// and the children become `(1 - gamma) * a + gamma * b` and
/// `gamma * a + (1 - gamma) * b`. With `alpha = 0` both children stay inside
/// the parents' interval. Both fitnesses are invalidated.
pub fn cx_blend<R: Rng + ?Sized>(a: &mut Individual, b: &mut Individual, alpha: f64, rng: &mut R) {
    for (x, y) in a.genes.iter_mut().zip(b.genes.iter_mut()) {
        let gamma = (1.0 + 2.0 * alpha) * rng.random::<f64>() - alpha;
        let (x0, y0) = (*x, *y);
        *x = (1.0 - gamma) * x0 + gamma * y0;
        *y = gamma * x0 + (1.0 - gamma) * y0;
    }
    a.invalidate();
    b.invalidate();
}

/// Gaussian mutation, in place.
///
/// Each gene independently, with probability `indpb`, gets `N(mu, sigma)`
/// added. Returns whether any gene changed; the fitness is only invalidated
/// in that case.
pub fn mut_gaussian<R: Rng + ?Sized>(
    ind: &mut Individual,
    mu: f64,
    sigma: f64,
    indpb: f64,
    rng: &mut R,
) -> bool {
    let mut changed = false;
    for gene in &mut ind.genes {
        if rng.random::<f64>() < indpb {
            let z: f64 = rng.sample(StandardNormal);
            *gene += mu + sigma * z;
            changed = true;
        }
    }
    if changed {
        ind.invalidate();
    }
    changed
}

/// Tournament selection.
///
/// Runs `k` tournaments. Each one samples `tournament_size` distinct members
/// (clamped to the population size) and keeps a copy of the fittest. An
/// individual may win any number of tournaments.
pub fn sel_tournament<R: Rng + ?Sized>(
    population: &[Individual],
    k: usize,
    tournament_size: usize,
    rng: &mut R,
) -> Vec<Individual> {
    let size = tournament_size.clamp(1, population.len().max(1));
    (0..k)
        .filter_map(|_| {
            population
                .choose_multiple(rng, size)
                .min_by(|a, b| cmp_fitness(a, b))
                .cloned()
        })
        .collect()
}

/// The fittest individual, first one wins ties.
pub fn sel_best(population: &[Individual]) -> Option<&Individual> {
    population.iter().min_by(|a, b| cmp_fitness(a, b))
}

/// Crossover then mutation on a copy of `population`.
///
/// Consecutive pairs `(0, 1), (2, 3), ...` are blended with probability
/// `crossover_prob`; an odd trailing individual is never mated. Every
/// offspring is then mutated with probability `mutation_prob`. The input is
/// left untouched.
pub fn var_and<R: Rng + ?Sized>(
    population: &[Individual],
    config: &EvolutionConfig,
    rng: &mut R,
) -> Vec<Individual> {
    let mut offspring = population.to_vec();

    for pair in offspring.chunks_exact_mut(2) {
        if rng.random::<f64>() < config.crossover_prob {
            let (left, right) = pair.split_at_mut(1);
            cx_blend(&mut left[0], &mut right[0], config.blend_alpha, rng);
        }
    }

    for ind in &mut offspring {
        if rng.random::<f64>() < config.mutation_prob {
            mut_gaussian(
                ind,
                config.mutation_mu,
                config.mutation_sigma,
                config.mutation_indpb,
                rng,
            );
        }
    }

    offspring
}
