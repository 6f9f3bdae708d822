use crate::algorithms::operators::{init_population, sel_best, sel_tournament, var_and};
use crate::error::Result;
use crate::{EvolutionConfig, Evaluator, Evolver, Individual};
use log::{debug, info};
use rand::Rng;
use rand::prelude::SeedableRng;
use rand_pcg::Pcg64; // Specific, serializable generator
use serde::{Deserialize, Serialize};
use std::io::{self, Write};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Fitness summary of one generation's evaluated offspring.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenerationStats {
    pub generation: usize,
    pub evaluations: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

impl GenerationStats {
    fn from_population(generation: usize, population: &[Individual]) -> Self {
        let fitnesses: Vec<f64> = population.iter().filter_map(|ind| ind.fitness).collect();
        let min = fitnesses.iter().copied().fold(f64::INFINITY, f64::min);
        let max = fitnesses.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mean = if fitnesses.is_empty() {
            f64::NAN
        } else {
            fitnesses.iter().sum::<f64>() / fitnesses.len() as f64
        };
        Self {
            generation,
            evaluations: fitnesses.len(),
            min,
            max,
            mean,
        }
    }
}

/// Score every individual in place and return how many were scored.
///
/// Assignment is positional, so the parallel build produces exactly the
/// same population as the sequential one.
pub fn evaluate_all<E: Evaluator>(population: &mut [Individual], evaluator: &E) -> usize {
    #[cfg(feature = "parallel")]
    population.par_iter_mut().for_each(|ind| {
        ind.fitness = Some(evaluator.evaluate(&ind.genes));
    });
    #[cfg(not(feature = "parallel"))]
    for ind in population.iter_mut() {
        ind.fitness = Some(evaluator.evaluate(&ind.genes));
    }
    population.len()
}

/// Writes the two-line run summary:
///
/// ```text
/// Best individual: [0.01, -0.2, 0.003]
/// Best fitness: 0.040109
/// ```
///
/// An unevaluated individual reports `NaN` fitness.
pub fn write_result<W: Write>(best: &Individual, mut writer: W) -> io::Result<()> {
    writeln!(writer, "Best individual: {:?}", best.genes)?;
    writeln!(writer, "Best fitness: {}", best.fitness.unwrap_or(f64::NAN))?;
    writer.flush()
}

/// Generational GA: variation, evaluation of all offspring, then tournament
/// selection of a same-sized next population. No elitism.
///
/// The whole engine, RNG included, is serializable, so a checkpointed run
/// resumes exactly where it stopped.
#[derive(Serialize, Deserialize)]
pub struct SimpleGA {
    population: Vec<Individual>,
    config: EvolutionConfig,
    seed: u64,
    generation: usize,
    history: Vec<GenerationStats>,
    rng: Pcg64,
}

impl SimpleGA {
    /// Validates `config` and draws the initial population.
    pub fn new(config: EvolutionConfig) -> Result<Self> {
        config.validate()?;
        let seed = config.seed.unwrap_or_else(|| rand::rng().random());
        info!("evolving with seed {seed}");

        let mut rng = Pcg64::seed_from_u64(seed);
        let population = init_population(
            config.population_size,
            config.gene_count,
            config.lower_bound,
            config.upper_bound,
            &mut rng,
        );

        Ok(Self {
            population,
            config,
            seed,
            generation: 0,
            history: Vec::new(),
            rng,
        })
    }

    /// Starts from a caller-supplied population. `config` is used as is.
    pub fn with_population(initial_pop: Vec<Individual>, config: EvolutionConfig, seed: u64) -> Self {
        Self {
            population: initial_pop,
            config,
            seed,
            generation: 0,
            history: Vec::new(),
            rng: Pcg64::seed_from_u64(seed),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn config(&self) -> &EvolutionConfig {
        &self.config
    }

    /// Number of completed generations.
    pub fn generation(&self) -> usize {
        self.generation
    }

    pub fn history(&self) -> &[GenerationStats] {
        &self.history
    }

    pub fn best(&self) -> Option<&Individual> {
        sel_best(&self.population)
    }

    /// Steps until `config.generations` generations have completed and
    /// returns the fittest member of the final population.
    pub fn run<E: Evaluator>(&mut self, evaluator: &E) -> Option<Individual> {
        for _ in self.generation..self.config.generations {
            self.step(evaluator);
        }
        // With zero generations nothing has been scored yet.
        if self.population.iter().any(|ind| !ind.is_evaluated()) {
            evaluate_all(&mut self.population, evaluator);
        }
        self.best().cloned()
    }
}

impl Evolver for SimpleGA {
    fn step<E: Evaluator>(&mut self, evaluator: &E) {
        if self.population.is_empty() {
            return;
        }

        let mut offspring = var_and(&self.population, &self.config, &mut self.rng);
        evaluate_all(&mut offspring, evaluator);

        self.generation += 1;
        let stats = GenerationStats::from_population(self.generation, &offspring);
        debug!(
            "gen {:>3} evals {:>4} min {:.6} mean {:.6} max {:.6}",
            stats.generation, stats.evaluations, stats.min, stats.mean, stats.max
        );
        self.history.push(stats);

        let k = offspring.len();
        self.population = sel_tournament(&offspring, k, self.config.tournament_size, &mut self.rng);
    }

    fn population(&self) -> &[Individual] {
        &self.population
    }
}
