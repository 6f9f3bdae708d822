//! Run configuration, loadable from TOML.
//!
//! Every field carries a serde default, so a file only needs to name the
//! values it changes:
//!
//! ```toml
//! [evolution]
//! population_size = 200
//! seed = 7
//!
//! [counter]
//! malformed = "fail"
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Parameters of the generational loop and its operators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionConfig {
    pub population_size: usize,
    pub gene_count: usize,
    pub lower_bound: f64,
    pub upper_bound: f64,
    /// Probability that a consecutive pair is mated.
    pub crossover_prob: f64,
    /// How far past the parents' interval a blended gene may land.
    pub blend_alpha: f64,
    /// Probability that an offspring is mutated at all.
    pub mutation_prob: f64,
    pub mutation_mu: f64,
    pub mutation_sigma: f64,
    /// Per-gene mutation probability once an offspring is picked.
    pub mutation_indpb: f64,
    pub tournament_size: usize,
    pub generations: usize,
    /// Drawn from OS entropy when absent.
    pub seed: Option<u64>,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            population_size: 50,
            gene_count: 3,
            lower_bound: -5.0,
            upper_bound: 5.0,
            crossover_prob: 0.5,
            blend_alpha: 0.5,
            mutation_prob: 0.1,
            mutation_mu: 0.0,
            mutation_sigma: 1.0,
            mutation_indpb: 0.2,
            tournament_size: 3,
            generations: 20,
            seed: None,
        }
    }
}

fn check_probability(name: &str, value: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(Error::Configuration(format!(
            "{name} must be between 0 and 1, got {value}"
        )));
    }
    Ok(())
}

impl EvolutionConfig {
    pub fn validate(&self) -> Result<()> {
        if self.population_size == 0 {
            return Err(Error::Configuration(
                "Population size must be at least 1".to_string(),
            ));
        }
        if self.gene_count == 0 {
            return Err(Error::Configuration(
                "Gene count must be at least 1".to_string(),
            ));
        }
        if !self.lower_bound.is_finite() || !self.upper_bound.is_finite() {
            return Err(Error::Configuration(
                "Gene bounds must be finite".to_string(),
            ));
        }
        if self.lower_bound > self.upper_bound {
            return Err(Error::Configuration(format!(
                "Lower bound {} exceeds upper bound {}",
                self.lower_bound, self.upper_bound
            )));
        }
        // Uniform sampling needs the width itself to be representable.
        if !(self.upper_bound - self.lower_bound).is_finite() {
            return Err(Error::Configuration(format!(
                "Gene bounds [{}, {}] span a range too wide to sample",
                self.lower_bound, self.upper_bound
            )));
        }
        check_probability("Crossover probability", self.crossover_prob)?;
        check_probability("Mutation probability", self.mutation_prob)?;
        check_probability("Per-gene mutation probability", self.mutation_indpb)?;
        if !self.blend_alpha.is_finite() || self.blend_alpha < 0.0 {
            return Err(Error::Configuration(
                "Blend alpha must be a non-negative finite number".to_string(),
            ));
        }
        if !self.mutation_mu.is_finite() {
            return Err(Error::Configuration(
                "Mutation mean must be finite".to_string(),
            ));
        }
        if !self.mutation_sigma.is_finite() || self.mutation_sigma < 0.0 {
            return Err(Error::Configuration(
                "Mutation sigma must be a non-negative finite number".to_string(),
            ));
        }
        if self.tournament_size == 0 {
            return Err(Error::Configuration(
                "Tournament size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Applies command-line values on top of file values. `None` keeps the file value.
    pub fn with_overrides(
        mut self,
        seed: Option<u64>,
        generations: Option<usize>,
        population_size: Option<usize>,
    ) -> Self {
        if seed.is_some() {
            self.seed = seed;
        }
        if let Some(generations) = generations {
            self.generations = generations;
        }
        if let Some(population_size) = population_size {
            self.population_size = population_size;
        }
        self
    }
}

/// What the reducer does with a line it cannot parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MalformedPolicy {
    /// Log a warning and keep going.
    #[default]
    Skip,
    /// Abort with [`Error::MalformedInput`].
    Fail,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CounterConfig {
    pub malformed: MalformedPolicy,
}

impl CounterConfig {
    /// `--strict` always wins; otherwise the configured policy applies.
    pub fn policy(&self, strict: bool) -> MalformedPolicy {
        if strict {
            MalformedPolicy::Fail
        } else {
            self.malformed
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub evolution: EvolutionConfig,
    pub counter: CounterConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<()> {
        self.evolution.validate()
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }
}
