use serde::{Deserialize, Serialize};

/// A real-valued candidate solution.
/// `fitness` is `None` until evaluated and is cleared whenever the genes change.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Individual {
    pub genes: Vec<f64>,
    pub fitness: Option<f64>,
}

impl Individual {
    pub fn new(genes: Vec<f64>) -> Self {
        Self {
            genes,
            fitness: None,
        }
    }

    pub fn is_evaluated(&self) -> bool {
        self.fitness.is_some()
    }

    /// Drop the cached fitness after the genes were modified.
    pub fn invalidate(&mut self) {
        self.fitness = None;
    }
}

/// Scores a gene vector. Lower is better.
pub trait Evaluator: Send + Sync {
    fn evaluate(&self, genes: &[f64]) -> f64;
}

/// The sphere function: sum of squared genes, minimum 0 at the origin.
#[derive(Clone, Copy, Debug, Default)]
pub struct SumOfSquares;

impl Evaluator for SumOfSquares {
    fn evaluate(&self, genes: &[f64]) -> f64 {
        genes.iter().map(|g| g * g).sum()
    }
}

/// The master engine trait.
pub trait Evolver {
    fn step<E: Evaluator>(&mut self, evaluator: &E);
    fn population(&self) -> &[Individual];
}

pub mod config;
pub mod error;

pub mod algorithms {
    pub mod operators;
    pub mod simple;
}

pub mod counting {
    pub mod mapper;
    pub mod reducer;
    pub mod shuffle;

    pub use mapper::{CountKey, map_line, run_mapper};
    pub use reducer::{Reducer, Report, run_reducer};
    pub use shuffle::count_in_process;
}

pub use config::{AppConfig, CounterConfig, EvolutionConfig, MalformedPolicy};
pub use error::{Error, Result};
