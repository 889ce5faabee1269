//! # QUARRY
//!
//! Neuroevolution sandbox: a population of foraging agents mines stones
//! and hauls them back to a base, steered by small feed-forward networks
//! evolved across generations.
//!
//! ## Features
//!
//! - **Evolvable**: elitism, crossover, mutation and momentum exploration
//!   with adaptive mutation strength
//! - **Reproducible**: one seeded random stream makes runs bit-identical
//! - **Configurable**: every reward magnitude and physics constant comes
//!   from a YAML-loadable [`Config`]
//! - **Parallel**: per-agent sensing and inference fan out via Rayon while
//!   world mutation stays strictly sequential
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use quarry::{Config, Simulation};
//!
//! let config = Config::default();
//! let mut sim = Simulation::new_with_seed(config, 42);
//!
//! // Run ten generations.
//! sim.run_generations(10).expect("world stays sane");
//!
//! println!("Best fitness: {}", sim.best_fitness);
//! println!("Stones delivered: {}", sim.world.stones_delivered);
//! ```
//!
//! ## Snapshots
//!
//! ```rust,no_run
//! use quarry::{Config, Simulation};
//! use quarry::snapshot::Snapshot;
//!
//! let mut sim = Simulation::new_with_seed(Config::default(), 42);
//! sim.run_generations(5).unwrap();
//!
//! sim.snapshot().save("run.bin").unwrap();
//!
//! let restored = Simulation::from_snapshot(Snapshot::load("run.bin").unwrap());
//! assert_eq!(restored.generation, 5);
//! ```

pub mod agent;
pub mod config;
pub mod evolution;
pub mod genome;
pub mod geometry;
pub mod map;
pub mod rewards;
pub mod sensors;
pub mod simulation;
pub mod snapshot;
pub mod stats;
pub mod world;

// Re-export main types
pub use agent::Agent;
pub use config::Config;
pub use genome::Genome;
pub use simulation::Simulation;
pub use world::World;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Run a quick benchmark
pub fn benchmark(generations: u32, lambda: usize) -> BenchmarkResult {
    use std::time::Instant;

    let mut config = Config::default();
    config.population.lambda = lambda;
    config.simulation.steps_per_gen = 300;

    let mut sim = Simulation::new_with_seed(config, 42);

    let start = Instant::now();
    let steps = generations as u64 * sim.config.simulation.steps_per_gen as u64;
    sim.run_generations(generations).ok();
    let elapsed = start.elapsed();

    BenchmarkResult {
        generations,
        population: sim.population.len(),
        steps,
        elapsed_secs: elapsed.as_secs_f64(),
        steps_per_second: steps as f64 / elapsed.as_secs_f64(),
        best_fitness: sim.best_fitness,
    }
}

/// Benchmark result
#[derive(Debug, Clone)]
pub struct BenchmarkResult {
    pub generations: u32,
    pub population: usize,
    pub steps: u64,
    pub elapsed_secs: f64,
    pub steps_per_second: f64,
    pub best_fitness: f64,
}

impl std::fmt::Display for BenchmarkResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Benchmark Results ===")?;
        writeln!(f, "Generations: {}", self.generations)?;
        writeln!(f, "Population: {}", self.population)?;
        writeln!(f, "Steps: {}", self.steps)?;
        writeln!(f, "Time: {:.3}s", self.elapsed_secs)?;
        writeln!(f, "Speed: {:.1} steps/s", self.steps_per_second)?;
        writeln!(f, "Best fitness: {:.1}", self.best_fitness)?;
        Ok(())
    }
}
