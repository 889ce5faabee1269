//! Per-generation statistics tracking.

use crate::agent::Agent;
use serde::{Deserialize, Serialize};

/// Snapshot of one finished generation.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct GenStats {
    /// Generation index (the generation that just ended)
    pub generation: u32,
    /// Population size during the generation
    pub population: usize,
    /// Best fitness in the ranked population
    pub best_fitness: f64,
    /// Mean fitness across the population
    pub mean_fitness: f64,
    /// Deliveries of the champion
    pub best_delivered: u32,
    /// Deliveries summed over the whole population
    pub total_delivered: u32,
    /// Agents that delivered at least once
    pub deliverer_count: usize,
    /// Adaptive mutation sigma after the boundary
    pub sigma: f32,
    /// Stagnation counter after the boundary
    pub stagnation: u32,
    /// Latest recorded population diversity
    pub diversity: f32,
}

impl GenStats {
    /// Population aggregates measured on the outgoing generation.
    pub fn measure(generation: u32, agents: &[Agent]) -> Self {
        let n = agents.len();
        let mean_fitness = if n > 0 {
            agents.iter().map(|a| a.fitness).sum::<f64>() / n as f64
        } else {
            0.0
        };

        Self {
            generation,
            population: n,
            mean_fitness,
            total_delivered: agents.iter().map(|a| a.delivered).sum(),
            deliverer_count: agents.iter().filter(|a| a.deliveries > 0).count(),
            ..Default::default()
        }
    }

    /// Format stats as a one-line summary
    pub fn summary(&self) -> String {
        format!(
            "Gen:{:4} | Pop:{:4} | Best:{:10.1} | Mean:{:9.1} | Del:{:3} (tot {:4}) | Sigma:{:.3} | Stag:{:2} | Div:{:.3}",
            self.generation,
            self.population,
            self.best_fitness,
            self.mean_fitness,
            self.best_delivered,
            self.total_delivered,
            self.sigma,
            self.stagnation,
            self.diversity,
        )
    }
}

/// Historical statistics tracker
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StatsHistory {
    /// All recorded generation snapshots
    pub snapshots: Vec<GenStats>,
}

impl StatsHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a generation snapshot
    pub fn record(&mut self, stats: GenStats) {
        self.snapshots.push(stats);
    }

    pub fn latest(&self) -> Option<&GenStats> {
        self.snapshots.last()
    }

    /// Best fitness over generations
    pub fn fitness_series(&self) -> Vec<(u32, f64)> {
        self.snapshots
            .iter()
            .map(|s| (s.generation, s.best_fitness))
            .collect()
    }

    /// Total deliveries over generations
    pub fn delivery_series(&self) -> Vec<(u32, u32)> {
        self.snapshots
            .iter()
            .map(|s| (s.generation, s.total_delivered))
            .collect()
    }

    /// Adaptive sigma over generations
    pub fn sigma_series(&self) -> Vec<(u32, f32)> {
        self.snapshots.iter().map(|s| (s.generation, s.sigma)).collect()
    }

    /// Save history to a JSON file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let json = serde_json::to_string(self)?;
        std::fs::write(path, json)
    }

    /// Load history from a JSON file
    pub fn load(path: &str) -> std::io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }

    /// Export to CSV format
    pub fn to_csv(&self) -> String {
        let mut csv = String::from(
            "generation,population,best_fitness,mean_fitness,best_delivered,total_delivered,deliverers,sigma,stagnation,diversity\n",
        );
        for s in &self.snapshots {
            csv.push_str(&format!(
                "{},{},{:.4},{:.4},{},{},{},{:.4},{},{:.4}\n",
                s.generation,
                s.population,
                s.best_fitness,
                s.mean_fitness,
                s.best_delivered,
                s.total_delivered,
                s.deliverer_count,
                s.sigma,
                s.stagnation,
                s.diversity,
            ));
        }
        csv
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{Agent, BirthKind};
    use crate::config::GenomeConfig;
    use crate::genome::Genome;
    use crate::world::Base;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn agents(n: usize) -> Vec<Agent> {
        let cfg = GenomeConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let base = Base { x: 100.0, y: 100.0, r: 18.0 };
        (0..n)
            .map(|i| {
                let mut a =
                    Agent::spawn_at_base(&base, Genome::random(&cfg, &mut rng), BirthKind::Genesis, &mut rng);
                a.fitness = i as f64 * 10.0;
                a.delivered = (i % 3) as u32;
                a.deliveries = (i % 3) as u32;
                a
            })
            .collect()
    }

    #[test]
    fn test_measure() {
        let stats = GenStats::measure(7, &agents(6));

        assert_eq!(stats.generation, 7);
        assert_eq!(stats.population, 6);
        assert!((stats.mean_fitness - 25.0).abs() < 1e-9);
        assert_eq!(stats.total_delivered, 6);
        assert_eq!(stats.deliverer_count, 4);
    }

    #[test]
    fn test_measure_empty() {
        let stats = GenStats::measure(0, &[]);
        assert_eq!(stats.mean_fitness, 0.0);
        assert_eq!(stats.population, 0);
    }

    #[test]
    fn test_history_series() {
        let mut history = StatsHistory::new();
        for g in 0..5 {
            let mut s = GenStats::measure(g, &agents(4));
            s.best_fitness = g as f64 * 100.0;
            history.record(s);
        }

        let series = history.fitness_series();
        assert_eq!(series.len(), 5);
        assert_eq!(series[4], (4, 400.0));
        assert!(history.latest().is_some());
    }

    #[test]
    fn test_csv_export() {
        let mut history = StatsHistory::new();
        history.record(GenStats::measure(1, &agents(3)));

        let csv = history.to_csv();
        assert!(csv.starts_with("generation,population"));
        assert!(csv.lines().count() == 2);
    }
}
