//! Generational evolution: elitism, crossover, mutation and exploratory
//! injection, with adaptive mutation strength driven by stagnation and
//! population diversity.

use crate::agent::{Agent, BirthKind};
use crate::config::{CrossoverMixing, EvolutionConfig, GenomeConfig, SelectionScheme};
use crate::genome::Genome;
use crate::rewards::RewardSystem;
use crate::world::Base;
use ndarray::Zip;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Adaptive state carried across generations. Serialized into snapshots so
/// a resumed run keeps its mutation schedule.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EvolutionState {
    /// Current Gaussian mutation standard deviation
    pub sigma: f32,
    /// Consecutive generations without meaningful improvement
    pub stagnation: u32,
    pub last_best_fitness: f64,
    /// Recent mean pairwise genome distances
    pub diversity_history: VecDeque<f32>,
    /// Flattened parameter vectors of recent champions, oldest first
    pub champion_history: VecDeque<Vec<f32>>,
}

/// What a generation boundary hands back to the driver.
#[derive(Clone, Debug)]
pub struct EvolutionResult {
    pub population: Vec<Agent>,
    pub champion: Genome,
    pub best_fitness: f64,
    pub best_delivered: u32,
}

/// Consumes a finished generation and produces the next one. The old
/// population is taken by value and discarded in full; only genomes
/// explicitly cloned here survive.
#[derive(Clone, Debug)]
pub struct EvolutionEngine {
    cfg: EvolutionConfig,
    pub state: EvolutionState,
}

impl EvolutionEngine {
    pub fn new(cfg: EvolutionConfig) -> Self {
        let state = EvolutionState {
            sigma: cfg.sigma_initial,
            stagnation: 0,
            last_best_fitness: 0.0,
            diversity_history: VecDeque::new(),
            champion_history: VecDeque::new(),
        };
        Self { cfg, state }
    }

    /// Rebuild an engine around previously saved adaptive state.
    pub fn from_state(cfg: EvolutionConfig, state: EvolutionState) -> Self {
        Self { cfg, state }
    }

    #[inline]
    pub fn sigma(&self) -> f32 {
        self.state.sigma
    }

    /// Rank, breed and return the next generation along with the
    /// generation's champion and headline numbers.
    pub fn evolve<R: Rng>(
        &mut self,
        population: Vec<Agent>,
        base: &Base,
        genome_cfg: &GenomeConfig,
        rewards: &mut RewardSystem,
        rng: &mut R,
    ) -> EvolutionResult {
        if population.is_empty() {
            // The driver's sanity check makes this unreachable in a run;
            // hand back an empty generation rather than panic.
            return EvolutionResult {
                population: Vec::new(),
                champion: Genome::random(genome_cfg, rng),
                best_fitness: 0.0,
                best_delivered: 0,
            };
        }

        let pop_size = population.len();
        let ranked = rewards.evaluate_population(population);

        // Champion comes from the unfiltered ranking.
        let champion = ranked[0].genome.clone();
        let best_fitness = ranked[0].fitness;
        let best_delivered = ranked[0].delivered;

        let diversity = self.population_diversity(&ranked);
        self.state.diversity_history.push_back(diversity);
        while self.state.diversity_history.len() > self.cfg.diversity_window {
            self.state.diversity_history.pop_front();
        }

        // Parent material: culled ranking prefix, further restricted to
        // the configured top fraction.
        let pool_len = rewards.parent_pool_len(&ranked);
        let parent_limit = ((pop_size as f64 * self.cfg.parent_pool_fraction).floor() as usize)
            .max(self.cfg.min_elite)
            .min(pool_len)
            .max(1);
        let parents = &ranked[..parent_limit];

        let elite = ((pop_size as f64 * self.cfg.elite_fraction).floor() as usize)
            .max(self.cfg.min_elite)
            .min(pop_size);
        let crossover =
            ((pop_size as f64 * self.cfg.crossover_fraction).floor() as usize).min(pop_size - elite);
        let mutants = ((pop_size as f64 * self.cfg.mutation_fraction).floor() as usize)
            .min(pop_size - elite - crossover);
        let explore = pop_size - elite - crossover - mutants;

        let mut next = Vec::with_capacity(pop_size);

        for ranked_agent in ranked.iter().take(elite) {
            let genome = ranked_agent.genome.clone();
            next.push(Agent::spawn_at_base(base, genome, BirthKind::Elite, rng));
        }

        for _ in 0..crossover {
            let p1 = self.select_parent(parents, rng);
            let p2 = self.select_parent(parents, rng);
            let child = self.crossover_genomes(&parents[p1], &parents[p2], genome_cfg, rng);
            next.push(Agent::spawn_at_base(base, child, BirthKind::Crossover, rng));
        }

        for _ in 0..mutants {
            let p = self.select_parent(parents, rng);
            let genome = parents[p].genome.mutate(genome_cfg, rng, self.state.sigma);
            next.push(Agent::spawn_at_base(base, genome, BirthKind::Mutant, rng));
        }

        for _ in 0..explore {
            let use_momentum = self.state.champion_history.len() >= 3
                && rng.gen::<f64>() < self.cfg.momentum_share;
            let bred = if use_momentum {
                self.momentum_genome(genome_cfg, rng)
            } else {
                None
            };
            match bred {
                Some(genome) => next.push(Agent::spawn_at_base(base, genome, BirthKind::Momentum, rng)),
                None => {
                    let genome = Genome::random(genome_cfg, rng);
                    next.push(Agent::spawn_at_base(base, genome, BirthKind::Random, rng));
                }
            }
        }

        self.record_champion(&champion);
        self.update_adaptive_state(best_fitness);

        EvolutionResult {
            population: next,
            champion,
            best_fitness,
            best_delivered,
        }
    }

    /// Pick a parent index from the pool under the configured scheme.
    fn select_parent<R: Rng>(&self, pool: &[Agent], rng: &mut R) -> usize {
        debug_assert!(!pool.is_empty());
        if pool.len() == 1 {
            return 0;
        }

        match self.cfg.selection {
            SelectionScheme::Tournament => {
                let rounds = self.cfg.tournament_size.min(pool.len());
                let mut best = rng.gen_range(0..pool.len());
                for _ in 1..rounds {
                    let candidate = rng.gen_range(0..pool.len());
                    if pool[candidate].fitness > pool[best].fitness {
                        best = candidate;
                    }
                }
                best
            }
            SelectionScheme::FitnessProportional => {
                // Rank-based power-law weights; rank 0 is the fittest.
                let n = pool.len() as f64;
                let weights: Vec<f64> = (0..pool.len())
                    .map(|i| ((n - i as f64) / n).powf(self.cfg.selection_pressure))
                    .collect();
                let total: f64 = weights.iter().sum();
                let mut target = rng.gen::<f64>() * total;
                for (i, w) in weights.iter().enumerate() {
                    target -= w;
                    if target <= 0.0 {
                        return i;
                    }
                }
                pool.len() - 1
            }
        }
    }

    /// Recombine two parents. With probability `1 - crossover_rate` the
    /// fitter parent is cloned outright; otherwise every network
    /// parameter is mixed per the configured rule, the sensor geometry is
    /// blended, and the child's weights get a light sigma-scaled shake.
    fn crossover_genomes<R: Rng>(
        &self,
        p1: &Agent,
        p2: &Agent,
        genome_cfg: &GenomeConfig,
        rng: &mut R,
    ) -> Genome {
        if rng.gen::<f64>() >= self.cfg.crossover_rate {
            let fitter = if p1.fitness >= p2.fitness { p1 } else { p2 };
            return fitter.genome.clone();
        }

        // Probability that a parameter comes from p1.
        let share = match self.cfg.mixing {
            CrossoverMixing::Uniform => 0.5,
            CrossoverMixing::FitnessWeighted => {
                let a = p1.fitness.max(0.0) + 1e-6;
                let b = p2.fitness.max(0.0) + 1e-6;
                a / (a + b)
            }
        } as f32;

        let mut child = p1.genome.clone();
        let other = &p2.genome;

        let mix2 = |target: &mut ndarray::Array2<f32>, source: &ndarray::Array2<f32>, rng: &mut R| {
            Zip::from(target).and(source).for_each(|c, &o| {
                if rng.gen::<f32>() >= share {
                    *c = o;
                }
            });
        };
        mix2(&mut child.hidden.weights, &other.hidden.weights, rng);
        mix2(&mut child.output.weights, &other.output.weights, rng);

        let mix1 = |target: &mut ndarray::Array1<f32>, source: &ndarray::Array1<f32>, rng: &mut R| {
            Zip::from(target).and(source).for_each(|c, &o| {
                if rng.gen::<f32>() >= share {
                    *c = o;
                }
            });
        };
        mix1(&mut child.hidden.biases, &other.hidden.biases, rng);
        mix1(&mut child.output.biases, &other.output.biases, rng);

        // Sensor geometry blends instead of swapping.
        for (a, &b) in child.sensor_angles.iter_mut().zip(&other.sensor_angles) {
            *a = *a * share + b * (1.0 - share);
        }
        child.sensor_range = child.sensor_range * share + other.sensor_range * (1.0 - share);

        child.perturb_weights(self.state.sigma * self.cfg.child_noise_factor, rng);
        child.sensor_range = child.sensor_range.max(genome_cfg.min_sensor_range);
        child
    }

    /// Extrapolate the trend across recent champions: average the
    /// consecutive parameter deltas, overshoot by `momentum_gain`, add to
    /// the latest champion, then shake lightly so concurrent momentum
    /// slots diverge.
    fn momentum_genome<R: Rng>(&self, genome_cfg: &GenomeConfig, rng: &mut R) -> Option<Genome> {
        let hist = &self.state.champion_history;
        let last = hist.back()?;
        let dim = last.len();
        if hist.len() < 3 {
            return None;
        }

        let mut trend = vec![0.0f32; dim];
        let mut pairs = 0usize;
        for (prev, next) in hist.iter().zip(hist.iter().skip(1)) {
            if prev.len() != dim || next.len() != dim {
                return None;
            }
            for (t, (p, n)) in trend.iter_mut().zip(prev.iter().zip(next.iter())) {
                *t += n - p;
            }
            pairs += 1;
        }
        if pairs == 0 {
            return None;
        }
        for t in &mut trend {
            *t /= pairs as f32;
        }

        let params: Vec<f32> = last
            .iter()
            .zip(&trend)
            .map(|(&p, &d)| p + self.cfg.momentum_gain * d)
            .collect();

        let mut genome = Genome::from_parameter_vector(genome_cfg, &params).ok()?;
        genome.perturb_weights(self.state.sigma * self.cfg.child_noise_factor, rng);
        genome.sensor_range = genome.sensor_range.max(genome_cfg.min_sensor_range);
        Some(genome)
    }

    fn record_champion(&mut self, champion: &Genome) {
        self.state.champion_history.push_back(champion.parameter_vector());
        while self.state.champion_history.len() > self.cfg.champion_history {
            self.state.champion_history.pop_front();
        }
    }

    /// Mean pairwise genome distance over the leading individuals. The
    /// sample is capped for cost: pairwise over at most 10 genomes, 50
    /// hidden weights per comparison.
    fn population_diversity(&self, ranked: &[Agent]) -> f32 {
        let sample = ranked.len().min(10);
        if sample < 2 {
            return 0.0;
        }

        let mut total = 0.0f32;
        let mut comparisons = 0usize;
        for i in 0..sample {
            for j in (i + 1)..sample {
                total += genomic_distance(&ranked[i].genome, &ranked[j].genome);
                comparisons += 1;
            }
        }

        if comparisons > 0 {
            total / comparisons as f32
        } else {
            0.0
        }
    }

    /// Stagnation and diversity feedback on sigma, clamped to its
    /// configured band.
    fn update_adaptive_state(&mut self, best_fitness: f64) {
        if best_fitness <= self.state.last_best_fitness + self.cfg.stagnation_epsilon {
            self.state.stagnation += 1;
        } else {
            self.state.stagnation = 0;
        }
        self.state.last_best_fitness = best_fitness;

        if self.state.stagnation > self.cfg.stagnation_threshold {
            self.state.sigma = (self.state.sigma * self.cfg.sigma_growth).min(self.cfg.sigma_max);
        } else {
            self.state.sigma = (self.state.sigma * self.cfg.sigma_decay).max(self.cfg.sigma_min);
        }

        let avg_diversity = if self.state.diversity_history.is_empty() {
            1.0
        } else {
            self.state.diversity_history.iter().sum::<f32>()
                / self.state.diversity_history.len() as f32
        };
        if avg_diversity < self.cfg.diversity_threshold {
            self.state.sigma =
                (self.state.sigma * self.cfg.diversity_growth).min(self.cfg.sigma_max);
        }
    }
}

/// Distance between two genomes over a fixed hidden-weight sample.
fn genomic_distance(a: &Genome, b: &Genome) -> f32 {
    let sample = a.hidden.weights.len().min(b.hidden.weights.len()).min(50);
    if sample == 0 {
        return 0.0;
    }

    let mut sum = 0.0f32;
    for (x, y) in a.hidden.weights.iter().zip(b.hidden.weights.iter()).take(sample) {
        let d = x - y;
        sum += d * d;
    }
    (sum / sample as f32).sqrt()
}
