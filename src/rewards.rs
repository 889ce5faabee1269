//! Reward shaping and population ranking.
//!
//! The per-step reward is a sum of sparse event bonuses (pickup, deposit),
//! attempt-quality terms with an adaptive penalty for repeated mistakes,
//! continuous proximity shaping, and a small alive bonus. Ranking at
//! generation boundaries is lexicographic on deliveries with a z-scored
//! aggregate of secondary metrics as the tie-breaker.

use crate::agent::{ActionOutcome, Agent, AgentState};
use crate::config::{ActionConfig, RewardConfig};
use crate::geometry;
use crate::world::World;

/// Where a collision happened; the penalties differ.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CollisionKind {
    Boundary,
    Obstacle,
}

/// Secondary ranking metrics, z-score normalized across the population
/// before aggregation so no metric dominates by scale alone.
#[derive(Clone, Copy, Debug, Default)]
pub struct MultiObjectiveMetrics {
    pub efficiency: f64,
    pub exploration: f64,
    pub survival: f64,
}

/// Reward computation collaborator. Carries the population averages that
/// drive the adaptive wrong-attempt penalty.
#[derive(Clone, Debug)]
pub struct RewardSystem {
    cfg: RewardConfig,
    pickup_reach: f32,
    deposit_reach: f32,
    avg_wrong_mines: f64,
}

impl RewardSystem {
    pub fn new(cfg: RewardConfig, actions: &ActionConfig) -> Self {
        Self {
            cfg,
            pickup_reach: actions.stone_pickup_distance,
            deposit_reach: actions.deposit_distance,
            avg_wrong_mines: 0.0,
        }
    }

    pub fn config(&self) -> &RewardConfig {
        &self.cfg
    }

    /// Refresh the population averages behind the adaptive penalty. Run
    /// once per generation boundary so early explorers are judged against
    /// their peers, not against a stale cohort.
    pub fn update_population_stats(&mut self, agents: &[Agent]) {
        let n = agents.len().max(1) as f64;
        self.avg_wrong_mines =
            agents.iter().map(|a| a.wrong_mine_attempts as f64).sum::<f64>() / n;
    }

    pub fn collision_penalty(&self, kind: CollisionKind) -> f64 {
        match kind {
            CollisionKind::Boundary => self.cfg.boundary_collision,
            CollisionKind::Obstacle => self.cfg.obstacle_collision,
        }
    }

    /// Per-step fitness delta for one agent. Also books the agent's
    /// correct/wrong attempt counters, which feed both the adaptive
    /// penalty and the efficiency ranking metric.
    pub fn step_reward(&self, agent: &mut Agent, outcome: &ActionOutcome, world: &World) -> f64 {
        let mut reward = 0.0;

        if outcome.just_picked {
            reward += self.cfg.stone_picked;
        }
        if outcome.just_deposited {
            reward += self.cfg.stone_delivered;
        }

        if outcome.attempted_mine {
            let in_range = outcome.just_picked
                || (!agent.is_carrying()
                    && world.stone_index_near(agent.x, agent.y, self.pickup_reach).is_some());
            if in_range {
                agent.correct_mine_attempts += 1;
                reward += self.cfg.correct_mine_attempt;
            } else {
                agent.wrong_mine_attempts += 1;
                reward += self.wrong_mine_penalty(agent);
            }
        }

        if outcome.attempted_deposit {
            let in_range = outcome.just_deposited
                || (agent.is_carrying()
                    && world.distance_to_base(agent.x, agent.y) < world.base.r + self.deposit_reach);
            if in_range {
                reward += self.cfg.correct_deposit_attempt;
            } else {
                reward += self.wrong_deposit_penalty(agent);
            }
        }

        if agent.state == AgentState::Mining {
            reward += self.cfg.immobile_cost;
        }

        reward += self.proximity_bonus(agent, world);
        reward += self.return_to_base_bonus(agent, world);
        reward += self.path_memory_bonus(agent);
        reward += self.cfg.alive_bonus;

        reward
    }

    /// Wrong-mine penalty scaling exponentially with the agent's own
    /// experience and with how its mistake count compares to the
    /// population average. Fresh explorers get off lightly; veterans
    /// repeating the mistake do not.
    fn wrong_mine_penalty(&self, agent: &Agent) -> f64 {
        let experience = agent.experience() as f64;
        let experience_multiplier = self.cfg.wrong_mine_experience_multiplier.powf(experience);

        let own_wrong = agent.wrong_mine_attempts as f64;
        let relative_factor = if own_wrong > self.avg_wrong_mines {
            1.0 + (own_wrong - self.avg_wrong_mines) * 0.5
        } else {
            0.5
        };

        self.cfg.wrong_mine_base_penalty * experience_multiplier * relative_factor
    }

    fn wrong_deposit_penalty(&self, agent: &Agent) -> f64 {
        self.cfg.wrong_deposit_base_penalty * (1.0 + agent.experience() as f64 * 0.5)
    }

    /// Continuous shaping: carriers are pulled toward the base, seekers
    /// toward the nearest live stone. Distances normalize by the world
    /// diagonal so the term is world-size independent.
    fn proximity_bonus(&self, agent: &Agent, world: &World) -> f64 {
        let diagonal = world.diagonal() as f64;

        if agent.is_carrying() {
            let d = world.distance_to_base(agent.x, agent.y) as f64;
            let factor = (1.0 - d / diagonal).max(0.0);
            factor * self.cfg.carrying_proximity_weight + self.cfg.carrying_bonus
        } else {
            let mut bonus = 0.0;
            if let Some(d) = world.nearest_live_stone_distance(agent.x, agent.y) {
                let factor = (1.0 - d as f64 / diagonal).max(0.0);
                bonus += factor * self.cfg.seeking_proximity_weight;
            }
            if agent.has_left_base {
                bonus += self.cfg.exploration_bonus;
            }
            bonus
        }
    }

    /// Near-field pull once a carrier is inside the proximity threshold,
    /// on top of the global shaping term.
    fn return_to_base_bonus(&self, agent: &Agent, world: &World) -> f64 {
        if !agent.is_carrying() {
            return 0.0;
        }

        let d = world.distance_to_base(agent.x, agent.y) as f64;
        let diagonal = world.diagonal() as f64;
        let mut bonus = (1.0 - d / diagonal).max(0.0) * self.cfg.return_to_base_bonus;

        if d <= self.cfg.base_proximity_threshold {
            let nearness = 1.0 - d / self.cfg.base_proximity_threshold.max(1.0);
            bonus += nearness * self.cfg.return_to_base_bonus * 3.0;
        }

        bonus
    }

    /// Reward carriers for retracing the route of their last successful
    /// delivery. Both paths are compared tail-first, point by point.
    fn path_memory_bonus(&self, agent: &Agent) -> f64 {
        if !agent.is_carrying() || agent.last_return_path.is_empty() || agent.trail.is_empty() {
            return 0.0;
        }

        let n = agent.trail.len().min(agent.last_return_path.len());
        let tolerance = self.cfg.path_memory_tolerance.max(1.0);
        let mut similarity = 0.0f64;

        for i in 0..n {
            let (cx, cy) = agent.trail[agent.trail.len() - 1 - i];
            let (sx, sy) = agent.last_return_path[agent.last_return_path.len() - 1 - i];
            let d = geometry::distance(cx, cy, sx, sy);
            similarity += f64::from((1.0 - d / tolerance).max(0.0));
        }

        similarity / n as f64 * self.cfg.path_memory_bonus
    }

    /// Rank the population: deliveries first (strictly lexicographic),
    /// then the z-scored aggregate of efficiency, exploration and
    /// survival. Returns the same agents reordered best-first.
    pub fn evaluate_population(&mut self, agents: Vec<Agent>) -> Vec<Agent> {
        self.update_population_stats(&agents);

        let metrics: Vec<MultiObjectiveMetrics> = agents.iter().map(|a| self.metrics_for(a)).collect();
        let normalized = z_normalize(&metrics);

        let mut keyed: Vec<(Agent, f64)> = agents
            .into_iter()
            .zip(normalized)
            .map(|(a, m)| (a, m.efficiency + m.exploration + m.survival))
            .collect();

        keyed.sort_by(|a, b| {
            b.0.deliveries
                .cmp(&a.0.deliveries)
                .then_with(|| b.1.total_cmp(&a.1))
        });

        keyed.into_iter().map(|(a, _)| a).collect()
    }

    fn metrics_for(&self, agent: &Agent) -> MultiObjectiveMetrics {
        let attempts = (agent.correct_mine_attempts + agent.wrong_mine_attempts).max(1) as f64;
        MultiObjectiveMetrics {
            efficiency: agent.correct_mine_attempts as f64 / attempts,
            exploration: if agent.has_left_base { 1.0 } else { 0.0 },
            survival: (agent.age as f64 / self.cfg.survival_age_scale.max(1.0)).min(1.0),
        }
    }

    /// Length of the ranked prefix exposed to the evolution engine as
    /// parent material. When enough of the population has delivered at
    /// least once, zero-delivery agents are culled from the pool, floored
    /// so the pool never collapses. The champion always comes from the
    /// unfiltered ranking.
    pub fn parent_pool_len(&self, ranked: &[Agent]) -> usize {
        let len = ranked.len();
        if len == 0 {
            return 0;
        }

        let deliverers = ranked.iter().filter(|a| a.deliveries > 0).count();
        let activation = (self.cfg.cull_activation_share * len as f64).ceil() as usize;
        if deliverers < activation.max(1) {
            return len;
        }

        deliverers.max(self.cfg.min_parent_pool).min(len)
    }
}

/// Z-score each metric across the population. A zero or degenerate
/// standard deviation falls back to 1.0 so uniform populations rank
/// stably instead of producing NaN.
fn z_normalize(metrics: &[MultiObjectiveMetrics]) -> Vec<MultiObjectiveMetrics> {
    let n = metrics.len().max(1) as f64;

    let normalize = |get: fn(&MultiObjectiveMetrics) -> f64| {
        let mean = metrics.iter().map(get).sum::<f64>() / n;
        let var = metrics.iter().map(|m| (get(m) - mean).powi(2)).sum::<f64>() / n;
        let std = var.sqrt();
        let std = if std > 0.0 && std.is_finite() { std } else { 1.0 };
        (mean, std)
    };

    let (e_mean, e_std) = normalize(|m| m.efficiency);
    let (x_mean, x_std) = normalize(|m| m.exploration);
    let (s_mean, s_std) = normalize(|m| m.survival);

    metrics
        .iter()
        .map(|m| MultiObjectiveMetrics {
            efficiency: (m.efficiency - e_mean) / e_std,
            exploration: (m.exploration - x_mean) / x_std,
            survival: (m.survival - s_mean) / s_std,
        })
        .collect()
}
