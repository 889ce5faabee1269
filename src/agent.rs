//! Agent entity: position, heading, discrete state, lifetime counters and
//! the genome that drives it.

use crate::genome::Genome;
use crate::world::Base;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Behavioral state. `Carrying` doubles as the carry indicator: an agent
/// holds at most one stone unit at a time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgentState {
    Seek,
    Mining,
    Carrying,
}

/// How an agent entered the population; used by telemetry to pick the
/// tracked agent and by debugging output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BirthKind {
    Genesis,
    Elite,
    Crossover,
    Mutant,
    Random,
    Momentum,
}

/// Short-term directional memory: angle (relative to heading) and
/// diagonal-normalized distance of the most recently sensed target.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct LastSeen {
    pub angle: Option<f32>,
    pub dist: Option<f32>,
}

/// Per-step record of what the action resolution did.
#[derive(Clone, Copy, Debug, Default)]
pub struct ActionOutcome {
    pub just_picked: bool,
    pub just_deposited: bool,
    pub attempted_mine: bool,
    pub attempted_deposit: bool,
}

/// Ephemeral record of one agent step, surfaced to telemetry consumers.
#[derive(Clone, Debug)]
pub struct StepResult {
    pub inputs: Vec<f32>,
    pub outputs: [f32; 3],
    pub outcome: ActionOutcome,
}

/// A foraging agent. Created at generation start or by the evolution
/// engine; discarded wholesale when its generation ends.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Agent {
    pub x: f32,
    pub y: f32,
    /// Heading in radians
    pub heading: f32,
    /// Scalar speed along the heading
    pub speed: f32,
    pub state: AgentState,
    pub mine_timer: u32,
    pub last_seen: LastSeen,

    // Lifetime counters
    pub delivered: u32,
    pub deliveries: u32,
    pub has_mined_before: bool,
    pub has_left_base: bool,
    pub collisions: u32,
    pub age: u32,
    pub steps_carrying: u32,
    pub correct_mine_attempts: u32,
    pub wrong_mine_attempts: u32,

    pub fitness: f64,
    pub genome: Genome,
    pub birth: BirthKind,

    /// Recent positions, presentation-only, bounded by the driver.
    pub trail: VecDeque<(f32, f32)>,
    /// Trail captured at the last successful delivery; rewards retracing it.
    pub last_return_path: Vec<(f32, f32)>,
}

impl Agent {
    /// Spawn at the base rim with positional jitter and a random heading.
    pub fn spawn_at_base<R: Rng>(base: &Base, genome: Genome, birth: BirthKind, rng: &mut R) -> Self {
        let x = base.x + base.r + 6.0 + rng.gen_range(-6.0..=6.0);
        let y = base.y + rng.gen_range(-6.0..=6.0);
        let heading = rng.gen_range(0.0..std::f32::consts::TAU);

        Self {
            x,
            y,
            heading,
            speed: 0.0,
            state: AgentState::Seek,
            mine_timer: 0,
            last_seen: LastSeen::default(),
            delivered: 0,
            deliveries: 0,
            has_mined_before: false,
            has_left_base: false,
            collisions: 0,
            age: 0,
            steps_carrying: 0,
            correct_mine_attempts: 0,
            wrong_mine_attempts: 0,
            fitness: 0.0,
            genome,
            birth,
            trail: VecDeque::new(),
            last_return_path: Vec::new(),
        }
    }

    #[inline]
    pub fn is_carrying(&self) -> bool {
        self.state == AgentState::Carrying
    }

    /// Deliveries plus one for having mined at all; drives the adaptive
    /// wrong-attempt penalty.
    #[inline]
    pub fn experience(&self) -> u32 {
        self.deliveries + u32::from(self.has_mined_before)
    }

    pub fn record_trail(&mut self, cap: usize) {
        self.trail.push_back((self.x, self.y));
        while self.trail.len() > cap {
            self.trail.pop_front();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GenomeConfig;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn test_agent() -> Agent {
        let cfg = GenomeConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let genome = Genome::random(&cfg, &mut rng);
        Agent::spawn_at_base(&Base { x: 400.0, y: 300.0, r: 18.0 }, genome, BirthKind::Genesis, &mut rng)
    }

    #[test]
    fn test_spawn_near_base_rim() {
        let agent = test_agent();
        let d = ((agent.x - 400.0).powi(2) + (agent.y - 300.0).powi(2)).sqrt();
        assert!(d > 10.0 && d < 40.0);
        assert_eq!(agent.state, AgentState::Seek);
        assert!(!agent.is_carrying());
    }

    #[test]
    fn test_trail_is_bounded() {
        let mut agent = test_agent();
        for i in 0..100 {
            agent.x = i as f32;
            agent.record_trail(10);
        }
        assert_eq!(agent.trail.len(), 10);
        assert_eq!(agent.trail.back().unwrap().0, 99.0);
    }

    #[test]
    fn test_experience() {
        let mut agent = test_agent();
        assert_eq!(agent.experience(), 0);
        agent.has_mined_before = true;
        agent.deliveries = 2;
        assert_eq!(agent.experience(), 3);
    }
}
