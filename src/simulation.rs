//! Simulation step driver: orchestrates sensing, inference, action
//! resolution, physics, collisions and fitness accrual each tick, and the
//! ranking/evolution/replenishment cycle at generation boundaries.

use crate::agent::{ActionOutcome, Agent, AgentState, BirthKind, StepResult};
use crate::config::{ActionConfig, Config, PhysicsConfig};
use crate::evolution::EvolutionEngine;
use crate::genome::{Genome, GenomeError};
use crate::geometry;
use crate::map::MapGenerator;
use crate::rewards::{CollisionKind, RewardSystem};
use crate::sensors;
use crate::snapshot::Snapshot;
use crate::stats::{GenStats, StatsHistory};
use crate::world::World;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

/// Invariant violations that make further stepping meaningless. Fatal to
/// the run: the driver refuses to step and surfaces the diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SanityError {
    EmptyPopulation,
    NoStones,
    BaseOutOfBounds,
}

impl std::fmt::Display for SanityError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyPopulation => write!(f, "sanity check failed: population missing"),
            Self::NoStones => write!(f, "sanity check failed: no stones"),
            Self::BaseOutOfBounds => write!(f, "sanity check failed: base out of bounds"),
        }
    }
}

impl std::error::Error for SanityError {}

/// The simulation: owns the world, the active population and explicit
/// handles to its collaborators (map generator, reward system, evolution
/// engine). Nothing is reached through globals.
pub struct Simulation {
    pub config: Config,
    pub world: World,
    pub population: Vec<Agent>,

    map: MapGenerator,
    rewards: RewardSystem,
    evolution: EvolutionEngine,

    rng: ChaCha8Rng,
    seed: u64,

    pub generation: u32,
    gen_step_count: u32,
    pub best_fitness: f64,
    pub best_delivered: u32,
    /// Champion genome of the last finished generation
    pub champion: Option<Genome>,
    /// Step record of the tracked agent (first elite, else agent 0)
    pub last_step_result: Option<StepResult>,
    pub stats_history: StatsHistory,
}

impl Simulation {
    /// Create a simulation with a random seed.
    pub fn new(config: Config) -> Self {
        let seed = rand::thread_rng().gen();
        Self::new_with_seed(config, seed)
    }

    /// Create a simulation with a specific seed. Identical seeds and tick
    /// counts reproduce runs bit-for-bit.
    pub fn new_with_seed(config: Config, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let map = MapGenerator::new(&config.world);

        let min_quantity = config.population.lambda.max(config.population.min_size) as u32
            * config.simulation.stones_per_agent;
        let world = map.generate_world(config.world.width, config.world.height, min_quantity, &mut rng);

        let pop_size = Self::population_size(&config);
        let population = (0..pop_size)
            .map(|_| {
                let genome = Genome::random(&config.genome, &mut rng);
                Agent::spawn_at_base(&world.base, genome, BirthKind::Genesis, &mut rng)
            })
            .collect();

        let rewards = RewardSystem::new(config.rewards.clone(), &config.actions);
        let evolution = EvolutionEngine::new(config.evolution.clone());

        Self {
            config,
            world,
            population,
            map,
            rewards,
            evolution,
            rng,
            seed,
            generation: 0,
            gen_step_count: 0,
            best_fitness: 0.0,
            best_delivered: 0,
            champion: None,
            last_step_result: None,
            stats_history: StatsHistory::new(),
        }
    }

    fn population_size(config: &Config) -> usize {
        1 + config.population.lambda.clamp(
            config.population.min_size - 1,
            config.population.max_size - 1,
        )
    }

    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    #[inline]
    pub fn sigma(&self) -> f32 {
        self.evolution.sigma()
    }

    /// Advance one physics tick for the whole population.
    ///
    /// Sensing and network inference run in parallel per agent (each
    /// touches only world geometry and its own fields); action resolution,
    /// physics, collisions and rewards then run sequentially in population
    /// order so rng draws and stone decrements keep the reference
    /// semantics.
    pub fn step(&mut self) -> Result<(), SanityError> {
        if let Err(e) = self.sanity_check() {
            log::error!("{}", e);
            return Err(e);
        }

        // Phase 1: parallel sense + infer.
        let world = &self.world;
        let genome_cfg = &self.config.genome;
        let boundary_margin = self.config.physics.boundary_margin;
        let decisions: Vec<(Vec<f32>, [f32; 3])> = self
            .population
            .par_iter_mut()
            .map(|agent| {
                let readings = sensors::sense(agent, world, boundary_margin);
                let inputs = sensors::collect_inputs(agent, &readings);
                let out = agent.genome.feed(&inputs, &genome_cfg.output_activations);
                (inputs, [out[0], out[1], out[2]])
            })
            .collect();

        // Phase 2: sequential resolution.
        {
            let Simulation {
                population,
                world,
                map,
                rewards,
                rng,
                config,
                last_step_result,
                ..
            } = self;

            let mut tracked: Option<StepResult> = None;
            for (i, (inputs, outputs)) in decisions.into_iter().enumerate() {
                let agent = &mut population[i];

                let outcome = resolve_actions(agent, world, outputs[2], &config.actions);
                integrate_physics(agent, outputs[0], outputs[1], &config.physics, rng);
                handle_collisions(agent, world, &config.physics, rewards);
                track_base_exit(agent, world, config.actions.base_exit_margin);

                if agent.state == AgentState::Carrying {
                    agent.steps_carrying += 1;
                }

                agent.fitness += rewards.step_reward(agent, &outcome, world);
                agent.age += 1;
                agent.record_trail(config.simulation.trail_length);

                if i == 0 || agent.birth == BirthKind::Elite {
                    tracked = Some(StepResult { inputs, outputs, outcome });
                }
            }
            if tracked.is_some() {
                *last_step_result = tracked;
            }

            // Replace exhausted stones where the generator finds room; a
            // failed placement is tolerated and retried next tick.
            for i in 0..world.stones.len() {
                if world.stones[i].quantity == 0 {
                    let initial = world.stones[i].initial_quantity;
                    match map.respawn_stone(
                        world.width,
                        world.height,
                        &world.base,
                        &world.obstacles,
                        &world.stones,
                        initial,
                        rng,
                    ) {
                        Some(stone) => world.stones[i] = stone,
                        None => log::debug!("stone respawn found no placement; staying exhausted"),
                    }
                }
            }
        }

        self.gen_step_count += 1;
        if self.gen_step_count >= self.config.simulation.steps_per_gen {
            self.end_generation();
        }

        Ok(())
    }

    /// Run `n` ticks, stopping early on a sanity failure.
    pub fn run_steps(&mut self, n: u64) -> Result<(), SanityError> {
        for _ in 0..n {
            self.step()?;
        }
        Ok(())
    }

    /// Run until `n` more generations have finished.
    pub fn run_generations(&mut self, n: u32) -> Result<(), SanityError> {
        let target = self.generation + n;
        while self.generation < target {
            self.step()?;
        }
        Ok(())
    }

    /// Rank the outgoing population, breed the next one and replenish the
    /// stone field.
    pub fn end_generation(&mut self) {
        let mut stats = GenStats::measure(self.generation, &self.population);

        let base = self.world.base;
        let result = self.evolution.evolve(
            std::mem::take(&mut self.population),
            &base,
            &self.config.genome,
            &mut self.rewards,
            &mut self.rng,
        );

        self.population = result.population;
        self.best_fitness = result.best_fitness;
        self.best_delivered = result.best_delivered;
        self.champion = Some(result.champion);
        self.generation += 1;
        self.gen_step_count = 0;

        let min_quantity = self.population.len() as u32 + 2;
        self.world.stones = self.map.generate_stones(
            self.world.width,
            self.world.height,
            &base,
            &self.world.obstacles,
            min_quantity,
            &mut self.rng,
        );

        stats.best_fitness = self.best_fitness;
        stats.best_delivered = self.best_delivered;
        stats.sigma = self.evolution.sigma();
        stats.stagnation = self.evolution.state.stagnation;
        stats.diversity = self.evolution.state.diversity_history.back().copied().unwrap_or(0.0);
        log::info!("{}", stats.summary());
        self.stats_history.record(stats);
    }

    /// Pre-tick invariant check; any failure is fatal to the run.
    pub fn sanity_check(&self) -> Result<(), SanityError> {
        if self.population.is_empty() {
            return Err(SanityError::EmptyPopulation);
        }
        if self.world.stones.is_empty() {
            return Err(SanityError::NoStones);
        }
        if !self.world.contains(self.world.base.x, self.world.base.y) {
            return Err(SanityError::BaseOutOfBounds);
        }
        Ok(())
    }

    /// Flat textual export of the current champion, if one exists.
    pub fn export_champion(&self) -> Result<Option<String>, GenomeError> {
        match &self.champion {
            Some(genome) => Ok(Some(genome.to_json()?)),
            None => Ok(None),
        }
    }

    /// Replace the stored champion from its textual form. On failure the
    /// previous champion stays untouched.
    pub fn import_champion(&mut self, json: &str) -> Result<(), GenomeError> {
        let genome = Genome::from_json(json, &self.config.genome)?;
        self.champion = Some(genome);
        Ok(())
    }

    /// Capture the full simulation state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            version: Snapshot::VERSION,
            config: self.config.clone(),
            seed: self.seed,
            generation: self.generation,
            gen_step_count: self.gen_step_count,
            best_fitness: self.best_fitness,
            best_delivered: self.best_delivered,
            world: self.world.clone(),
            population: self.population.clone(),
            evolution_state: self.evolution.state.clone(),
            champion: self.champion.clone(),
            stats_history: self.stats_history.clone(),
        }
    }

    /// Rebuild a simulation from a snapshot. The rng restarts from the
    /// stored seed; the resumed run is self-consistent though not a
    /// bit-identical continuation of the interrupted draw stream.
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let map = MapGenerator::new(&snapshot.config.world);
        let rewards = RewardSystem::new(snapshot.config.rewards.clone(), &snapshot.config.actions);
        let evolution =
            EvolutionEngine::from_state(snapshot.config.evolution.clone(), snapshot.evolution_state);
        let rng = ChaCha8Rng::seed_from_u64(snapshot.seed);

        Self {
            config: snapshot.config,
            world: snapshot.world,
            population: snapshot.population,
            map,
            rewards,
            evolution,
            rng,
            seed: snapshot.seed,
            generation: snapshot.generation,
            gen_step_count: snapshot.gen_step_count,
            best_fitness: snapshot.best_fitness,
            best_delivered: snapshot.best_delivered,
            champion: snapshot.champion,
            last_step_result: None,
            stats_history: snapshot.stats_history,
        }
    }
}

/// Deposit check, then the mining state machine. Deposit fires
/// automatically for carriers in range before any mining decision; mining
/// intent without a stone in reach still immobilizes the agent.
fn resolve_actions(agent: &mut Agent, world: &mut World, mine_out: f32, cfg: &ActionConfig) -> ActionOutcome {
    let mut outcome = ActionOutcome::default();

    if agent.state == AgentState::Carrying {
        let dx = agent.x - world.base.x;
        let dy = agent.y - world.base.y;
        let max_dist = world.base.r + cfg.deposit_distance;
        if dx * dx + dy * dy < max_dist * max_dist {
            outcome.attempted_deposit = true;
            outcome.just_deposited = true;
            agent.delivered += 1;
            agent.deliveries += 1;
            world.stones_delivered += 1;
            agent.state = AgentState::Seek;
            agent.mine_timer = 0;
            agent.steps_carrying = 0;
            agent.last_return_path = agent.trail.iter().copied().collect();
            return outcome;
        }
    }

    if agent.state != AgentState::Carrying {
        if mine_out > cfg.mine_threshold {
            outcome.attempted_mine = true;
            if let Some(idx) = world.stone_index_near(agent.x, agent.y, cfg.stone_pickup_distance) {
                agent.state = AgentState::Mining;
                agent.mine_timer += 1;
                if agent.mine_timer >= cfg.mine_timer_base {
                    let stone = &mut world.stones[idx];
                    stone.quantity = stone.quantity.saturating_sub(1);
                    agent.state = AgentState::Carrying;
                    agent.has_mined_before = true;
                    agent.mine_timer = 0;
                    agent.steps_carrying = 0;
                    outcome.just_picked = true;
                }
            } else {
                agent.state = AgentState::Mining;
            }
        } else if agent.state == AgentState::Mining {
            agent.state = AgentState::Seek;
            agent.mine_timer = 0;
        }
    }

    outcome
}

/// Velocity/heading integration. Agents in MINING are pinned in place;
/// the heading jitter applies regardless.
fn integrate_physics<R: Rng>(agent: &mut Agent, accel: f32, rot: f32, cfg: &PhysicsConfig, rng: &mut R) {
    if agent.state == AgentState::Mining {
        agent.speed = 0.0;
    } else {
        agent.speed = agent.speed * cfg.velocity_decay + accel * cfg.max_speed * cfg.acceleration_factor;
        agent.heading += rot * cfg.rotation_factor;
        agent.x += agent.heading.cos() * agent.speed;
        agent.y += agent.heading.sin() * agent.speed;
    }

    agent.heading += (rng.gen::<f32>() - 0.5) * cfg.random_rotation;
    agent.heading = geometry::normalize_angle(agent.heading);
}

/// Boundary clamp-and-reflect plus obstacle push-out, each charging the
/// corresponding collision penalty.
fn handle_collisions(agent: &mut Agent, world: &World, cfg: &PhysicsConfig, rewards: &RewardSystem) {
    let margin = cfg.boundary_margin;

    let boundary_hit = |agent: &mut Agent| {
        agent.speed *= cfg.collision_velocity_factor;
        agent.collisions += 1;
        agent.fitness += rewards.collision_penalty(CollisionKind::Boundary);
    };

    if agent.x < margin {
        agent.x = margin;
        boundary_hit(agent);
    }
    if agent.y < margin {
        agent.y = margin;
        boundary_hit(agent);
    }
    if agent.x > world.width - margin {
        agent.x = world.width - margin;
        boundary_hit(agent);
    }
    if agent.y > world.height - margin {
        agent.y = world.height - margin;
        boundary_hit(agent);
    }

    for ob in &world.obstacles {
        if geometry::point_in_rect(agent.x, agent.y, ob) {
            // Push out along the dominant axis only.
            let (cx, cy) = ob.center();
            let dx = agent.x - cx;
            let dy = agent.y - cy;
            if dx.abs() >= dy.abs() {
                agent.x += dx.signum() * cfg.collision_push_distance;
            } else {
                agent.y += dy.signum() * cfg.collision_push_distance;
            }
            agent.collisions += 1;
            agent.fitness += rewards.collision_penalty(CollisionKind::Obstacle);
        }
    }
}

/// Exploration bookkeeping: leaving the base rim arms the exploration
/// bonus; returning after a delivery disarms it for the next trip.
fn track_base_exit(agent: &mut Agent, world: &World, margin: f32) {
    let dist = world.distance_to_base(agent.x, agent.y);
    let threshold = world.base.r + margin;
    if dist > threshold {
        agent.has_left_base = true;
    }
    if agent.delivered > 0 && dist <= threshold {
        agent.has_left_base = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GenomeConfig;
    use crate::world::{Base, Rect, Stone};

    fn small_config() -> Config {
        let mut config = Config::default();
        config.population.lambda = 9;
        config.population.min_size = 5;
        config.population.max_size = 20;
        config.simulation.steps_per_gen = 40;
        config
    }

    fn bare_world() -> World {
        let mut world = World::new(1280.0, 720.0, Base { x: 640.0, y: 360.0, r: 18.0 });
        world.stones.push(Stone { x: 200.0, y: 200.0, r: 12.0, quantity: 3, initial_quantity: 3 });
        world
    }

    fn agent_on_stone() -> Agent {
        let cfg = GenomeConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(101);
        let genome = Genome::random(&cfg, &mut rng);
        let mut agent = Agent::spawn_at_base(
            &Base { x: 640.0, y: 360.0, r: 18.0 },
            genome,
            BirthKind::Genesis,
            &mut rng,
        );
        agent.x = 200.0;
        agent.y = 200.0;
        agent
    }

    #[test]
    fn test_mining_takes_exactly_timer_base_ticks() {
        let mut world = bare_world();
        let mut agent = agent_on_stone();
        let cfg = ActionConfig::default();

        for tick in 1..=cfg.mine_timer_base {
            let outcome = resolve_actions(&mut agent, &mut world, 0.9, &cfg);
            assert!(outcome.attempted_mine);
            if tick < cfg.mine_timer_base {
                assert!(!outcome.just_picked, "picked early at tick {}", tick);
                assert_eq!(agent.state, AgentState::Mining);
                assert_eq!(world.stones[0].quantity, 3);
            } else {
                assert!(outcome.just_picked, "must pick on the final tick");
                assert_eq!(agent.state, AgentState::Carrying);
                assert_eq!(world.stones[0].quantity, 2);
                assert!(agent.has_mined_before);
                assert_eq!(agent.mine_timer, 0);
            }
        }
    }

    #[test]
    fn test_mine_intent_without_stone_immobilizes() {
        let mut world = bare_world();
        let mut agent = agent_on_stone();
        agent.x = 640.0;
        agent.y = 500.0; // nowhere near a stone
        let cfg = ActionConfig::default();
        let physics = PhysicsConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(103);

        for _ in 0..100 {
            let outcome = resolve_actions(&mut agent, &mut world, 0.95, &cfg);
            assert!(outcome.attempted_mine);
            assert!(!outcome.just_picked);
            assert_eq!(agent.state, AgentState::Mining);
            agent.speed = 1.0;
            integrate_physics(&mut agent, 1.0, 0.0, &physics, &mut rng);
            assert_eq!(agent.speed, 0.0);
        }
        assert_eq!(world.stones[0].quantity, 3);
    }

    #[test]
    fn test_dropping_mine_intent_returns_to_seek() {
        let mut world = bare_world();
        let mut agent = agent_on_stone();
        let cfg = ActionConfig::default();

        resolve_actions(&mut agent, &mut world, 0.9, &cfg);
        assert_eq!(agent.state, AgentState::Mining);
        assert_eq!(agent.mine_timer, 1);

        resolve_actions(&mut agent, &mut world, 0.1, &cfg);
        assert_eq!(agent.state, AgentState::Seek);
        assert_eq!(agent.mine_timer, 0);
    }

    #[test]
    fn test_deposit_at_threshold_distance() {
        let mut world = bare_world();
        let mut agent = agent_on_stone();
        let cfg = ActionConfig::default();

        // Just inside base.r + deposit_distance of the base center.
        agent.state = AgentState::Carrying;
        agent.x = world.base.x + world.base.r + cfg.deposit_distance - 0.01;
        agent.y = world.base.y;

        // Deposits regardless of the mine output.
        let outcome = resolve_actions(&mut agent, &mut world, 0.0, &cfg);

        assert!(outcome.just_deposited);
        assert!(outcome.attempted_deposit);
        assert_eq!(agent.delivered, 1);
        assert_eq!(agent.deliveries, 1);
        assert_eq!(world.stones_delivered, 1);
        assert_eq!(agent.state, AgentState::Seek);
        assert_eq!(agent.steps_carrying, 0);
    }

    #[test]
    fn test_carrier_out_of_range_keeps_carrying() {
        let mut world = bare_world();
        let mut agent = agent_on_stone();
        let cfg = ActionConfig::default();

        agent.state = AgentState::Carrying;
        agent.x = world.base.x + world.base.r + cfg.deposit_distance + 5.0;
        agent.y = world.base.y;

        let outcome = resolve_actions(&mut agent, &mut world, 0.9, &cfg);

        assert!(!outcome.just_deposited);
        assert_eq!(agent.state, AgentState::Carrying);
        assert_eq!(world.stones_delivered, 0);
    }

    #[test]
    fn test_boundary_collision_clamps_and_penalizes() {
        let world = bare_world();
        let rewards = RewardSystem::new(crate::config::RewardConfig::default(), &ActionConfig::default());
        let physics = PhysicsConfig::default();

        let mut agent = agent_on_stone();
        agent.x = -5.0;
        agent.speed = 2.0;
        let fitness_before = agent.fitness;

        handle_collisions(&mut agent, &world, &physics, &rewards);

        assert_eq!(agent.x, physics.boundary_margin);
        assert_eq!(agent.collisions, 1);
        assert!((agent.speed - 2.0 * physics.collision_velocity_factor).abs() < 1e-6);
        assert!(agent.fitness < fitness_before);
    }

    #[test]
    fn test_obstacle_pushes_agent_out() {
        let mut world = bare_world();
        world.obstacles.push(Rect { x: 300.0, y: 300.0, w: 40.0, h: 40.0 });
        let rewards = RewardSystem::new(crate::config::RewardConfig::default(), &ActionConfig::default());
        let physics = PhysicsConfig::default();

        let mut agent = agent_on_stone();
        agent.x = 335.0; // 15 right of center (320), dominant axis
        agent.y = 310.0; // 10 above center
        handle_collisions(&mut agent, &world, &physics, &rewards);

        assert_eq!(agent.x, 335.0 + physics.collision_push_distance);
        assert_eq!(agent.y, 310.0);
        assert_eq!(agent.collisions, 1);
    }

    #[test]
    fn test_step_runs_and_ages_population() {
        let mut sim = Simulation::new_with_seed(small_config(), 42);
        let pop_size = sim.population.len();

        sim.step().unwrap();

        assert_eq!(sim.population.len(), pop_size);
        assert!(sim.population.iter().all(|a| a.age == 1));
        assert!(sim.last_step_result.is_some());
        let tracked = sim.last_step_result.as_ref().unwrap();
        assert_eq!(tracked.inputs.len(), sim.config.genome.inputs());
    }

    #[test]
    fn test_generation_rollover() {
        let config = small_config();
        let steps = config.simulation.steps_per_gen as u64;
        let mut sim = Simulation::new_with_seed(config, 7);
        let pop_size = sim.population.len();

        sim.run_steps(steps).unwrap();

        assert_eq!(sim.generation, 1);
        assert_eq!(sim.population.len(), pop_size);
        assert!(sim.champion.is_some());
        assert!(!sim.world.stones.is_empty());
        assert_eq!(sim.stats_history.snapshots.len(), 1);
        // Fresh generation starts unaged.
        assert!(sim.population.iter().all(|a| a.age == 0));
    }

    #[test]
    fn test_sanity_check_rejects_empty_population() {
        let mut sim = Simulation::new_with_seed(small_config(), 9);
        sim.population.clear();

        assert_eq!(sim.step(), Err(SanityError::EmptyPopulation));
    }

    #[test]
    fn test_sanity_check_rejects_missing_stones() {
        let mut sim = Simulation::new_with_seed(small_config(), 9);
        sim.world.stones.clear();

        assert_eq!(sim.step(), Err(SanityError::NoStones));
    }

    #[test]
    fn test_sanity_check_rejects_stray_base() {
        let mut sim = Simulation::new_with_seed(small_config(), 9);
        sim.world.base.x = -100.0;

        assert_eq!(sim.step(), Err(SanityError::BaseOutOfBounds));
    }

    #[test]
    fn test_exhausted_stone_respawns() {
        let mut sim = Simulation::new_with_seed(small_config(), 11);
        for s in &mut sim.world.stones {
            s.quantity = 0;
        }

        sim.step().unwrap();

        // The open default world always has room to respawn.
        assert!(sim.world.stones.iter().any(|s| s.is_live()));
    }

    #[test]
    fn test_champion_export_import_roundtrip() {
        let config = small_config();
        let steps = config.simulation.steps_per_gen as u64;
        let mut sim = Simulation::new_with_seed(config, 13);
        sim.run_steps(steps).unwrap();

        let json = sim.export_champion().unwrap().expect("champion exists after a generation");
        let before = sim.champion.clone().unwrap();

        sim.import_champion(&json).unwrap();
        assert_eq!(sim.champion.unwrap(), before);
    }

    #[test]
    fn test_import_rejects_malformed_champion_and_keeps_state() {
        let mut sim = Simulation::new_with_seed(small_config(), 17);
        sim.run_steps(sim.config.simulation.steps_per_gen as u64).unwrap();
        let before = sim.champion.clone();

        assert!(sim.import_champion("{\"sensor_angles\": [1.0]}").is_err());
        assert_eq!(sim.champion, before);
    }
}
