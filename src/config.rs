//! Configuration for the simulation.
//!
//! Every tunable the engine consumes lives here: population bounds, sensor
//! and physics constants, reward magnitudes and the evolution schedule.
//! Supports YAML configuration files with sensible defaults.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub world: WorldConfig,
    pub population: PopulationConfig,
    pub genome: GenomeConfig,
    pub physics: PhysicsConfig,
    pub actions: ActionConfig,
    pub rewards: RewardConfig,
    pub evolution: EvolutionConfig,
    pub simulation: SimulationConfig,
    pub logging: LoggingConfig,
}

/// World geometry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldConfig {
    /// World width in world units
    pub width: f32,
    /// World height in world units
    pub height: f32,
    /// Radius of the drop-off base
    pub base_radius: f32,
    /// Radius of every stone deposit
    pub stone_radius: f32,
}

/// Population sizing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopulationConfig {
    /// Target offspring count per generation; actual size is
    /// `1 + clamp(lambda, min_size - 1, max_size - 1)`
    pub lambda: usize,
    /// Lower population bound
    pub min_size: usize,
    /// Upper population bound
    pub max_size: usize,
}

/// Per-output activation choice, fixed by configuration and never evolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    /// Bounded 0..1, used for "desire" outputs
    Sigmoid,
    /// Bounded -1..1, used for turning
    Tanh,
}

/// Network topology and sensor-genome initialization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenomeConfig {
    /// Number of sensor rays per agent
    pub sensor_count: usize,
    /// Hidden layer width
    pub hidden: usize,
    /// Output count; the engine consumes [acceleration, rotation, mine]
    pub outputs: usize,
    /// Activation per output index
    pub output_activations: Vec<Activation>,
    /// Base angular spread between adjacent rays (radians)
    pub sensor_angle_base: f32,
    /// Uniform jitter applied to each initial ray offset
    pub sensor_angle_variation: f32,
    /// Initial sensor range lower bound
    pub sensor_range_min: f32,
    /// Initial sensor range upper bound
    pub sensor_range_max: f32,
    /// Std of Gaussian weight initialization
    pub weight_init_std: f32,
    /// Std of Gaussian bias initialization
    pub bias_init_std: f32,
    /// Sensor-angle mutation noise scale relative to sigma
    pub angle_noise_factor: f32,
    /// Sensor-range mutation noise scale relative to sigma
    pub range_noise_factor: f32,
    /// Hard floor re-applied to sensor range after every mutation
    pub min_sensor_range: f32,
}

impl GenomeConfig {
    /// Input vector width: 3 signals per ray, last-seen angle/distance,
    /// carry flag, and the 3-way state one-hot.
    #[inline]
    pub fn inputs(&self) -> usize {
        3 * self.sensor_count + 6
    }
}

/// Movement integration and collision response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhysicsConfig {
    pub max_speed: f32,
    /// Per-step velocity retention factor
    pub velocity_decay: f32,
    /// Scale applied to the network's acceleration output
    pub acceleration_factor: f32,
    /// Scale applied to the network's rotation output (radians/step)
    pub rotation_factor: f32,
    /// Velocity multiplier on boundary impact (negative reflects)
    pub collision_velocity_factor: f32,
    /// Push-out distance on obstacle overlap
    pub collision_push_distance: f32,
    /// Minimum distance kept from the world edge
    pub boundary_margin: f32,
    /// Magnitude of per-step random heading jitter
    pub random_rotation: f32,
}

/// Action thresholds for the SEEK/MINING/CARRYING state machine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionConfig {
    /// Mine-desire output above this value signals intent to mine
    pub mine_threshold: f32,
    /// Deposit triggers within `base.r + deposit_distance` of base center
    pub deposit_distance: f32,
    /// A stone is mineable within `stone.r + stone_pickup_distance`
    pub stone_pickup_distance: f32,
    /// Consecutive mining ticks required per stone unit
    pub mine_timer_base: u32,
    /// Distance past the base rim at which an agent counts as having left
    pub base_exit_margin: f32,
}

/// Reward magnitudes for the per-step fitness delta and ranking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardConfig {
    pub stone_picked: f64,
    pub stone_delivered: f64,
    pub correct_mine_attempt: f64,
    pub correct_deposit_attempt: f64,
    /// Base penalty for mining with no stone in reach (negative)
    pub wrong_mine_base_penalty: f64,
    /// Exponential experience factor on repeated wrong mining
    pub wrong_mine_experience_multiplier: f64,
    pub wrong_deposit_base_penalty: f64,
    /// Per-step cost while immobilized in MINING
    pub immobile_cost: f64,
    pub boundary_collision: f64,
    pub obstacle_collision: f64,
    pub alive_bonus: f64,
    /// Scale of the near-field bonus for carriers approaching the base
    pub return_to_base_bonus: f64,
    /// Distance at which the near-field bonus kicks in
    pub base_proximity_threshold: f64,
    /// Flat per-step bonus while carrying
    pub carrying_bonus: f64,
    /// Flat per-step bonus once the agent has left the base
    pub exploration_bonus: f64,
    /// Proximity shaping weight while carrying (toward base)
    pub carrying_proximity_weight: f64,
    /// Proximity shaping weight while seeking (toward nearest stone)
    pub seeking_proximity_weight: f64,
    /// Maximum bonus for retracing a previously successful return route
    pub path_memory_bonus: f64,
    /// Point-to-point distance over which path similarity falls to zero
    pub path_memory_tolerance: f32,
    /// Age normalization horizon for the survival ranking metric
    pub survival_age_scale: f64,
    /// Share of the population that must have delivered before
    /// zero-delivery agents are culled from the parent pool
    pub cull_activation_share: f64,
    /// Parent pool never shrinks below this many agents
    pub min_parent_pool: usize,
}

/// Parent selection scheme for crossover and mutation slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionScheme {
    /// k-way tournament on fitness
    Tournament,
    /// Rank-based power-law weighting controlled by `selection_pressure`
    FitnessProportional,
}

/// Per-parameter recombination rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrossoverMixing {
    /// 50/50 coin flip per parameter
    Uniform,
    /// Fitter parent contributes with probability equal to its fitness share
    FitnessWeighted,
}

/// Generational evolution schedule and adaptive-sigma bounds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionConfig {
    pub elite_fraction: f64,
    /// Elites are never fewer than this
    pub min_elite: usize,
    pub crossover_fraction: f64,
    pub mutation_fraction: f64,
    /// Probability that a crossover slot recombines instead of cloning
    /// the fitter parent
    pub crossover_rate: f64,
    /// Parents are drawn from this top fraction of the ranked pool
    pub parent_pool_fraction: f64,
    pub tournament_size: usize,
    pub selection: SelectionScheme,
    /// Power-law exponent for fitness-proportional selection
    pub selection_pressure: f64,
    pub mixing: CrossoverMixing,
    /// Post-recombination noise scale relative to the adaptive sigma
    pub child_noise_factor: f32,
    pub sigma_initial: f32,
    pub sigma_min: f32,
    pub sigma_max: f32,
    /// Sigma multiplier under stagnation
    pub sigma_growth: f32,
    /// Sigma multiplier while progressing
    pub sigma_decay: f32,
    /// Sigma multiplier under low diversity
    pub diversity_growth: f32,
    /// Generations without improvement before sigma grows
    pub stagnation_threshold: u32,
    /// Minimum best-fitness improvement that resets stagnation
    pub stagnation_epsilon: f64,
    /// Mean pairwise genome distance below which sigma grows
    pub diversity_threshold: f32,
    /// Number of diversity samples kept for the running mean
    pub diversity_window: usize,
    /// Number of recent champions kept for momentum extrapolation
    pub champion_history: usize,
    /// Share of exploration slots filled by momentum mutants once
    /// enough champions are banked
    pub momentum_share: f64,
    /// Extrapolation gain along the champion trend
    pub momentum_gain: f32,
}

/// Generation pacing and presentation buffers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Physics ticks per generation
    pub steps_per_gen: u32,
    /// Trail buffer length per agent (presentation only)
    pub trail_length: usize,
    /// Initial stone quantity per expected agent
    pub stones_per_agent: u32,
}

/// Logging and snapshot cadence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Generations between stats log lines
    pub stats_interval: u32,
    /// Generations between automatic snapshots
    pub snapshot_interval: u32,
    /// Log level (error, warn, info, debug, trace)
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            world: WorldConfig::default(),
            population: PopulationConfig::default(),
            genome: GenomeConfig::default(),
            physics: PhysicsConfig::default(),
            actions: ActionConfig::default(),
            rewards: RewardConfig::default(),
            evolution: EvolutionConfig::default(),
            simulation: SimulationConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
            base_radius: 18.0,
            stone_radius: 12.0,
        }
    }
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            lambda: 99,
            min_size: 50,
            max_size: 300,
        }
    }
}

impl Default for GenomeConfig {
    fn default() -> Self {
        Self {
            sensor_count: 5,
            hidden: 8,
            outputs: 3,
            output_activations: vec![Activation::Sigmoid, Activation::Tanh, Activation::Sigmoid],
            sensor_angle_base: 0.35,
            sensor_angle_variation: 0.15,
            sensor_range_min: 80.0,
            sensor_range_max: 220.0,
            weight_init_std: 0.8,
            bias_init_std: 0.5,
            angle_noise_factor: 0.6,
            range_noise_factor: 20.0,
            min_sensor_range: 30.0,
        }
    }
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            max_speed: 2.2,
            velocity_decay: 0.6,
            acceleration_factor: 0.9,
            rotation_factor: 0.12,
            collision_velocity_factor: -0.2,
            collision_push_distance: 4.0,
            boundary_margin: 2.0,
            random_rotation: 0.002,
        }
    }
}

impl Default for ActionConfig {
    fn default() -> Self {
        Self {
            mine_threshold: 0.6,
            deposit_distance: 14.0,
            stone_pickup_distance: 12.0,
            mine_timer_base: 30,
            base_exit_margin: 25.0,
        }
    }
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            stone_picked: 2000.0,
            stone_delivered: 5000.0,
            correct_mine_attempt: 2.0,
            correct_deposit_attempt: 1.0,
            wrong_mine_base_penalty: -2.0,
            wrong_mine_experience_multiplier: 1.8,
            wrong_deposit_base_penalty: -1.0,
            immobile_cost: -0.5,
            boundary_collision: -6.0,
            obstacle_collision: -8.0,
            alive_bonus: 0.01,
            return_to_base_bonus: 100.0,
            base_proximity_threshold: 80.0,
            carrying_bonus: 10.0,
            exploration_bonus: 20.0,
            carrying_proximity_weight: 15.0,
            seeking_proximity_weight: 5.0,
            path_memory_bonus: 50.0,
            path_memory_tolerance: 100.0,
            survival_age_scale: 1000.0,
            cull_activation_share: 0.05,
            min_parent_pool: 10,
        }
    }
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            elite_fraction: 0.15,
            min_elite: 5,
            crossover_fraction: 0.6,
            mutation_fraction: 0.2,
            crossover_rate: 0.7,
            parent_pool_fraction: 0.3,
            tournament_size: 3,
            selection: SelectionScheme::Tournament,
            selection_pressure: 1.5,
            mixing: CrossoverMixing::Uniform,
            child_noise_factor: 0.3,
            sigma_initial: 0.12,
            sigma_min: 0.05,
            sigma_max: 0.3,
            sigma_growth: 1.1,
            sigma_decay: 0.99,
            diversity_growth: 1.05,
            stagnation_threshold: 10,
            stagnation_epsilon: 0.01,
            diversity_threshold: 0.1,
            diversity_window: 20,
            champion_history: 5,
            momentum_share: 0.5,
            momentum_gain: 2.0,
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            steps_per_gen: 1800,
            trail_length: 60,
            stones_per_agent: 3,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            stats_interval: 1,
            snapshot_interval: 25,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a YAML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if self.world.width <= 0.0 || self.world.height <= 0.0 {
            return Err("world dimensions must be positive".to_string());
        }
        if self.world.width < self.world.base_radius * 4.0
            || self.world.height < self.world.base_radius * 4.0
        {
            return Err("world too small for the base".to_string());
        }
        if self.population.min_size < 2 {
            return Err("min_size must be at least 2".to_string());
        }
        if self.population.min_size > self.population.max_size {
            return Err("min_size cannot exceed max_size".to_string());
        }
        if self.genome.sensor_count == 0 || self.genome.hidden == 0 {
            return Err("sensor_count and hidden must be > 0".to_string());
        }
        if self.genome.outputs != 3 {
            return Err("engine expects exactly 3 outputs (accel, rotation, mine)".to_string());
        }
        if self.genome.output_activations.len() != self.genome.outputs {
            return Err("output_activations length must match outputs".to_string());
        }
        if self.genome.sensor_range_min > self.genome.sensor_range_max {
            return Err("sensor_range_min cannot exceed sensor_range_max".to_string());
        }
        if self.genome.min_sensor_range <= 0.0 {
            return Err("min_sensor_range must be positive".to_string());
        }
        if self.actions.mine_timer_base == 0 {
            return Err("mine_timer_base must be at least 1".to_string());
        }
        let fractions = self.evolution.elite_fraction
            + self.evolution.crossover_fraction
            + self.evolution.mutation_fraction;
        if !(0.0..=1.0).contains(&fractions) {
            return Err("elite + crossover + mutation fractions must stay within 1.0".to_string());
        }
        if self.evolution.sigma_min > self.evolution.sigma_max {
            return Err("sigma_min cannot exceed sigma_max".to_string());
        }
        if self.evolution.sigma_initial < self.evolution.sigma_min
            || self.evolution.sigma_initial > self.evolution.sigma_max
        {
            return Err("sigma_initial must lie within [sigma_min, sigma_max]".to_string());
        }
        if !(0.0..=1.0).contains(&self.evolution.momentum_share) {
            return Err("momentum_share must lie within [0, 1]".to_string());
        }
        if self.evolution.tournament_size == 0 {
            return Err("tournament_size must be at least 1".to_string());
        }
        if self.evolution.champion_history < 3 {
            return Err("champion_history must be at least 3 for momentum".to_string());
        }
        if self.simulation.steps_per_gen == 0 {
            return Err("steps_per_gen must be at least 1".to_string());
        }
        if !(0.0..=1.0).contains(&self.rewards.cull_activation_share) {
            return Err("cull_activation_share must lie within [0, 1]".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let loaded: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(config.population.lambda, loaded.population.lambda);
        assert_eq!(config.genome.output_activations, loaded.genome.output_activations);
        assert_eq!(config.rewards.stone_delivered, loaded.rewards.stone_delivered);
    }

    #[test]
    fn test_input_width() {
        let config = Config::default();
        assert_eq!(config.genome.inputs(), 21);
    }

    #[test]
    fn test_validation_rejects_bad_fractions() {
        let mut config = Config::default();
        config.evolution.crossover_fraction = 0.9;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_output_mismatch() {
        let mut config = Config::default();
        config.genome.output_activations.pop();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_inverted_sigma_bounds() {
        let mut config = Config::default();
        config.evolution.sigma_min = 0.5;
        assert!(config.validate().is_err());
    }
}
