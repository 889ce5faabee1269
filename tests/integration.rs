//! Integration tests for QUARRY

use quarry::snapshot::Snapshot;
use quarry::{Config, Simulation};

fn small_config() -> Config {
    let mut config = Config::default();
    config.population.lambda = 19;
    config.population.min_size = 10;
    config.population.max_size = 40;
    config.simulation.steps_per_gen = 60;
    config
}

#[test]
fn test_full_simulation_cycle() {
    let config = small_config();
    let steps_per_gen = config.simulation.steps_per_gen as u64;
    let mut sim = Simulation::new_with_seed(config, 12345);
    let pop_size = sim.population.len();

    // Three full generations.
    sim.run_steps(steps_per_gen * 3).expect("world stays sane");

    assert_eq!(sim.generation, 3);
    assert_eq!(sim.population.len(), pop_size);
    assert!(sim.champion.is_some());
    assert_eq!(sim.stats_history.snapshots.len(), 3);

    // Agents stay inside the world and hold finite genomes.
    for agent in &sim.population {
        assert!(agent.x >= 0.0 && agent.x <= sim.world.width);
        assert!(agent.y >= 0.0 && agent.y <= sim.world.height);
        assert!(agent.genome.is_valid());
        assert!(agent.fitness.is_finite());
    }

    // Every stone honors the non-negative quantity invariant by type, and
    // the base stayed put.
    assert!(sim.world.contains(sim.world.base.x, sim.world.base.y));
}

#[test]
fn test_seeded_runs_are_identical() {
    let config = small_config();
    let steps = config.simulation.steps_per_gen as u64 * 2 + 17;

    let mut a = Simulation::new_with_seed(config.clone(), 99999);
    let mut b = Simulation::new_with_seed(config, 99999);

    a.run_steps(steps).unwrap();
    b.run_steps(steps).unwrap();

    assert_eq!(a.generation, b.generation);
    assert_eq!(a.world.stones_delivered, b.world.stones_delivered);
    assert_eq!(a.best_fitness.to_bits(), b.best_fitness.to_bits());
    assert_eq!(a.champion, b.champion);

    assert_eq!(a.population.len(), b.population.len());
    for (x, y) in a.population.iter().zip(&b.population) {
        assert_eq!(x.x.to_bits(), y.x.to_bits());
        assert_eq!(x.y.to_bits(), y.y.to_bits());
        assert_eq!(x.fitness.to_bits(), y.fitness.to_bits());
        assert_eq!(x.genome, y.genome);
        assert_eq!(x.state, y.state);
    }
}

#[test]
fn test_different_seeds_diverge() {
    let config = small_config();

    let mut a = Simulation::new_with_seed(config.clone(), 1);
    let mut b = Simulation::new_with_seed(config, 2);

    a.run_steps(50).unwrap();
    b.run_steps(50).unwrap();

    let same = a
        .population
        .iter()
        .zip(&b.population)
        .all(|(x, y)| x.x.to_bits() == y.x.to_bits() && x.y.to_bits() == y.y.to_bits());
    assert!(!same, "different seeds should not produce identical runs");
}

#[test]
fn test_snapshot_persistence() {
    let config = small_config();
    let steps_per_gen = config.simulation.steps_per_gen as u64;
    let mut sim = Simulation::new_with_seed(config, 54321);
    sim.run_steps(steps_per_gen * 2).unwrap();

    let snapshot = sim.snapshot();
    let temp_path = "/tmp/quarry_integration_snapshot.bin";
    snapshot.save(temp_path).expect("failed to save snapshot");

    let loaded = Snapshot::load(temp_path).expect("failed to load snapshot");

    assert_eq!(loaded.generation, sim.generation);
    assert_eq!(loaded.seed, sim.seed());
    assert_eq!(loaded.population.len(), sim.population.len());
    assert_eq!(loaded.evolution_state.sigma, sim.sigma());
    for (x, y) in loaded.population.iter().zip(&sim.population) {
        assert_eq!(x.genome, y.genome);
    }

    // Restore and keep running.
    let mut restored = Simulation::from_snapshot(loaded);
    assert_eq!(restored.generation, sim.generation);
    restored.run_steps(steps_per_gen).unwrap();
    assert_eq!(restored.generation, 3);

    std::fs::remove_file(temp_path).ok();
}

#[test]
fn test_population_size_stable_across_generations() {
    let config = small_config();
    let steps_per_gen = config.simulation.steps_per_gen as u64;
    let mut sim = Simulation::new_with_seed(config, 11111);
    let expected = sim.population.len();

    for _ in 0..5 {
        sim.run_steps(steps_per_gen).unwrap();
        assert_eq!(sim.population.len(), expected);
    }
}

#[test]
fn test_champion_roundtrips_through_json() {
    let config = small_config();
    let steps_per_gen = config.simulation.steps_per_gen as u64;
    let mut sim = Simulation::new_with_seed(config, 2024);
    sim.run_steps(steps_per_gen).unwrap();

    let json = sim
        .export_champion()
        .unwrap()
        .expect("champion exists after a generation");
    let champion = sim.champion.clone().unwrap();

    let mut other = Simulation::new_with_seed(small_config(), 77);
    other.import_champion(&json).unwrap();

    assert_eq!(other.champion.unwrap(), champion);
}

#[test]
fn test_world_replenishes_between_generations() {
    let config = small_config();
    let steps_per_gen = config.simulation.steps_per_gen as u64;
    let mut sim = Simulation::new_with_seed(config, 31337);

    sim.run_steps(steps_per_gen).unwrap();

    let total = sim.world.total_stone_quantity();
    assert!(
        total >= sim.population.len() as u32 + 2,
        "stone field must be replenished to the floor, got {}",
        total
    );
}

#[test]
fn test_sigma_stays_within_bounds_over_many_generations() {
    let config = small_config();
    let steps_per_gen = config.simulation.steps_per_gen as u64;
    let sigma_min = config.evolution.sigma_min;
    let sigma_max = config.evolution.sigma_max;
    let mut sim = Simulation::new_with_seed(config, 5150);

    for _ in 0..10 {
        sim.run_steps(steps_per_gen).unwrap();
        assert!(sim.sigma() >= sigma_min - 1e-6);
        assert!(sim.sigma() <= sigma_max + 1e-6);
    }
}
