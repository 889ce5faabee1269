//! QUARRY - CLI entry point.

use clap::{Parser, Subcommand};
use quarry::snapshot::{Snapshot, SnapshotManager};
use quarry::{benchmark, Config, Simulation};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "quarry")]
#[command(version)]
#[command(about = "Neuroevolution sandbox: foraging agents that mine stones and haul them home")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a new simulation
    Run {
        /// Configuration file (YAML)
        #[arg(short, long, default_value = "config.yaml")]
        config: PathBuf,

        /// Number of generations to simulate
        #[arg(short, long, default_value = "100")]
        generations: u32,

        /// Output directory for snapshots
        #[arg(short, long, default_value = "output")]
        output: PathBuf,

        /// Random seed for reproducibility
        #[arg(long)]
        seed: Option<u64>,

        /// Quiet mode (minimal output)
        #[arg(short, long)]
        quiet: bool,
    },

    /// Resume simulation from a snapshot
    Resume {
        /// Snapshot file to resume from
        #[arg(short, long)]
        snapshot: PathBuf,

        /// Number of additional generations
        #[arg(short, long, default_value = "100")]
        generations: u32,

        /// Output directory
        #[arg(short, long, default_value = "output")]
        output: PathBuf,
    },

    /// Run performance benchmark
    Benchmark {
        /// Number of generations
        #[arg(short, long, default_value = "5")]
        generations: u32,

        /// Population lambda
        #[arg(short, long, default_value = "99")]
        lambda: usize,
    },

    /// Generate default configuration file
    Init {
        /// Output path
        #[arg(short, long, default_value = "config.yaml")]
        output: PathBuf,
    },

    /// Analyze a snapshot file
    Analyze {
        /// Snapshot file
        snapshot: PathBuf,

        /// Write the champion genome as JSON to this path
        #[arg(long)]
        champion: Option<PathBuf>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            generations,
            output,
            seed,
            quiet,
        } => run_simulation(config, generations, output, seed, quiet),

        Commands::Resume {
            snapshot,
            generations,
            output,
        } => resume_simulation(snapshot, generations, output),

        Commands::Benchmark { generations, lambda } => run_benchmark(generations, lambda),

        Commands::Init { output } => generate_config(output),

        Commands::Analyze { snapshot, champion } => analyze_snapshot(snapshot, champion),
    }
}

fn run_simulation(
    config_path: PathBuf,
    generations: u32,
    output: PathBuf,
    seed: Option<u64>,
    quiet: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = if config_path.exists() {
        println!("Loading config from: {:?}", config_path);
        Config::from_file(&config_path)?
    } else {
        println!("Using default configuration");
        Config::default()
    };

    std::fs::create_dir_all(&output)?;

    let mut sim = if let Some(s) = seed {
        println!("Using seed: {}", s);
        Simulation::new_with_seed(config.clone(), s)
    } else {
        Simulation::new(config.clone())
    };

    println!("Starting simulation");
    println!("  Population: {}", sim.population.len());
    println!("  World: {}x{}", config.world.width, config.world.height);
    println!("  Stones: {}", sim.world.stones.len());
    println!("  Generations: {}", generations);
    println!();

    let mut snapshot_mgr = SnapshotManager::new(
        output.to_string_lossy().to_string(),
        config.logging.snapshot_interval,
        10, // Keep last 10 snapshots
    );

    let start = Instant::now();
    let stats_interval = config.logging.stats_interval.max(1);
    let target = sim.generation + generations;

    while sim.generation < target {
        if let Err(e) = sim.run_generations(1) {
            eprintln!("Simulation halted: {}", e);
            break;
        }

        if !quiet && sim.generation % stats_interval == 0 {
            if let Some(stats) = sim.stats_history.latest() {
                println!("{}", stats.summary());
            }
        }

        if snapshot_mgr.should_save(sim.generation) {
            match snapshot_mgr.save(&sim.snapshot()) {
                Ok(path) => {
                    if !quiet {
                        println!("  Snapshot saved: {}", path);
                    }
                }
                Err(e) => eprintln!("  Snapshot error: {}", e),
            }
        }
    }

    let elapsed = start.elapsed();
    let total_steps = sim.generation as u64 * config.simulation.steps_per_gen as u64;

    println!();
    println!("=== Simulation Complete ===");
    println!("Time: {:.2}s", elapsed.as_secs_f64());
    println!("Generations: {}", sim.generation);
    println!("Speed: {:.1} steps/s", total_steps as f64 / elapsed.as_secs_f64());
    println!("Best fitness: {:.1}", sim.best_fitness);
    println!("Best delivered: {}", sim.best_delivered);
    println!("Total stones delivered: {}", sim.world.stones_delivered);

    let final_path = output.join("snapshot_final.bin");
    sim.snapshot().save(&final_path)?;
    println!("Final snapshot: {:?}", final_path);

    let stats_path = output.join("stats_history.json");
    sim.stats_history.save(stats_path.to_string_lossy().as_ref())?;
    println!("Stats history: {:?}", stats_path);

    if let Some(champion) = sim.export_champion()? {
        let champion_path = output.join("champion.json");
        std::fs::write(&champion_path, champion)?;
        println!("Champion genome: {:?}", champion_path);
    }

    Ok(())
}

fn resume_simulation(
    snapshot_path: PathBuf,
    generations: u32,
    output: PathBuf,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("Loading snapshot: {:?}", snapshot_path);

    let snapshot = Snapshot::load(&snapshot_path)?;
    let mut sim = Simulation::from_snapshot(snapshot);

    println!("Resumed at generation {}", sim.generation);
    println!("Population: {}", sim.population.len());
    println!("Running {} additional generations", generations);
    println!();

    std::fs::create_dir_all(&output)?;

    let mut snapshot_mgr = SnapshotManager::new(
        output.to_string_lossy().to_string(),
        sim.config.logging.snapshot_interval,
        10,
    );

    let start = Instant::now();
    let target = sim.generation + generations;

    while sim.generation < target {
        if let Err(e) = sim.run_generations(1) {
            eprintln!("Simulation halted: {}", e);
            break;
        }

        if let Some(stats) = sim.stats_history.latest() {
            println!("{}", stats.summary());
        }

        if snapshot_mgr.should_save(sim.generation) {
            if let Ok(path) = snapshot_mgr.save(&sim.snapshot()) {
                println!("  Snapshot: {}", path);
            }
        }
    }

    let elapsed = start.elapsed();
    println!();
    println!("=== Resume Complete ===");
    println!("Time: {:.2}s", elapsed.as_secs_f64());
    println!("Generation: {}", sim.generation);
    println!("Best fitness: {:.1}", sim.best_fitness);

    let final_path = output.join("snapshot_final.bin");
    sim.snapshot().save(&final_path)?;
    println!("Final snapshot: {:?}", final_path);

    Ok(())
}

fn run_benchmark(generations: u32, lambda: usize) -> Result<(), Box<dyn std::error::Error>> {
    println!("Benchmarking {} generations with lambda {}...", generations, lambda);
    let result = benchmark(generations, lambda);
    println!("{}", result);
    Ok(())
}

fn generate_config(output: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::default();
    config.save(&output)?;
    println!("Default configuration written to {:?}", output);
    Ok(())
}

fn analyze_snapshot(
    snapshot_path: PathBuf,
    champion_out: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let snapshot = Snapshot::load(&snapshot_path)?;

    println!("=== Snapshot Analysis ===");
    println!("Version: {}", snapshot.version);
    println!("Seed: {}", snapshot.seed);
    println!("Generation: {}", snapshot.generation);
    println!("Population: {}", snapshot.population.len());
    println!("Best fitness: {:.1}", snapshot.best_fitness);
    println!("Best delivered: {}", snapshot.best_delivered);
    println!("Stones delivered: {}", snapshot.world.stones_delivered);
    println!("Live stones: {}", snapshot.world.stones.iter().filter(|s| s.is_live()).count());
    println!("Sigma: {:.3}", snapshot.evolution_state.sigma);
    println!("Stagnation: {}", snapshot.evolution_state.stagnation);

    let deliverers = snapshot.population.iter().filter(|a| a.deliveries > 0).count();
    println!("Agents with deliveries: {}/{}", deliverers, snapshot.population.len());

    if let Some(path) = champion_out {
        match &snapshot.champion {
            Some(genome) => {
                std::fs::write(&path, genome.to_json()?)?;
                println!("Champion genome written to {:?}", path);
            }
            None => println!("Snapshot holds no champion yet"),
        }
    }

    Ok(())
}
