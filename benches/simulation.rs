//! Performance benchmarks for QUARRY

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use quarry::config::GenomeConfig;
use quarry::{Config, Genome, Simulation};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn benchmark_simulation_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("simulation_step");

    for lambda in [50usize, 100, 200].iter() {
        let mut config = Config::default();
        config.population.lambda = *lambda;
        config.population.max_size = 300;

        let mut sim = Simulation::new_with_seed(config, 42);

        // Warm up
        sim.run_steps(10).unwrap();

        group.bench_with_input(BenchmarkId::new("lambda", lambda), lambda, |b, _| {
            b.iter(|| {
                sim.step().unwrap();
            });
        });
    }

    group.finish();
}

fn benchmark_genome_feed(c: &mut Criterion) {
    let cfg = GenomeConfig::default();
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let genome = Genome::random(&cfg, &mut rng);
    let inputs = vec![0.5f32; cfg.inputs()];

    c.bench_function("genome_feed", |b| {
        b.iter(|| genome.feed(black_box(&inputs), &cfg.output_activations));
    });
}

fn benchmark_genome_mutate(c: &mut Criterion) {
    let cfg = GenomeConfig::default();
    let mut rng = ChaCha8Rng::seed_from_u64(9);
    let genome = Genome::random(&cfg, &mut rng);

    c.bench_function("genome_mutate", |b| {
        b.iter(|| genome.mutate(&cfg, &mut rng, black_box(0.12)));
    });
}

fn benchmark_generation_boundary(c: &mut Criterion) {
    let mut config = Config::default();
    config.population.lambda = 99;
    config.simulation.steps_per_gen = 1;

    let mut sim = Simulation::new_with_seed(config, 11);

    c.bench_function("generation_boundary", |b| {
        b.iter(|| {
            // steps_per_gen == 1 so every step runs a full evolution cycle.
            sim.step().unwrap();
        });
    });
}

criterion_group!(
    benches,
    benchmark_simulation_step,
    benchmark_genome_feed,
    benchmark_genome_mutate,
    benchmark_generation_boundary
);
criterion_main!(benches);
