use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use ixa_seirv::{ParametersBuilder, Simulation};

static POPULATION: usize = 1000;
static SEED: u64 = 123;
static DAYS: usize = 200;

fn full_run() -> Simulation {
    let parameters = ParametersBuilder::default()
        .population(POPULATION)
        .beta(0.3)
        .seed(SEED)
        .build()
        .expect("failed to build parameters");
    let mut simulation = Simulation::new(parameters).expect("invalid parameters");
    simulation.run(DAYS);
    simulation
}

pub fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("seirv full run", |bencher| {
        bencher.iter_with_large_drop(full_run)
    });

    c.bench_function("seirv single step", |bencher| {
        bencher.iter_batched(
            || {
                let parameters = ParametersBuilder::default()
                    .population(POPULATION)
                    .beta(0.3)
                    .seed(SEED)
                    .build()
                    .expect("failed to build parameters");
                let mut simulation = Simulation::new(parameters).expect("invalid parameters");
                // Step into the growth phase so the transmission pass has work to do.
                simulation.run(20);
                simulation
            },
            |mut simulation| simulation.step(),
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
