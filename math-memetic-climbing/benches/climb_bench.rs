use criterion::{Criterion, black_box, criterion_group, criterion_main};
use math_memetic_climbing::function_registry::{TestFunction, rastrigin, sphere};
use math_memetic_climbing::{ClimbConfigBuilder, hill_climbing_with_restarts, hollow_distribution};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn bench_hollow_distribution(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0);
    c.bench_function("hollow_distribution_20d", |b| {
        b.iter(|| hollow_distribution(black_box(20), &mut rng))
    });
}

fn bench_climb(c: &mut Criterion) {
    let mut group = c.benchmark_group("hill_climbing");
    group.sample_size(10);
    for (name, func, interval) in [
        ("sphere_10d", sphere as TestFunction, (-10.0, 10.0)),
        ("rastrigin_10d", rastrigin as TestFunction, (-5.12, 5.12)),
    ] {
        let bounds = vec![interval; 10];
        group.bench_function(name, |b| {
            b.iter(|| {
                let config = ClimbConfigBuilder::new()
                    .cycles(50)
                    .max_iterations(1000)
                    .seed(1)
                    .build()
                    .expect("valid config");
                hill_climbing_with_restarts(&func, &bounds, 10, config).expect("valid problem")
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_hollow_distribution, bench_climb);
criterion_main!(benches);
