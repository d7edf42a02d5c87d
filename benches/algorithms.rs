use captcha_genetics::{
    EvaluationFailure, Evaluator, GaConfig, GeneticSearch, Individual, MutationRate, Selection,
    create_population, crossover, mutate,
};
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use rand::prelude::SeedableRng;
use rand_pcg::Pcg64;

// =============================================================================
// Common evaluators
// =============================================================================

/// Cheap analytic landscape so the benchmarks measure the optimizer itself.
struct LandscapeEval;

impl Evaluator<Individual> for LandscapeEval {
    fn evaluate(&self, g: &Individual) -> Result<f64, EvaluationFailure> {
        let t = (f64::from(g.threshold()) - 90.0).abs() / 60.0;
        let kernels = g.dilate_size() + g.dilate_shape() + g.erode_size() + g.erode_shape();
        let k = f64::from(kernels) / 20.0;
        Ok(1.0 - 0.7 * t - 0.3 * k)
    }
}

// =============================================================================
// Generational search benchmarks
// =============================================================================

fn bench_generation_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("GeneticSearch/step");

    for pop_size in [20, 100, 500].iter() {
        let strategies = [
            ("roulette", Selection::Roulette),
            ("tournament", Selection::tournament()),
        ];
        for (name, selection) in strategies {
            group.throughput(Throughput::Elements(*pop_size as u64));
            group.bench_with_input(BenchmarkId::new(name, pop_size), pop_size, |b, &size| {
                let config = GaConfig::default()
                    .with_population_size(size)
                    .with_generations(2)
                    .with_selection(selection)
                    .with_seed(42);
                b.iter_batched(
                    || GeneticSearch::new(config.clone()).unwrap(),
                    |mut search| {
                        search.step(&LandscapeEval);
                        black_box(search)
                    },
                    criterion::BatchSize::SmallInput,
                );
            });
        }
    }
    group.finish();
}

fn bench_full_run(c: &mut Criterion) {
    c.bench_function("GeneticSearch/run_default", |b| {
        let config = GaConfig::default().with_seed(7);
        b.iter(|| black_box(GeneticSearch::new(config.clone()).unwrap().run(&LandscapeEval)));
    });
}

fn bench_operators(c: &mut Criterion) {
    let mut rng = Pcg64::seed_from_u64(1);
    let parents = create_population(2, &mut rng).unwrap();
    let rate = MutationRate::default();

    c.bench_function("operators/crossover_mutate", |b| {
        b.iter(|| {
            let child = crossover(&parents[0], &parents[1], &mut rng);
            black_box(mutate(&child, rate, &mut rng))
        });
    });
}

// =============================================================================
// Imaging pipeline benchmarks
// =============================================================================

#[cfg(feature = "imaging")]
fn bench_captcha_pipeline(c: &mut Criterion) {
    use captcha_genetics::imaging::CaptchaPipeline;
    use image::{GrayImage, Luma};

    let mut group = c.benchmark_group("CaptchaPipeline/process");
    for side in [64u32, 160, 320].iter() {
        let img =
            GrayImage::from_fn(*side, *side / 2, |x, y| Luma([((x * 31 + y * 17) % 256) as u8]));
        let params = Individual::new(100, 5, 5, 5, 5, 5).unwrap();
        group.throughput(Throughput::Elements(u64::from(img.width() * img.height())));
        group.bench_with_input(BenchmarkId::from_parameter(side), &img, |b, img| {
            b.iter(|| black_box(CaptchaPipeline.process(&params, img)))
        });
    }
    group.finish();
}

#[cfg(not(feature = "imaging"))]
fn bench_captcha_pipeline(_c: &mut Criterion) {}

// =============================================================================
// Criterion setup
// =============================================================================

criterion_group!(
    search_benches,
    bench_generation_step,
    bench_full_run,
    bench_operators,
);

criterion_group!(imaging_benches, bench_captcha_pipeline);

criterion_main!(search_benches, imaging_benches);
