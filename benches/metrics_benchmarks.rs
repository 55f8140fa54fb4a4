use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use review_sentiment::batch::PredictedLabel;
use review_sentiment::metrics::{compute_from_predictions, ScoredPrediction};
use review_sentiment::sentiment::Sentiment;

fn create_predictions(count: usize) -> Vec<ScoredPrediction> {
    (0..count)
        .map(|i| {
            let true_label = Sentiment::ALL[i % 3];
            // every seventh row is wrong, every thirteenth failed
            let predicted = if i % 13 == 0 {
                PredictedLabel::Error
            } else if i % 7 == 0 {
                Sentiment::ALL[(i + 1) % 3].into()
            } else {
                true_label.into()
            };
            ScoredPrediction {
                true_label,
                predicted,
                confidence: (i % 100) as f64 / 100.0,
            }
        })
        .collect()
}

pub fn metrics_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("metrics");

    for size in [100, 10_000, 100_000] {
        let rows = create_predictions(size);
        group.bench_with_input(BenchmarkId::new("compute", size), &rows, |b, rows| {
            b.iter(|| compute_from_predictions(black_box(rows)));
        });

        let report = compute_from_predictions(&rows).unwrap();
        group.bench_with_input(BenchmarkId::new("render", size), &report, |b, report| {
            b.iter(|| report.to_string());
        });
    }

    group.finish();
}

criterion_group!(benches, metrics_benchmark);
criterion_main!(benches);
