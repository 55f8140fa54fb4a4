use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use review_sentiment::sentiment::prompt::build_prompt;
use review_sentiment::sentiment::validator::validate_response;

fn create_test_response(shape: &str, explanation_len: usize) -> String {
    let body = format!(
        "{{\"label\": \"Positive\", \"confidence\": 0.87, \"explanation\": \"{}\", \"evidence_phrases\": [\"great\", \"moving\", \"funny\", \"sharp\"]}}",
        "a".repeat(explanation_len)
    );
    match shape {
        "fenced" => format!("```json\n{}\n```", body),
        "bare" => body,
        "prose" => format!("I would say Positive. {}", "a".repeat(explanation_len)),
        _ => String::new(),
    }
}

pub fn validation_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("response_validation");

    for shape in ["fenced", "bare", "prose"] {
        for size in [100, 1000, 10000] {
            let raw = create_test_response(shape, size);

            group.bench_with_input(
                BenchmarkId::new(format!("validate_{}", shape), size),
                &raw,
                |b, raw| {
                    b.iter(|| {
                        let _ = validate_response(black_box(raw));
                    });
                },
            );
        }
    }

    group.finish();
}

pub fn prompt_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("prompt_construction");

    for size in [100, 1000, 10000] {
        let review = "word ".repeat(size / 5);
        group.bench_with_input(BenchmarkId::new("build_prompt", size), &review, |b, review| {
            b.iter(|| build_prompt(black_box(review)));
        });
    }

    group.finish();
}

criterion_group!(benches, validation_benchmark, prompt_benchmark);
criterion_main!(benches);
