// Criterion benchmarks for CareerPath

use careerpath::core::{parse_scorer_output, FallbackScorer};
use careerpath::services::recommender::clean_recommendations;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

const SKILL_POOL: [&str; 12] = [
    "python", "pandas", "sql", "docker", "react", "kotlin", "aws", "linux", "c++", "excel", "rust", "figma",
];

fn skill_list(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| SKILL_POOL[i % SKILL_POOL.len()].to_string())
        .collect()
}

/// Scorer output with `noise` log lines ahead of the result
fn noisy_output(noise: usize) -> String {
    let mut output = String::new();
    for i in 0..noise {
        output.push_str(&format!("INFO step {} of {} [features=42]\n", i, noise));
    }
    output.push_str("{\"status\": \"success\", \"recommendations\": [\"Data Scientist\", \"Data Analyst\", \"Cloud Engineer\"]}\n");
    output
}

fn bench_fallback(c: &mut Criterion) {
    let scorer = FallbackScorer::default();

    let mut group = c.benchmark_group("fallback");

    for skill_count in [1, 5, 20].iter() {
        let skills = skill_list(*skill_count);

        group.bench_with_input(
            BenchmarkId::new("recommend", skill_count),
            skill_count,
            |b, _| {
                b.iter(|| scorer.recommend(black_box(&skills)));
            },
        );
    }

    group.finish();
}

fn bench_output_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("output_parser");

    for noise in [0, 100, 1000].iter() {
        let output = noisy_output(*noise);

        group.bench_with_input(
            BenchmarkId::new("parse_scorer_output", noise),
            noise,
            |b, _| {
                b.iter(|| parse_scorer_output(black_box(&output)));
            },
        );
    }

    group.finish();
}

fn bench_clean_recommendations(c: &mut Criterion) {
    let items: Vec<String> = (0..50)
        .map(|i| if i % 3 == 0 { "QA".to_string() } else { format!("  Role {}  ", i) })
        .collect();

    c.bench_function("clean_recommendations_50", |b| {
        b.iter(|| clean_recommendations(black_box(items.clone()), black_box(5)));
    });
}

criterion_group!(benches, bench_fallback, bench_output_parsing, bench_clean_recommendations);

criterion_main!(benches);
