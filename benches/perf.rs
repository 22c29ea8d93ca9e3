use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use matchday_grader::gameweek::{PredictionRecord, summarize};
use matchday_grader::{MatchResult, classify, normalize};

const PREDICTIONS: &[&str] = &[
    "Home Win",
    "Over 2.5 Goals",
    "OverUnderCorners: Over 9.5",
    "OverUnderCards: Under 4.5",
    "BTTS Yes",
    "H(1.80), X(3.40)",
    "Casa Pia -1.5 Asian Handicap",
    "1X & Under 3.5 Goals",
    "Benfica Over 1.5 Goals",
    "Double Chance X2",
];

fn sample_result(idx: usize) -> MatchResult {
    MatchResult::new("Casa Pia", "Benfica")
        .with_score((idx % 4) as f64, (idx % 3) as f64)
        .with_corners((idx % 13) as f64)
        .with_cards((idx % 5) as f64, (idx % 4) as f64)
}

fn bench_normalize(c: &mut Criterion) {
    c.bench_function("normalize", |b| {
        b.iter(|| {
            for p in PREDICTIONS {
                black_box(normalize(black_box(p)));
            }
        })
    });
}

fn bench_classify(c: &mut Criterion) {
    let result = sample_result(5);
    c.bench_function("classify_mixed_markets", |b| {
        b.iter(|| {
            for p in PREDICTIONS {
                black_box(classify(black_box(p), black_box(&result)));
            }
        })
    });
}

fn bench_summarize(c: &mut Criterion) {
    let records: Vec<PredictionRecord> = (0..2_000)
        .map(|idx| PredictionRecord {
            country: format!("Country {}", idx % 12),
            league_name: format!("League {}", idx % 7),
            rec_prediction: Some(PREDICTIONS[idx % PREDICTIONS.len()].to_string()),
            result: sample_result(idx),
        })
        .collect();

    c.bench_function("summarize_2000_records", |b| {
        b.iter(|| {
            let summary = summarize(black_box(&records));
            black_box(summary.overall.total);
        })
    });
}

criterion_group!(benches, bench_normalize, bench_classify, bench_summarize);
criterion_main!(benches);
