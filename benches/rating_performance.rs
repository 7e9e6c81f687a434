//! Performance benchmarks for rating calculations and match validation

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pingpong_ladder::metrics::MetricsCollector;
use pingpong_ladder::rating::{compute_rating_update, EloRatingCalculator, RatingCalculator};
use pingpong_ladder::rules::{validate_match, validate_set_counts};
use pingpong_ladder::storage::InMemoryStorage;
use pingpong_ladder::types::{MatchInput, MatchRequest, SetScore};
use pingpong_ladder::LadderService;
use std::sync::Arc;

fn create_bench_service() -> LadderService {
    LadderService::new(
        Arc::new(InMemoryStorage::new()),
        Arc::new(EloRatingCalculator::default()),
        Arc::new(MetricsCollector::new().unwrap()),
    )
}

fn bench_rating_calculations(c: &mut Criterion) {
    let calculator = EloRatingCalculator::default();

    let pairs = vec![(1500, 1500), (1620, 1480), (1200, 1900), (2400, 800)];

    c.bench_function("compute_rating_update", |b| {
        b.iter(|| {
            for &(winner, loser) in &pairs {
                black_box(compute_rating_update(black_box(winner), black_box(loser), 32));
            }
        })
    });

    c.bench_function("calculator_rating_update", |b| {
        b.iter(|| black_box(calculator.rating_update(black_box(1540), black_box(1460))))
    });
}

fn bench_match_validation(c: &mut Criterion) {
    let best_of_five = vec![
        SetScore::new(11, 9),
        SetScore::new(8, 11),
        SetScore::new(14, 12),
        SetScore::new(5, 11),
        SetScore::new(11, 7),
    ];

    c.bench_function("validate_match_bo5", |b| {
        b.iter(|| black_box(validate_match(black_box(5), black_box(&best_of_five))))
    });

    c.bench_function("validate_set_counts_bo5", |b| {
        b.iter(|| black_box(validate_set_counts(black_box(5), black_box(3), black_box(2))))
    });
}

fn bench_match_registration(c: &mut Criterion) {
    let service = create_bench_service();
    let alice = service.register_player("Alice").unwrap();
    let bob = service.register_player("Bob").unwrap();

    c.bench_function("register_match_bo3", |b| {
        b.iter(|| {
            let request = MatchRequest {
                player1_id: alice.id,
                player2_id: bob.id,
                match_format: 3,
                input: MatchInput::PerSetScores {
                    set_scores: vec![SetScore::new(11, 6), SetScore::new(11, 8)],
                },
            };
            black_box(service.register_match(request).unwrap())
        })
    });
}

criterion_group!(
    benches,
    bench_rating_calculations,
    bench_match_validation,
    bench_match_registration
);
criterion_main!(benches);
