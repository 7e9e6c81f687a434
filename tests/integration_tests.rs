//! Integration tests for the pingpong-ladder service
//!
//! These tests validate the system working together, including:
//! - A full ladder season through the service with real Elo ratings
//! - Persistence across restarts with the JSON file storage
//! - Failed writes leaving the ladder untouched
//! - Concurrent registrations not losing rating updates
//! - The HTTP API wired to a custom rating calculator

mod fixtures;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use pingpong_ladder::api;
use pingpong_ladder::config::AppConfig;
use pingpong_ladder::error::LadderError;
use pingpong_ladder::rating::EloRatingCalculator;
use pingpong_ladder::rules::RuleViolation;
use pingpong_ladder::service::AppState;
use pingpong_ladder::storage::{InMemoryStorage, JsonFileStorage, LadderStorage};
use pingpong_ladder::types::Side;
use serde_json::{json, Value};
use std::sync::Arc;
use std::thread;
use tower::ServiceExt;

use fixtures::{counts, create_service, per_set, scratch_file, FixedDeltaCalculator, FlakyStorage};

#[test]
fn test_complete_ladder_season() {
    let service = create_service(
        Arc::new(InMemoryStorage::new()),
        Arc::new(EloRatingCalculator::default()),
    );

    let alice = service.register_player("Alice").unwrap();
    let bob = service.register_player("Bob").unwrap();
    let carl = service.register_player("Carl").unwrap();

    // Step 1: even match, ratings move by k/2
    let outcome = service
        .register_match(per_set(alice.id, bob.id, 3, &[(11, 7), (11, 9)]))
        .unwrap();
    assert_eq!(outcome.winner, Side::Player1);
    assert_eq!(outcome.player1_rating_change, 16);

    // Step 2: aggregate result, player 2 wins
    let outcome = service
        .register_match(counts(carl.id, alice.id, 5, 2, 3))
        .unwrap();
    assert_eq!(outcome.winner, Side::Player2);
    assert!(outcome.player2_rating_change > 0);
    assert!(outcome.player2_rating_change < 16);

    // Step 3: rejected reports change nothing
    let before = service.leaderboard().unwrap();
    assert!(matches!(
        service.register_match(per_set(bob.id, carl.id, 1, &[(11, 10)])),
        Err(LadderError::InvalidMatch(RuleViolation::InvalidSet { set: 1, .. }))
    ));
    assert!(matches!(
        service.register_match(counts(bob.id, carl.id, 3, 2, 2)),
        Err(LadderError::InvalidMatch(RuleViolation::BothReachedSetsToWin { sets_to_win: 2 }))
    ));
    assert!(matches!(
        service.register_match(counts(bob.id, carl.id, 4, 2, 1)),
        Err(LadderError::InvalidMatch(RuleViolation::InvalidFormat { format: 4 }))
    ));
    assert_eq!(service.leaderboard().unwrap(), before);

    // Step 4: standings and history
    let leaderboard = service.leaderboard().unwrap();
    assert_eq!(leaderboard[0].name, "Alice");
    assert_eq!((leaderboard[0].wins, leaderboard[0].losses), (2, 0));

    let profile = service.player_profile(alice.id).unwrap();
    assert_eq!(profile.games_played, 2);
    assert_eq!(profile.win_rate, 100.0);
    assert!(profile.nemesis.is_none());

    let history = service.player_matches(bob.id).unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].player1_name, "Alice");

    let total: i64 = leaderboard.iter().map(|p| p.rating).sum();
    assert_eq!(total, 3 * 1500);
}

#[test]
fn test_ladder_survives_restart() {
    let path = scratch_file("restart");

    {
        let storage = Arc::new(JsonFileStorage::open(&path).unwrap());
        let service = create_service(storage, Arc::new(EloRatingCalculator::default()));

        let alice = service.register_player("Alice").unwrap();
        let bob = service.register_player("Bob").unwrap();
        service
            .register_match(per_set(alice.id, bob.id, 1, &[(13, 11)]))
            .unwrap();
    }

    let storage = Arc::new(JsonFileStorage::open(&path).unwrap());
    assert_eq!(storage.player_count().unwrap(), 2);
    assert_eq!(storage.match_count().unwrap(), 1);

    let service = create_service(storage, Arc::new(EloRatingCalculator::default()));
    let alice = service.get_player(1).unwrap();
    assert_eq!(alice.rating, 1516);

    let carl = service.register_player("Carl").unwrap();
    assert_eq!(carl.id, 3);

    let recent = service.recent_matches().unwrap();
    assert_eq!(recent[0].record.set_scores.as_ref().map(Vec::len), Some(1));

    std::fs::remove_file(&path).ok();
}

#[test]
fn test_failed_write_leaves_ladder_untouched() {
    let storage = Arc::new(FlakyStorage::new());
    let calculator = Arc::new(FixedDeltaCalculator::new(10));
    let service = create_service(storage.clone(), calculator.clone());

    let alice = service.register_player("Alice").unwrap();
    let bob = service.register_player("Bob").unwrap();
    assert_eq!(alice.rating, 1000);

    storage.fail_match_writes(true);
    let result = service.register_match(per_set(alice.id, bob.id, 1, &[(11, 2)]));
    assert!(matches!(result, Err(LadderError::StorageError { .. })));
    assert_eq!(storage.failed_writes(), 1);
    assert_eq!(service.get_player(alice.id).unwrap().rating, 1000);
    assert_eq!(service.stats().unwrap().matches, 0);

    storage.fail_match_writes(false);
    service
        .register_match(per_set(alice.id, bob.id, 1, &[(11, 2)]))
        .unwrap();
    assert_eq!(service.get_player(alice.id).unwrap().rating, 1010);
    assert_eq!(service.get_player(bob.id).unwrap().rating, 990);
}

#[test]
fn test_failed_snapshot_write_keeps_ratings() {
    let dir = scratch_file("unwritable").with_extension("d");
    let storage = Arc::new(JsonFileStorage::open(dir.join("ladder.json")).unwrap());
    let service = create_service(storage, Arc::new(EloRatingCalculator::default()));

    let alice = service.register_player("Alice").unwrap();
    let bob = service.register_player("Bob").unwrap();

    // The data directory turns into a regular file, so every save fails
    std::fs::remove_dir_all(&dir).unwrap();
    std::fs::write(&dir, "not a directory").unwrap();

    let result = service.register_match(per_set(alice.id, bob.id, 3, &[(11, 4), (11, 6)]));
    assert!(matches!(result, Err(LadderError::StorageError { .. })));
    assert!(matches!(
        service.register_player("Carl"),
        Err(LadderError::StorageError { .. })
    ));

    let alice = service.get_player(alice.id).unwrap();
    assert_eq!((alice.rating, alice.wins), (1500, 0));
    assert_eq!(service.get_player(bob.id).unwrap().losses, 0);
    assert_eq!(service.stats().unwrap().players, 2);
    assert_eq!(service.stats().unwrap().matches, 0);
    assert!(service.recent_matches().unwrap().is_empty());

    std::fs::remove_file(&dir).unwrap();
    service
        .register_match(per_set(alice.id, bob.id, 3, &[(11, 4), (11, 6)]))
        .unwrap();
    assert_eq!(service.get_player(alice.id).unwrap().rating, 1516);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_winner_rating_passed_first() {
    let calculator = Arc::new(FixedDeltaCalculator::new(5));
    let service = create_service(Arc::new(InMemoryStorage::new()), calculator.clone());

    let alice = service.register_player("Alice").unwrap();
    let bob = service.register_player("Bob").unwrap();

    service
        .register_match(per_set(alice.id, bob.id, 3, &[(3, 11), (4, 11)]))
        .unwrap();
    service
        .register_match(per_set(alice.id, bob.id, 3, &[(3, 11), (4, 11)]))
        .unwrap();

    // Bob won both, so his rating is always the first argument
    assert_eq!(calculator.calls(), vec![(1000, 1000), (1005, 995)]);
}

#[test]
fn test_concurrent_registrations_keep_every_update() {
    let calculator = Arc::new(FixedDeltaCalculator::new(3));
    let service = Arc::new(create_service(
        Arc::new(InMemoryStorage::new()),
        calculator,
    ));

    let alice = service.register_player("Alice").unwrap();
    let bob = service.register_player("Bob").unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let service = service.clone();
            thread::spawn(move || {
                for _ in 0..25 {
                    service
                        .register_match(per_set(alice.id, bob.id, 1, &[(11, 6)]))
                        .unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let alice = service.get_player(alice.id).unwrap();
    let bob = service.get_player(bob.id).unwrap();
    assert_eq!(alice.wins, 200);
    assert_eq!(bob.losses, 200);
    assert_eq!(alice.rating, 1000 + 200 * 3);
    assert_eq!(bob.rating, 1000 - 200 * 3);
    assert_eq!(service.stats().unwrap().matches, 200);
}

#[tokio::test]
async fn test_http_api_with_custom_calculator() {
    let state = Arc::new(
        AppState::with_components(
            AppConfig::default(),
            Arc::new(InMemoryStorage::new()),
            Arc::new(FixedDeltaCalculator::new(7)),
        )
        .unwrap(),
    );
    state.start().await.unwrap();
    let app = api::router(state.clone());

    for name in ["Alice", "Bob"] {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/players")
                    .header("content-type", "application/json")
                    .body(Body::from(json!({ "name": name }).to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/matches")
                .header("content-type", "application/json")
                .body(Body::from(
                    json!({
                        "player1_id": 1,
                        "player2_id": 2,
                        "match_format": 3,
                        "sets_won1": 0,
                        "sets_won2": 2
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/players/2")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let profile: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(profile["player"]["rating"], 1007);
    assert_eq!(profile["win_rate"], 100.0);
    assert_eq!(profile["matches"][0]["opponent_name"], "Alice");

    state.shutdown().await.unwrap();
}
