//! Concurrent submission tests and rating-store interaction tests

mod fixtures;

use fixtures::*;
use futures::future::join_all;
use quiz_ladder::rating::{EloRatingUpdater, RatingEntry, RatingStore, RatingUpdater};
use quiz_ladder::types::{RatingKey, DEFAULT_RATING};
use std::collections::HashSet;
use std::time::Duration;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_answers_match_sequential_application() {
    const ANSWERS: usize = 40;
    let system = create_test_system(arithmetic_questions(1, DEFAULT_RATING));

    let handles = (0..ANSWERS).map(|_| {
        let engine = system.engine.clone();
        tokio::spawn(async move {
            engine
                .record_outcome(&"alice".to_string(), 1, true)
                .await
                .unwrap()
        })
    });

    let results = tokio::time::timeout(Duration::from_secs(10), join_all(handles))
        .await
        .expect("concurrent submissions should not deadlock");
    let recorded: Vec<_> = results.into_iter().map(|result| result.unwrap()).collect();

    // Same outcome every time, so any serial order gives the same result
    let updater = EloRatingUpdater::default();
    let (mut player, mut question) = (DEFAULT_RATING, DEFAULT_RATING);
    let mut applied = 0;
    for _ in 0..ANSWERS {
        let update = updater.update(player, question, true).unwrap();
        if update.applied {
            applied += 1;
        }
        player = update.player_rating;
        question = update.question_rating;
    }

    let stored_player = system
        .ratings
        .get_rating(&RatingKey::player("alice", MATH))
        .unwrap()
        .unwrap();
    let stored_question = system
        .ratings
        .get_rating(&RatingKey::question(1))
        .unwrap()
        .unwrap();

    assert!((stored_player.rating - player).abs() < 1e-9);
    assert!((stored_question.rating - question).abs() < 1e-9);
    assert_eq!(stored_player.updates, applied);
    assert_eq!(stored_question.updates, applied);

    assert_eq!(system.history.len().unwrap(), ANSWERS);
    let sequences: HashSet<u64> = recorded.iter().map(|r| r.answer.sequence).collect();
    assert_eq!(sequences.len(), ANSWERS);

    let stats = system.engine.stats().unwrap();
    assert_eq!(stats.answers_recorded, ANSWERS as u64);
    assert_eq!(stats.rating_updates_applied, applied);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_players_on_shared_questions() {
    const PLAYERS: usize = 10;
    const QUESTIONS: u64 = 3;
    let system = create_test_system(arithmetic_questions(QUESTIONS, DEFAULT_RATING));

    let mut handles = Vec::new();
    for player in 0..PLAYERS {
        for question_id in 1..=QUESTIONS {
            let engine = system.engine.clone();
            let player_id = format!("player{}", player);
            handles.push(tokio::spawn(async move {
                engine
                    .record_outcome(&player_id, question_id, (player + question_id as usize) % 2 == 0)
                    .await
                    .unwrap()
            }));
        }
    }

    let results = tokio::time::timeout(Duration::from_secs(10), join_all(handles))
        .await
        .expect("concurrent submissions should not deadlock");
    let recorded: Vec<_> = results.into_iter().map(|result| result.unwrap()).collect();
    assert_eq!(recorded.len(), PLAYERS * QUESTIONS as usize);

    // No lost updates: every applied change is counted on both sides
    let applied = recorded
        .iter()
        .filter(|r| r.rating_change.applied)
        .count() as u64;
    let all = system.ratings.get_all_ratings().unwrap();
    let question_updates: u64 = all
        .values()
        .filter(|entry| matches!(entry.key, RatingKey::Question(_)))
        .map(|entry| entry.updates)
        .sum();
    let player_updates: u64 = all
        .values()
        .filter(|entry| matches!(entry.key, RatingKey::Player { .. }))
        .map(|entry| entry.updates)
        .sum();
    assert_eq!(question_updates, applied);
    assert_eq!(player_updates, applied);

    // Each player's log is strictly ordered by sequence
    for player in 0..PLAYERS {
        let history = system
            .engine
            .answer_history(&format!("player{}", player))
            .unwrap();
        assert_eq!(history.len(), QUESTIONS as usize);
        assert!(history
            .windows(2)
            .all(|pair| pair[0].sequence > pair[1].sequence));
    }
}

#[tokio::test]
async fn test_both_ratings_written_in_one_store_call() {
    let mut store = MockStore::new();
    store
        .expect_get_or_init()
        .times(2)
        .returning(|key, default| Ok(RatingEntry::new(key.clone(), default)));
    store
        .expect_store_ratings()
        .withf(|entries| {
            entries.len() == 2
                && entries[0].key == RatingKey::player("alice", MATH)
                && (entries[0].rating - 1208.0).abs() < 1e-9
                && entries[1].key == RatingKey::question(1)
                && (entries[1].rating - 1196.0).abs() < 1e-9
        })
        .times(1)
        .returning(|_| Ok(()));
    store.expect_store_rating().never();

    let (engine, history) = create_engine_with_store(arithmetic_questions(1, DEFAULT_RATING), store);

    let recorded = engine
        .record_outcome(&"alice".to_string(), 1, true)
        .await
        .unwrap();
    assert!(recorded.rating_change.applied);
    assert_eq!(history.len().unwrap(), 1);
}

#[tokio::test]
async fn test_capped_answer_writes_no_ratings() {
    let mut store = MockStore::new();
    store
        .expect_get_or_init()
        .times(2)
        .returning(|key, default| Ok(RatingEntry::new(key.clone(), default)));
    store.expect_store_ratings().never();
    store.expect_store_rating().never();

    let (engine, history) =
        create_engine_with_store(vec![true_false(1, ARITHMETIC, 1000.0)], store);

    let recorded = engine
        .record_outcome(&"alice".to_string(), 1, true)
        .await
        .unwrap();
    assert!(!recorded.rating_change.applied);
    assert_eq!(history.len().unwrap(), 1);
}

#[tokio::test]
async fn test_store_failure_leaves_history_untouched() {
    let mut store = MockStore::new();
    store
        .expect_get_or_init()
        .returning(|key, default| Ok(RatingEntry::new(key.clone(), default)));
    store
        .expect_store_ratings()
        .times(1)
        .returning(|_| Err(anyhow::anyhow!("storage unavailable")));

    let (engine, history) = create_engine_with_store(arithmetic_questions(1, DEFAULT_RATING), store);

    let result = engine.record_outcome(&"alice".to_string(), 1, true).await;
    assert!(result.is_err());
    assert!(history.is_empty().unwrap());
    assert_eq!(engine.stats().unwrap().answers_recorded, 0);
}

#[tokio::test]
async fn test_log_failure_leaves_ratings_untouched() {
    let (engine, ratings) = create_engine_with_failing_log(arithmetic_questions(1, DEFAULT_RATING));

    let result = engine.record_outcome(&"alice".to_string(), 1, true).await;
    assert!(result.is_err());

    // Neither rating moved
    assert_eq!(
        engine.player_rating(&"alice".to_string(), MATH).unwrap(),
        DEFAULT_RATING
    );
    assert_eq!(engine.question_rating(1).await.unwrap(), DEFAULT_RATING);
    let stored_updates: u64 = ratings
        .get_all_ratings()
        .unwrap()
        .values()
        .map(|entry| entry.updates)
        .sum();
    assert_eq!(stored_updates, 0);
    assert_eq!(engine.stats().unwrap().answers_recorded, 0);
}
