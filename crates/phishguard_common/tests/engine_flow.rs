//! End-to-end exercise of the training loop: adaptive difficulty feeding
//! recorded attempts, progression state accumulating, and the read-side
//! rollups agreeing with what was written.

use phishguard_common::difficulty::BOOTSTRAP_TIER;
use phishguard_common::types::{AttemptRequest, SimKind};
use phishguard_common::GuardStore;
use tempfile::TempDir;

fn open_store(dir: &TempDir) -> GuardStore {
    GuardStore::open_at(dir.path().join("guard.db")).unwrap()
}

fn attempt(trainee_id: i64, difficulty: i64, score: i64, correct: bool) -> AttemptRequest {
    AttemptRequest {
        trainee_id,
        simulation_id: None,
        campaign_id: None,
        kind: SimKind::Email,
        is_correct: correct,
        score,
        response_time_ms: 12_000,
        difficulty,
        flags_identified: vec!["Suspicious sender domain".to_string()],
        flags_missed: vec![],
        feedback: Some("Well spotted.".to_string()),
    }
}

#[test]
fn test_adaptive_loop_ramps_difficulty_and_accumulates_progression() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    let dept = store.insert_department("Treasury", 100).unwrap();
    let trainee = store
        .insert_trainee("Dana Smith", "dana@example.com", Some(dept))
        .unwrap();

    // Fresh trainee sits at the bootstrap tier.
    assert_eq!(store.select_difficulty(trainee).unwrap(), BOOTSTRAP_TIER);

    // Ace five attempts at whatever tier the selector hands out.
    let mut total_xp = 0;
    for _ in 0..5 {
        let d = store.select_difficulty(trainee).unwrap();
        let rec = store.record_attempt(&attempt(trainee, d, 92, true)).unwrap();
        assert!(rec.progression.xp_awarded > 0);
        total_xp += rec.progression.xp_awarded;
        assert_eq!(rec.progression.total_xp, total_xp);
    }

    // Five high scores push the selector to the top tier.
    assert_eq!(store.select_difficulty(trainee).unwrap(), 4);

    let t = store.get_trainee(trainee).unwrap();
    assert_eq!(t.xp, total_xp);
    assert_eq!(t.current_streak, 5);
    assert_eq!(t.best_streak, 5);
    assert_eq!(t.simulations_completed, 5);
    assert_eq!(t.security_score, 100); // clamped, wins cannot push past 100
}

#[test]
fn test_slump_drops_difficulty_and_resets_streak() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    let trainee = store
        .insert_trainee("Lee Park", "lee@example.com", None)
        .unwrap();

    for _ in 0..3 {
        store.record_attempt(&attempt(trainee, 3, 90, true)).unwrap();
    }
    for _ in 0..5 {
        store.record_attempt(&attempt(trainee, 3, 20, false)).unwrap();
    }

    // Window of five failures lands in the bottom band.
    assert_eq!(store.select_difficulty(trainee).unwrap(), 1);

    let t = store.get_trainee(trainee).unwrap();
    assert_eq!(t.current_streak, 0);
    assert_eq!(t.best_streak, 3);
}

#[test]
fn test_rollups_agree_with_recorded_attempts() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    let dept = store.insert_department("Accounting", 100).unwrap();
    let trainee = store
        .insert_trainee("Sam Ruiz", "sam@example.com", Some(dept))
        .unwrap();

    store.record_attempt(&attempt(trainee, 2, 80, true)).unwrap();
    store.record_attempt(&attempt(trainee, 2, 60, false)).unwrap();
    let mut phone = attempt(trainee, 3, 95, true);
    phone.kind = SimKind::Phone;
    store.record_attempt(&phone).unwrap();

    let stats = store.trainee_stats(trainee).unwrap();
    assert_eq!(stats.total_attempts, 3);
    assert_eq!(stats.correct_count, 2);
    assert_eq!(stats.recent_scores.len(), 3);

    let by_kind = store.by_kind(trainee).unwrap();
    let email = by_kind.iter().find(|k| k.kind == SimKind::Email).unwrap();
    assert_eq!(email.attempts, 2);
    assert_eq!(email.correct, 1);

    let overview = store.admin_overview().unwrap();
    assert_eq!(overview.total_attempts, 3);
    assert_eq!(overview.detected, 2);
    assert_eq!(overview.compromised, 1);

    let board = store.leaderboard().unwrap();
    assert_eq!(board.len(), 1);
    assert_eq!(board[0].dept_name.as_deref(), Some("Accounting"));
    assert_eq!(board[0].total_attempts, 3);

    let reports = store.recent_reports(trainee, 20).unwrap();
    assert_eq!(reports.len(), 3);
    // Most recent first.
    assert_eq!(reports[0].kind, SimKind::Phone);
}
