//! Demo-data bootstrap.
//!
//! Explicitly invoked (daemon --seed flag or the ctl `seed` command), never
//! run as a side effect of loading configuration. Creates five departments,
//! five trainees, and fourteen days of randomized attempt history so the
//! dashboard charts have something to show. Historical attempts are routed
//! through the progression engine like any other attempt, just backdated.

use crate::error::GuardError;
use crate::store::GuardStore;
use crate::types::{AttemptRequest, SeedSummary, SimKind};
use rand::Rng;

const DEPARTMENTS: &[(&str, i64)] = &[
    ("Engineering", 72),
    ("Finance", 85),
    ("Marketing", 58),
    ("HR", 63),
    ("Sales", 51),
];

const TRAINEES: &[(&str, &str, &str)] = &[
    ("Alice Chen", "alice@corp.com", "Engineering"),
    ("Bob Smith", "bob@corp.com", "Finance"),
    ("Charlie Day", "charlie@corp.com", "Marketing"),
    ("Diana Ross", "diana@corp.com", "HR"),
    ("Eve Johnson", "eve@corp.com", "Sales"),
];

const HISTORY_DAYS: i64 = 14;

/// Seed demo data. Skips (seeded = false) when departments already exist.
pub fn seed_demo_data(store: &GuardStore) -> Result<SeedSummary, GuardError> {
    if store.department_count()? > 0 {
        return Ok(SeedSummary::default());
    }

    let mut dept_ids = Vec::new();
    for (name, risk) in DEPARTMENTS {
        dept_ids.push(store.insert_department(name, *risk)?);
    }

    let mut trainee_ids = Vec::new();
    for (name, email, dept) in TRAINEES {
        let dept_id = store
            .find_department(dept)?
            .map(|d| d.id)
            .ok_or_else(|| GuardError::Store(format!("seed department {} missing", dept)))?;
        trainee_ids.push(store.insert_trainee(name, email, Some(dept_id))?);
    }

    let mut rng = rand::thread_rng();
    let now = chrono::Utc::now().timestamp();
    let mut attempts = 0usize;

    for day in (0..HISTORY_DAYS).rev() {
        let created_at = now - day * 86_400;
        for _ in 0..rng.gen_range(1..=4) {
            let trainee_id = trainee_ids[rng.gen_range(0..trainee_ids.len())];
            let kind = SimKind::ALL[rng.gen_range(0..SimKind::ALL.len())];
            let difficulty = rng.gen_range(1..=5);
            let is_correct = rng.gen_bool(0.65);
            let score = if is_correct {
                rng.gen_range(70..=99)
            } else {
                rng.gen_range(10..=59)
            };
            store.record_attempt_at(
                &AttemptRequest {
                    trainee_id,
                    simulation_id: None,
                    campaign_id: None,
                    kind,
                    is_correct,
                    score,
                    response_time_ms: rng.gen_range(5_000..=65_000),
                    difficulty,
                    flags_identified: vec![],
                    flags_missed: vec![],
                    feedback: None,
                },
                created_at,
            )?;
            attempts += 1;
        }
    }

    Ok(SeedSummary {
        seeded: true,
        departments: dept_ids.len(),
        trainees: trainee_ids.len(),
        attempts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_seed_populates_and_skips_on_rerun() {
        let tmp = NamedTempFile::new().unwrap();
        let store = GuardStore::open_at(tmp.path()).unwrap();

        let first = seed_demo_data(&store).unwrap();
        assert!(first.seeded);
        assert_eq!(first.departments, 5);
        assert_eq!(first.trainees, 5);
        assert!(first.attempts >= HISTORY_DAYS as usize);

        let second = seed_demo_data(&store).unwrap();
        assert!(!second.seeded);
        assert_eq!(store.department_count().unwrap(), 5);
    }

    #[test]
    fn test_seeded_trainees_hold_invariants() {
        let tmp = NamedTempFile::new().unwrap();
        let store = GuardStore::open_at(tmp.path()).unwrap();
        seed_demo_data(&store).unwrap();

        for id in 1..=5 {
            let trainee = store.get_trainee(id).unwrap();
            assert_eq!(trainee.level, trainee.xp / 200 + 1);
            assert!(trainee.best_streak >= trainee.current_streak);
            assert!((0..=100).contains(&trainee.security_score));
        }
    }

    #[test]
    fn test_seed_history_spans_days() {
        let tmp = NamedTempFile::new().unwrap();
        let store = GuardStore::open_at(tmp.path()).unwrap();
        seed_demo_data(&store).unwrap();

        let overview = store.admin_overview().unwrap();
        assert!(overview.total_attempts > 0);
        // At least one attempt per day means a multi-day trend.
        assert!(overview.trend.len() > 1);
    }
}
