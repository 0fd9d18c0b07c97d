//! Entity store - SQLite-backed persistence for the training core.
//!
//! Single-writer embedded store. Schema is owned by a versioned migration
//! ladder (`PRAGMA user_version`), applied once at open; no ad hoc column
//! patching at runtime. All writes from the progression engine happen in
//! one transaction so a reader never sees an attempt without its trainee
//! mutation, or vice versa.

use crate::difficulty;
use crate::error::GuardError;
use crate::progression::{self, AttemptOutcome, TraineeProgress};
use crate::types::*;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// Default database path for the daemon.
pub const GUARD_DB_PATH: &str = "/var/lib/phishguard/phishguard.db";

/// Versioned schema migrations. `user_version` equals the number of entries
/// applied; append only, never edit a shipped entry.
const MIGRATIONS: &[&str] = &[
    // v1: initial five-relation schema
    r#"
    CREATE TABLE departments (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        risk_score INTEGER NOT NULL DEFAULT 100
    );

    CREATE TABLE trainees (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        email TEXT NOT NULL UNIQUE,
        dept_id INTEGER REFERENCES departments(id),
        security_score INTEGER NOT NULL DEFAULT 100,
        simulations_completed INTEGER NOT NULL DEFAULT 0,
        current_streak INTEGER NOT NULL DEFAULT 0,
        best_streak INTEGER NOT NULL DEFAULT 0,
        xp INTEGER NOT NULL DEFAULT 0,
        level INTEGER NOT NULL DEFAULT 1
    );

    CREATE TABLE simulations (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        kind TEXT NOT NULL,
        difficulty INTEGER NOT NULL,
        content TEXT,
        created_at INTEGER NOT NULL
    );

    CREATE TABLE campaigns (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'active',
        target_dept_id INTEGER NOT NULL REFERENCES departments(id),
        sim_kind TEXT NOT NULL,
        launched_at INTEGER NOT NULL
    );

    CREATE TABLE attempts (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        trainee_id INTEGER NOT NULL REFERENCES trainees(id),
        simulation_id INTEGER NOT NULL REFERENCES simulations(id),
        campaign_id INTEGER REFERENCES campaigns(id) ON DELETE SET NULL,
        sim_kind TEXT NOT NULL,
        is_correct INTEGER NOT NULL,
        score INTEGER NOT NULL DEFAULT 0,
        response_time_ms INTEGER NOT NULL DEFAULT 0,
        difficulty INTEGER NOT NULL DEFAULT 1,
        flags_identified TEXT,
        flags_missed TEXT,
        feedback TEXT NOT NULL DEFAULT '',
        created_at INTEGER NOT NULL
    );

    CREATE INDEX idx_attempts_trainee_time ON attempts(trainee_id, created_at);
    CREATE INDEX idx_attempts_campaign ON attempts(campaign_id);
    "#,
];

/// SQLite-backed entity store.
pub struct GuardStore {
    conn: Connection,
}

impl GuardStore {
    /// Open or create the store at the default path.
    pub fn open() -> Result<Self, GuardError> {
        Self::open_at(GUARD_DB_PATH)
    }

    /// Open at a specific path (daemon startup and tests).
    pub fn open_at<P: AsRef<Path>>(path: P) -> Result<Self, GuardError> {
        let conn = Connection::open(path.as_ref())?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
        Self::migrate(&conn)?;
        Ok(Self { conn })
    }

    fn migrate(conn: &Connection) -> Result<(), GuardError> {
        let version: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
        for (i, sql) in MIGRATIONS.iter().enumerate().skip(version as usize) {
            let tx = conn.unchecked_transaction()?;
            tx.execute_batch(sql)?;
            tx.pragma_update(None, "user_version", (i + 1) as i64)?;
            tx.commit()?;
            tracing::info!("  Applied store migration v{}", i + 1);
        }
        Ok(())
    }

    /// Current schema version (number of applied migrations).
    pub fn schema_version(&self) -> Result<i64, GuardError> {
        Ok(self
            .conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))?)
    }

    fn now() -> i64 {
        chrono::Utc::now().timestamp()
    }

    // ------------------------------------------------------------------
    // Departments
    // ------------------------------------------------------------------

    pub fn insert_department(&self, name: &str, risk_score: i64) -> Result<i64, GuardError> {
        self.conn.execute(
            "INSERT INTO departments (name, risk_score) VALUES (?1, ?2)",
            params![name, risk_score],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn department_count(&self) -> Result<i64, GuardError> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM departments", [], |row| row.get(0))?)
    }

    pub fn find_department(&self, name: &str) -> Result<Option<Department>, GuardError> {
        Ok(self
            .conn
            .query_row(
                "SELECT id, name, risk_score FROM departments WHERE name = ?1",
                params![name],
                |row| {
                    Ok(Department {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        risk_score: row.get(2)?,
                    })
                },
            )
            .optional()?)
    }

    // ------------------------------------------------------------------
    // Trainees
    // ------------------------------------------------------------------

    pub fn insert_trainee(
        &self,
        name: &str,
        email: &str,
        dept_id: Option<i64>,
    ) -> Result<i64, GuardError> {
        self.conn.execute(
            "INSERT INTO trainees (name, email, dept_id) VALUES (?1, ?2, ?3)",
            params![name, email, dept_id],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn get_trainee(&self, id: i64) -> Result<Trainee, GuardError> {
        self.conn
            .query_row(
                "SELECT id, name, email, dept_id, security_score, simulations_completed,
                        current_streak, best_streak, xp, level
                 FROM trainees WHERE id = ?1",
                params![id],
                |row| {
                    Ok(Trainee {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        email: row.get(2)?,
                        dept_id: row.get(3)?,
                        security_score: row.get(4)?,
                        simulations_completed: row.get(5)?,
                        current_streak: row.get(6)?,
                        best_streak: row.get(7)?,
                        xp: row.get(8)?,
                        level: row.get(9)?,
                    })
                },
            )
            .optional()?
            .ok_or_else(|| GuardError::NotFound(format!("trainee {}", id)))
    }

    // ------------------------------------------------------------------
    // Simulations
    // ------------------------------------------------------------------

    pub fn insert_simulation(
        &self,
        kind: SimKind,
        difficulty: i64,
        content: Option<&serde_json::Value>,
    ) -> Result<i64, GuardError> {
        self.conn.execute(
            "INSERT INTO simulations (kind, difficulty, content, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                kind.as_str(),
                difficulty,
                content.map(|c| c.to_string()),
                Self::now()
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn get_simulation(&self, id: i64) -> Result<Simulation, GuardError> {
        self.conn
            .query_row(
                "SELECT id, kind, difficulty, content, created_at FROM simulations WHERE id = ?1",
                params![id],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, i64>(2)?,
                        row.get::<_, Option<String>>(3)?,
                        row.get::<_, i64>(4)?,
                    ))
                },
            )
            .optional()?
            .map(|(id, kind, difficulty, content, created_at)| {
                Ok::<_, GuardError>(Simulation {
                    id,
                    kind: kind.parse()?,
                    difficulty,
                    content: content.and_then(|c| serde_json::from_str(&c).ok()),
                    created_at,
                })
            })
            .transpose()?
            .ok_or_else(|| GuardError::NotFound(format!("simulation {}", id)))
    }

    // ------------------------------------------------------------------
    // Campaigns
    // ------------------------------------------------------------------

    pub fn insert_campaign(
        &self,
        name: &str,
        target_dept_id: i64,
        sim_kind: SimKind,
    ) -> Result<i64, GuardError> {
        let dept_exists: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM departments WHERE id = ?1)",
            params![target_dept_id],
            |row| row.get(0),
        )?;
        if !dept_exists {
            return Err(GuardError::NotFound(format!(
                "department {}",
                target_dept_id
            )));
        }
        self.conn.execute(
            "INSERT INTO campaigns (name, status, target_dept_id, sim_kind, launched_at)
             VALUES (?1, 'active', ?2, ?3, ?4)",
            params![name, target_dept_id, sim_kind.as_str(), Self::now()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn list_campaigns(&self) -> Result<Vec<CampaignSummary>, GuardError> {
        let mut stmt = self.conn.prepare(
            "SELECT c.id, c.name, c.status, c.target_dept_id, d.name, c.sim_kind, c.launched_at,
                    (SELECT COUNT(*) FROM attempts a WHERE a.campaign_id = c.id)
             FROM campaigns c
             JOIN departments d ON c.target_dept_id = d.id
             ORDER BY c.launched_at DESC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, i64>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
                row.get::<_, i64>(6)?,
                row.get::<_, i64>(7)?,
            ))
        })?;

        let mut campaigns = Vec::new();
        for row in rows {
            let (id, name, status, target_dept_id, dept_name, kind, launched_at, response_count) =
                row?;
            campaigns.push(CampaignSummary {
                id,
                name,
                status,
                target_dept_id,
                dept_name,
                sim_kind: kind.parse()?,
                launched_at,
                response_count,
            });
        }
        Ok(campaigns)
    }

    /// Delete a campaign. Attempts that referenced it keep existing with a
    /// nulled campaign reference (FK `ON DELETE SET NULL`).
    pub fn delete_campaign(&self, id: i64) -> Result<(), GuardError> {
        let deleted = self
            .conn
            .execute("DELETE FROM campaigns WHERE id = ?1", params![id])?;
        if deleted == 0 {
            return Err(GuardError::NotFound(format!("campaign {}", id)));
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Difficulty selection
    // ------------------------------------------------------------------

    /// Scores of the trainee's most recent attempts, newest first.
    pub fn recent_scores(&self, trainee_id: i64, limit: usize) -> Result<Vec<i64>, GuardError> {
        let mut stmt = self.conn.prepare(
            "SELECT score FROM attempts WHERE trainee_id = ?1
             ORDER BY created_at DESC, id DESC LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![trainee_id, limit as i64], |row| row.get(0))?;
        let mut scores = Vec::new();
        for row in rows {
            scores.push(row?);
        }
        Ok(scores)
    }

    /// Next-simulation difficulty tier for a trainee. Pure read.
    pub fn select_difficulty(&self, trainee_id: i64) -> Result<i64, GuardError> {
        let scores = self.recent_scores(trainee_id, difficulty::HISTORY_WINDOW)?;
        Ok(difficulty::tier_for_history(&scores))
    }

    // ------------------------------------------------------------------
    // Attempts + progression
    // ------------------------------------------------------------------

    /// Record an attempt and apply the progression engine, atomically.
    ///
    /// Exactly one trainee row is mutated and exactly one attempt row is
    /// inserted per call; a store failure rolls back both halves.
    pub fn record_attempt(&self, req: &AttemptRequest) -> Result<AttemptRecorded, GuardError> {
        self.record_attempt_at(req, Self::now())
    }

    /// Internal variant with an explicit timestamp, used by the seed
    /// bootstrap to backdate demo history. Still routes through the engine.
    pub(crate) fn record_attempt_at(
        &self,
        req: &AttemptRequest,
        created_at: i64,
    ) -> Result<AttemptRecorded, GuardError> {
        progression::validate_outcome(req.score, req.difficulty)?;

        let tx = self.conn.unchecked_transaction()?;

        let progress = tx
            .query_row(
                "SELECT xp, current_streak, best_streak, security_score
                 FROM trainees WHERE id = ?1",
                params![req.trainee_id],
                |row| {
                    Ok(TraineeProgress {
                        xp: row.get(0)?,
                        current_streak: row.get(1)?,
                        best_streak: row.get(2)?,
                        security_score: row.get(3)?,
                    })
                },
            )
            .optional()?
            .ok_or_else(|| GuardError::NotFound(format!("trainee {}", req.trainee_id)))?;

        // An attempt always references a simulation; synthesize a
        // placeholder row when the caller supplies none.
        let simulation_id = match req.simulation_id {
            Some(id) => {
                let exists: bool = tx.query_row(
                    "SELECT EXISTS(SELECT 1 FROM simulations WHERE id = ?1)",
                    params![id],
                    |row| row.get(0),
                )?;
                if !exists {
                    return Err(GuardError::NotFound(format!("simulation {}", id)));
                }
                id
            }
            None => {
                tx.execute(
                    "INSERT INTO simulations (kind, difficulty, content, created_at)
                     VALUES (?1, ?2, NULL, ?3)",
                    params![req.kind.as_str(), req.difficulty, created_at],
                )?;
                tx.last_insert_rowid()
            }
        };

        if let Some(campaign_id) = req.campaign_id {
            let exists: bool = tx.query_row(
                "SELECT EXISTS(SELECT 1 FROM campaigns WHERE id = ?1)",
                params![campaign_id],
                |row| row.get(0),
            )?;
            if !exists {
                return Err(GuardError::NotFound(format!("campaign {}", campaign_id)));
            }
        }

        let update = progression::apply(
            &progress,
            &AttemptOutcome {
                score: req.score,
                difficulty: req.difficulty,
                is_correct: req.is_correct,
            },
        );

        tx.execute(
            "INSERT INTO attempts (trainee_id, simulation_id, campaign_id, sim_kind, is_correct,
                                   score, response_time_ms, difficulty, flags_identified,
                                   flags_missed, feedback, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                req.trainee_id,
                simulation_id,
                req.campaign_id,
                req.kind.as_str(),
                req.is_correct,
                req.score,
                req.response_time_ms,
                req.difficulty,
                encode_flags(&req.flags_identified),
                encode_flags(&req.flags_missed),
                req.feedback.as_deref().unwrap_or(""),
                created_at
            ],
        )?;
        let attempt_id = tx.last_insert_rowid();

        tx.execute(
            "UPDATE trainees
             SET xp = ?1, level = ?2, current_streak = ?3, best_streak = ?4,
                 security_score = ?5, simulations_completed = simulations_completed + 1
             WHERE id = ?6",
            params![
                update.total_xp,
                update.new_level,
                update.new_streak,
                update.best_streak,
                update.security_score,
                req.trainee_id
            ],
        )?;

        tx.commit()?;

        Ok(AttemptRecorded {
            attempt_id,
            progression: ProgressionResult {
                xp_awarded: update.xp_awarded,
                new_level: update.new_level,
                new_streak: update.new_streak,
                total_xp: update.total_xp,
            },
        })
    }

    /// Most recent attempts for a trainee's report view, newest first.
    pub fn recent_reports(&self, trainee_id: i64, limit: usize) -> Result<Vec<Attempt>, GuardError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, trainee_id, simulation_id, campaign_id, sim_kind, is_correct, score,
                    response_time_ms, difficulty, flags_identified, flags_missed, feedback,
                    created_at
             FROM attempts WHERE trainee_id = ?1
             ORDER BY created_at DESC, id DESC LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![trainee_id, limit as i64], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, Option<i64>>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, bool>(5)?,
                row.get::<_, i64>(6)?,
                row.get::<_, i64>(7)?,
                row.get::<_, i64>(8)?,
                row.get::<_, Option<String>>(9)?,
                row.get::<_, Option<String>>(10)?,
                row.get::<_, String>(11)?,
                row.get::<_, i64>(12)?,
            ))
        })?;

        let mut attempts = Vec::new();
        for row in rows {
            let (
                id,
                trainee_id,
                simulation_id,
                campaign_id,
                kind,
                is_correct,
                score,
                response_time_ms,
                difficulty,
                flags_identified,
                flags_missed,
                feedback,
                created_at,
            ) = row?;
            attempts.push(Attempt {
                id,
                trainee_id,
                simulation_id,
                campaign_id,
                kind: kind.parse()?,
                is_correct,
                score,
                response_time_ms,
                difficulty,
                flags_identified: decode_flags(flags_identified.as_deref()),
                flags_missed: decode_flags(flags_missed.as_deref()),
                feedback,
                created_at,
            });
        }
        Ok(attempts)
    }

    pub(crate) fn conn(&self) -> &Connection {
        &self.conn
    }
}

fn encode_flags(flags: &[String]) -> Option<String> {
    if flags.is_empty() {
        None
    } else {
        serde_json::to_string(flags).ok()
    }
}

fn decode_flags(raw: Option<&str>) -> Vec<String> {
    raw.and_then(|s| serde_json::from_str(s).ok())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn test_store() -> GuardStore {
        let tmp = NamedTempFile::new().unwrap();
        GuardStore::open_at(tmp.path()).unwrap()
    }

    fn store_with_trainee() -> (GuardStore, i64) {
        let store = test_store();
        let dept = store.insert_department("Finance", 85).unwrap();
        let trainee = store
            .insert_trainee("Alice Chen", "alice@corp.com", Some(dept))
            .unwrap();
        (store, trainee)
    }

    fn attempt(trainee_id: i64, score: i64, difficulty: i64, is_correct: bool) -> AttemptRequest {
        AttemptRequest {
            trainee_id,
            simulation_id: None,
            campaign_id: None,
            kind: SimKind::Email,
            is_correct,
            score,
            response_time_ms: 12_000,
            difficulty,
            flags_identified: vec![],
            flags_missed: vec![],
            feedback: None,
        }
    }

    #[test]
    fn test_migrations_applied_once() {
        let tmp = NamedTempFile::new().unwrap();
        let store = GuardStore::open_at(tmp.path()).unwrap();
        assert_eq!(store.schema_version().unwrap(), 1);
        drop(store);
        // Reopening must not re-run migrations.
        let store = GuardStore::open_at(tmp.path()).unwrap();
        assert_eq!(store.schema_version().unwrap(), 1);
    }

    #[test]
    fn test_unique_trainee_email() {
        let store = test_store();
        store.insert_trainee("A", "dup@corp.com", None).unwrap();
        let err = store.insert_trainee("B", "dup@corp.com", None).unwrap_err();
        assert!(matches!(err, GuardError::Store(_)));
    }

    #[test]
    fn test_unique_department_name() {
        let store = test_store();
        store.insert_department("Finance", 80).unwrap();
        assert!(matches!(
            store.insert_department("Finance", 50).unwrap_err(),
            GuardError::Store(_)
        ));
    }

    #[test]
    fn test_record_attempt_updates_trainee() {
        let (store, trainee_id) = store_with_trainee();
        let rec = store
            .record_attempt(&attempt(trainee_id, 90, 3, true))
            .unwrap();
        assert_eq!(rec.progression.xp_awarded, 84);
        assert_eq!(rec.progression.total_xp, 84);
        assert_eq!(rec.progression.new_streak, 1);

        let trainee = store.get_trainee(trainee_id).unwrap();
        assert_eq!(trainee.xp, 84);
        assert_eq!(trainee.level, 1);
        assert_eq!(trainee.current_streak, 1);
        assert_eq!(trainee.best_streak, 1);
        assert_eq!(trainee.simulations_completed, 1);
        assert_eq!(trainee.security_score, 100); // clamped at 100
    }

    #[test]
    fn test_record_attempt_unknown_trainee() {
        let store = test_store();
        assert!(matches!(
            store.record_attempt(&attempt(99, 50, 2, true)).unwrap_err(),
            GuardError::NotFound(_)
        ));
    }

    #[test]
    fn test_record_attempt_validates_ranges() {
        let (store, trainee_id) = store_with_trainee();
        assert!(matches!(
            store
                .record_attempt(&attempt(trainee_id, 101, 2, true))
                .unwrap_err(),
            GuardError::Validation(_)
        ));
        assert!(matches!(
            store
                .record_attempt(&attempt(trainee_id, 50, 6, true))
                .unwrap_err(),
            GuardError::Validation(_)
        ));
        // Nothing was persisted for the rejected calls.
        let trainee = store.get_trainee(trainee_id).unwrap();
        assert_eq!(trainee.simulations_completed, 0);
    }

    #[test]
    fn test_placeholder_simulation_synthesized() {
        let (store, trainee_id) = store_with_trainee();
        let rec = store
            .record_attempt(&attempt(trainee_id, 70, 2, true))
            .unwrap();
        let reports = store.recent_reports(trainee_id, 10).unwrap();
        assert_eq!(reports.len(), 1);
        let sim = store.get_simulation(reports[0].simulation_id).unwrap();
        assert_eq!(sim.kind, SimKind::Email);
        assert_eq!(sim.difficulty, 2);
        assert!(sim.content.is_none());
        assert_eq!(rec.attempt_id, reports[0].id);
    }

    #[test]
    fn test_attempt_with_unknown_simulation() {
        let (store, trainee_id) = store_with_trainee();
        let mut req = attempt(trainee_id, 70, 2, true);
        req.simulation_id = Some(424242);
        assert!(matches!(
            store.record_attempt(&req).unwrap_err(),
            GuardError::NotFound(_)
        ));

        // The failed call must leave no trace: no attempt row, no
        // progression mutation.
        let trainee = store.get_trainee(trainee_id).unwrap();
        assert_eq!(trainee.xp, 0);
        assert_eq!(trainee.current_streak, 0);
        assert_eq!(trainee.simulations_completed, 0);
        assert!(store.recent_reports(trainee_id, 10).unwrap().is_empty());
    }

    #[test]
    fn test_campaign_delete_nulls_attempt_reference() {
        let (store, trainee_id) = store_with_trainee();
        let dept = store.find_department("Finance").unwrap().unwrap();
        let campaign_id = store
            .insert_campaign("Q3 wire-fraud drill", dept.id, SimKind::Email)
            .unwrap();

        let mut req = attempt(trainee_id, 60, 2, false);
        req.campaign_id = Some(campaign_id);
        store.record_attempt(&req).unwrap();

        store.delete_campaign(campaign_id).unwrap();

        let reports = store.recent_reports(trainee_id, 10).unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].campaign_id, None);
    }

    #[test]
    fn test_delete_missing_campaign() {
        let store = test_store();
        assert!(matches!(
            store.delete_campaign(5).unwrap_err(),
            GuardError::NotFound(_)
        ));
    }

    #[test]
    fn test_select_difficulty_bootstrap_then_adapts() {
        let (store, trainee_id) = store_with_trainee();
        assert_eq!(store.select_difficulty(trainee_id).unwrap(), 2);

        store.record_attempt(&attempt(trainee_id, 95, 2, true)).unwrap();
        store.record_attempt(&attempt(trainee_id, 95, 2, true)).unwrap();
        // Still below the three-attempt minimum.
        assert_eq!(store.select_difficulty(trainee_id).unwrap(), 2);

        store.record_attempt(&attempt(trainee_id, 95, 2, true)).unwrap();
        assert_eq!(store.select_difficulty(trainee_id).unwrap(), 4);
    }

    #[test]
    fn test_select_difficulty_uses_last_five_only() {
        let (store, trainee_id) = store_with_trainee();
        // Five weak attempts followed by five strong ones; only the strong
        // window should count.
        for _ in 0..5 {
            store.record_attempt(&attempt(trainee_id, 10, 1, false)).unwrap();
        }
        for _ in 0..5 {
            store.record_attempt(&attempt(trainee_id, 95, 3, true)).unwrap();
        }
        assert_eq!(store.select_difficulty(trainee_id).unwrap(), 4);
    }

    #[test]
    fn test_flags_round_trip() {
        let (store, trainee_id) = store_with_trainee();
        let mut req = attempt(trainee_id, 80, 3, true);
        req.flags_identified = vec!["Urgency".into(), "Spoofed domain".into()];
        req.flags_missed = vec!["Mismatched reply-to".into()];
        req.feedback = Some("Good catch on the domain.".into());
        store.record_attempt(&req).unwrap();

        let reports = store.recent_reports(trainee_id, 1).unwrap();
        assert_eq!(reports[0].flags_identified.len(), 2);
        assert_eq!(reports[0].flags_missed, vec!["Mismatched reply-to"]);
        assert_eq!(reports[0].feedback, "Good catch on the domain.");
    }

    #[test]
    fn test_xp_monotonic_over_mixed_sequence() {
        let (store, trainee_id) = store_with_trainee();
        let mut last_xp = 0;
        for (score, difficulty, correct) in
            [(90, 3, true), (5, 5, false), (100, 4, true), (0, 1, false)]
        {
            store
                .record_attempt(&attempt(trainee_id, score, difficulty, correct))
                .unwrap();
            let trainee = store.get_trainee(trainee_id).unwrap();
            assert!(trainee.xp >= last_xp);
            assert_eq!(trainee.level, trainee.xp / 200 + 1);
            assert!(trainee.best_streak >= trainee.current_streak);
            assert!((0..=100).contains(&trainee.security_score));
            last_xp = trainee.xp;
        }
    }
}
