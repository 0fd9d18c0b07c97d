//! Analytics Aggregator - read-only rollups over the entity store.
//!
//! Every query recomputes from current store state; there is no cache, so
//! the staleness window is zero by construction.

use crate::error::GuardError;
use crate::types::*;
use crate::GuardStore;
use rusqlite::params;

/// Distinct days covered by the per-trainee timeline.
pub const TIMELINE_DAYS: usize = 30;

/// Days covered by the admin score trend.
pub const TREND_DAYS: usize = 14;

/// Attempts returned by the per-trainee report view.
pub const REPORT_ATTEMPTS: usize = 30;

/// Recent scores returned with trainee stats.
const RECENT_SCORE_COUNT: usize = 10;

impl GuardStore {
    /// Per-day activity for a trainee: the most recent 30 distinct days,
    /// ordered ascending by date.
    pub fn timeline(&self, trainee_id: i64) -> Result<Vec<TimelinePoint>, GuardError> {
        let mut stmt = self.conn().prepare(
            "SELECT * FROM (
                 SELECT DATE(created_at, 'unixepoch') AS day,
                        COUNT(*),
                        AVG(score),
                        SUM(is_correct),
                        AVG(response_time_ms)
                 FROM attempts WHERE trainee_id = ?1
                 GROUP BY day ORDER BY day DESC LIMIT ?2
             ) ORDER BY day ASC",
        )?;
        let rows = stmt.query_map(params![trainee_id, TIMELINE_DAYS as i64], |row| {
            Ok(TimelinePoint {
                date: row.get(0)?,
                attempts: row.get(1)?,
                avg_score: row.get(2)?,
                correct: row.get(3)?,
                avg_time_ms: row.get(4)?,
            })
        })?;
        collect(rows)
    }

    /// Per-simulation-kind breakdown for a trainee.
    pub fn by_kind(&self, trainee_id: i64) -> Result<Vec<KindBreakdown>, GuardError> {
        let mut stmt = self.conn().prepare(
            "SELECT sim_kind, COUNT(*), AVG(score), SUM(is_correct)
             FROM attempts WHERE trainee_id = ?1
             GROUP BY sim_kind ORDER BY sim_kind",
        )?;
        let rows = stmt.query_map(params![trainee_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, f64>(2)?,
                row.get::<_, i64>(3)?,
            ))
        })?;

        let mut breakdown = Vec::new();
        for row in rows {
            let (kind, attempts, avg_score, correct) = row?;
            breakdown.push(KindBreakdown {
                kind: kind.parse()?,
                attempts,
                avg_score,
                correct,
            });
        }
        Ok(breakdown)
    }

    /// Mean score per difficulty tier for a trainee.
    pub fn difficulty_curve(&self, trainee_id: i64) -> Result<Vec<DifficultyPoint>, GuardError> {
        let mut stmt = self.conn().prepare(
            "SELECT difficulty, AVG(score), COUNT(*)
             FROM attempts WHERE trainee_id = ?1
             GROUP BY difficulty ORDER BY difficulty",
        )?;
        let rows = stmt.query_map(params![trainee_id], |row| {
            Ok(DifficultyPoint {
                difficulty: row.get(0)?,
                avg_score: row.get(1)?,
                attempts: row.get(2)?,
            })
        })?;
        collect(rows)
    }

    /// Organization-wide leaderboard, ordered by XP descending.
    pub fn leaderboard(&self) -> Result<Vec<LeaderboardRow>, GuardError> {
        let mut stmt = self.conn().prepare(
            "SELECT t.name, t.security_score, t.xp, t.level, t.current_streak, t.best_streak,
                    d.name, COUNT(a.id), AVG(a.score)
             FROM trainees t
             LEFT JOIN departments d ON t.dept_id = d.id
             LEFT JOIN attempts a ON a.trainee_id = t.id
             GROUP BY t.id
             ORDER BY t.xp DESC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(LeaderboardRow {
                name: row.get(0)?,
                security_score: row.get(1)?,
                xp: row.get(2)?,
                level: row.get(3)?,
                current_streak: row.get(4)?,
                best_streak: row.get(5)?,
                dept_name: row.get(6)?,
                total_attempts: row.get(7)?,
                avg_score: row.get(8)?,
            })
        })?;
        collect(rows)
    }

    /// Organization-wide admin overview: totals, per-kind fail rates, and
    /// the 14-day score trend (date descending).
    pub fn admin_overview(&self) -> Result<AdminOverview, GuardError> {
        let (total_attempts, detected, compromised, avg_score, avg_time_ms) =
            self.conn().query_row(
                "SELECT COUNT(*),
                        COALESCE(SUM(is_correct), 0),
                        COALESCE(SUM(1 - is_correct), 0),
                        AVG(score),
                        AVG(response_time_ms)
                 FROM attempts",
                [],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, i64>(2)?,
                        row.get::<_, Option<f64>>(3)?,
                        row.get::<_, Option<f64>>(4)?,
                    ))
                },
            )?;

        let mut stmt = self.conn().prepare(
            "SELECT sim_kind, COUNT(*), AVG(score),
                    SUM(1 - is_correct) * 100.0 / COUNT(*)
             FROM attempts GROUP BY sim_kind ORDER BY sim_kind",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, f64>(2)?,
                row.get::<_, f64>(3)?,
            ))
        })?;
        let mut risk_by_kind = Vec::new();
        for row in rows {
            let (kind, total, avg_score, fail_rate) = row?;
            risk_by_kind.push(KindRisk {
                kind: kind.parse()?,
                total,
                avg_score,
                fail_rate,
            });
        }

        let mut stmt = self.conn().prepare(
            "SELECT DATE(created_at, 'unixepoch') AS day, AVG(score), COUNT(*)
             FROM attempts GROUP BY day ORDER BY day DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![TREND_DAYS as i64], |row| {
            Ok(TrendPoint {
                date: row.get(0)?,
                avg_score: row.get(1)?,
                volume: row.get(2)?,
            })
        })?;
        let trend = collect(rows)?;

        Ok(AdminOverview {
            total_attempts,
            detected,
            compromised,
            avg_score,
            avg_time_ms,
            risk_by_kind,
            trend,
        })
    }

    /// Dashboard stats for one trainee: attempt aggregates, progression
    /// state, and the last ten scores.
    pub fn trainee_stats(&self, trainee_id: i64) -> Result<TraineeStats, GuardError> {
        let trainee = self.get_trainee(trainee_id)?;

        let (total_attempts, correct_count, avg_score, avg_time_ms) = self.conn().query_row(
            "SELECT COUNT(*), COALESCE(SUM(is_correct), 0), AVG(score), AVG(response_time_ms)
             FROM attempts WHERE trainee_id = ?1",
            params![trainee_id],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, Option<f64>>(2)?,
                    row.get::<_, Option<f64>>(3)?,
                ))
            },
        )?;

        let mut stmt = self.conn().prepare(
            "SELECT score, sim_kind, difficulty, created_at
             FROM attempts WHERE trainee_id = ?1
             ORDER BY created_at DESC, id DESC LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![trainee_id, RECENT_SCORE_COUNT as i64], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, i64>(3)?,
            ))
        })?;
        let mut recent_scores = Vec::new();
        for row in rows {
            let (score, kind, difficulty, created_at) = row?;
            recent_scores.push(RecentScore {
                score,
                kind: kind.parse()?,
                difficulty,
                created_at,
            });
        }

        Ok(TraineeStats {
            total_attempts,
            correct_count,
            avg_score,
            avg_time_ms,
            security_score: trainee.security_score,
            xp: trainee.xp,
            level: trainee.level,
            current_streak: trainee.current_streak,
            best_streak: trainee.best_streak,
            simulations_completed: trainee.simulations_completed,
            recent_scores,
        })
    }

    /// Derived per-department risk view for the admin screen.
    pub fn department_rollups(&self) -> Result<Vec<DepartmentRollup>, GuardError> {
        let mut stmt = self.conn().prepare(
            "SELECT d.id, d.name, d.risk_score,
                    (SELECT COUNT(*) FROM trainees t WHERE t.dept_id = d.id),
                    (SELECT AVG(security_score) FROM trainees t WHERE t.dept_id = d.id),
                    (SELECT COUNT(*) FROM attempts a
                       JOIN trainees t ON a.trainee_id = t.id
                      WHERE t.dept_id = d.id)
             FROM departments d ORDER BY d.id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(DepartmentRollup {
                id: row.get(0)?,
                name: row.get(1)?,
                risk_score: row.get(2)?,
                trainee_count: row.get(3)?,
                avg_security_score: row.get(4)?,
                total_attempts: row.get(5)?,
            })
        })?;
        collect(rows)
    }
}

fn collect<T>(
    rows: impl Iterator<Item = Result<T, rusqlite::Error>>,
) -> Result<Vec<T>, GuardError> {
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}
