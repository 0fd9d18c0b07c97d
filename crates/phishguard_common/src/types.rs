//! Shared domain types for PhishGuard.
//!
//! Entities mirror the five relations in the store; rollup structs are the
//! read-side shapes the analytics endpoints and the CLI share. Timestamps
//! are epoch seconds throughout.

use crate::error::GuardError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Kind of training simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimKind {
    Email,
    Phone,
    Deepfake,
}

impl SimKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SimKind::Email => "email",
            SimKind::Phone => "phone",
            SimKind::Deepfake => "deepfake",
        }
    }

    pub const ALL: [SimKind; 3] = [SimKind::Email, SimKind::Phone, SimKind::Deepfake];
}

impl FromStr for SimKind {
    type Err = GuardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "email" => Ok(SimKind::Email),
            "phone" => Ok(SimKind::Phone),
            "deepfake" => Ok(SimKind::Deepfake),
            other => Err(GuardError::Validation(format!(
                "unknown simulation kind '{}'",
                other
            ))),
        }
    }
}

impl std::fmt::Display for SimKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Organizational grouping of trainees.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Department {
    pub id: i64,
    pub name: String,
    /// Baseline risk score 0-100, set at seed time.
    pub risk_score: i64,
}

/// A person undergoing training. Mutated exclusively by the progression
/// engine after each attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trainee {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub dept_id: Option<i64>,
    pub security_score: i64,
    pub simulations_completed: i64,
    pub current_streak: i64,
    pub best_streak: i64,
    pub xp: i64,
    pub level: i64,
}

/// One generated training artifact. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Simulation {
    pub id: i64,
    pub kind: SimKind,
    pub difficulty: i64,
    /// Opaque generated payload; None for placeholder rows synthesized at
    /// attempt submission.
    pub content: Option<serde_json::Value>,
    pub created_at: i64,
}

/// Administrative grouping of simulations targeted at a department.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Campaign {
    pub id: i64,
    pub name: String,
    pub status: String,
    pub target_dept_id: i64,
    pub sim_kind: SimKind,
    pub launched_at: i64,
}

/// A single scored trainee response. Immutable once created; corrections
/// are modeled as new attempts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attempt {
    pub id: i64,
    pub trainee_id: i64,
    pub simulation_id: i64,
    pub campaign_id: Option<i64>,
    pub kind: SimKind,
    pub is_correct: bool,
    pub score: i64,
    pub response_time_ms: i64,
    pub difficulty: i64,
    pub flags_identified: Vec<String>,
    pub flags_missed: Vec<String>,
    pub feedback: String,
    pub created_at: i64,
}

/// Input for recording an attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptRequest {
    pub trainee_id: i64,
    /// A placeholder simulation row is synthesized when absent.
    #[serde(default)]
    pub simulation_id: Option<i64>,
    #[serde(default)]
    pub campaign_id: Option<i64>,
    pub kind: SimKind,
    pub is_correct: bool,
    pub score: i64,
    #[serde(default)]
    pub response_time_ms: i64,
    pub difficulty: i64,
    #[serde(default)]
    pub flags_identified: Vec<String>,
    #[serde(default)]
    pub flags_missed: Vec<String>,
    #[serde(default)]
    pub feedback: Option<String>,
}

/// Progression outcome returned from recording an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressionResult {
    pub xp_awarded: i64,
    pub new_level: i64,
    pub new_streak: i64,
    pub total_xp: i64,
}

/// An attempt id plus the progression it triggered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptRecorded {
    pub attempt_id: i64,
    #[serde(flatten)]
    pub progression: ProgressionResult,
}

// ============================================================================
// Read-side rollup shapes
// ============================================================================

/// Per-day activity for one trainee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelinePoint {
    /// ISO date (YYYY-MM-DD).
    pub date: String,
    pub attempts: i64,
    pub avg_score: f64,
    pub correct: i64,
    pub avg_time_ms: f64,
}

/// Per-simulation-kind breakdown for one trainee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KindBreakdown {
    pub kind: SimKind,
    pub attempts: i64,
    pub avg_score: f64,
    pub correct: i64,
}

/// Mean score per difficulty tier for one trainee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifficultyPoint {
    pub difficulty: i64,
    pub avg_score: f64,
    pub attempts: i64,
}

/// Organization-wide leaderboard row, ordered by XP descending.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardRow {
    pub name: String,
    pub security_score: i64,
    pub xp: i64,
    pub level: i64,
    pub current_streak: i64,
    pub best_streak: i64,
    pub dept_name: Option<String>,
    pub total_attempts: i64,
    pub avg_score: Option<f64>,
}

/// Per-kind organization risk figures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KindRisk {
    pub kind: SimKind,
    pub total: i64,
    pub avg_score: f64,
    /// compromises / total * 100
    pub fail_rate: f64,
}

/// One point of the 14-day organization score trend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: String,
    pub avg_score: f64,
    pub volume: i64,
}

/// Organization-wide admin overview.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminOverview {
    pub total_attempts: i64,
    /// Attempts where the trainee detected the attack.
    pub detected: i64,
    /// Attempts where the trainee was compromised.
    pub compromised: i64,
    pub avg_score: Option<f64>,
    pub avg_time_ms: Option<f64>,
    pub risk_by_kind: Vec<KindRisk>,
    /// Ordered by date descending, most recent 14 days.
    pub trend: Vec<TrendPoint>,
}

/// One of the trainee's most recent scores, for the dashboard sparkline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentScore {
    pub score: i64,
    pub kind: SimKind,
    pub difficulty: i64,
    pub created_at: i64,
}

/// Per-trainee dashboard stats: attempt aggregates plus progression state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraineeStats {
    pub total_attempts: i64,
    pub correct_count: i64,
    pub avg_score: Option<f64>,
    pub avg_time_ms: Option<f64>,
    pub security_score: i64,
    pub xp: i64,
    pub level: i64,
    pub current_streak: i64,
    pub best_streak: i64,
    pub simulations_completed: i64,
    pub recent_scores: Vec<RecentScore>,
}

/// Derived per-department view for the admin screen. Risk is aggregated at
/// read time, never written back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepartmentRollup {
    pub id: i64,
    pub name: String,
    pub risk_score: i64,
    pub trainee_count: i64,
    pub avg_security_score: Option<f64>,
    pub total_attempts: i64,
}

/// Campaign listing row with its response count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignSummary {
    pub id: i64,
    pub name: String,
    pub status: String,
    pub target_dept_id: i64,
    pub dept_name: String,
    pub sim_kind: SimKind,
    pub launched_at: i64,
    pub response_count: i64,
}

/// What the seed bootstrap created.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeedSummary {
    pub seeded: bool,
    pub departments: usize,
    pub trainees: usize,
    pub attempts: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sim_kind_round_trip() {
        for kind in SimKind::ALL {
            assert_eq!(kind.as_str().parse::<SimKind>().unwrap(), kind);
        }
        assert!("smishing".parse::<SimKind>().is_err());
    }

    #[test]
    fn test_sim_kind_serde_lowercase() {
        assert_eq!(serde_json::to_string(&SimKind::Deepfake).unwrap(), "\"deepfake\"");
        let k: SimKind = serde_json::from_str("\"phone\"").unwrap();
        assert_eq!(k, SimKind::Phone);
    }

    #[test]
    fn test_attempt_recorded_flattens_progression() {
        let rec = AttemptRecorded {
            attempt_id: 7,
            progression: ProgressionResult {
                xp_awarded: 84,
                new_level: 1,
                new_streak: 1,
                total_xp: 84,
            },
        };
        let v: serde_json::Value = serde_json::to_value(&rec).unwrap();
        assert_eq!(v["attempt_id"], 7);
        assert_eq!(v["xp_awarded"], 84);
        assert_eq!(v["total_xp"], 84);
    }
}
