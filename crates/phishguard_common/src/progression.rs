//! Scoring & Progression Engine - pure policy half.
//!
//! Everything here is arithmetic over a snapshot of a trainee's progression
//! fields; the store applies the result inside the same transaction that
//! records the attempt. No randomness, no I/O.
//!
//! XP design: the raw score feeds XP sub-linearly (divided by 10) while
//! difficulty feeds it multiplicatively, so grinding trivial simulations
//! cannot outpace genuine skill progression. The security-score formula is
//! asymmetric: one realistic compromise at high difficulty hurts more than
//! one success at the same difficulty helps.

use crate::error::GuardError;
use serde::{Deserialize, Serialize};

/// XP needed per level. Level is always `xp / 200 + 1`.
pub const XP_PER_LEVEL: i64 = 200;

/// Base XP for a correct attempt.
pub const CORRECT_BASE_XP: i64 = 50;

/// Base XP for an incorrect attempt (participation floor).
pub const INCORRECT_BASE_XP: i64 = 10;

/// Snapshot of the progression fields read from a trainee row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraineeProgress {
    pub xp: i64,
    pub current_streak: i64,
    pub best_streak: i64,
    pub security_score: i64,
}

/// One evaluated attempt outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptOutcome {
    pub score: i64,
    pub difficulty: i64,
    pub is_correct: bool,
}

/// The full set of fields to write back to the trainee row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressionUpdate {
    pub xp_awarded: i64,
    pub total_xp: i64,
    pub new_level: i64,
    pub new_streak: i64,
    pub best_streak: i64,
    pub security_score: i64,
}

/// Level as a pure function of XP.
pub fn level_for_xp(xp: i64) -> i64 {
    xp / XP_PER_LEVEL + 1
}

/// Check an outcome's ranges before it reaches the store.
pub fn validate_outcome(score: i64, difficulty: i64) -> Result<(), GuardError> {
    if !(0..=100).contains(&score) {
        return Err(GuardError::Validation(format!(
            "score {} out of range 0-100",
            score
        )));
    }
    if !(1..=5).contains(&difficulty) {
        return Err(GuardError::Validation(format!(
            "difficulty {} out of range 1-5",
            difficulty
        )));
    }
    Ok(())
}

/// Apply one outcome to a progression snapshot.
///
/// Callers must have validated the outcome; this function assumes the
/// ranges hold and never fails.
pub fn apply(progress: &TraineeProgress, outcome: &AttemptOutcome) -> ProgressionUpdate {
    let base_xp = if outcome.is_correct {
        CORRECT_BASE_XP
    } else {
        INCORRECT_BASE_XP
    };

    let xp_awarded =
        (base_xp as f64 * outcome.difficulty as f64 * 0.5 + outcome.score as f64 / 10.0) as i64;
    let total_xp = progress.xp + xp_awarded;
    let new_level = level_for_xp(total_xp);

    let new_streak = if outcome.is_correct {
        progress.current_streak + 1
    } else {
        0
    };
    let best_streak = progress.best_streak.max(new_streak);

    let security_score = if outcome.is_correct {
        (progress.security_score + 2 + outcome.difficulty).min(100)
    } else {
        (progress.security_score - 3 - outcome.difficulty).max(0)
    };

    ProgressionUpdate {
        xp_awarded,
        total_xp,
        new_level,
        new_streak,
        best_streak,
        security_score,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh() -> TraineeProgress {
        TraineeProgress {
            xp: 0,
            current_streak: 0,
            best_streak: 0,
            security_score: 100,
        }
    }

    #[test]
    fn test_fresh_trainee_correct_attempt() {
        // score=90 difficulty=3 correct: floor(50*3*0.5 + 9) = 84
        let up = apply(
            &fresh(),
            &AttemptOutcome {
                score: 90,
                difficulty: 3,
                is_correct: true,
            },
        );
        assert_eq!(up.xp_awarded, 84);
        assert_eq!(up.total_xp, 84);
        assert_eq!(up.new_level, 1);
        assert_eq!(up.new_streak, 1);
    }

    #[test]
    fn test_level_up_crossing_200() {
        let progress = TraineeProgress {
            xp: 180,
            ..fresh()
        };
        // score=100 difficulty=2 correct: floor(50*2*0.5 + 10) = 60
        let up = apply(
            &progress,
            &AttemptOutcome {
                score: 100,
                difficulty: 2,
                is_correct: true,
            },
        );
        assert_eq!(up.xp_awarded, 60);
        assert_eq!(up.total_xp, 240);
        assert_eq!(up.new_level, 2);
    }

    #[test]
    fn test_security_score_penalty() {
        let progress = TraineeProgress {
            security_score: 95,
            ..fresh()
        };
        let up = apply(
            &progress,
            &AttemptOutcome {
                score: 20,
                difficulty: 5,
                is_correct: false,
            },
        );
        assert_eq!(up.security_score, 87); // 95 - 3 - 5
    }

    #[test]
    fn test_security_score_clamped_at_100() {
        let progress = TraineeProgress {
            security_score: 99,
            ..fresh()
        };
        let up = apply(
            &progress,
            &AttemptOutcome {
                score: 80,
                difficulty: 1,
                is_correct: true,
            },
        );
        assert_eq!(up.security_score, 100); // min(100, 99+2+1)
    }

    #[test]
    fn test_security_score_clamped_at_0() {
        let progress = TraineeProgress {
            security_score: 4,
            ..fresh()
        };
        let up = apply(
            &progress,
            &AttemptOutcome {
                score: 0,
                difficulty: 5,
                is_correct: false,
            },
        );
        assert_eq!(up.security_score, 0);
    }

    #[test]
    fn test_incorrect_resets_streak() {
        let progress = TraineeProgress {
            current_streak: 9,
            best_streak: 9,
            ..fresh()
        };
        let up = apply(
            &progress,
            &AttemptOutcome {
                score: 30,
                difficulty: 2,
                is_correct: false,
            },
        );
        assert_eq!(up.new_streak, 0);
        assert_eq!(up.best_streak, 9); // best is preserved
    }

    #[test]
    fn test_best_streak_follows_current() {
        let progress = TraineeProgress {
            current_streak: 4,
            best_streak: 4,
            ..fresh()
        };
        let up = apply(
            &progress,
            &AttemptOutcome {
                score: 70,
                difficulty: 2,
                is_correct: true,
            },
        );
        assert_eq!(up.new_streak, 5);
        assert_eq!(up.best_streak, 5);
    }

    #[test]
    fn test_incorrect_still_awards_xp() {
        // XP is monotonic: even a failed attempt earns a little.
        let up = apply(
            &fresh(),
            &AttemptOutcome {
                score: 0,
                difficulty: 1,
                is_correct: false,
            },
        );
        assert_eq!(up.xp_awarded, 5); // floor(10*1*0.5 + 0)
        assert!(up.xp_awarded > 0);
    }

    #[test]
    fn test_level_is_pure_function_of_xp() {
        assert_eq!(level_for_xp(0), 1);
        assert_eq!(level_for_xp(199), 1);
        assert_eq!(level_for_xp(200), 2);
        assert_eq!(level_for_xp(399), 2);
        assert_eq!(level_for_xp(400), 3);
    }

    #[test]
    fn test_invariants_over_sequence() {
        let mut progress = fresh();
        let outcomes = [
            (90, 3, true),
            (10, 5, false),
            (100, 4, true),
            (55, 1, true),
            (0, 5, false),
            (75, 2, true),
        ];
        for (score, difficulty, is_correct) in outcomes {
            let up = apply(
                &progress,
                &AttemptOutcome {
                    score,
                    difficulty,
                    is_correct,
                },
            );
            assert_eq!(up.new_level, level_for_xp(up.total_xp));
            assert!(up.best_streak >= up.new_streak);
            assert!((0..=100).contains(&up.security_score));
            assert!(up.total_xp >= progress.xp);
            progress = TraineeProgress {
                xp: up.total_xp,
                current_streak: up.new_streak,
                best_streak: up.best_streak,
                security_score: up.security_score,
            };
        }
    }

    #[test]
    fn test_validate_outcome_ranges() {
        assert!(validate_outcome(0, 1).is_ok());
        assert!(validate_outcome(100, 5).is_ok());
        assert!(validate_outcome(-1, 3).is_err());
        assert!(validate_outcome(101, 3).is_err());
        assert!(validate_outcome(50, 0).is_err());
        assert!(validate_outcome(50, 6).is_err());
    }
}
