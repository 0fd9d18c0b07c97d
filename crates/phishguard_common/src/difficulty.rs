//! Difficulty Selector - adaptive tier lookup.
//!
//! The next simulation's tier is a five-branch lookup over the mean of the
//! trainee's five most recent attempt scores. Pure and idempotent; the
//! store wrapper only fetches the history.

/// Tier handed to fresh trainees with insufficient signal.
pub const BOOTSTRAP_TIER: i64 = 2;

/// How many recent attempts feed the rolling average.
pub const HISTORY_WINDOW: usize = 5;

/// Below this many historical attempts, the bootstrap tier is returned
/// regardless of scores.
pub const MIN_HISTORY: usize = 3;

/// Map a recent-score history to a difficulty tier in 1..=5.
pub fn tier_for_history(scores: &[i64]) -> i64 {
    if scores.len() < MIN_HISTORY {
        return BOOTSTRAP_TIER;
    }
    let mean = scores.iter().sum::<i64>() as f64 / scores.len() as f64;
    if mean > 85.0 {
        4
    } else if mean > 70.0 {
        3
    } else if mean > 50.0 {
        2
    } else {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bootstrap_with_no_history() {
        assert_eq!(tier_for_history(&[]), BOOTSTRAP_TIER);
    }

    #[test]
    fn test_bootstrap_below_min_history_regardless_of_scores() {
        assert_eq!(tier_for_history(&[100, 100]), BOOTSTRAP_TIER);
        assert_eq!(tier_for_history(&[0, 0]), BOOTSTRAP_TIER);
    }

    #[test]
    fn test_tier_bands() {
        assert_eq!(tier_for_history(&[90, 90, 90]), 4); // mean 90 > 85
        assert_eq!(tier_for_history(&[80, 80, 80]), 3); // mean 80 > 70
        assert_eq!(tier_for_history(&[60, 60, 60]), 2); // mean 60 > 50
        assert_eq!(tier_for_history(&[40, 40, 40]), 1);
    }

    #[test]
    fn test_band_edges_are_exclusive() {
        assert_eq!(tier_for_history(&[85, 85, 85]), 3); // mean exactly 85
        assert_eq!(tier_for_history(&[70, 70, 70]), 2);
        assert_eq!(tier_for_history(&[50, 50, 50]), 1);
    }

    #[test]
    fn test_pure_function_of_history() {
        let history = [88, 92, 71, 95, 84];
        let first = tier_for_history(&history);
        for _ in 0..10 {
            assert_eq!(tier_for_history(&history), first);
        }
    }
}
