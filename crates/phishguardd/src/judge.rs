//! Local judging shortcuts that avoid a model round-trip when the
//! outcome is already decided by the transcript alone.

use serde_json::{json, Value};

/// Transcripts shorter than this many characters count as hanging up
/// immediately.
pub const DISENGAGE_MIN_LEN: usize = 12;

/// Words that on their own do not count as engaging with the caller
/// (greetings plus "who is this" style identification questions).
const GREETINGS: &[&str] = &[
    "hi", "hello", "hey", "yes", "no", "who", "is", "this", "um", "uh",
];

/// True when the trainee effectively hung up without engaging: an empty
/// or very short transcript, or nothing beyond a bare greeting.
pub fn is_disengaged(transcript: &str) -> bool {
    let trimmed = transcript.trim();
    if trimmed.chars().count() < DISENGAGE_MIN_LEN {
        return true;
    }
    let lowered = trimmed.to_lowercase();
    let words: Vec<&str> = lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();
    !words.is_empty() && words.iter().all(|w| GREETINGS.contains(w))
}

/// Perfect-score verdict returned when the trainee hung up immediately.
pub fn disengaged_verdict() -> Value {
    json!({
        "correct": true,
        "score": 100,
        "feedback": "Excellent! You hung up without engaging with the caller. \
                     That is exactly the right response to an unexpected call asking \
                     for information or payment: end the call and verify through an \
                     official channel.",
        "missedFlags": [],
        "correctFlags": ["Hung up immediately", "Did not share any information"],
    })
}
