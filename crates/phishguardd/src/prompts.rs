//! Prompt builders and response schemas for simulation generation and
//! judging. All simulations are finance-sector themed.

use serde_json::{json, Value};

/// Vishing call scenarios, one picked at random per phone simulation.
pub const PHONE_SCENARIOS: &[&str] = &[
    "Bank or credit union fraud department about suspicious transactions requiring verification",
    "CEO or CFO urgently requesting a wire transfer or ACH change",
    "Vendor or supplier requesting updated payment details or a new bank account",
    "Tax authority or IRS threatening legal action unless immediate payment",
    "Investment or treasury team offering a time-sensitive opportunity",
    "Loan servicer or refinance offer requesting personal or account information",
    "Audit or compliance team asking to confirm credentials or approve a payment",
];

/// Canned scripts read aloud for deepfake detection drills.
pub const DEEPFAKE_SCRIPTS: &[&str] = &[
    "Hi team, this is a reminder that our quarterly review has been moved to 3 PM. Please update your calendars.",
    "This is a confidential message from the executive office. We need you to authorize the wire transfer immediately.",
    "Hey, just confirming our lunch meeting tomorrow at noon. Looking forward to it.",
    "Attention all employees. There has been a security breach in Sector 7. Report to safety zones immediately.",
    "I'm calling from IT regarding the system migration this weekend. We'll need your login credentials to ensure a smooth transition.",
];

/// TTS voices used for synthetic deepfake clips.
pub const DEEPFAKE_VOICES: &[&str] = &["Charon", "Kore", "Fenrir", "Aoede", "Puck"];

/// Voice used for authentic (non-synthetic) clips and vishing calls.
pub const BASELINE_VOICE: &str = "Aoede";

/// How much of the attacker script is fed to TTS.
pub const TTS_SCRIPT_LIMIT: usize = 500;

pub fn email_prompt(difficulty: i64) -> String {
    let style = if difficulty <= 2 {
        "use obvious red flags: misspellings, generic greetings, suspicious domains"
    } else if difficulty <= 3 {
        "use convincing finance language with subtle domain spoofing and urgency"
    } else {
        "use highly targeted finance spear phishing: typosquatted bank/vendor domains, \
         CFO impersonation, specific wire or invoice details"
    };
    format!(
        "Generate a realistic phishing email for finance-sector cybersecurity training. \
         The target is a finance/accounting employee.\n\
         Theme: finance-oriented attacks only — e.g. urgent wire transfer request, fake invoice \
         or payment change, banking/account verification, CFO or executive impersonation, ACH or \
         vendor payment redirect, investment or treasury scam, loan/refund fraud.\n\
         Difficulty: {d}/5 (1=obvious spam, 3=convincing finance email, 5=targeted BEC/wire fraud).\n\
         At difficulty {d}, {style}.\n\
         Include: subject, sender name, sender email (domain should look finance-related but \
         suspicious scaled to difficulty), body in Markdown with embedded suspicious links, \
         3-6 red flags, explanation of the attack vector.",
        d = difficulty,
        style = style
    )
}

pub fn email_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "subject": { "type": "STRING" },
            "senderName": { "type": "STRING" },
            "senderEmail": { "type": "STRING" },
            "body": { "type": "STRING" },
            "redFlags": { "type": "ARRAY", "items": { "type": "STRING" } },
            "explanation": { "type": "STRING" },
            "attackVector": { "type": "STRING" },
        },
        "required": ["subject", "senderName", "senderEmail", "body", "redFlags", "explanation"],
    })
}

pub fn phone_prompt(difficulty: i64, scenario: &str) -> String {
    format!(
        "Generate a vishing (voice phishing) phone call script for finance-sector training. \
         The target is a finance/accounting employee.\n\
         Difficulty: {}/5. Scenario: {}\n\
         Keep the scenario finance-focused (wires, payments, accounts, verification). \
         Include: caller persona (name, role, org), scenario description, full attacker script \
         (2-3 paragraphs, conversational), 4-6 red flags, explanation of technique used.",
        difficulty, scenario
    )
}

pub fn phone_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "callerName": { "type": "STRING" },
            "callerRole": { "type": "STRING" },
            "scenario": { "type": "STRING" },
            "attackerScript": { "type": "STRING" },
            "redFlags": { "type": "ARRAY", "items": { "type": "STRING" } },
            "explanation": { "type": "STRING" },
            "technique": { "type": "STRING" },
        },
        "required": ["scenario", "attackerScript", "redFlags", "explanation"],
    })
}

/// Listening hints shown alongside a deepfake clip, broader at low tiers.
pub fn deepfake_hints(difficulty: i64) -> Vec<&'static str> {
    if difficulty <= 2 {
        vec![
            "Unusually consistent pitch",
            "No natural breathing sounds",
            "Emotion doesn't match urgency",
        ]
    } else if difficulty <= 3 {
        vec!["Pay attention to micro-pauses", "Listen for breathing patterns"]
    } else {
        vec!["Trust your instincts"]
    }
}

pub fn engagement_prompt(scenario: &str, attacker_script: &str, transcript: &str) -> String {
    let script: String = attacker_script.chars().take(1500).collect();
    format!(
        "You are a vishing (voice phishing) security trainer. The employee received a suspicious \
         call. Call scenario: {}. Attacker script (what the caller said): {}. The employee \
         responded with: \"{}\". They then ended the call.\n\
         Assess: Did the employee engage in conversation (answer questions, give info, or continue \
         talking) instead of hanging up immediately? If they engaged at all, that was the wrong \
         decision. Return JSON with: correct (false if they engaged), score (0-100; 100 only if \
         they said nothing substantive or hung up immediately), feedback (2-4 sentences: explain \
         why engaging was wrong and that they should hang up immediately next time), missedFlags \
         (array of what they did wrong, e.g. \"Engaged in conversation\"), correctFlags (array, \
         empty if they engaged).",
        scenario, script, transcript
    )
}

pub fn engagement_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "correct": { "type": "BOOLEAN" },
            "score": { "type": "NUMBER" },
            "feedback": { "type": "STRING" },
            "missedFlags": { "type": "ARRAY", "items": { "type": "STRING" } },
            "correctFlags": { "type": "ARRAY", "items": { "type": "STRING" } },
        },
        "required": ["correct", "score", "feedback", "missedFlags", "correctFlags"],
    })
}

pub fn analysis_prompt(kind: &str, content: &Value, flags: &[String]) -> String {
    let flags = if flags.is_empty() {
        "(none)".to_string()
    } else {
        flags.join(", ")
    };
    format!(
        "You are an expert cybersecurity analyst grading threat detection.\n\
         Type: {}. Content: {}. User flags: {}.\n\
         Score 0-100 based on accuracy. List correct and missed flags. Give 2-3 sentence \
         actionable feedback. Suggest one skill to improve.",
        kind, content, flags
    )
}

pub fn analysis_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "score": { "type": "NUMBER" },
            "missedFlags": { "type": "ARRAY", "items": { "type": "STRING" } },
            "correctFlags": { "type": "ARRAY", "items": { "type": "STRING" } },
            "feedback": { "type": "STRING" },
            "skillToImprove": { "type": "STRING" },
        },
        "required": ["score", "missedFlags", "correctFlags", "feedback"],
    })
}

pub fn chat_system(context: Option<&str>) -> String {
    let mut sys = "You are PhisherBot, a cybersecurity training AI. Be concise (2-4 sentences). \
                   Give actionable advice."
        .to_string();
    if let Some(ctx) = context {
        sys.push_str(&format!(" Current simulation context: {}", ctx));
    }
    sys
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_prompt_scales_with_difficulty() {
        assert!(email_prompt(1).contains("obvious red flags"));
        assert!(email_prompt(3).contains("subtle domain spoofing"));
        assert!(email_prompt(5).contains("spear phishing"));
    }

    #[test]
    fn test_deepfake_hints_narrow_with_difficulty() {
        assert_eq!(deepfake_hints(1).len(), 3);
        assert_eq!(deepfake_hints(3).len(), 2);
        assert_eq!(deepfake_hints(5).len(), 1);
    }

    #[test]
    fn test_engagement_prompt_truncates_script() {
        let long_script = "a".repeat(5000);
        let prompt = engagement_prompt("wire fraud", &long_script, "hello?");
        assert!(prompt.len() < 3000);
    }

    #[test]
    fn test_schemas_list_required_fields() {
        assert!(email_schema()["required"]
            .as_array()
            .unwrap()
            .contains(&serde_json::json!("redFlags")));
        assert!(engagement_schema()["required"]
            .as_array()
            .unwrap()
            .contains(&serde_json::json!("correct")));
    }
}
