//! API routes for phishguardd
//!
//! Thin glue over the core library: handlers validate input, hold the
//! store lock for the duration of one operation, and map `GuardError`
//! onto HTTP statuses.

use crate::judge;
use crate::prompts;
use crate::server::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use phishguard_common::{
    Attempt, AttemptRecorded, AttemptRequest, GuardError, SeedSummary, SimKind,
};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info, warn};

type AppStateArc = Arc<AppState>;
type ApiError = (StatusCode, Json<Value>);

fn reject(err: GuardError) -> ApiError {
    let status =
        StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(json!({ "error": err.to_string() })))
}

// ============================================================================
// Health Routes
// ============================================================================

pub fn health_routes() -> Router<AppStateArc> {
    Router::new().route("/api/health", get(health))
}

async fn health(State(state): State<AppStateArc>) -> Result<Json<Value>, ApiError> {
    let schema_version = {
        let store = state.store.lock().await;
        store.schema_version().map_err(reject)?
    };
    Ok(Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_secs": state.start_time.elapsed().as_secs(),
        "schema_version": schema_version,
        "genai_ready": state.genai.has_key(),
    })))
}

// ============================================================================
// Generation Routes
// ============================================================================

#[derive(Deserialize)]
struct GenerateRequest {
    trainee_id: i64,
}

pub fn generation_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/api/generate/email", post(generate_email))
        .route("/api/generate/phone", post(generate_phone))
        .route("/api/generate/deepfake", post(generate_deepfake))
}

async fn generate_email(
    State(state): State<AppStateArc>,
    Json(req): Json<GenerateRequest>,
) -> Result<Json<Value>, ApiError> {
    let difficulty = {
        let store = state.store.lock().await;
        store.select_difficulty(req.trainee_id).map_err(reject)?
    };
    info!("  Generating email simulation at difficulty {}", difficulty);

    let content = state
        .genai
        .generate_json(
            &prompts::email_prompt(difficulty),
            None,
            &prompts::email_schema(),
        )
        .await
        .map_err(reject)?;

    let simulation_id = {
        let store = state.store.lock().await;
        store
            .insert_simulation(SimKind::Email, difficulty, Some(&content))
            .map_err(reject)?
    };

    Ok(Json(json!({
        "simulation_id": simulation_id,
        "kind": "email",
        "difficulty": difficulty,
        "content": content,
    })))
}

async fn generate_phone(
    State(state): State<AppStateArc>,
    Json(req): Json<GenerateRequest>,
) -> Result<Json<Value>, ApiError> {
    let difficulty = {
        let store = state.store.lock().await;
        store.select_difficulty(req.trainee_id).map_err(reject)?
    };
    let scenario = prompts::PHONE_SCENARIOS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(prompts::PHONE_SCENARIOS[0]);
    info!("  Generating phone simulation at difficulty {}", difficulty);

    let mut content = state
        .genai
        .generate_json(
            &prompts::phone_prompt(difficulty, scenario),
            None,
            &prompts::phone_schema(),
        )
        .await
        .map_err(reject)?;

    // Audio is best-effort for vishing; the script carries the drill.
    let script: String = content["attackerScript"]
        .as_str()
        .unwrap_or_default()
        .chars()
        .take(prompts::TTS_SCRIPT_LIMIT)
        .collect();
    if !script.is_empty() {
        match state.genai.synthesize(&script, prompts::BASELINE_VOICE).await {
            Ok(audio) => content["audioBase64"] = json!(audio),
            Err(e) => warn!("  TTS failed for phone simulation: {}", e),
        }
    }

    let simulation_id = {
        let store = state.store.lock().await;
        store
            .insert_simulation(SimKind::Phone, difficulty, Some(&content))
            .map_err(reject)?
    };

    Ok(Json(json!({
        "simulation_id": simulation_id,
        "kind": "phone",
        "difficulty": difficulty,
        "content": content,
    })))
}

async fn generate_deepfake(
    State(state): State<AppStateArc>,
    Json(req): Json<GenerateRequest>,
) -> Result<Json<Value>, ApiError> {
    let difficulty = {
        let store = state.store.lock().await;
        store.select_difficulty(req.trainee_id).map_err(reject)?
    };

    let (script, is_synthetic, voice) = {
        let mut rng = rand::thread_rng();
        let script = prompts::DEEPFAKE_SCRIPTS
            .choose(&mut rng)
            .copied()
            .unwrap_or(prompts::DEEPFAKE_SCRIPTS[0]);
        let is_synthetic = rng.gen_bool(0.65);
        let voice = if is_synthetic {
            prompts::DEEPFAKE_VOICES
                .choose(&mut rng)
                .copied()
                .unwrap_or(prompts::DEEPFAKE_VOICES[0])
        } else {
            prompts::BASELINE_VOICE
        };
        (script, is_synthetic, voice)
    };
    info!(
        "  Generating deepfake simulation at difficulty {} (synthetic: {})",
        difficulty, is_synthetic
    );

    // Without audio there is nothing to judge, so TTS failure is fatal here.
    let audio = state
        .genai
        .synthesize(script, voice)
        .await
        .map_err(reject)?;

    let content = json!({ "script": script, "isSynthetic": is_synthetic });
    let simulation_id = {
        let store = state.store.lock().await;
        store
            .insert_simulation(SimKind::Deepfake, difficulty, Some(&content))
            .map_err(reject)?
    };

    Ok(Json(json!({
        "simulation_id": simulation_id,
        "kind": "deepfake",
        "difficulty": difficulty,
        "audioBase64": audio,
        "isSynthetic": is_synthetic,
        "hints": prompts::deepfake_hints(difficulty),
    })))
}

// ============================================================================
// Judging Routes
// ============================================================================

#[derive(Deserialize)]
struct AnalyzeRequest {
    kind: SimKind,
    content: Value,
    #[serde(default)]
    flags: Vec<String>,
}

#[derive(Deserialize)]
struct EngagementRequest {
    scenario: String,
    #[serde(default)]
    attacker_script: String,
    #[serde(default)]
    transcript: String,
}

#[derive(Deserialize)]
struct ChatRequest {
    message: String,
    #[serde(default)]
    context: Option<String>,
}

pub fn judging_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/api/analyze", post(analyze_flags))
        .route("/api/analyze/engagement", post(analyze_engagement))
        .route("/api/chat", post(chat))
}

async fn analyze_flags(
    State(state): State<AppStateArc>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<Value>, ApiError> {
    // Audio payloads are large and meaningless to the grader.
    let mut content = req.content;
    if let Some(obj) = content.as_object_mut() {
        obj.remove("audioBase64");
    }

    let verdict = state
        .genai
        .generate_json(
            &prompts::analysis_prompt(req.kind.as_str(), &content, &req.flags),
            None,
            &prompts::analysis_schema(),
        )
        .await
        .map_err(reject)?;
    Ok(Json(verdict))
}

async fn analyze_engagement(
    State(state): State<AppStateArc>,
    Json(req): Json<EngagementRequest>,
) -> Result<Json<Value>, ApiError> {
    if judge::is_disengaged(&req.transcript) {
        info!("  Caller disengaged, skipping AI judge");
        return Ok(Json(judge::disengaged_verdict()));
    }

    let verdict = state
        .genai
        .generate_json(
            &prompts::engagement_prompt(&req.scenario, &req.attacker_script, &req.transcript),
            None,
            &prompts::engagement_schema(),
        )
        .await
        .map_err(reject)?;
    Ok(Json(verdict))
}

async fn chat(
    State(state): State<AppStateArc>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<Value>, ApiError> {
    if req.message.trim().is_empty() {
        return Err(reject(GuardError::Validation("message is empty".into())));
    }
    let system = prompts::chat_system(req.context.as_deref());
    let reply = state
        .genai
        .generate_text(&req.message, Some(&system))
        .await
        .map_err(reject)?;
    Ok(Json(json!({ "reply": reply })))
}

// ============================================================================
// Progression Routes
// ============================================================================

#[derive(Deserialize)]
struct TraineeQuery {
    trainee_id: i64,
}

pub fn progression_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/api/results", post(record_result))
        .route("/api/stats", get(trainee_stats))
        .route("/api/reports", get(trainee_reports))
}

async fn record_result(
    State(state): State<AppStateArc>,
    Json(req): Json<AttemptRequest>,
) -> Result<Json<AttemptRecorded>, ApiError> {
    let store = state.store.lock().await;
    let recorded = store.record_attempt(&req).map_err(reject)?;
    info!(
        "  Recorded attempt {} for trainee {} (+{} XP)",
        recorded.attempt_id, req.trainee_id, recorded.progression.xp_awarded
    );
    Ok(Json(recorded))
}

async fn trainee_stats(
    State(state): State<AppStateArc>,
    Query(q): Query<TraineeQuery>,
) -> Result<Json<Value>, ApiError> {
    let store = state.store.lock().await;
    let stats = store.trainee_stats(q.trainee_id).map_err(reject)?;
    Ok(Json(serde_json::to_value(stats).map_err(|e| {
        reject(GuardError::Store(e.to_string()))
    })?))
}

async fn trainee_reports(
    State(state): State<AppStateArc>,
    Query(q): Query<TraineeQuery>,
) -> Result<Json<Vec<Attempt>>, ApiError> {
    let store = state.store.lock().await;
    let reports = store
        .recent_reports(q.trainee_id, phishguard_common::analytics::REPORT_ATTEMPTS)
        .map_err(reject)?;
    Ok(Json(reports))
}

// ============================================================================
// Analytics Routes
// ============================================================================

pub fn analytics_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/api/analytics/timeline", get(analytics_timeline))
        .route("/api/analytics/by-kind", get(analytics_by_kind))
        .route(
            "/api/analytics/difficulty-curve",
            get(analytics_difficulty_curve),
        )
        .route("/api/analytics/leaderboard", get(analytics_leaderboard))
}

async fn analytics_timeline(
    State(state): State<AppStateArc>,
    Query(q): Query<TraineeQuery>,
) -> Result<Json<Value>, ApiError> {
    let store = state.store.lock().await;
    let points = store.timeline(q.trainee_id).map_err(reject)?;
    Ok(Json(json!({ "timeline": points })))
}

async fn analytics_by_kind(
    State(state): State<AppStateArc>,
    Query(q): Query<TraineeQuery>,
) -> Result<Json<Value>, ApiError> {
    let store = state.store.lock().await;
    let rows = store.by_kind(q.trainee_id).map_err(reject)?;
    Ok(Json(json!({ "by_kind": rows })))
}

async fn analytics_difficulty_curve(
    State(state): State<AppStateArc>,
    Query(q): Query<TraineeQuery>,
) -> Result<Json<Value>, ApiError> {
    let store = state.store.lock().await;
    let curve = store.difficulty_curve(q.trainee_id).map_err(reject)?;
    Ok(Json(json!({ "difficulty_curve": curve })))
}

async fn analytics_leaderboard(
    State(state): State<AppStateArc>,
) -> Result<Json<Value>, ApiError> {
    let store = state.store.lock().await;
    let rows = store.leaderboard().map_err(reject)?;
    Ok(Json(json!({ "leaderboard": rows })))
}

// ============================================================================
// Admin Routes
// ============================================================================

#[derive(Deserialize)]
struct CreateCampaignRequest {
    name: String,
    target_dept_id: i64,
    sim_kind: SimKind,
}

pub fn admin_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/api/admin/overview", get(admin_overview))
        .route("/api/admin/departments", get(admin_departments))
        .route(
            "/api/admin/campaigns",
            get(list_campaigns).post(create_campaign),
        )
        .route("/api/admin/campaigns/:id", delete(delete_campaign))
        .route("/api/admin/seed", post(seed))
        .route("/api/threat-feed", get(threat_feed))
}

async fn admin_overview(State(state): State<AppStateArc>) -> Result<Json<Value>, ApiError> {
    let store = state.store.lock().await;
    let overview = store.admin_overview().map_err(reject)?;
    Ok(Json(serde_json::to_value(overview).map_err(|e| {
        reject(GuardError::Store(e.to_string()))
    })?))
}

async fn admin_departments(State(state): State<AppStateArc>) -> Result<Json<Value>, ApiError> {
    let store = state.store.lock().await;
    let rollups = store.department_rollups().map_err(reject)?;
    Ok(Json(json!({ "departments": rollups })))
}

async fn list_campaigns(State(state): State<AppStateArc>) -> Result<Json<Value>, ApiError> {
    let store = state.store.lock().await;
    let campaigns = store.list_campaigns().map_err(reject)?;
    Ok(Json(json!({ "campaigns": campaigns })))
}

async fn create_campaign(
    State(state): State<AppStateArc>,
    Json(req): Json<CreateCampaignRequest>,
) -> Result<Json<Value>, ApiError> {
    if req.name.trim().is_empty() {
        return Err(reject(GuardError::Validation(
            "campaign name is empty".into(),
        )));
    }
    let store = state.store.lock().await;
    let id = store
        .insert_campaign(req.name.trim(), req.target_dept_id, req.sim_kind)
        .map_err(reject)?;
    info!("  Launched campaign {} ({})", id, req.name.trim());
    Ok(Json(json!({ "id": id, "status": "active" })))
}

async fn delete_campaign(
    State(state): State<AppStateArc>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let store = state.store.lock().await;
    store.delete_campaign(id).map_err(reject)?;
    info!("  Deleted campaign {}", id);
    Ok(Json(json!({ "deleted": id })))
}

async fn seed(State(state): State<AppStateArc>) -> Result<Json<SeedSummary>, ApiError> {
    let store = state.store.lock().await;
    let summary = phishguard_common::seed::seed_demo_data(&store).map_err(reject)?;
    if summary.seeded {
        info!(
            "  Seeded {} departments, {} trainees, {} attempts",
            summary.departments, summary.trainees, summary.attempts
        );
    }
    Ok(Json(summary))
}

// Static curated feed; refreshed by hand when the landscape shifts.
async fn threat_feed() -> Json<Value> {
    Json(json!({
        "updated": "2026-08",
        "threats": [
            {
                "title": "BEC wire-fraud wave targeting mid-market finance teams",
                "kind": "email",
                "severity": "high",
                "summary": "Spoofed CFO mailboxes requesting urgent same-day wires; \
                            reply-to domains typosquat the real corporate domain."
            },
            {
                "title": "Vendor payment-change requests via compromised mailboxes",
                "kind": "email",
                "severity": "high",
                "summary": "Attackers hijack real vendor threads and slip in new \
                            bank details; verify every change out of band."
            },
            {
                "title": "Voice-cloned executive calls approving transfers",
                "kind": "deepfake",
                "severity": "critical",
                "summary": "Synthesized executive voices pressure staff into approving \
                            payments; a callback on a known number defeats the play."
            },
            {
                "title": "Bank 'fraud department' callback scams",
                "kind": "phone",
                "severity": "medium",
                "summary": "Callers claiming to reverse fraudulent charges harvest \
                            one-time passcodes; banks never ask for codes by phone."
            }
        ]
    }))
}
