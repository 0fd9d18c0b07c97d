//! Command handlers for phishguardctl.

use anyhow::Result;
use chrono::DateTime;
use owo_colors::OwoColorize;
use phishguard_common::types::{
    AdminOverview, Attempt, CampaignSummary, DepartmentRollup, LeaderboardRow, SeedSummary,
    SimKind, TraineeStats,
};
use serde_json::json;

use crate::client::GuardClient;

fn fmt_epoch(secs: i64) -> String {
    DateTime::from_timestamp(secs, 0)
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn fmt_avg(avg: Option<f64>) -> String {
    match avg {
        Some(v) => format!("{:.1}", v),
        None => "-".to_string(),
    }
}

pub async fn status() -> Result<()> {
    let health = GuardClient::new().get("/api/health").await?;

    println!();
    println!(
        "{}",
        format!("phishguardd v{}", health["version"].as_str().unwrap_or("?")).bold()
    );
    println!("  status     {}", health["status"].as_str().unwrap_or("?").green());
    println!("  uptime     {}s", health["uptime_secs"]);
    println!("  schema     v{}", health["schema_version"]);
    let genai = if health["genai_ready"].as_bool().unwrap_or(false) {
        "ready".green().to_string()
    } else {
        "no API key".yellow().to_string()
    };
    println!("  generation {}", genai);
    Ok(())
}

pub async fn stats(trainee_id: i64) -> Result<()> {
    let body = GuardClient::new()
        .get(&format!("/api/stats?trainee_id={}", trainee_id))
        .await?;
    let s: TraineeStats = serde_json::from_value(body)?;

    println!();
    println!("{}", format!("Trainee {}", trainee_id).bold());
    println!("  level      {} ({} XP)", s.level, s.xp);
    println!("  streak     {} (best {})", s.current_streak, s.best_streak);
    println!("  security   {}/100", s.security_score);
    println!(
        "  attempts   {} total, {} correct, avg score {}",
        s.total_attempts,
        s.correct_count,
        fmt_avg(s.avg_score)
    );
    if !s.recent_scores.is_empty() {
        let line: Vec<String> = s
            .recent_scores
            .iter()
            .map(|r| r.score.to_string())
            .collect();
        println!("  recent     {}", line.join(" "));
    }
    Ok(())
}

pub async fn reports(trainee_id: i64) -> Result<()> {
    let body = GuardClient::new()
        .get(&format!("/api/reports?trainee_id={}", trainee_id))
        .await?;
    let rows: Vec<Attempt> = serde_json::from_value(body)?;

    println!();
    if rows.is_empty() {
        println!("No attempts recorded for trainee {}.", trainee_id);
        return Ok(());
    }
    println!(
        "{}",
        format!("Recent attempts for trainee {}", trainee_id).bold()
    );
    for r in rows {
        let verdict = if r.is_correct {
            "detected".green().to_string()
        } else {
            "compromised".red().to_string()
        };
        println!(
            "  {}  {:8}  d{}  score {:>3}  {}",
            fmt_epoch(r.created_at),
            r.kind.as_str(),
            r.difficulty,
            r.score,
            verdict
        );
    }
    Ok(())
}

pub async fn leaderboard() -> Result<()> {
    let mut body = GuardClient::new().get("/api/analytics/leaderboard").await?;
    let rows: Vec<LeaderboardRow> = serde_json::from_value(body["leaderboard"].take())?;

    println!();
    if rows.is_empty() {
        println!("No trainees yet. Run `phishguardctl seed` for demo data.");
        return Ok(());
    }
    println!("{}", "Leaderboard".bold());
    println!(
        "  {:<4} {:<20} {:<14} {:>5} {:>4} {:>7} {:>9}",
        "#", "name", "department", "xp", "lvl", "streak", "avg score"
    );
    for (i, r) in rows.iter().enumerate() {
        println!(
            "  {:<4} {:<20} {:<14} {:>5} {:>4} {:>7} {:>9}",
            i + 1,
            r.name,
            r.dept_name.as_deref().unwrap_or("-"),
            r.xp,
            r.level,
            r.current_streak,
            fmt_avg(r.avg_score)
        );
    }
    Ok(())
}

pub async fn overview() -> Result<()> {
    let client = GuardClient::new();
    let o: AdminOverview = serde_json::from_value(client.get("/api/admin/overview").await?)?;
    let mut depts_body = client.get("/api/admin/departments").await?;
    let depts: Vec<DepartmentRollup> = serde_json::from_value(depts_body["departments"].take())?;

    println!();
    println!("{}", "Organization overview".bold());
    println!("  attempts     {}", o.total_attempts);
    println!(
        "  detected     {} / compromised {}",
        o.detected.to_string().green(),
        o.compromised.to_string().red()
    );
    println!("  avg score    {}", fmt_avg(o.avg_score));

    if !o.risk_by_kind.is_empty() {
        println!();
        println!("  {}", "Risk by kind".bold());
        for k in &o.risk_by_kind {
            println!(
                "    {:10} {:>4} attempts, avg {:.1}, fail rate {:.0}%",
                k.kind.as_str(),
                k.total,
                k.avg_score,
                k.fail_rate
            );
        }
    }

    if !depts.is_empty() {
        println!();
        println!("  {}", "Departments".bold());
        for d in &depts {
            println!(
                "    [{}] {:<16} {} trainees, avg security {}",
                d.id,
                d.name,
                d.trainee_count,
                fmt_avg(d.avg_security_score)
            );
        }
    }
    Ok(())
}

pub async fn campaigns() -> Result<()> {
    let mut body = GuardClient::new().get("/api/admin/campaigns").await?;
    let rows: Vec<CampaignSummary> = serde_json::from_value(body["campaigns"].take())?;

    println!();
    if rows.is_empty() {
        println!("No campaigns.");
        return Ok(());
    }
    println!("{}", "Campaigns".bold());
    for c in rows {
        println!(
            "  [{}] {} ({}, {}) -> {} | {} responses | launched {}",
            c.id,
            c.name.bold(),
            c.sim_kind.as_str(),
            c.status,
            c.dept_name,
            c.response_count,
            fmt_epoch(c.launched_at)
        );
    }
    Ok(())
}

pub async fn campaign_create(name: &str, dept: i64, kind: &str) -> Result<()> {
    let kind: SimKind = kind.parse()?;
    let body = json!({ "name": name, "target_dept_id": dept, "sim_kind": kind });
    let created = GuardClient::new()
        .post("/api/admin/campaigns", &body)
        .await?;
    println!(
        "{} campaign {} (id {})",
        "Launched".green(),
        name.bold(),
        created["id"]
    );
    Ok(())
}

pub async fn campaign_delete(id: i64) -> Result<()> {
    GuardClient::new()
        .delete(&format!("/api/admin/campaigns/{}", id))
        .await?;
    println!("{} campaign {}", "Deleted".green(), id);
    Ok(())
}

pub async fn seed() -> Result<()> {
    let body = GuardClient::new()
        .post("/api/admin/seed", &json!({}))
        .await?;
    let summary: SeedSummary = serde_json::from_value(body)?;
    if summary.seeded {
        println!(
            "{}: {} departments, {} trainees, {} historical attempts",
            "Seeded".green(),
            summary.departments,
            summary.trainees,
            summary.attempts
        );
    } else {
        println!("Seed skipped: departments already present.");
    }
    Ok(())
}
