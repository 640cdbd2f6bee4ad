//! Populate a pitch showcase database with demo founders, reviewers, teams, pitches, votes and feedback.

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::too_many_lines)]

use anyhow::{Context, anyhow};
use clap::Parser;
use pitch_common::db_util;
use pitch_common::{Category, NewPitch, NewUser, PitchStatus, TeamMember, UserRecord, UserRole};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};

const SEED_PASSWORD: &str = "password123";

const TEAM_NAMES: [&str; 20] = [
    "TechVision",
    "DataFlow",
    "CloudSync",
    "NextGen",
    "InnovateLab",
    "FutureTech",
    "SmartSolutions",
    "DigitalWave",
    "CodeCraft",
    "TechHub",
    "StartupX",
    "InnovationCo",
    "TechForge",
    "DigitalEdge",
    "FutureLab",
    "TechNova",
    "InnovateNow",
    "DigitalCraft",
    "TechPulse",
    "NextWave",
];

const PITCH_TITLES: [&str; 20] = [
    "Revolutionary AI-Powered Healthcare Platform",
    "Next-Gen Fintech Solution for SMEs",
    "Smart City IoT Management System",
    "Blockchain-Based Supply Chain Tracker",
    "AI-Driven Personal Finance Assistant",
    "Telemedicine Platform for Rural Areas",
    "Machine Learning Fraud Detection",
    "Sustainable Energy Management System",
    "AR/VR Training Platform for Healthcare",
    "Cryptocurrency Trading Bot",
    "Smart Home Automation System",
    "AI-Powered Customer Service Bot",
    "Digital Identity Verification Platform",
    "Predictive Analytics for Agriculture",
    "Blockchain Voting System",
    "AI-Powered Content Creation Tool",
    "Smart Transportation Management",
    "Digital Health Monitoring Platform",
    "AI-Driven Investment Advisor",
    "Sustainable Waste Management Solution",
];

const FEEDBACK_TEMPLATES: [&str; 12] = [
    "Great concept with strong market potential!",
    "Interesting approach to solving this problem.",
    "The demo was impressive and well-executed.",
    "Could benefit from more user testing.",
    "Strong technical implementation.",
    "Market validation needed.",
    "Excellent presentation and clear value proposition.",
    "Consider expanding to other markets.",
    "Need more focus on user experience.",
    "Solid business model and execution.",
    "Strong team with relevant experience.",
    "Clear path to monetization.",
];

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    /// Create the tables and indexes before seeding
    #[arg(long, env = "PITCH_SEED_INIT_SCHEMA")]
    init_schema: bool,

    /// Delete all existing data first
    #[arg(long, env = "PITCH_SEED_RESET")]
    reset: bool,

    /// Number of founder accounts (one team each)
    #[arg(long, default_value_t = 80, env = "PITCH_SEED_FOUNDERS")]
    founders: usize,

    /// Number of reviewer accounts
    #[arg(long, default_value_t = 20, env = "PITCH_SEED_REVIEWERS")]
    reviewers: usize,

    /// Number of pitches to attempt, assigned to teams round-robin
    #[arg(long, default_value_t = 120, env = "PITCH_SEED_PITCHES")]
    pitches: usize,

    /// Share of pitches left as drafts
    #[arg(long, default_value_t = 0.1, env = "PITCH_SEED_DRAFT_RATIO")]
    draft_ratio: f64,

    /// Categories to cycle through
    #[arg(
        long,
        value_enum,
        value_delimiter = ',',
        default_values_t = Category::ALL,
        env = "PITCH_SEED_CATEGORIES"
    )]
    categories: Vec<Category>,

    /// bcrypt cost for the shared demo password
    #[arg(long, default_value_t = 10, env = "PITCH_SEED_BCRYPT_COST")]
    bcrypt_cost: u32,

    /// Fixed RNG seed for reproducible data
    #[arg(long, env = "PITCH_SEED_RNG_SEED")]
    rng_seed: Option<u64>,

    /// Show additional output
    #[arg(short, long, env = "PITCH_SEED_VERBOSE")]
    verbose: bool,
}

#[derive(Debug, Default, PartialEq, Eq)]
struct SeedSummary {
    founders: usize,
    reviewers: usize,
    teams: usize,
    pitches: usize,
    drafts: usize,
    skipped_pitches: usize,
    votes: usize,
    feedback: usize,
}

/// Team names repeat after the list runs out, so later ones get a numeric suffix.
fn team_name(index: usize) -> String {
    let base = TEAM_NAMES[index % TEAM_NAMES.len()];
    match index / TEAM_NAMES.len() {
        0 => base.to_string(),
        round => format!("{base} {}", round + 1),
    }
}

fn team_members(team_name: &str) -> Vec<TeamMember> {
    let domain: String = team_name
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect::<String>()
        .to_lowercase();
    vec![
        TeamMember {
            name: format!("Member 1 of {team_name}"),
            role: "CTO".to_string(),
            email: format!("member1@{domain}.com"),
        },
        TeamMember {
            name: format!("Member 2 of {team_name}"),
            role: "Designer".to_string(),
            email: format!("member2@{domain}.com"),
        },
    ]
}

fn pitch_title(index: usize) -> String {
    format!("{} {}", PITCH_TITLES[index % PITCH_TITLES.len()], index + 1)
}

/// How many votes a submitted pitch gets, capped by the reviewer pool.
fn vote_count<R: Rng>(rng: &mut R, reviewer_count: usize) -> usize {
    rng.random_range(3..=8).min(reviewer_count)
}

/// Create a user, or fetch the existing one when the email is already taken.
fn ensure_user(
    conn: &mut db_util::PgConnection,
    role: UserRole,
    index: usize,
    password_hash: &str,
) -> anyhow::Result<UserRecord> {
    let email = format!("{}{}@example.com", role.as_str(), index + 1);
    let name = match role {
        UserRole::Founder => format!("Founder {}", index + 1),
        UserRole::Reviewer => format!("Reviewer {}", index + 1),
    };
    let inserted = db_util::insert_user(
        conn,
        NewUser {
            email: email.clone(),
            password_hash: password_hash.to_string(),
            role,
            name,
        },
    )
    .map_err(|err| anyhow!(err))?;
    match inserted {
        Some(user) => Ok(user),
        None => {
            log::debug!("{email} already exists, reusing it");
            db_util::get_user_credentials_by_email(conn, &email)
                .map_err(|err| anyhow!(err))?
                .map(|(user, _)| user)
                .with_context(|| format!("{email} vanished during seeding"))
        }
    }
}

fn seed(conn: &mut db_util::PgConnection, cli: &Cli, rng: &mut StdRng) -> anyhow::Result<SeedSummary> {
    let mut summary = SeedSummary::default();
    let password_hash = bcrypt::hash(SEED_PASSWORD, cli.bcrypt_cost)?;

    let mut founders = Vec::with_capacity(cli.founders);
    for i in 0..cli.founders {
        founders.push(ensure_user(conn, UserRole::Founder, i, &password_hash)?);
    }
    summary.founders = founders.len();

    let mut reviewers = Vec::with_capacity(cli.reviewers);
    for i in 0..cli.reviewers {
        reviewers.push(ensure_user(conn, UserRole::Reviewer, i, &password_hash)?);
    }
    summary.reviewers = reviewers.len();
    log::info!(
        "Users ready: {} founders, {} reviewers",
        summary.founders,
        summary.reviewers
    );

    let mut teams = Vec::with_capacity(founders.len());
    for (i, founder) in founders.iter().enumerate() {
        let existing = db_util::get_teams_by_founder(conn, founder.user_id).map_err(|err| anyhow!(err))?;
        let team = match existing.into_iter().next() {
            Some(team) => team,
            None => {
                let name = team_name(i);
                let members = team_members(&name);
                summary.teams += 1;
                db_util::insert_team(conn, founder.user_id, name, members)
                    .map_err(|err| anyhow!(err))?
            }
        };
        teams.push(team);
    }
    log::info!("Teams ready: {} ({} new)", teams.len(), summary.teams);

    if teams.is_empty() || cli.categories.is_empty() {
        log::warn!("No teams or categories to seed pitches with");
        return Ok(summary);
    }

    let mut submitted = Vec::new();
    for i in 0..cli.pitches {
        let team = &teams[i % teams.len()];
        let status = if rng.random_bool(cli.draft_ratio.clamp(0.0, 1.0)) {
            PitchStatus::Draft
        } else {
            PitchStatus::Submitted
        };
        let inserted = db_util::insert_pitch(
            conn,
            NewPitch {
                team_id: team.team_id,
                title: pitch_title(i),
                demo_link: format!("https://demo.example.com/pitch{}", i + 1),
                deck_url: format!("https://deck.example.com/pitch{}", i + 1),
                category: cli.categories[i % cli.categories.len()],
                status,
            },
        )
        .map_err(|err| anyhow!(err))?;

        match inserted {
            Some(pitch) => {
                summary.pitches += 1;
                match pitch.status {
                    PitchStatus::Draft => summary.drafts += 1,
                    PitchStatus::Submitted => submitted.push(pitch),
                }
            }
            None => {
                log::debug!("Team #{} already has a pitch, skipping", team.team_id);
                summary.skipped_pitches += 1;
            }
        }
    }
    log::info!(
        "Pitches created: {} ({} drafts, {} skipped)",
        summary.pitches,
        summary.drafts,
        summary.skipped_pitches
    );

    for pitch in &submitted {
        let count = vote_count(rng, reviewers.len());
        for reviewer in reviewers.choose_multiple(rng, count) {
            let rating: u8 = rng.random_range(1..=5);
            db_util::upsert_vote(conn, pitch.pitch_id, reviewer.user_id, rating)
                .map_err(|err| anyhow!(err))?;
            summary.votes += 1;

            if rng.random_bool(0.7) {
                let content = FEEDBACK_TEMPLATES
                    .choose(rng)
                    .copied()
                    .unwrap_or(FEEDBACK_TEMPLATES[0]);
                db_util::insert_feedback(conn, pitch.pitch_id, reviewer.user_id, content.to_string())
                    .map_err(|err| anyhow!(err))?;
                summary.feedback += 1;
            }
        }
    }
    log::info!(
        "Votes cast: {}, feedback left: {}",
        summary.votes,
        summary.feedback
    );

    Ok(summary)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let mut conn = db_util::get_database_connection().map_err(|err| anyhow!(err))?;
    log::info!("Database connection established.");

    if cli.init_schema {
        db_util::apply_schema(&mut conn).map_err(|err| anyhow!(err))?;
        log::info!("Schema applied.");
    }
    if cli.reset {
        db_util::truncate_all(&mut conn).map_err(|err| anyhow!(err))?;
        log::info!("Existing data removed.");
    }

    let mut rng = match cli.rng_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_rng(&mut rand::rng()),
    };

    let summary = seed(&mut conn, &cli, &mut rng)?;

    println!("=== SEED DATA SUMMARY ===");
    println!("Founders: {}", summary.founders);
    println!("Reviewers: {}", summary.reviewers);
    println!("New teams: {}", summary.teams);
    println!(
        "Pitches: {} ({} drafts, {} skipped because the team already had one)",
        summary.pitches, summary.drafts, summary.skipped_pitches
    );
    println!("Votes: {}", summary.votes);
    println!("Feedback: {}", summary.feedback);
    println!("All accounts use the password \"{SEED_PASSWORD}\".");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn test_team_names_stay_unique() {
        let names: Vec<String> = (0..80).map(team_name).collect();
        let mut deduped = names.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(deduped.len(), names.len());
        assert_eq!(team_name(0), "TechVision");
        assert_eq!(team_name(20), "TechVision 2");
    }

    #[test_log::test]
    fn test_team_members() {
        let members = team_members("TechVision 2");
        assert_eq!(members.len(), 2);
        assert_eq!(members[0].email, "member1@techvision2.com");
        assert_eq!(members[1].role, "Designer");
    }

    #[test_log::test]
    fn test_vote_count_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let count = vote_count(&mut rng, 20);
            assert!((3..=8).contains(&count));
        }
        assert_eq!(vote_count(&mut rng, 2), 2);
    }

    #[test_log::test]
    fn test_pitch_titles_are_numbered() {
        assert_eq!(pitch_title(0), "Revolutionary AI-Powered Healthcare Platform 1");
        assert_eq!(pitch_title(20), "Revolutionary AI-Powered Healthcare Platform 21");
    }

    #[test_log::test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["pitch_seed"]);
        assert_eq!(cli.founders, 80);
        assert_eq!(cli.reviewers, 20);
        assert_eq!(cli.pitches, 120);
        assert_eq!(cli.categories, Category::ALL.to_vec());
        assert!(!cli.reset);
    }
}
