//! ONX Progress - command line front end
//!
//! Inspects and drives the local progress store.

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

use onx_progress::gamification::{Activity, XpEventType};
use onx_progress::storage::config::load_config;
use onx_progress::storage::StorageBackend;
use onx_progress::GamificationEngine;

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "onx-progress", version)]
#[command(about = "XP, streaks, badges and quests for your sales pipeline")]
struct Args {
    /// Configuration file (defaults to the data directory's config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Keep everything in memory for this run
    #[arg(long)]
    memory: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show level, streak and today's XP
    Status,
    /// Record a raw XP event (first_touch, task_complete, call_logged, ...)
    Record {
        kind: String,
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Report an activity (contact_added, task_completed, call_logged, ...)
    Log { activity: String },
    /// List recent events
    Events {
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },
    /// List badges
    Badges,
    /// List active quests
    Quests,
    /// Set a quest's progress
    QuestProgress { id: Uuid, value: u32 },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let mut config = load_config(args.config.as_deref()).context("loading configuration")?;
    if args.memory {
        config.storage.backend = StorageBackend::Memory;
    }

    tracing::debug!("Starting onx-progress v{}", env!("CARGO_PKG_VERSION"));
    let engine = GamificationEngine::from_config(&config).context("opening progress store")?;

    match args.command.unwrap_or(Command::Status) {
        Command::Status => print_status(&engine),
        Command::Record { kind, description } => {
            let kind = XpEventType::from_str(&kind)
                .ok_or_else(|| anyhow!("unknown event type: {}", kind))?;
            let event = engine.record(kind, description.as_deref());
            println!("+{} XP  {}", event.xp, event.description);
            print_status(&engine);
        }
        Command::Log { activity } => {
            let activity = Activity::from_str(&activity)
                .ok_or_else(|| anyhow!("unknown activity: {}", activity))?;
            let outcome = engine.log_activity(activity);
            println!("+{} XP  {}", outcome.event.xp, outcome.event.description);
            for quest in &outcome.completed_quests {
                println!("Quest completed: {} (+{} XP)", quest.title, quest.xp_reward);
            }
            for badge in &outcome.unlocked_badges {
                println!("Badge unlocked: {} {}", badge.icon, badge.name);
            }
            if outcome.leveled_up() {
                println!("Level up! Now level {}", outcome.level_after);
            }
        }
        Command::Events { limit } => {
            for event in engine.recent_events(limit) {
                println!(
                    "{}  {:<18} +{:<3} {}",
                    event.timestamp.format("%Y-%m-%d %H:%M"),
                    event.kind.as_str(),
                    event.xp,
                    event.description
                );
            }
        }
        Command::Badges => {
            let profile = engine.get_profile();
            for badge in engine.badges() {
                let state = match badge.unlocked_at {
                    Some(at) if badge.unlocked => format!("unlocked {}", at.format("%Y-%m-%d")),
                    _ => format!("{:.0}%", badge.percentage(&profile)),
                };
                println!("{} {:<18} {:<26} {}", badge.icon, badge.name, badge.description, state);
            }
        }
        Command::Quests => {
            for quest in engine.active_quests() {
                println!(
                    "{}  [{}] {:<15} {}/{} ({:.0}%)  +{} XP{}  (expires {})",
                    quest.id,
                    quest.kind.as_str(),
                    quest.title,
                    quest.current,
                    quest.target,
                    quest.percentage(),
                    quest.xp_reward,
                    if quest.completed { "  done" } else { "" },
                    quest.expires_at.format("%Y-%m-%d %H:%M UTC")
                );
            }
        }
        Command::QuestProgress { id, value } => match engine.update_quest_progress(id, value) {
            Some(quest) => println!("{}: {}/{}", quest.title, quest.current, quest.target),
            None => println!("No open quest with id {}", id),
        },
    }

    Ok(())
}

fn print_status(engine: &GamificationEngine) {
    let progress = engine.level_progress();
    let summary = engine.daily_summary();
    let profile = engine.get_profile();

    println!("Level {}  ({} XP)", progress.level, progress.total_xp);
    match progress.next_threshold {
        Some(next) => println!(
            "{:.0}% to level {} ({} XP to go, at {})",
            progress.percent,
            progress.level + 1,
            progress.xp_to_next,
            next
        ),
        None => println!("Max level reached"),
    }
    println!("Streak {} day(s), longest {}", summary.streak, profile.longest_streak);
    println!(
        "Today {} / {} XP from {} event(s)",
        summary.xp_earned, summary.target, summary.events
    );
}
