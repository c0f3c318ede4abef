use clap::{Parser, Subcommand};
use ladder_tracker::{
    config::Settings,
    ladder::RankEvent,
    models::{Format, Goal, SessionSummary, Tier},
    snapshot,
    stats::{GameRecord, GoalProgress, HistoryReport, StatusReport},
    tracker::Tracker,
    utils, StateStore, TrackerError,
};
use chrono::{DateTime, Local};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[clap(name = "ladder")]
#[clap(about = "Track ranked ladder progress across Constructed and Limited", long_about = None)]
struct Cli {
    /// Settings file to use instead of config/default and config/local
    #[clap(short, long)]
    config: Option<PathBuf>,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show rank, session, season and history for the current format
    Status {
        /// Format to show (constructed, limited)
        #[clap(short, long)]
        format: Option<String>,
    },

    /// Record a win
    Win,

    /// Record a loss
    Loss,

    /// Correct the current rank
    Rank {
        /// Tier (bronze, silver, gold, platinum, diamond, mythic)
        tier: String,

        /// Division 1-4, ignored for Mythic
        division: Option<u8>,

        /// Pips filled in the division
        #[clap(default_value = "0")]
        pips: u8,

        /// Allow leaving Mythic or going below the tier floor
        #[clap(long)]
        force: bool,
    },

    /// Set the Mythic percentile or leaderboard position
    Mythic {
        #[clap(long, conflicts_with = "position")]
        percentile: Option<f64>,

        #[clap(long)]
        position: Option<u32>,
    },

    /// Set the session goal, e.g. "Platinum 2" or "Mythic"
    Goal {
        goal: Option<String>,

        #[clap(long, conflicts_with = "goal")]
        clear: bool,
    },

    /// Manage the current session
    Session {
        #[clap(subcommand)]
        action: SessionAction,
    },

    /// Switch format, or toggle when no format is given
    Format { name: Option<String> },

    /// Start the game timer
    Game,

    /// Start a new season at the given rank
    Season {
        tier: String,

        division: Option<u8>,

        #[clap(default_value = "0")]
        pips: u8,

        /// When the season ends, e.g. 2025-04-01 or 2025-04-01T12:00:00
        #[clap(long)]
        ends: Option<String>,
    },

    /// Set when the current season ends
    SeasonEnd {
        when: Option<String>,

        #[clap(long, conflicts_with = "when")]
        clear: bool,
    },

    /// Show day and week history with recent sessions
    History,
}

#[derive(Subcommand)]
enum SessionAction {
    Start,
    Pause,
    Resume,
    End,
    Reset,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (settings, defaulted) = match &cli.config {
        Some(path) => (Settings::from_file(path)?, false),
        None => match Settings::new() {
            Ok(settings) => (settings, false),
            Err(_) => (Settings::default(), true),
        },
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.app.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if defaulted {
        info!("Using default settings");
    }
    if let Err(e) = settings.validate() {
        error!("Invalid settings: {}", e);
        return Err(anyhow::anyhow!(e));
    }

    let store = StateStore::new(settings.state_path()?);
    let state = store.load(settings.tracking.default_format)?;
    let mut tracker = Tracker::with_system_clock(state, settings.tracking.clone());

    if run(&mut tracker, cli.command)? {
        store.save(tracker.state())?;
    }

    Ok(())
}

/// Applies one command; returns true when the state changed.
fn run(tracker: &mut Tracker, command: Commands) -> anyhow::Result<bool> {
    match command {
        Commands::Status { format } => {
            let report = match format {
                Some(name) => tracker.status_for(parse_format(&name)?),
                None => tracker.status(),
            };
            print_status(&report);
            Ok(false)
        }

        Commands::Win => {
            let record = tracker.record_win();
            print_game(&record, tracker.format());
            Ok(true)
        }

        Commands::Loss => {
            let record = tracker.record_loss();
            print_game(&record, tracker.format());
            Ok(true)
        }

        Commands::Rank { tier, division, pips, force } => {
            let tier = parse_tier(&tier)?;
            let division = division.unwrap_or(4);
            let transition = tracker.set_rank(tier, division, pips, force)?;
            println!("Rank set to {}", transition.after.label(tracker.format()));
            Ok(true)
        }

        Commands::Mythic { percentile, position } => {
            match (percentile, position) {
                (Some(value), _) => tracker.set_mythic_percentile(value)?,
                (None, Some(position)) => tracker.set_mythic_leaderboard(position)?,
                (None, None) => anyhow::bail!("Give --percentile or --position"),
            }
            println!("{}", tracker.status().position);
            Ok(true)
        }

        Commands::Goal { goal, clear } => {
            let goal = match (goal, clear) {
                (_, true) => None,
                (Some(text), false) => Some(Goal::parse(&text)?),
                (None, false) => anyhow::bail!("Give a goal or --clear"),
            };
            match (goal, tracker.set_goal(goal)?) {
                (Some(goal), Some(progress)) => println!("Goal {}: {}", goal, goal_text(&progress)),
                _ => println!("Goal cleared"),
            }
            Ok(true)
        }

        Commands::Session { action } => {
            match action {
                SessionAction::Start => {
                    if let Some(summary) = tracker.start_session() {
                        print_summary("Previous session", &summary);
                    }
                    println!("Session started");
                }
                SessionAction::Pause => {
                    if tracker.pause_session()? {
                        println!("Session paused");
                    } else {
                        println!("Session already paused");
                    }
                }
                SessionAction::Resume => {
                    if tracker.resume_session()? {
                        println!("Session resumed");
                    } else {
                        println!("Session was not paused");
                    }
                }
                SessionAction::End => {
                    let summary = tracker.end_session()?;
                    print_summary("Session ended", &summary);
                }
                SessionAction::Reset => {
                    let summary = tracker.reset_session()?;
                    print_summary("Session reset", &summary);
                }
            }
            Ok(true)
        }

        Commands::Format { name } => {
            let format = match name {
                Some(name) => {
                    let format = parse_format(&name)?;
                    tracker.switch_format(format);
                    format
                }
                None => tracker.toggle_format(),
            };
            println!("Tracking {}", format);
            Ok(true)
        }

        Commands::Game => {
            tracker.start_game();
            println!("Game timer started");
            Ok(true)
        }

        Commands::Season { tier, division, pips, ends } => {
            let tier = parse_tier(&tier)?;
            let ends_at = ends.as_deref().map(parse_timestamp).transpose()?;
            if let Some(summary) =
                tracker.start_new_season(tier, division.unwrap_or(4), pips, ends_at)?
            {
                print_summary("Session ended", &summary);
            }
            println!(
                "New {} season from {}",
                tracker.format(),
                tracker.status().position.label(tracker.format())
            );
            Ok(true)
        }

        Commands::SeasonEnd { when, clear } => {
            let ends_at = match (when, clear) {
                (_, true) => None,
                (Some(text), false) => Some(parse_timestamp(&text)?),
                (None, false) => anyhow::bail!("Give an end date or --clear"),
            };
            tracker.set_season_end(ends_at);
            println!("Season: {}", utils::format_countdown(tracker.status().season.time_left));
            Ok(true)
        }

        Commands::History => {
            let report = tracker.status();
            print_history(&report.history);
            for summary in report.recent_sessions.iter().rev() {
                print_summary(&summary.date.to_string(), summary);
            }
            Ok(false)
        }
    }
}

fn parse_tier(text: &str) -> ladder_tracker::Result<Tier> {
    Tier::from_str(text).ok_or_else(|| TrackerError::UnknownTier(text.to_string()))
}

fn parse_format(text: &str) -> ladder_tracker::Result<Format> {
    Format::from_str(text).ok_or_else(|| TrackerError::UnknownFormat(text.to_string()))
}

fn parse_timestamp(text: &str) -> ladder_tracker::Result<DateTime<Local>> {
    snapshot::parse_local(text).ok_or_else(|| TrackerError::InvalidTimestamp(text.to_string()))
}

fn goal_text(progress: &GoalProgress) -> String {
    match progress {
        GoalProgress::Reached => "reached".to_string(),
        GoalProgress::Remaining(bars) => format!("{} bars to go", bars),
    }
}

fn print_game(record: &GameRecord, format: Format) {
    let after = record.transition.after;
    println!(
        "{} -> {}  {}  streak {}",
        record.result.as_char(),
        after.label(format),
        utils::format_record(record.session_wins, record.session_losses),
        utils::format_streak(record.current_streak)
    );
    match record.transition.event {
        RankEvent::PromotedDivision => println!("Promoted to {}", after),
        RankEvent::PromotedTier => println!("Tier up! Welcome to {}", after.tier()),
        RankEvent::EnteredMythic => println!("Mythic reached!"),
        RankEvent::DemotedDivision => println!("Demoted to {}", after),
        RankEvent::DemotionBlockedByFloor => println!("Tier floor held at {}", after),
        RankEvent::None => {}
    }
    if let Some(duration) = record.game_duration {
        println!("Game time {}", utils::format_duration(duration));
    }
    if let Some(progress) = &record.goal {
        println!("Goal: {}", goal_text(progress));
    }
}

fn print_status(report: &StatusReport) {
    let format = report.format;
    println!("=== {} ===", format);
    println!("Rank: {}", report.position.label(format));
    if let Some(rank) = report.position.ladder() {
        println!("      {}", utils::pip_meter(rank.pips, format.pip_capacity()));
    }
    println!("Floor: {}", report.floor);
    if !report.position.is_mythic() {
        println!("Bars to Mythic: {}", report.bars_to_mythic);
    }
    if report.boss_fight {
        println!("Boss fight: the next win promotes the tier");
    }

    match &report.session {
        Some(session) => {
            println!("\nSession{}", if session.paused { " (paused)" } else { "" });
            println!("  Record: {}", utils::format_record(session.wins, session.losses));
            println!("  Bars: {}", utils::format_bars(session.bars_gained));
            println!(
                "  Time: {} active / {} total",
                utils::format_duration(session.active),
                utils::format_duration(session.elapsed)
            );
            if let Some((real, active)) = session.since_last_result {
                println!(
                    "  Since last result: {} ({} active)",
                    utils::format_duration(real),
                    utils::format_duration(active)
                );
            }
            if let Some(game) = session.current_game {
                println!("  Current game: {}", utils::format_duration(game));
            }
            if !session.recent_results.is_empty() {
                println!("  Last games: {}", utils::results_strip(&session.recent_results));
            }
            if let (Some(goal), Some(progress)) = (session.goal, session.goal_progress) {
                println!("  Goal {}: {}", goal, goal_text(&progress));
            }
        }
        None => println!("\nNo active session"),
    }

    let season = &report.season;
    match season.time_left {
        Some(left) => println!("\nSeason ({})", utils::format_countdown(Some(left))),
        None => println!("\nSeason"),
    }
    println!("  Record: {}", utils::format_record(season.wins, season.losses));
    println!(
        "  Streak: {} (best W{}, worst L{})",
        utils::format_streak(season.current_streak),
        season.best_streak,
        -season.worst_streak
    );
    println!(
        "  Started {} / peak {}",
        season.start_rank.label(format),
        season.peak_rank.label(format)
    );
    println!("  Bars: {}", utils::format_bars(season.bars_gained));
    if let Some(average) = season.average_game {
        println!("  Average game: {}", utils::format_duration(average));
    }

    println!();
    print_history(&report.history);
}

fn print_history(history: &HistoryReport) {
    let rows = [
        ("Today", &history.today),
        ("Yesterday", &history.yesterday),
        ("This week", &history.this_week),
        ("Last week", &history.last_week),
    ];
    for (label, period) in rows {
        println!(
            "{:<10} {}  {} bars",
            label,
            utils::format_record(period.wins, period.losses),
            utils::format_bars(period.bars_gained)
        );
    }
    if let Some(best) = &history.best_day {
        println!(
            "Best day   {}  {}W-{}L  {} bars",
            best.date,
            best.wins,
            best.losses,
            utils::format_bars(best.bars_gained)
        );
    }
}

fn print_summary(title: &str, summary: &SessionSummary) {
    println!(
        "{}: {} {}  {} -> {}  {} bars  {}",
        title,
        summary.format,
        utils::format_record(summary.wins, summary.losses),
        summary.start_rank.label(summary.format),
        summary.end_rank.label(summary.format),
        utils::format_bars(summary.bars_gained),
        utils::format_duration(chrono::Duration::seconds(summary.active_seconds))
    );
}
