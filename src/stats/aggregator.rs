use chrono::{DateTime, Days, Duration, Local};
use tracing::{debug, info};

use crate::config::TrackingSettings;
use crate::ladder::{position_progress, Transition};
use crate::models::{DaySegment, Format, GameResult, Session, SessionSummary};
use crate::stats::goal::{goal_distance, GoalProgress};
use crate::tracker::FormatTrack;

/// Counters touched by one recorded game.
#[derive(Debug, Clone, PartialEq)]
pub struct GameRecord {
    pub result: GameResult,
    pub transition: Transition,
    pub session_wins: u32,
    pub session_losses: u32,
    pub current_streak: i32,
    pub goal: Option<GoalProgress>,
    pub game_duration: Option<Duration>,
    pub started_session: bool,
}

/// Folds game results into session, season and per-day history counters.
pub struct Aggregator {
    settings: TrackingSettings,
}

impl Aggregator {
    pub fn new(settings: TrackingSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &TrackingSettings {
        &self.settings
    }

    /// Records a game whose rank transition has already been applied.
    pub fn record_game(
        &self,
        track: &mut FormatTrack,
        format: Format,
        transition: &Transition,
        won: bool,
        now: DateTime<Local>,
    ) -> GameRecord {
        let started_session = track.session.is_none();
        if started_session {
            info!("No active {} session, starting one", format);
            track.session = Some(Session::new(now, transition.before));
        }

        self.roll_over(track, now);

        let result = GameResult::from_won(won);
        let bars = transition.progress_delta(format);

        track.season.record(result);
        track.season.observe_rank(&transition.after, format);

        let mut game_duration = None;
        if let Some(session) = track.session.as_mut() {
            game_duration = session.finish_game(now);
            session.record(result, now);
            let day = &mut session.pending_day;
            match result {
                GameResult::Win => day.wins += 1,
                GameResult::Loss => day.losses += 1,
            }
            day.bars_gained += bars;
        }
        if let Some(duration) = game_duration {
            track
                .season
                .push_game_duration(duration, self.settings.game_duration_window);
        }

        let (session_wins, session_losses, goal) = match &track.session {
            Some(session) => (
                session.wins,
                session.losses,
                session
                    .goal
                    .map(|goal| goal_distance(&goal, &transition.after, format)),
            ),
            None => (0, 0, None),
        };

        debug!(
            "{} {} recorded: {} bars, streak {}",
            format,
            result.as_char(),
            bars,
            track.season.current_streak
        );

        GameRecord {
            result,
            transition: *transition,
            session_wins,
            session_losses,
            current_streak: track.season.current_streak,
            goal,
            game_duration,
            started_session,
        }
    }

    /// Folds the session's results for a past day into history.
    pub fn roll_over(&self, track: &mut FormatTrack, now: DateTime<Local>) -> bool {
        let today = now.date_naive();
        let session = match track.session.as_mut() {
            Some(session) => session,
            None => return false,
        };
        if session.pending_day.date == today {
            return false;
        }
        let finished = std::mem::replace(&mut session.pending_day, DaySegment::new(today));
        debug!("Day rolled over, folding results for {}", finished.date);
        track.history.fold_segment(&finished);
        self.prune(track, now);
        true
    }

    /// Starts a fresh session, finishing any session already running.
    /// A goal set on the finished session carries over.
    pub fn start_session(
        &self,
        track: &mut FormatTrack,
        format: Format,
        now: DateTime<Local>,
    ) -> Option<SessionSummary> {
        let goal = track.session.as_ref().and_then(|s| s.goal);
        let finished = self.end_session(track, format, now);
        let mut session = Session::new(now, *track.ladder.position());
        session.goal = goal;
        track.session = Some(session);
        info!("{} session started at {}", format, track.ladder.position().label(format));
        finished
    }

    /// Finishes the active session: pending results go to history and a
    /// summary is kept. Returns `None` when no session was running.
    pub fn end_session(
        &self,
        track: &mut FormatTrack,
        format: Format,
        now: DateTime<Local>,
    ) -> Option<SessionSummary> {
        let mut session = track.session.take()?;
        session.resume(now);
        track.history.fold_segment(&session.pending_day);
        self.prune(track, now);

        let end_rank = *track.ladder.position();
        let bars_gained = position_progress(&end_rank, format) as i32
            - position_progress(&session.start_rank, format) as i32;
        let summary = SessionSummary {
            format,
            date: session.start_time.date_naive(),
            wins: session.wins,
            losses: session.losses,
            start_time: session.start_time,
            end_time: now,
            start_rank: session.start_rank,
            end_rank,
            bars_gained,
            active_seconds: session.active_time(now).num_seconds(),
        };
        info!(
            "{} session ended: {}W-{}L, {:+} bars",
            format, summary.wins, summary.losses, summary.bars_gained
        );

        if session.games() > 0 {
            track.recent_sessions.push(summary.clone());
            let keep = self.settings.recent_sessions;
            if track.recent_sessions.len() > keep {
                let excess = track.recent_sessions.len() - keep;
                track.recent_sessions.drain(..excess);
            }
        }
        Some(summary)
    }

    fn prune(&self, track: &mut FormatTrack, now: DateTime<Local>) {
        // A window reaching past the earliest date keeps everything.
        let cutoff = u64::try_from(self.settings.history_days)
            .ok()
            .and_then(|days| now.date_naive().checked_sub_days(Days::new(days)));
        let cutoff = match cutoff {
            Some(cutoff) => cutoff,
            None => return,
        };
        let removed = track.history.prune_before(cutoff);
        if removed > 0 {
            debug!("Pruned {} history days before {}", removed, cutoff);
        }
    }
}
