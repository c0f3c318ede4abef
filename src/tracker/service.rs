use chrono::{DateTime, Local};
use tracing::{debug, info};

use crate::config::TrackingSettings;
use crate::ladder::Transition;
use crate::models::{
    Format, Goal, LadderRank, MythicStanding, RankPosition, Result, SeasonStats, SessionSummary,
    Tier, TrackerError,
};
use crate::stats::{build_status, goal_distance, Aggregator, GameRecord, GoalProgress, StatusReport};
use crate::tracker::clock::{Clock, SystemClock};
use crate::tracker::state::TrackerState;

/// Single owner of the tracker state. Every mutating command acts on the
/// current format; the caller persists after each successful call.
pub struct Tracker<C: Clock = SystemClock> {
    state: TrackerState,
    clock: C,
    aggregator: Aggregator,
}

impl Tracker<SystemClock> {
    pub fn with_system_clock(state: TrackerState, settings: TrackingSettings) -> Self {
        Self::new(state, SystemClock, settings)
    }
}

impl<C: Clock> Tracker<C> {
    pub fn new(state: TrackerState, clock: C, settings: TrackingSettings) -> Self {
        Self {
            state,
            clock,
            aggregator: Aggregator::new(settings),
        }
    }

    pub fn state(&self) -> &TrackerState {
        &self.state
    }

    pub fn into_state(self) -> TrackerState {
        self.state
    }

    pub fn format(&self) -> Format {
        self.state.current_format
    }

    /// Returns false when `format` was already selected.
    pub fn switch_format(&mut self, format: Format) -> bool {
        if self.state.current_format == format {
            return false;
        }
        info!("Switched format {} -> {}", self.state.current_format, format);
        self.state.current_format = format;
        true
    }

    pub fn toggle_format(&mut self) -> Format {
        let next = self.state.current_format.other();
        self.switch_format(next);
        next
    }

    pub fn record_result(&mut self, won: bool) -> GameRecord {
        let now = self.clock.now();
        let format = self.state.current_format;
        let track = self.state.current_mut();

        if let Some(session) = track.session.as_mut() {
            if session.resume(now) {
                debug!("Result recorded while paused, session resumed");
            }
        }

        let transition = track.ladder.apply_result(format, won);
        self.aggregator
            .record_game(track, format, &transition, won, now)
    }

    pub fn record_win(&mut self) -> GameRecord {
        self.record_result(true)
    }

    pub fn record_loss(&mut self) -> GameRecord {
        self.record_result(false)
    }

    /// Manual rank correction. `force` is needed to leave Mythic or to go
    /// below the recorded tier floor.
    pub fn set_rank(&mut self, tier: Tier, division: u8, pips: u8, force: bool) -> Result<Transition> {
        let format = self.state.current_format;
        let track = self.state.current_mut();
        let transition = track.ladder.set_rank(tier, division, pips, format, force)?;
        track.season.observe_rank(&transition.after, format);
        Ok(transition)
    }

    pub fn set_mythic_percentile(&mut self, percentile: f64) -> Result<()> {
        self.set_mythic_standing(MythicStanding::percentile(percentile)?)
    }

    pub fn set_mythic_leaderboard(&mut self, position: u32) -> Result<()> {
        self.set_mythic_standing(MythicStanding::leaderboard(position)?)
    }

    fn set_mythic_standing(&mut self, standing: MythicStanding) -> Result<()> {
        let format = self.state.current_format;
        let track = self.state.current_mut();
        track.ladder.set_mythic_standing(standing)?;
        track.season.observe_rank(track.ladder.position(), format);
        Ok(())
    }

    /// Sets or clears the goal of the active session.
    pub fn set_goal(&mut self, goal: Option<Goal>) -> Result<Option<GoalProgress>> {
        let format = self.state.current_format;
        let track = self.state.current_mut();
        let position = *track.ladder.position();
        let session = track.session.as_mut().ok_or(TrackerError::NoActiveSession)?;
        session.goal = goal;
        match goal {
            Some(goal) => info!("{} goal set to {}", format, goal),
            None => info!("{} goal cleared", format),
        }
        Ok(goal.map(|goal| goal_distance(&goal, &position, format)))
    }

    /// Starts a new session, returning the summary of the one it replaced.
    pub fn start_session(&mut self) -> Option<SessionSummary> {
        let now = self.clock.now();
        let format = self.state.current_format;
        self.aggregator
            .start_session(self.state.current_mut(), format, now)
    }

    pub fn pause_session(&mut self) -> Result<bool> {
        let now = self.clock.now();
        let session = self
            .state
            .current_mut()
            .session
            .as_mut()
            .ok_or(TrackerError::NoActiveSession)?;
        let paused = session.pause(now);
        if paused {
            info!("Session paused");
        }
        Ok(paused)
    }

    pub fn resume_session(&mut self) -> Result<bool> {
        let now = self.clock.now();
        let session = self
            .state
            .current_mut()
            .session
            .as_mut()
            .ok_or(TrackerError::NoActiveSession)?;
        let resumed = session.resume(now);
        if resumed {
            info!("Session resumed");
        }
        Ok(resumed)
    }

    pub fn end_session(&mut self) -> Result<SessionSummary> {
        let now = self.clock.now();
        let format = self.state.current_format;
        self.aggregator
            .end_session(self.state.current_mut(), format, now)
            .ok_or(TrackerError::NoActiveSession)
    }

    /// Replaces the active session with a fresh one at the current rank.
    pub fn reset_session(&mut self) -> Result<SessionSummary> {
        if self.state.current().session.is_none() {
            return Err(TrackerError::NoActiveSession);
        }
        self.start_session().ok_or(TrackerError::NoActiveSession)
    }

    /// Starts the game timer, opening a session if none is running.
    pub fn start_game(&mut self) {
        let now = self.clock.now();
        let format = self.state.current_format;
        let track = self.state.current_mut();
        if track.session.is_none() {
            self.aggregator.start_session(track, format, now);
        }
        if let Some(session) = track.session.as_mut() {
            session.resume(now);
            session.start_game(now);
            debug!("{} game timer started", format);
        }
    }

    /// Clears season counters and the tier floor for the current format.
    /// History and finished session summaries are kept.
    pub fn start_new_season(
        &mut self,
        tier: Tier,
        division: u8,
        pips: u8,
        ends_at: Option<DateTime<Local>>,
    ) -> Result<Option<SessionSummary>> {
        let format = self.state.current_format;
        let start = if tier.is_mythic() {
            RankPosition::Mythic(MythicStanding::Unplaced)
        } else {
            RankPosition::Ladder(LadderRank::new(tier, division, pips, format)?)
        };

        let now = self.clock.now();
        let track = self.state.current_mut();
        let finished = self.aggregator.end_session(track, format, now);
        track.ladder.reset(start);
        track.season = SeasonStats::new(start, Some(now));
        track.season.ends_at = ends_at;
        info!("New {} season started at {}", format, start.label(format));
        Ok(finished)
    }

    /// Sets or clears when the current format's season ends.
    pub fn set_season_end(&mut self, ends_at: Option<DateTime<Local>>) {
        let format = self.state.current_format;
        self.state.current_mut().season.ends_at = ends_at;
        match ends_at {
            Some(ends_at) => info!("{} season ends {}", format, ends_at),
            None => info!("{} season end cleared", format),
        }
    }

    pub fn status(&self) -> StatusReport {
        self.status_for(self.state.current_format)
    }

    pub fn status_for(&self, format: Format) -> StatusReport {
        build_status(
            self.state.track(format),
            format,
            self.aggregator.settings(),
            self.clock.now(),
        )
    }
}
