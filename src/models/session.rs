use chrono::{DateTime, Duration, Local, NaiveDate};
use serde::{Deserialize, Serialize};

use super::{win_rate, DaySegment, Format, Goal, RankPosition};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    #[serde(rename = "W")]
    Win,
    #[serde(rename = "L")]
    Loss,
}

impl GameResult {
    pub fn from_won(won: bool) -> Self {
        if won {
            GameResult::Win
        } else {
            GameResult::Loss
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            GameResult::Win => 'W',
            GameResult::Loss => 'L',
        }
    }
}

/// One sitting of play. Durations are derived from timestamps on demand.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub wins: u32,
    pub losses: u32,
    pub start_time: DateTime<Local>,
    pub start_rank: RankPosition,
    pub goal: Option<Goal>,
    /// Seconds spent in completed pauses.
    pub paused_seconds: i64,
    pub paused_at: Option<DateTime<Local>>,
    pub last_result_at: Option<DateTime<Local>>,
    pub paused_since_last_result: i64,
    pub game_started_at: Option<DateTime<Local>>,
    pub game_paused_seconds: i64,
    pub results: Vec<GameResult>,
    pub pending_day: DaySegment,
}

impl Session {
    pub fn new(now: DateTime<Local>, start_rank: RankPosition) -> Self {
        Self {
            wins: 0,
            losses: 0,
            start_time: now,
            start_rank,
            goal: None,
            paused_seconds: 0,
            paused_at: None,
            last_result_at: None,
            paused_since_last_result: 0,
            game_started_at: None,
            game_paused_seconds: 0,
            results: Vec::new(),
            pending_day: DaySegment::new(now.date_naive()),
        }
    }

    pub fn games(&self) -> u32 {
        self.wins + self.losses
    }

    pub fn win_rate(&self) -> f64 {
        win_rate(self.wins, self.losses)
    }

    pub fn is_paused(&self) -> bool {
        self.paused_at.is_some()
    }

    /// Returns false when already paused.
    pub fn pause(&mut self, now: DateTime<Local>) -> bool {
        if self.paused_at.is_some() {
            return false;
        }
        self.paused_at = Some(now);
        true
    }

    /// Returns false when not paused. The paused span is credited exactly once.
    pub fn resume(&mut self, now: DateTime<Local>) -> bool {
        let paused_at = match self.paused_at.take() {
            Some(at) => at,
            None => return false,
        };
        self.paused_seconds += seconds_between(paused_at, now);
        if let Some(game_start) = self.game_started_at {
            self.game_paused_seconds += seconds_between(paused_at.max(game_start), now);
        }
        let since = self.last_result_at.map_or(paused_at, |at| paused_at.max(at));
        self.paused_since_last_result += seconds_between(since, now);
        true
    }

    /// Length of the pause in progress, zero when running.
    pub fn current_pause(&self, now: DateTime<Local>) -> Duration {
        self.current_pause_since(self.start_time, now)
    }

    /// Wall-clock time since the session started.
    pub fn elapsed(&self, now: DateTime<Local>) -> Duration {
        Duration::seconds(seconds_between(self.start_time, now))
    }

    /// Wall-clock time minus every pause, including one in progress.
    pub fn active_time(&self, now: DateTime<Local>) -> Duration {
        let active = seconds_between(self.start_time, now)
            - self.paused_seconds
            - self.current_pause(now).num_seconds();
        Duration::seconds(active.max(0))
    }

    /// `(real, active)` time since the last recorded result.
    pub fn time_since_last_result(&self, now: DateTime<Local>) -> Option<(Duration, Duration)> {
        let last = self.last_result_at?;
        let real = seconds_between(last, now);
        let active = real
            - self.paused_since_last_result
            - self.current_pause_since(last, now).num_seconds();
        Some((Duration::seconds(real), Duration::seconds(active.max(0))))
    }

    pub fn start_game(&mut self, now: DateTime<Local>) {
        self.game_started_at = Some(now);
        self.game_paused_seconds = 0;
    }

    pub fn current_game_duration(&self, now: DateTime<Local>) -> Option<Duration> {
        let started = self.game_started_at?;
        let active = seconds_between(started, now)
            - self.game_paused_seconds
            - self.current_pause_since(started, now).num_seconds();
        Some(Duration::seconds(active.max(0)))
    }

    /// Closes the running game timer and returns its active length.
    pub fn finish_game(&mut self, now: DateTime<Local>) -> Option<Duration> {
        let duration = self.current_game_duration(now)?;
        self.game_started_at = None;
        self.game_paused_seconds = 0;
        Some(duration)
    }

    pub fn record(&mut self, result: GameResult, now: DateTime<Local>) {
        match result {
            GameResult::Win => self.wins += 1,
            GameResult::Loss => self.losses += 1,
        }
        self.results.push(result);
        self.last_result_at = Some(now);
        self.paused_since_last_result = 0;
    }

    /// Up to `count` most recent results, oldest first.
    pub fn recent_results(&self, count: usize) -> &[GameResult] {
        let start = self.results.len().saturating_sub(count);
        &self.results[start..]
    }

    fn current_pause_since(&self, since: DateTime<Local>, now: DateTime<Local>) -> Duration {
        match self.paused_at {
            Some(at) => Duration::seconds(seconds_between(at.max(since), now)),
            None => Duration::zero(),
        }
    }
}

/// Record of a finished session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    pub format: Format,
    pub date: NaiveDate,
    pub wins: u32,
    pub losses: u32,
    pub start_time: DateTime<Local>,
    pub end_time: DateTime<Local>,
    pub start_rank: RankPosition,
    pub end_rank: RankPosition,
    pub bars_gained: i32,
    pub active_seconds: i64,
}

impl SessionSummary {
    pub fn win_rate(&self) -> f64 {
        win_rate(self.wins, self.losses)
    }
}

fn seconds_between(from: DateTime<Local>, to: DateTime<Local>) -> i64 {
    (to - from).num_seconds().max(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, minute: u32, second: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 3, 10, hour, minute, second).unwrap()
    }

    fn session() -> Session {
        Session::new(at(12, 0, 0), RankPosition::default())
    }

    #[test]
    fn test_records_results() {
        let mut session = session();
        session.record(GameResult::Win, at(12, 10, 0));
        session.record(GameResult::Win, at(12, 20, 0));
        session.record(GameResult::Loss, at(12, 30, 0));
        assert_eq!((session.wins, session.losses), (2, 1));
        assert_eq!(session.recent_results(2), &[GameResult::Win, GameResult::Loss]);
        assert_eq!(session.recent_results(10).len(), 3);
        assert!((session.win_rate() - 66.666).abs() < 0.01);
    }

    #[test]
    fn test_pause_and_resume_account_once() {
        let mut session = session();
        assert!(session.pause(at(12, 10, 0)));
        assert!(!session.pause(at(12, 11, 0)));
        assert_eq!(session.active_time(at(12, 15, 0)), Duration::minutes(10));
        assert!(session.resume(at(12, 20, 0)));
        assert!(!session.resume(at(12, 25, 0)));
        assert_eq!(session.paused_seconds, 600);
        assert_eq!(session.elapsed(at(12, 30, 0)), Duration::minutes(30));
        assert_eq!(session.active_time(at(12, 30, 0)), Duration::minutes(20));
    }

    #[test]
    fn test_time_since_last_result() {
        let mut session = session();
        assert!(session.time_since_last_result(at(12, 5, 0)).is_none());
        session.record(GameResult::Win, at(12, 10, 0));
        session.pause(at(12, 12, 0));
        session.resume(at(12, 15, 0));
        let (real, active) = session.time_since_last_result(at(12, 20, 0)).unwrap();
        assert_eq!(real, Duration::minutes(10));
        assert_eq!(active, Duration::minutes(7));

        session.record(GameResult::Loss, at(12, 21, 0));
        let (real, active) = session.time_since_last_result(at(12, 22, 0)).unwrap();
        assert_eq!(real, active);
    }

    #[test]
    fn test_game_timer_excludes_pauses() {
        let mut session = session();
        assert!(session.finish_game(at(12, 1, 0)).is_none());
        session.start_game(at(12, 0, 0));
        session.pause(at(12, 5, 0));
        session.resume(at(12, 7, 0));
        assert_eq!(session.current_game_duration(at(12, 10, 0)), Some(Duration::minutes(8)));
        assert_eq!(session.finish_game(at(12, 12, 0)), Some(Duration::minutes(10)));
        assert!(session.game_started_at.is_none());
    }

    #[test]
    fn test_pause_before_game_start_only_counts_overlap() {
        let mut session = session();
        session.pause(at(12, 0, 0));
        session.start_game(at(12, 4, 0));
        session.resume(at(12, 5, 0));
        assert_eq!(session.game_paused_seconds, 60);
        assert_eq!(session.finish_game(at(12, 10, 0)), Some(Duration::minutes(5)));
    }

    #[test]
    fn test_clock_going_backwards_is_clamped() {
        let session = session();
        assert_eq!(session.elapsed(at(11, 0, 0)), Duration::zero());
        assert_eq!(session.active_time(at(11, 0, 0)), Duration::zero());
    }
}
