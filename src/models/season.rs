use chrono::{DateTime, Duration, Local};

use super::{win_rate, Format, GameResult, RankPosition};
use crate::ladder::position_progress;

/// Cumulative results since the season started for one format.
#[derive(Debug, Clone, PartialEq)]
pub struct SeasonStats {
    pub wins: u32,
    pub losses: u32,
    /// Longest winning run, never negative.
    pub best_streak: i32,
    /// Longest losing run as a negative number, never positive.
    pub worst_streak: i32,
    /// Positive while winning, negative while losing.
    pub current_streak: i32,
    pub start_rank: RankPosition,
    pub started_at: Option<DateTime<Local>>,
    pub peak_rank: RankPosition,
    /// Active seconds of the most recent timed games.
    pub game_durations: Vec<i64>,
    pub ends_at: Option<DateTime<Local>>,
}

impl Default for SeasonStats {
    fn default() -> Self {
        Self::new(RankPosition::default(), None)
    }
}

impl SeasonStats {
    pub fn new(start_rank: RankPosition, started_at: Option<DateTime<Local>>) -> Self {
        Self {
            wins: 0,
            losses: 0,
            best_streak: 0,
            worst_streak: 0,
            current_streak: 0,
            start_rank,
            started_at,
            peak_rank: start_rank,
            game_durations: Vec::new(),
            ends_at: None,
        }
    }

    /// Time until the season ends, zero once it has ended.
    /// `None` when no end is known.
    pub fn time_left(&self, now: DateTime<Local>) -> Option<Duration> {
        self.ends_at
            .map(|ends_at| (ends_at - now).max(Duration::zero()))
    }

    pub fn has_ended(&self, now: DateTime<Local>) -> bool {
        self.ends_at.map(|ends_at| now >= ends_at).unwrap_or(false)
    }

    pub fn games(&self) -> u32 {
        self.wins + self.losses
    }

    pub fn win_rate(&self) -> f64 {
        win_rate(self.wins, self.losses)
    }

    pub fn record(&mut self, result: GameResult) {
        match result {
            GameResult::Win => {
                self.wins += 1;
                self.current_streak = if self.current_streak > 0 {
                    self.current_streak + 1
                } else {
                    1
                };
            }
            GameResult::Loss => {
                self.losses += 1;
                self.current_streak = if self.current_streak < 0 {
                    self.current_streak - 1
                } else {
                    -1
                };
            }
        }
        self.best_streak = self.best_streak.max(self.current_streak);
        self.worst_streak = self.worst_streak.min(self.current_streak);
    }

    /// Keeps `peak_rank` at the highest position seen.
    pub fn observe_rank(&mut self, position: &RankPosition, format: Format) -> bool {
        if is_higher(position, &self.peak_rank, format) {
            self.peak_rank = *position;
            return true;
        }
        false
    }

    pub fn push_game_duration(&mut self, duration: Duration, window: usize) {
        self.game_durations.push(duration.num_seconds().max(0));
        if self.game_durations.len() > window {
            let excess = self.game_durations.len() - window;
            self.game_durations.drain(..excess);
        }
    }

    pub fn average_game_duration(&self) -> Option<Duration> {
        if self.game_durations.is_empty() {
            return None;
        }
        let total: i64 = self.game_durations.iter().sum();
        Some(Duration::seconds(total / self.game_durations.len() as i64))
    }
}

fn is_higher(candidate: &RankPosition, current: &RankPosition, format: Format) -> bool {
    match (candidate, current) {
        (RankPosition::Mythic(a), RankPosition::Mythic(b)) => a.is_better_than(b),
        (RankPosition::Mythic(_), RankPosition::Ladder(_)) => true,
        (RankPosition::Ladder(_), RankPosition::Mythic(_)) => false,
        _ => position_progress(candidate, format) > position_progress(current, format),
    }
}
