use chrono::{DateTime, Duration, Local};

use crate::config::TrackingSettings;
use crate::ladder::{bars_to_mythic, is_boss_fight, position_progress};
use crate::models::{
    Format, GameResult, Goal, History, HistoryBucket, PeriodSummary, RankPosition, SessionSummary,
    Tier,
};
use crate::stats::goal::{goal_distance, GoalProgress};
use crate::tracker::FormatTrack;

#[derive(Debug, Clone, PartialEq)]
pub struct SessionReport {
    pub wins: u32,
    pub losses: u32,
    pub win_rate: f64,
    pub elapsed: Duration,
    pub active: Duration,
    pub paused: bool,
    /// `(real, active)` since the last result.
    pub since_last_result: Option<(Duration, Duration)>,
    pub current_game: Option<Duration>,
    pub bars_gained: i32,
    pub goal: Option<Goal>,
    pub goal_progress: Option<GoalProgress>,
    pub recent_results: Vec<GameResult>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeasonReport {
    pub wins: u32,
    pub losses: u32,
    pub win_rate: f64,
    pub current_streak: i32,
    pub best_streak: i32,
    pub worst_streak: i32,
    pub start_rank: RankPosition,
    pub peak_rank: RankPosition,
    pub bars_gained: i32,
    pub average_game: Option<Duration>,
    pub ends_at: Option<DateTime<Local>>,
    /// Zero once the season has ended, `None` without an end date.
    pub time_left: Option<Duration>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryReport {
    pub today: PeriodSummary,
    pub yesterday: PeriodSummary,
    /// Rolling seven days ending today.
    pub this_week: PeriodSummary,
    /// The seven days before `this_week`.
    pub last_week: PeriodSummary,
    pub best_day: Option<HistoryBucket>,
}

/// Read-only view of one format at a given instant.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusReport {
    pub format: Format,
    pub position: RankPosition,
    pub floor: Tier,
    pub bars_to_mythic: u32,
    pub boss_fight: bool,
    pub session: Option<SessionReport>,
    pub season: SeasonReport,
    pub history: HistoryReport,
    pub recent_sessions: Vec<SessionSummary>,
}

/// Derives every displayed figure from state without mutating it.
pub fn build_status(
    track: &FormatTrack,
    format: Format,
    settings: &TrackingSettings,
    now: DateTime<Local>,
) -> StatusReport {
    let position = *track.ladder.position();
    let progress = position_progress(&position, format) as i32;

    let session = track.session.as_ref().map(|session| SessionReport {
        wins: session.wins,
        losses: session.losses,
        win_rate: session.win_rate(),
        elapsed: session.elapsed(now),
        active: session.active_time(now),
        paused: session.is_paused(),
        since_last_result: session.time_since_last_result(now),
        current_game: session.current_game_duration(now),
        bars_gained: progress - position_progress(&session.start_rank, format) as i32,
        goal: session.goal,
        goal_progress: session
            .goal
            .map(|goal| goal_distance(&goal, &position, format)),
        recent_results: session.recent_results(settings.recent_results).to_vec(),
    });

    let season = &track.season;
    let season = SeasonReport {
        wins: season.wins,
        losses: season.losses,
        win_rate: season.win_rate(),
        current_streak: season.current_streak,
        best_streak: season.best_streak,
        worst_streak: season.worst_streak,
        start_rank: season.start_rank,
        peak_rank: season.peak_rank,
        bars_gained: progress - position_progress(&season.start_rank, format) as i32,
        average_game: season.average_game_duration(),
        ends_at: season.ends_at,
        time_left: season.time_left(now),
    };

    StatusReport {
        format,
        position,
        floor: track.ladder.floor(),
        bars_to_mythic: bars_to_mythic(&position, format),
        boss_fight: position
            .ladder()
            .map(|rank| is_boss_fight(rank, format.pip_capacity()))
            .unwrap_or(false),
        session,
        season,
        history: build_history(track, now),
        recent_sessions: track.recent_sessions.clone(),
    }
}

/// Period sums over stored buckets plus results not yet folded.
pub fn build_history(track: &FormatTrack, now: DateTime<Local>) -> HistoryReport {
    let mut view: History = track.history.clone();
    if let Some(session) = &track.session {
        view.fold_segment(&session.pending_day);
    }

    let today = now.date_naive();
    let day = Duration::days(1);
    HistoryReport {
        today: view.period(today, today),
        yesterday: view.period(today - day, today - day),
        this_week: view.period(today - day * 6, today),
        last_week: view.period(today - day * 13, today - day * 7),
        best_day: view.best_day().copied(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ladder::LadderState;
    use crate::models::{LadderRank, Session};
    use chrono::{NaiveDate, TimeZone};

    fn at(day: u32, hour: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 3, day, hour, 0, 0).unwrap()
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, day).unwrap()
    }

    #[test]
    fn test_history_periods() {
        let mut track = FormatTrack::default();
        for d in 1..=20 {
            track.history.fold(date(d), d, 1, 1);
        }
        let report = build_history(&track, at(20, 12));
        assert_eq!(report.today.wins, 20);
        assert_eq!(report.yesterday.wins, 19);
        assert_eq!(report.this_week.wins, (14..=20).sum::<u32>());
        assert_eq!(report.last_week.wins, (7..=13).sum::<u32>());
        assert_eq!(report.this_week.losses, 7);
        assert_eq!(report.best_day.unwrap().date, date(20));
    }

    #[test]
    fn test_today_includes_pending_results() {
        let mut track = FormatTrack::default();
        track.history.fold(date(20), 1, 0, 2);
        let mut session = Session::new(at(20, 12), RankPosition::default());
        session.pending_day.wins = 2;
        session.pending_day.losses = 1;
        session.pending_day.bars_gained = 3;
        track.session = Some(session);

        let report = build_history(&track, at(20, 18));
        assert_eq!(report.today, PeriodSummary { wins: 3, losses: 1, bars_gained: 5 });
        assert!(track.history.get(date(20)).unwrap().wins == 1);
    }

    #[test]
    fn test_status_reports_ladder_figures() {
        let mut track = FormatTrack::default();
        track.ladder = LadderState::new(RankPosition::Ladder(LadderRank { tier: Tier::Gold, division: 1, pips: 4 }));
        let mut session = Session::new(at(20, 12), RankPosition::Ladder(LadderRank::entry(Tier::Gold)));
        session.goal = Some(Goal::Division { tier: Tier::Platinum, division: 4 });
        track.session = Some(session);

        let report = build_status(&track, Format::Constructed, &TrackingSettings::default(), at(20, 13));
        assert!(report.boss_fight);
        assert_eq!(report.floor, Tier::Gold);
        assert_eq!(report.bars_to_mythic, 120 - 70);
        let session = report.session.unwrap();
        assert_eq!(session.bars_gained, 22);
        assert_eq!(session.goal_progress, Some(GoalProgress::Remaining(2)));
        assert_eq!(session.elapsed, Duration::hours(1));
        assert!(session.since_last_result.is_none());
    }

    #[test]
    fn test_status_without_session() {
        let track = FormatTrack::default();
        let report = build_status(&track, Format::Limited, &TrackingSettings::default(), at(20, 13));
        assert!(report.session.is_none());
        assert_eq!(report.bars_to_mythic, 80);
        assert_eq!(report.season.bars_gained, 0);
    }
}
