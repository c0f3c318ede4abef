use tracing::{debug, warn};

use crate::ladder::LadderState;
use crate::models::{
    DaySegment, Format, Goal, History, HistoryBucket, LadderRank, MythicStanding, RankPosition,
    SeasonStats, Session, SessionSummary, Tier,
};
use crate::snapshot::schema::{
    DayRecord, FormatBlock, HistoryRecord, MythicRecord, PerFormat, RankRecord, SeasonRecord,
    SessionRecord, Snapshot, SummaryRecord,
};
use crate::tracker::{FormatTrack, TrackerState};

/// Out-of-range values brought back into range while loading.
#[derive(Debug, Default)]
struct Repairs(Vec<String>);

impl Repairs {
    fn note(&mut self, message: String) {
        warn!("Snapshot repaired: {}", message);
        self.0.push(message);
    }
}

#[derive(Default)]
struct TrackParts {
    rank: RankRecord,
    mythic: Option<MythicRecord>,
    floor: Option<Tier>,
    session: Option<SessionRecord>,
    season: Option<SeasonRecord>,
    history: Vec<HistoryBucket>,
    recent_sessions: Vec<SummaryRecord>,
}

impl Snapshot {
    pub fn from_state(state: &TrackerState) -> Self {
        let constructed = state.track(Format::Constructed);
        let limited = state.track(Format::Limited);

        let history = Format::ALL
            .iter()
            .flat_map(|&format| {
                state
                    .track(format)
                    .history
                    .buckets()
                    .iter()
                    .map(move |bucket| HistoryRecord {
                        format: Some(format),
                        date: bucket.date,
                        wins: bucket.wins,
                        losses: bucket.losses,
                        bars_gained: bucket.bars_gained,
                    })
            })
            .collect();

        let recent_sessions = Format::ALL
            .iter()
            .flat_map(|&format| state.track(format).recent_sessions.iter().map(SummaryRecord::from))
            .collect();

        Snapshot {
            current_format: state.current_format,
            constructed_rank: RankRecord::from_position(constructed.ladder.position()).without_standing(),
            limited_rank: RankRecord::from_position(limited.ladder.position()).without_standing(),
            mythic: Some(FormatBlock::PerFormat(PerFormat::new(
                mythic_record(constructed),
                mythic_record(limited),
            ))),
            tier_floor: PerFormat::new(Some(constructed.ladder.floor()), Some(limited.ladder.floor())),
            session: Some(FormatBlock::PerFormat(PerFormat::new(
                constructed.session.as_ref().map(SessionRecord::from),
                limited.session.as_ref().map(SessionRecord::from),
            ))),
            season: Some(FormatBlock::PerFormat(PerFormat::new(
                Some(SeasonRecord::from(&constructed.season)),
                Some(SeasonRecord::from(&limited.season)),
            ))),
            history,
            recent_sessions,
        }
    }

    /// Builds the tracker state, clamping out-of-range values.
    /// Returns a description of every repair made.
    pub fn into_state(self) -> (TrackerState, Vec<String>) {
        let current = self.current_format;
        let mut repairs = Repairs::default();

        let mut constructed = TrackParts {
            rank: self.constructed_rank,
            floor: self.tier_floor.constructed,
            ..Default::default()
        };
        let mut limited = TrackParts {
            rank: self.limited_rank,
            floor: self.tier_floor.limited,
            ..Default::default()
        };

        if let Some(block) = self.mythic {
            (constructed.mythic, limited.mythic) = block.split(current);
        }
        if let Some(block) = self.session {
            (constructed.session, limited.session) = block.split(current);
        }
        if let Some(block) = self.season {
            (constructed.season, limited.season) = block.split(current);
        }

        for record in self.history {
            let bucket = HistoryBucket {
                date: record.date,
                wins: record.wins,
                losses: record.losses,
                bars_gained: record.bars_gained,
            };
            match record.format.unwrap_or(current) {
                Format::Constructed => constructed.history.push(bucket),
                Format::Limited => limited.history.push(bucket),
            }
        }
        for record in self.recent_sessions {
            match record.format {
                Format::Constructed => constructed.recent_sessions.push(record),
                Format::Limited => limited.recent_sessions.push(record),
            }
        }

        let state = TrackerState {
            current_format: current,
            constructed: restore_track(Format::Constructed, constructed, &mut repairs),
            limited: restore_track(Format::Limited, limited, &mut repairs),
        };
        (state, repairs.0)
    }
}

fn mythic_record(track: &FormatTrack) -> Option<MythicRecord> {
    match track.ladder.position() {
        RankPosition::Mythic(standing) => Some(MythicRecord::from(*standing)),
        RankPosition::Ladder(_) => None,
    }
}

fn restore_track(format: Format, parts: TrackParts, repairs: &mut Repairs) -> FormatTrack {
    let position = restore_position(&parts.rank, parts.mythic, format, "rank", repairs);

    let floor = match parts.floor {
        Some(floor) if floor < position.tier() => {
            repairs.note(format!(
                "{} tier floor {} raised to current tier {}",
                format,
                floor,
                position.tier()
            ));
            position.tier()
        }
        Some(floor) => floor,
        None => position.tier(),
    };

    let session = parts
        .session
        .map(|record| restore_session(record, format, position, repairs));
    let season = restore_season(parts.season, format, position, repairs);
    let recent_sessions = parts
        .recent_sessions
        .into_iter()
        .map(|record| restore_summary(record, repairs))
        .collect();

    FormatTrack {
        ladder: LadderState::with_floor(position, floor),
        session,
        season,
        history: History::from_buckets(parts.history),
        recent_sessions,
    }
}

fn restore_position(
    record: &RankRecord,
    standing: Option<MythicRecord>,
    format: Format,
    field: &str,
    repairs: &mut Repairs,
) -> RankPosition {
    if record.tier.is_mythic() {
        let standing = standing.or(record.mythic);
        return RankPosition::Mythic(restore_standing(standing, format, field, repairs));
    }

    let division = match record.division {
        Some(division) if (1..=4).contains(&division) => division as u8,
        Some(division) => {
            let clamped = division.clamp(1, 4) as u8;
            repairs.note(format!(
                "{} {} division {} clamped to {}",
                format, field, division, clamped
            ));
            clamped
        }
        None => {
            repairs.note(format!(
                "{} {} has no division, using {}",
                format,
                field,
                LadderRank::ENTRY_DIVISION
            ));
            LadderRank::ENTRY_DIVISION
        }
    };

    let capacity = format.pip_capacity() as i64;
    let pips = if (0..capacity).contains(&record.pips) {
        record.pips as u8
    } else {
        let clamped = record.pips.clamp(0, capacity - 1) as u8;
        repairs.note(format!(
            "{} {} pips {} clamped to {}",
            format, field, record.pips, clamped
        ));
        clamped
    };

    RankPosition::Ladder(LadderRank {
        tier: record.tier,
        division,
        pips,
    })
}

fn restore_standing(
    record: Option<MythicRecord>,
    format: Format,
    field: &str,
    repairs: &mut Repairs,
) -> MythicStanding {
    let record = match record {
        Some(record) => record,
        None => return MythicStanding::Unplaced,
    };

    match record.rank_number {
        Some(position) if position >= 1 => {
            return MythicStanding::Leaderboard(u32::try_from(position).unwrap_or(u32::MAX));
        }
        Some(position) => repairs.note(format!(
            "{} {} leaderboard position {} dropped",
            format, field, position
        )),
        None => {}
    }

    match record.percentile {
        Some(value) if (0.0..=100.0).contains(&value) => MythicStanding::Percentile(value),
        Some(value) => {
            let clamped = value.clamp(0.0, 100.0);
            repairs.note(format!(
                "{} {} percentile {} clamped to {}",
                format, field, value, clamped
            ));
            MythicStanding::Percentile(clamped)
        }
        None => MythicStanding::Unplaced,
    }
}

fn non_negative(value: i64, format: Format, field: &str, repairs: &mut Repairs) -> i64 {
    if value < 0 {
        repairs.note(format!("{} {} {} reset to 0", format, field, value));
        return 0;
    }
    value
}

fn restore_session(
    record: SessionRecord,
    format: Format,
    position: RankPosition,
    repairs: &mut Repairs,
) -> Session {
    let start_rank = match &record.start_rank {
        Some(rank) => restore_position(rank, None, format, "session start rank", repairs),
        None => position,
    };

    let goal = match record.goal_rank.as_deref() {
        Some(text) => match Goal::parse(text) {
            Ok(goal) => Some(goal),
            Err(e) => {
                repairs.note(format!("{} session goal '{}' dropped: {}", format, text, e));
                None
            }
        },
        None => None,
    };

    // Files without a pending day still hold the session's results unfolded.
    let pending_day = match record.pending_day {
        Some(day) => DaySegment {
            date: day.date,
            wins: day.wins,
            losses: day.losses,
            bars_gained: day.bars_gained,
        },
        None => {
            debug!("{} session has no pending day, attributing results to its start", format);
            DaySegment {
                date: record.start_time.date_naive(),
                wins: record.wins,
                losses: record.losses,
                bars_gained: 0,
            }
        }
    };

    Session {
        wins: record.wins,
        losses: record.losses,
        start_time: record.start_time,
        start_rank,
        goal,
        paused_seconds: non_negative(record.paused_seconds, format, "paused_seconds", repairs),
        paused_at: record.paused_at,
        last_result_at: record.last_result_at,
        paused_since_last_result: non_negative(
            record.paused_since_last_result,
            format,
            "paused_since_last_result",
            repairs,
        ),
        game_started_at: record.game_started_at,
        game_paused_seconds: non_negative(
            record.game_paused_seconds,
            format,
            "game_paused_seconds",
            repairs,
        ),
        results: record.results,
        pending_day,
    }
}

fn restore_season(
    record: Option<SeasonRecord>,
    format: Format,
    position: RankPosition,
    repairs: &mut Repairs,
) -> SeasonStats {
    let record = match record {
        Some(record) => record,
        None => return SeasonStats::new(position, None),
    };

    let start_rank = restore_position(&record.start_rank, None, format, "season start rank", repairs);
    let mut season = SeasonStats::new(start_rank, record.started_at);
    season.ends_at = record.ends_at;
    season.wins = record.wins;
    season.losses = record.losses;
    season.current_streak = record.current_streak;

    season.best_streak = if record.best_streak < 0 {
        repairs.note(format!("{} best streak {} reset to 0", format, record.best_streak));
        0
    } else {
        record.best_streak
    };
    // Older files store the losing run as a positive count.
    season.worst_streak = if record.worst_streak > 0 {
        debug!("{} worst streak stored as a count, negating", format);
        -record.worst_streak
    } else {
        record.worst_streak
    };
    if season.current_streak > season.best_streak || season.current_streak < season.worst_streak {
        repairs.note(format!(
            "{} streak extremes widened to cover current streak {}",
            format, season.current_streak
        ));
        season.best_streak = season.best_streak.max(season.current_streak);
        season.worst_streak = season.worst_streak.min(season.current_streak);
    }

    if let Some(peak) = &record.peak_rank {
        season.peak_rank = restore_position(peak, None, format, "season peak rank", repairs);
        season.observe_rank(&start_rank, format);
    }
    season.observe_rank(&position, format);

    let before = record.game_durations.len();
    season.game_durations = record
        .game_durations
        .into_iter()
        .filter(|seconds| *seconds >= 0)
        .collect();
    if season.game_durations.len() != before {
        repairs.note(format!(
            "{} dropped {} negative game durations",
            format,
            before - season.game_durations.len()
        ));
    }

    season
}

fn restore_summary(record: SummaryRecord, repairs: &mut Repairs) -> SessionSummary {
    let format = record.format;
    SessionSummary {
        format,
        date: record.date,
        wins: record.wins,
        losses: record.losses,
        start_time: record.start_time,
        end_time: record.end_time,
        start_rank: restore_position(&record.start_rank, None, format, "summary start rank", repairs),
        end_rank: restore_position(&record.end_rank, None, format, "summary end rank", repairs),
        bars_gained: record.bars_gained,
        active_seconds: record.active_seconds,
    }
}

impl From<&Session> for SessionRecord {
    fn from(session: &Session) -> Self {
        let day = session.pending_day;
        SessionRecord {
            wins: session.wins,
            losses: session.losses,
            start_time: session.start_time,
            goal_rank: session.goal.map(|goal| goal.to_string()),
            paused_seconds: session.paused_seconds,
            start_rank: Some(RankRecord::from_position(&session.start_rank)),
            paused_at: session.paused_at,
            last_result_at: session.last_result_at,
            paused_since_last_result: session.paused_since_last_result,
            game_started_at: session.game_started_at,
            game_paused_seconds: session.game_paused_seconds,
            results: session.results.clone(),
            pending_day: Some(DayRecord {
                date: day.date,
                wins: day.wins,
                losses: day.losses,
                bars_gained: day.bars_gained,
            }),
        }
    }
}

impl From<&SeasonStats> for SeasonRecord {
    fn from(season: &SeasonStats) -> Self {
        SeasonRecord {
            wins: season.wins,
            losses: season.losses,
            best_streak: season.best_streak,
            worst_streak: season.worst_streak,
            current_streak: season.current_streak,
            start_rank: RankRecord::from_position(&season.start_rank),
            started_at: season.started_at,
            peak_rank: Some(RankRecord::from_position(&season.peak_rank)),
            game_durations: season.game_durations.clone(),
            ends_at: season.ends_at,
        }
    }
}

impl From<&SessionSummary> for SummaryRecord {
    fn from(summary: &SessionSummary) -> Self {
        SummaryRecord {
            format: summary.format,
            date: summary.date,
            wins: summary.wins,
            losses: summary.losses,
            start_time: summary.start_time,
            end_time: summary.end_time,
            start_rank: RankRecord::from_position(&summary.start_rank),
            end_rank: RankRecord::from_position(&summary.end_rank),
            bars_gained: summary.bars_gained,
            active_seconds: summary.active_seconds,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GameResult;
    use chrono::{DateTime, Local, NaiveDate, TimeZone};

    fn at(hour: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 3, 10, hour, 0, 0).unwrap()
    }

    fn ladder(tier: Tier, division: u8, pips: u8) -> RankPosition {
        RankPosition::Ladder(LadderRank { tier, division, pips })
    }

    fn load(json: &str) -> (TrackerState, Vec<String>) {
        serde_json::from_str::<Snapshot>(json).unwrap().into_state()
    }

    fn populated_state() -> TrackerState {
        let mut state = TrackerState::new(Format::Limited);

        let constructed = state.track_mut(Format::Constructed);
        constructed.ladder = LadderState::with_floor(ladder(Tier::Gold, 2, 3), Tier::Gold);
        let mut session = Session::new(at(18), ladder(Tier::Gold, 3, 1));
        session.goal = Some(Goal::Division { tier: Tier::Platinum, division: 4 });
        session.record(GameResult::Win, at(19));
        session.record(GameResult::Loss, at(20));
        session.pending_day.wins = 1;
        session.pending_day.losses = 1;
        session.pending_day.bars_gained = 1;
        session.pause(at(21));
        constructed.session = Some(session);
        constructed.season.record(GameResult::Win);
        constructed.season.record(GameResult::Loss);
        constructed.season.peak_rank = ladder(Tier::Gold, 2, 3);
        constructed.season.game_durations = vec![600, 900];
        constructed.season.ends_at = Some(at(23));
        constructed
            .history
            .fold(NaiveDate::from_ymd_opt(2025, 3, 9).unwrap(), 4, 2, 5);

        let limited = state.track_mut(Format::Limited);
        limited.ladder = LadderState::new(RankPosition::Mythic(MythicStanding::Percentile(87.5)));
        limited.season.peak_rank = RankPosition::Mythic(MythicStanding::Percentile(87.5));
        limited.recent_sessions.push(SessionSummary {
            format: Format::Limited,
            date: NaiveDate::from_ymd_opt(2025, 3, 8).unwrap(),
            wins: 3,
            losses: 0,
            start_time: at(10),
            end_time: at(11),
            start_rank: ladder(Tier::Diamond, 1, 2),
            end_rank: RankPosition::Mythic(MythicStanding::Unplaced),
            bars_gained: 2,
            active_seconds: 3600,
        });
        state
    }

    #[test]
    fn test_round_trip_is_stable() {
        let state = populated_state();
        let first = serde_json::to_string_pretty(&Snapshot::from_state(&state)).unwrap();
        let (restored, repairs) = load(&first);
        assert!(repairs.is_empty());
        assert_eq!(restored, state);
        let second = serde_json::to_string_pretty(&Snapshot::from_state(&restored)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_mythic_serialized_in_its_own_block() {
        let value = serde_json::to_value(Snapshot::from_state(&populated_state())).unwrap();
        assert_eq!(value["limited_rank"]["tier"], "Mythic");
        assert!(value["limited_rank"]["division"].is_null());
        assert_eq!(value["mythic"]["limited"]["percentile"], 87.5);
        assert!(value["mythic"]["constructed"].is_null());
        assert_eq!(value["tier_floor"]["limited"], "Mythic");
        assert_eq!(value["current_format"], "LIMITED");
    }

    #[test]
    fn test_loads_single_block_shape() {
        let json = r#"{
            "current_format": "CONSTRUCTED",
            "constructed_rank": {"tier": "Gold", "division": 1, "pips": 5},
            "limited_rank": {"tier": "Silver", "division": 3, "pips": 0},
            "session": {"wins": 2, "losses": 1, "start_time": "2025-03-10T18:00:00+01:00",
                        "goal_rank": "Platinum 4", "paused_seconds": 120},
            "season": {"wins": 30, "losses": 20, "best_streak": 6, "worst_streak": -4,
                       "start_rank": {"tier": "Silver", "division": 4, "pips": 0}},
            "history": [{"date": "2025-03-09", "wins": 5, "losses": 3, "bars_gained": 4}]
        }"#;
        let (state, repairs) = load(json);
        assert!(repairs.is_empty());

        let constructed = state.track(Format::Constructed);
        assert_eq!(constructed.ladder.floor(), Tier::Gold);
        let session = constructed.session.as_ref().unwrap();
        assert_eq!(session.goal, Some(Goal::Division { tier: Tier::Platinum, division: 4 }));
        assert_eq!(session.paused_seconds, 120);
        assert_eq!(session.start_rank, ladder(Tier::Gold, 1, 5));
        assert_eq!(session.pending_day.wins, 2);
        assert_eq!(constructed.season.wins, 30);
        assert_eq!(constructed.season.worst_streak, -4);
        assert_eq!(constructed.season.peak_rank, ladder(Tier::Gold, 1, 5));
        assert_eq!(constructed.history.buckets().len(), 1);

        let limited = state.track(Format::Limited);
        assert!(limited.session.is_none());
        assert_eq!(limited.ladder.floor(), Tier::Silver);
    }

    #[test]
    fn test_history_without_format_follows_current_format() {
        let json = r#"{
            "current_format": "LIMITED",
            "limited_rank": {"tier": "Silver", "division": 2, "pips": 1},
            "season": {"wins": 8, "losses": 4},
            "history": [{"date": "2025-03-09", "wins": 5, "losses": 3, "bars_gained": 4},
                        {"format": "CONSTRUCTED", "date": "2025-03-08", "wins": 1, "losses": 0}]
        }"#;
        let (state, repairs) = load(json);
        assert!(repairs.is_empty());
        assert_eq!(state.limited.season.wins, 8);
        assert_eq!(state.limited.history.buckets().len(), 1);
        assert_eq!(state.limited.history.buckets()[0].wins, 5);
        assert_eq!(state.constructed.history.buckets().len(), 1);
        assert_eq!(state.constructed.history.buckets()[0].wins, 1);
    }

    #[test]
    fn test_loads_offset_less_timestamps() {
        let json = r#"{
            "current_format": "CONSTRUCTED",
            "session": {"wins": 1, "losses": 0, "start_time": "2025-03-10T18:00:00.123456",
                        "goal_rank": null, "paused_seconds": 0,
                        "paused_at": "2025-03-10T19:30:00"},
            "season": {"wins": 1, "season_end_date": "2025-04-01T12:00:00"}
        }"#;
        let (state, repairs) = load(json);
        assert!(repairs.is_empty());

        let session = state.constructed.session.as_ref().unwrap();
        assert_eq!(session.start_time, at(18) + chrono::Duration::microseconds(123_456));
        assert_eq!(session.paused_at, Some(at(19) + chrono::Duration::minutes(30)));
        assert_eq!(
            state.constructed.season.ends_at,
            Local.with_ymd_and_hms(2025, 4, 1, 12, 0, 0).single()
        );
    }

    #[test]
    fn test_out_of_range_rank_is_clamped() {
        let json = r#"{
            "current_format": "LIMITED",
            "constructed_rank": {"tier": "Gold", "division": 7, "pips": 9},
            "limited_rank": {"tier": "Bronze", "division": 2, "pips": -3},
            "tier_floor": {"constructed": "Silver", "limited": "Bronze"}
        }"#;
        let (state, repairs) = load(json);
        assert_eq!(*state.constructed.ladder.position(), ladder(Tier::Gold, 4, 5));
        assert_eq!(state.constructed.ladder.floor(), Tier::Gold);
        assert_eq!(*state.limited.ladder.position(), ladder(Tier::Bronze, 2, 0));
        assert_eq!(repairs.len(), 4);
    }

    #[test]
    fn test_mythic_standing_repairs() {
        let json = r#"{
            "constructed_rank": {"tier": "Mythic", "division": null, "pips": 0},
            "limited_rank": {"tier": "Mythic", "division": null, "pips": 0},
            "mythic": {"constructed": {"percentile": 140.0, "rank_number": null},
                       "limited": {"percentile": 55.0, "rank_number": 0}}
        }"#;
        let (state, repairs) = load(json);
        assert_eq!(
            *state.constructed.ladder.position(),
            RankPosition::Mythic(MythicStanding::Percentile(100.0))
        );
        assert_eq!(
            *state.limited.ladder.position(),
            RankPosition::Mythic(MythicStanding::Percentile(55.0))
        );
        assert_eq!(repairs.len(), 2);
    }

    #[test]
    fn test_legacy_names_and_streak_counts() {
        let json = r#"{
            "current_format": "Constructed BO3",
            "season": {"wins": 5, "losses": 5, "best_streak": 3, "worst_streak": 4,
                       "current_streak": -5}
        }"#;
        let (state, repairs) = load(json);
        assert_eq!(state.current_format, Format::Constructed);
        assert_eq!(state.constructed.season.worst_streak, -5);
        assert_eq!(repairs.len(), 1);
    }

    #[test]
    fn test_unparseable_goal_dropped() {
        let json = r#"{
            "session": {"constructed": {"start_time": "2025-03-10T18:00:00+00:00",
                                        "goal_rank": "Emerald 2"}, "limited": null}
        }"#;
        let (state, repairs) = load(json);
        assert!(state.constructed.session.as_ref().unwrap().goal.is_none());
        assert_eq!(repairs.len(), 1);
    }
}
