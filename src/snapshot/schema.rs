//! On-disk shape of the tracker state.
//!
//! Records are looser than the domain types: integers are wide and most
//! fields default, so out-of-range data reaches the loader and is repaired
//! there instead of failing to parse.

use chrono::{DateTime, Local, NaiveDate};
use serde::de::{self, DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};

use crate::models::{Format, GameResult, LadderRank, MythicStanding, RankPosition, Tier};
use crate::snapshot::timestamp;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub current_format: Format,
    #[serde(default)]
    pub constructed_rank: RankRecord,
    #[serde(default)]
    pub limited_rank: RankRecord,
    #[serde(default)]
    pub mythic: Option<FormatBlock<MythicRecord>>,
    #[serde(default)]
    pub tier_floor: PerFormat<Option<Tier>>,
    #[serde(default)]
    pub session: Option<FormatBlock<SessionRecord>>,
    #[serde(default)]
    pub season: Option<FormatBlock<SeasonRecord>>,
    #[serde(default)]
    pub history: Vec<HistoryRecord>,
    #[serde(default)]
    pub recent_sessions: Vec<SummaryRecord>,
}

/// One value per format.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields, bound(deserialize = "T: Deserialize<'de> + Default"))]
pub struct PerFormat<T> {
    #[serde(default)]
    pub constructed: T,
    #[serde(default)]
    pub limited: T,
}

impl<T> PerFormat<T> {
    pub fn new(constructed: T, limited: T) -> Self {
        Self { constructed, limited }
    }
}

/// Either a per-format block or a single legacy object for the current format.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FormatBlock<T> {
    PerFormat(PerFormat<Option<T>>),
    Single(T),
}

/// An object keyed only by `constructed`/`limited` is a per-format block;
/// anything else is a single block. Field errors are reported as-is.
impl<'de, T> Deserialize<'de> for FormatBlock<T>
where
    T: DeserializeOwned,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        let per_format = value
            .as_object()
            .map(|map| map.keys().all(|key| key == "constructed" || key == "limited"))
            .unwrap_or(false);

        if per_format {
            serde_json::from_value(value)
                .map(FormatBlock::PerFormat)
                .map_err(|e| de::Error::custom(format!("per-format block: {}", e)))
        } else {
            serde_json::from_value(value)
                .map(FormatBlock::Single)
                .map_err(|e| de::Error::custom(format!("single block: {}", e)))
        }
    }
}

impl<T> FormatBlock<T> {
    /// Returns `(constructed, limited)`, giving a single block to `current`.
    pub fn split(self, current: Format) -> (Option<T>, Option<T>) {
        match self {
            FormatBlock::PerFormat(block) => (block.constructed, block.limited),
            FormatBlock::Single(value) => match current {
                Format::Constructed => (Some(value), None),
                Format::Limited => (None, Some(value)),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankRecord {
    pub tier: Tier,
    /// `null` in Mythic.
    #[serde(default)]
    pub division: Option<i64>,
    #[serde(default)]
    pub pips: i64,
    /// Standing carried by nested positions; top-level ranks use the `mythic` block.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mythic: Option<MythicRecord>,
}

impl Default for RankRecord {
    fn default() -> Self {
        Self::from_position(&RankPosition::default())
    }
}

impl RankRecord {
    pub fn from_position(position: &RankPosition) -> Self {
        match position {
            RankPosition::Ladder(rank) => Self {
                tier: rank.tier,
                division: Some(rank.division as i64),
                pips: rank.pips as i64,
                mythic: None,
            },
            RankPosition::Mythic(standing) => Self {
                tier: Tier::Mythic,
                division: None,
                pips: 0,
                mythic: Some(MythicRecord::from(*standing)),
            },
        }
    }

    pub fn without_standing(mut self) -> Self {
        self.mythic = None;
        self
    }

    pub fn is_valid_ladder(&self, format: Format) -> bool {
        match self.division {
            Some(division) => LadderRank::new(
                self.tier,
                u8::try_from(division).unwrap_or(0),
                u8::try_from(self.pips).unwrap_or(u8::MAX),
                format,
            )
            .is_ok(),
            None => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MythicRecord {
    #[serde(default)]
    pub percentile: Option<f64>,
    #[serde(default)]
    pub rank_number: Option<i64>,
}

impl From<MythicStanding> for MythicRecord {
    fn from(standing: MythicStanding) -> Self {
        match standing {
            MythicStanding::Unplaced => Self::default(),
            MythicStanding::Percentile(value) => Self {
                percentile: Some(value),
                rank_number: None,
            },
            MythicStanding::Leaderboard(position) => Self {
                percentile: None,
                rank_number: Some(position as i64),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DayRecord {
    pub date: NaiveDate,
    #[serde(default)]
    pub wins: u32,
    #[serde(default)]
    pub losses: u32,
    #[serde(default)]
    pub bars_gained: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    #[serde(default)]
    pub wins: u32,
    #[serde(default)]
    pub losses: u32,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub start_time: DateTime<Local>,
    #[serde(default)]
    pub goal_rank: Option<String>,
    #[serde(default)]
    pub paused_seconds: i64,
    #[serde(default)]
    pub start_rank: Option<RankRecord>,
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub paused_at: Option<DateTime<Local>>,
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub last_result_at: Option<DateTime<Local>>,
    #[serde(default)]
    pub paused_since_last_result: i64,
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub game_started_at: Option<DateTime<Local>>,
    #[serde(default)]
    pub game_paused_seconds: i64,
    #[serde(default)]
    pub results: Vec<GameResult>,
    #[serde(default)]
    pub pending_day: Option<DayRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonRecord {
    #[serde(default)]
    pub wins: u32,
    #[serde(default)]
    pub losses: u32,
    #[serde(default)]
    pub best_streak: i32,
    #[serde(default)]
    pub worst_streak: i32,
    #[serde(default)]
    pub current_streak: i32,
    #[serde(default)]
    pub start_rank: RankRecord,
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub started_at: Option<DateTime<Local>>,
    #[serde(default)]
    pub peak_rank: Option<RankRecord>,
    #[serde(default)]
    pub game_durations: Vec<i64>,
    #[serde(
        default,
        alias = "season_end_date",
        deserialize_with = "timestamp::deserialize_option"
    )]
    pub ends_at: Option<DateTime<Local>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    /// Absent in older files, which hold one format's days.
    #[serde(default)]
    pub format: Option<Format>,
    pub date: NaiveDate,
    #[serde(default)]
    pub wins: u32,
    #[serde(default)]
    pub losses: u32,
    #[serde(default)]
    pub bars_gained: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRecord {
    pub format: Format,
    pub date: NaiveDate,
    pub wins: u32,
    pub losses: u32,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub start_time: DateTime<Local>,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub end_time: DateTime<Local>,
    pub start_rank: RankRecord,
    pub end_rank: RankRecord,
    pub bars_gained: i32,
    pub active_seconds: i64,
}
