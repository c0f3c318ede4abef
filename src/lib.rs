pub mod models;
pub mod config;
pub mod ladder;
pub mod stats;
pub mod snapshot;
pub mod tracker;
pub mod utils;

pub use models::{
    Format, Goal, LadderRank, MythicStanding, RankPosition, Result, Tier, TrackerError,
};
pub use config::Settings;
pub use ladder::{apply_result, LadderState, RankEvent, Transition};
pub use snapshot::{Snapshot, StateStore};
pub use stats::{GameRecord, GoalProgress, StatusReport};
pub use tracker::{Clock, SystemClock, Tracker, TrackerState};
