pub mod convert;
pub mod schema;
pub mod store;
pub mod timestamp;

pub use schema::{
    DayRecord, FormatBlock, HistoryRecord, MythicRecord, PerFormat, RankRecord, SeasonRecord,
    SessionRecord, Snapshot, SummaryRecord,
};
pub use store::StateStore;
pub use timestamp::parse_local;
