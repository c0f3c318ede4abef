pub mod aggregator;
pub mod goal;
pub mod report;

pub use aggregator::{Aggregator, GameRecord};
pub use goal::{goal_distance, GoalProgress};
pub use report::{
    build_history, build_status, HistoryReport, SeasonReport, SessionReport, StatusReport,
};
