pub mod economics;
pub mod machine;

pub use economics::{
    bars_to_mythic, is_boss_fight, is_tier_floor, mythic_threshold, position_progress,
    progress_scalar, tier_index, TierEconomics,
};
pub use machine::{apply_result, LadderState, RankEvent, Transition};
