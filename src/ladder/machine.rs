use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::ladder::economics::{is_tier_floor, position_progress, TierEconomics};
use crate::models::{
    Format, LadderRank, MythicStanding, RankPosition, Result, Tier, TrackerError,
};

/// What a single transition did to the rank, for the caller to react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RankEvent {
    None,
    PromotedDivision,
    PromotedTier,
    EnteredMythic,
    DemotedDivision,
    DemotionBlockedByFloor,
}

impl RankEvent {
    pub fn is_promotion(&self) -> bool {
        matches!(
            self,
            RankEvent::PromotedDivision | RankEvent::PromotedTier | RankEvent::EnteredMythic
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RankEvent::None => "none",
            RankEvent::PromotedDivision => "promoted division",
            RankEvent::PromotedTier => "promoted tier",
            RankEvent::EnteredMythic => "entered mythic",
            RankEvent::DemotedDivision => "demoted division",
            RankEvent::DemotionBlockedByFloor => "demotion blocked by floor",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub before: RankPosition,
    pub after: RankPosition,
    pub event: RankEvent,
}

impl Transition {
    /// Signed change in bars between `before` and `after`.
    pub fn progress_delta(&self, format: Format) -> i32 {
        position_progress(&self.after, format) as i32 - position_progress(&self.before, format) as i32
    }
}

/// Computes the position after one game. Pure; Mythic positions are returned unchanged.
///
/// Division promotions carry surplus pips into the next division. Leaving a
/// tier starts the new tier at division 4 with no pips, and leaving Diamond 1
/// enters Mythic with no standing yet. A loss that would take pips below zero
/// drops one division, except at division 4 where the tier floor holds pips at 0.
pub fn apply_result(position: RankPosition, format: Format, won: bool) -> (RankPosition, RankEvent) {
    let rank = match position {
        RankPosition::Ladder(rank) => rank,
        RankPosition::Mythic(_) => return (position, RankEvent::None),
    };
    let economics = match TierEconomics::for_tier(rank.tier) {
        Some(economics) => economics,
        None => return (position, RankEvent::None),
    };
    let capacity = format.pip_capacity() as i32;

    let mut tier = rank.tier;
    let mut division = rank.division;
    let mut event = RankEvent::None;

    if won {
        let mut pips = rank.pips as i32 + economics.win_gain as i32;
        while pips >= capacity {
            pips -= capacity;
            if division > LadderRank::TOP_DIVISION {
                division -= 1;
                event = RankEvent::PromotedDivision;
                continue;
            }
            match tier.next() {
                Some(Tier::Mythic) | None => {
                    return (
                        RankPosition::Mythic(MythicStanding::Unplaced),
                        RankEvent::EnteredMythic,
                    );
                }
                Some(next) => {
                    tier = next;
                    division = LadderRank::ENTRY_DIVISION;
                    pips = 0;
                    event = RankEvent::PromotedTier;
                }
            }
        }
        return (
            RankPosition::Ladder(LadderRank { tier, division, pips: pips as u8 }),
            event,
        );
    }

    let mut pips = rank.pips as i32 - economics.loss_cost as i32;
    while pips < 0 {
        if !is_tier_floor(tier, division) {
            division += 1;
            pips += capacity;
            event = RankEvent::DemotedDivision;
        } else {
            pips = 0;
            event = RankEvent::DemotionBlockedByFloor;
        }
    }
    (
        RankPosition::Ladder(LadderRank { tier, division, pips: pips as u8 }),
        event,
    )
}

/// Classifies a manual jump from `before` to `after`.
fn classify(before: &RankPosition, after: &RankPosition, format: Format) -> RankEvent {
    if after.is_mythic() {
        return if before.is_mythic() {
            RankEvent::None
        } else {
            RankEvent::EnteredMythic
        };
    }
    let from = position_progress(before, format);
    let to = position_progress(after, format);
    if to > from {
        if after.tier() > before.tier() {
            RankEvent::PromotedTier
        } else if after.ladder().map(|r| r.division) != before.ladder().map(|r| r.division) {
            RankEvent::PromotedDivision
        } else {
            RankEvent::None
        }
    } else if to < from
        && after.ladder().map(|r| (r.tier, r.division))
            != before.ladder().map(|r| (r.tier, r.division))
    {
        RankEvent::DemotedDivision
    } else {
        RankEvent::None
    }
}

/// Rank of one format together with the highest tier it has reached.
#[derive(Debug, Clone, PartialEq)]
pub struct LadderState {
    position: RankPosition,
    floor: Tier,
}

impl Default for LadderState {
    fn default() -> Self {
        Self::new(RankPosition::default())
    }
}

impl LadderState {
    pub fn new(position: RankPosition) -> Self {
        Self {
            floor: position.tier(),
            position,
        }
    }

    /// The floor is never below the tier currently held.
    pub fn with_floor(position: RankPosition, floor: Tier) -> Self {
        Self {
            floor: floor.max(position.tier()),
            position,
        }
    }

    pub fn position(&self) -> &RankPosition {
        &self.position
    }

    pub fn floor(&self) -> Tier {
        self.floor
    }

    pub fn apply_result(&mut self, format: Format, won: bool) -> Transition {
        let before = self.position;
        let (after, event) = apply_result(before, format, won);
        self.position = after;
        self.raise_floor(after.tier());

        match event {
            RankEvent::EnteredMythic => info!("{} reached Mythic", format),
            RankEvent::PromotedTier => info!("{} promoted to {}", format, after),
            RankEvent::DemotionBlockedByFloor => {
                debug!("{} demotion blocked at {} floor", format, self.floor)
            }
            _ => debug!("{} {} -> {} ({})", format, before, after, event.as_str()),
        }

        Transition { before, after, event }
    }

    /// Manual correction that bypasses the transition rules.
    ///
    /// Leaving Mythic or moving below the recorded floor needs `force`; a
    /// forced move below the floor lowers the floor to the new tier.
    pub fn set_rank(
        &mut self,
        tier: Tier,
        division: u8,
        pips: u8,
        format: Format,
        force: bool,
    ) -> Result<Transition> {
        let after = if tier.is_mythic() {
            match self.position {
                RankPosition::Mythic(standing) => RankPosition::Mythic(standing),
                RankPosition::Ladder(_) => RankPosition::Mythic(MythicStanding::Unplaced),
            }
        } else {
            RankPosition::Ladder(LadderRank::new(tier, division, pips, format)?)
        };

        if self.position.is_mythic() && !after.is_mythic() && !force {
            return Err(TrackerError::MythicLocked);
        }
        if tier < self.floor && !force {
            return Err(TrackerError::BelowTierFloor {
                requested: after.to_string(),
                floor: self.floor.to_string(),
            });
        }

        let before = self.position;
        self.position = after;
        if tier < self.floor {
            info!("{} tier floor corrected from {} to {}", format, self.floor, tier);
            self.floor = tier;
        } else {
            self.raise_floor(tier);
        }

        let event = classify(&before, &after, format);
        info!("{} rank set to {}", format, after.label(format));
        Ok(Transition { before, after, event })
    }

    pub fn set_mythic_standing(&mut self, standing: MythicStanding) -> Result<()> {
        if !self.position.is_mythic() {
            return Err(TrackerError::NotMythic);
        }
        let standing = match standing {
            MythicStanding::Percentile(value) => MythicStanding::percentile(value)?,
            MythicStanding::Leaderboard(position) => MythicStanding::leaderboard(position)?,
            MythicStanding::Unplaced => MythicStanding::Unplaced,
        };
        self.position = RankPosition::Mythic(standing);
        info!("Mythic standing set to {}", standing);
        Ok(())
    }

    /// Start of a season: the held tier becomes the floor again.
    pub fn reset(&mut self, position: RankPosition) {
        self.position = position;
        self.floor = position.tier();
    }

    fn raise_floor(&mut self, tier: Tier) {
        if tier > self.floor {
            debug!("Tier floor raised from {} to {}", self.floor, tier);
            self.floor = tier;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ladder(tier: Tier, division: u8, pips: u8) -> RankPosition {
        RankPosition::Ladder(LadderRank { tier, division, pips })
    }

    #[test]
    fn test_win_within_division() {
        let (after, event) = apply_result(ladder(Tier::Bronze, 4, 0), Format::Constructed, true);
        assert_eq!(after, ladder(Tier::Bronze, 4, 2));
        assert_eq!(event, RankEvent::None);
    }

    #[test]
    fn test_division_promotion_carries_surplus() {
        let (after, event) = apply_result(ladder(Tier::Gold, 3, 5), Format::Constructed, true);
        assert_eq!(after, ladder(Tier::Gold, 2, 1));
        assert_eq!(event, RankEvent::PromotedDivision);
    }

    #[test]
    fn test_tier_promotion_starts_at_entry() {
        let (after, event) = apply_result(ladder(Tier::Gold, 1, 5), Format::Constructed, true);
        assert_eq!(after, ladder(Tier::Platinum, 4, 0));
        assert_eq!(event, RankEvent::PromotedTier);
    }

    #[test]
    fn test_enter_mythic_from_diamond_one() {
        let (after, event) = apply_result(ladder(Tier::Diamond, 1, 3), Format::Limited, true);
        assert_eq!(after, RankPosition::Mythic(MythicStanding::Unplaced));
        assert_eq!(event, RankEvent::EnteredMythic);
    }

    #[test]
    fn test_diamond_two_does_not_enter_mythic() {
        let (after, event) = apply_result(ladder(Tier::Diamond, 2, 5), Format::Constructed, true);
        assert_eq!(after, ladder(Tier::Diamond, 1, 0));
        assert_eq!(event, RankEvent::PromotedDivision);
    }

    #[test]
    fn test_mythic_ignores_results() {
        let mythic = RankPosition::Mythic(MythicStanding::Percentile(92.0));
        assert_eq!(apply_result(mythic, Format::Constructed, true), (mythic, RankEvent::None));
        assert_eq!(apply_result(mythic, Format::Constructed, false), (mythic, RankEvent::None));
    }

    #[test]
    fn test_bronze_and_silver_losses_cost_nothing() {
        let (after, event) = apply_result(ladder(Tier::Silver, 3, 0), Format::Constructed, false);
        assert_eq!(after, ladder(Tier::Silver, 3, 0));
        assert_eq!(event, RankEvent::None);
    }

    #[test]
    fn test_loss_demotes_division() {
        let (after, event) = apply_result(ladder(Tier::Platinum, 3, 0), Format::Constructed, false);
        assert_eq!(after, ladder(Tier::Platinum, 4, 5));
        assert_eq!(event, RankEvent::DemotedDivision);
    }

    #[test]
    fn test_loss_at_floor_is_blocked() {
        let (after, event) = apply_result(ladder(Tier::Diamond, 4, 0), Format::Limited, false);
        assert_eq!(after, ladder(Tier::Diamond, 4, 0));
        assert_eq!(event, RankEvent::DemotionBlockedByFloor);
    }

    #[test]
    fn test_loss_with_pips_at_floor_is_plain() {
        let (after, event) = apply_result(ladder(Tier::Gold, 4, 1), Format::Constructed, false);
        assert_eq!(after, ladder(Tier::Gold, 4, 0));
        assert_eq!(event, RankEvent::None);
    }

    #[test]
    fn test_state_raises_floor_on_tier_entry() {
        let mut state = LadderState::new(ladder(Tier::Gold, 1, 5));
        assert_eq!(state.floor(), Tier::Gold);
        let transition = state.apply_result(Format::Constructed, true);
        assert_eq!(transition.event, RankEvent::PromotedTier);
        assert_eq!(state.floor(), Tier::Platinum);
        assert_eq!(transition.progress_delta(Format::Constructed), 1);
    }

    #[test]
    fn test_with_floor_never_below_current_tier() {
        let state = LadderState::with_floor(ladder(Tier::Platinum, 2, 0), Tier::Silver);
        assert_eq!(state.floor(), Tier::Platinum);
        let state = LadderState::with_floor(ladder(Tier::Silver, 2, 0), Tier::Diamond);
        assert_eq!(state.floor(), Tier::Diamond);
    }

    #[test]
    fn test_set_rank_validates_input() {
        let mut state = LadderState::default();
        let err = state.set_rank(Tier::Gold, 0, 0, Format::Constructed, false).unwrap_err();
        assert!(matches!(err, TrackerError::InvalidDivision(0)));
        let err = state.set_rank(Tier::Gold, 2, 6, Format::Constructed, false).unwrap_err();
        assert!(matches!(err, TrackerError::InvalidPips { .. }));
        assert_eq!(state, LadderState::default());
    }

    #[test]
    fn test_set_rank_raises_floor() {
        let mut state = LadderState::default();
        let transition = state.set_rank(Tier::Diamond, 3, 2, Format::Constructed, false).unwrap();
        assert_eq!(transition.event, RankEvent::PromotedTier);
        assert_eq!(state.floor(), Tier::Diamond);
    }

    #[test]
    fn test_set_rank_below_floor_requires_force() {
        let mut state = LadderState::new(ladder(Tier::Platinum, 2, 0));
        let err = state.set_rank(Tier::Gold, 1, 0, Format::Constructed, false).unwrap_err();
        assert!(matches!(err, TrackerError::BelowTierFloor { .. }));
        assert_eq!(state.position(), &ladder(Tier::Platinum, 2, 0));

        let transition = state.set_rank(Tier::Gold, 1, 0, Format::Constructed, true).unwrap();
        assert_eq!(transition.event, RankEvent::DemotedDivision);
        assert_eq!(state.floor(), Tier::Gold);
    }

    #[test]
    fn test_set_rank_within_floor_tier_allowed() {
        let mut state = LadderState::new(ladder(Tier::Platinum, 1, 0));
        let transition = state.set_rank(Tier::Platinum, 4, 0, Format::Constructed, false).unwrap();
        assert_eq!(transition.event, RankEvent::DemotedDivision);
        assert_eq!(state.floor(), Tier::Platinum);
    }

    #[test]
    fn test_set_rank_into_and_out_of_mythic() {
        let mut state = LadderState::new(ladder(Tier::Diamond, 2, 0));
        let transition = state.set_rank(Tier::Mythic, 0, 0, Format::Constructed, false).unwrap();
        assert_eq!(transition.event, RankEvent::EnteredMythic);
        assert_eq!(state.position(), &RankPosition::Mythic(MythicStanding::Unplaced));

        state.set_mythic_standing(MythicStanding::Percentile(80.0)).unwrap();
        state.set_rank(Tier::Mythic, 0, 0, Format::Constructed, false).unwrap();
        assert_eq!(state.position(), &RankPosition::Mythic(MythicStanding::Percentile(80.0)));

        let err = state.set_rank(Tier::Diamond, 1, 0, Format::Constructed, false).unwrap_err();
        assert!(matches!(err, TrackerError::MythicLocked));

        state.set_rank(Tier::Diamond, 1, 0, Format::Constructed, true).unwrap();
        assert_eq!(state.position(), &ladder(Tier::Diamond, 1, 0));
        assert_eq!(state.floor(), Tier::Diamond);
    }

    #[test]
    fn test_mythic_standing_edits() {
        let mut state = LadderState::default();
        assert!(matches!(
            state.set_mythic_standing(MythicStanding::Leaderboard(5)),
            Err(TrackerError::NotMythic)
        ));

        let mut state = LadderState::new(RankPosition::Mythic(MythicStanding::Unplaced));
        assert!(state.set_mythic_standing(MythicStanding::Percentile(101.0)).is_err());
        assert!(state.set_mythic_standing(MythicStanding::Leaderboard(0)).is_err());
        assert_eq!(state.position(), &RankPosition::Mythic(MythicStanding::Unplaced));

        state.set_mythic_standing(MythicStanding::Leaderboard(1200)).unwrap();
        assert_eq!(state.position(), &RankPosition::Mythic(MythicStanding::Leaderboard(1200)));
    }
}
