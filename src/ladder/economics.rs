use crate::models::{Format, LadderRank, RankPosition, Tier};

const DIVISIONS_PER_TIER: u32 = 4;

/// Pips moved by a single game result in a given tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierEconomics {
    pub win_gain: u8,
    pub loss_cost: u8,
}

impl TierEconomics {
    /// `None` for Mythic, where results no longer move pips.
    pub fn for_tier(tier: Tier) -> Option<Self> {
        let (win_gain, loss_cost) = match tier {
            Tier::Bronze => (2, 0),
            Tier::Silver => (2, 0),
            Tier::Gold => (2, 1),
            Tier::Platinum => (1, 1),
            Tier::Diamond => (1, 1),
            Tier::Mythic => return None,
        };
        Some(Self { win_gain, loss_cost })
    }
}

/// Bronze = 0 through Diamond = 4. Mythic sits one past Diamond.
pub fn tier_index(tier: Tier) -> u32 {
    match tier {
        Tier::Bronze => 0,
        Tier::Silver => 1,
        Tier::Gold => 2,
        Tier::Platinum => 3,
        Tier::Diamond => 4,
        Tier::Mythic => 5,
    }
}

/// Total order over ladder positions; only meaningful for comparison and subtraction.
pub fn progress_scalar(rank: &LadderRank, capacity: u8) -> u32 {
    let capacity = capacity as u32;
    tier_index(rank.tier) * DIVISIONS_PER_TIER * capacity
        + (DIVISIONS_PER_TIER - rank.division as u32) * capacity
        + rank.pips as u32
}

/// Scalar value at which Mythic is entered.
pub fn mythic_threshold(capacity: u8) -> u32 {
    tier_index(Tier::Mythic) * DIVISIONS_PER_TIER * capacity as u32
}

/// Scalar for any position; every Mythic standing maps to the threshold.
pub fn position_progress(position: &RankPosition, format: Format) -> u32 {
    let capacity = format.pip_capacity();
    match position {
        RankPosition::Ladder(rank) => progress_scalar(rank, capacity),
        RankPosition::Mythic(_) => mythic_threshold(capacity),
    }
}

/// Division 4 is where a tier is entered; losses never push below it.
pub fn is_tier_floor(_tier: Tier, division: u8) -> bool {
    division == LadderRank::ENTRY_DIVISION
}

pub fn bars_to_mythic(position: &RankPosition, format: Format) -> u32 {
    mythic_threshold(format.pip_capacity()).saturating_sub(position_progress(position, format))
}

/// True when the next win leaves the current tier.
pub fn is_boss_fight(rank: &LadderRank, capacity: u8) -> bool {
    if rank.division != LadderRank::TOP_DIVISION {
        return false;
    }
    match TierEconomics::for_tier(rank.tier) {
        Some(economics) => rank.pips as u32 + economics.win_gain as u32 >= capacity as u32,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rank(tier: Tier, division: u8, pips: u8) -> LadderRank {
        LadderRank { tier, division, pips }
    }

    #[test]
    fn test_economics_table() {
        assert_eq!(
            TierEconomics::for_tier(Tier::Bronze),
            Some(TierEconomics { win_gain: 2, loss_cost: 0 })
        );
        assert_eq!(
            TierEconomics::for_tier(Tier::Gold),
            Some(TierEconomics { win_gain: 2, loss_cost: 1 })
        );
        assert_eq!(
            TierEconomics::for_tier(Tier::Diamond),
            Some(TierEconomics { win_gain: 1, loss_cost: 1 })
        );
        assert_eq!(TierEconomics::for_tier(Tier::Mythic), None);
    }

    #[test]
    fn test_progress_scalar_values() {
        assert_eq!(progress_scalar(&rank(Tier::Bronze, 4, 0), 6), 0);
        assert_eq!(progress_scalar(&rank(Tier::Bronze, 3, 0), 6), 6);
        assert_eq!(progress_scalar(&rank(Tier::Silver, 4, 0), 6), 24);
        assert_eq!(progress_scalar(&rank(Tier::Gold, 1, 5), 6), 48 + 18 + 5);
        assert_eq!(progress_scalar(&rank(Tier::Diamond, 1, 3), 4), 64 + 12 + 3);
        assert_eq!(mythic_threshold(6), 120);
        assert_eq!(mythic_threshold(4), 80);
    }

    #[test]
    fn test_progress_scalar_is_strictly_increasing() {
        let capacity = 6;
        let mut previous = None;
        for tier in Tier::LADDER {
            for division in (1..=4).rev() {
                for pips in 0..capacity {
                    let value = progress_scalar(&rank(tier, division, pips), capacity);
                    if let Some(prev) = previous {
                        assert_eq!(value, prev + 1);
                    }
                    previous = Some(value);
                }
            }
        }
        assert_eq!(previous.map(|p| p + 1), Some(mythic_threshold(capacity)));
    }

    #[test]
    fn test_tier_floor_is_entry_division() {
        assert!(is_tier_floor(Tier::Gold, 4));
        assert!(!is_tier_floor(Tier::Gold, 1));
    }

    #[test]
    fn test_bars_to_mythic() {
        let bronze = RankPosition::Ladder(rank(Tier::Bronze, 4, 0));
        assert_eq!(bars_to_mythic(&bronze, Format::Constructed), 120);
        let diamond = RankPosition::Ladder(rank(Tier::Diamond, 1, 5));
        assert_eq!(bars_to_mythic(&diamond, Format::Constructed), 1);
        let mythic = RankPosition::Mythic(Default::default());
        assert_eq!(bars_to_mythic(&mythic, Format::Limited), 0);
    }

    #[test]
    fn test_boss_fight_detection() {
        assert!(is_boss_fight(&rank(Tier::Gold, 1, 4), 6));
        assert!(!is_boss_fight(&rank(Tier::Gold, 1, 3), 6));
        assert!(!is_boss_fight(&rank(Tier::Gold, 2, 5), 6));
        assert!(is_boss_fight(&rank(Tier::Diamond, 1, 3), 4));
    }
}
