use crate::ladder::position_progress;
use crate::models::{Format, Goal, RankPosition};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoalProgress {
    Remaining(u32),
    Reached,
}

impl GoalProgress {
    pub fn bars_remaining(&self) -> u32 {
        match self {
            GoalProgress::Remaining(bars) => *bars,
            GoalProgress::Reached => 0,
        }
    }

    pub fn is_reached(&self) -> bool {
        matches!(self, GoalProgress::Reached)
    }
}

/// Bars between `position` and `goal`, never negative.
pub fn goal_distance(goal: &Goal, position: &RankPosition, format: Format) -> GoalProgress {
    let target = position_progress(&goal.target(), format);
    let current = position_progress(position, format);
    if current >= target {
        GoalProgress::Reached
    } else {
        GoalProgress::Remaining(target - current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ladder::apply_result;
    use crate::models::{LadderRank, MythicStanding, Tier};

    fn ladder(tier: Tier, division: u8, pips: u8) -> RankPosition {
        RankPosition::Ladder(LadderRank { tier, division, pips })
    }

    #[test]
    fn test_distance_to_division() {
        let goal = Goal::Division { tier: Tier::Gold, division: 3 };
        let progress = goal_distance(&goal, &ladder(Tier::Gold, 4, 2), Format::Constructed);
        assert_eq!(progress, GoalProgress::Remaining(4));
    }

    #[test]
    fn test_goal_met_or_exceeded_is_reached() {
        let goal = Goal::Division { tier: Tier::Gold, division: 3 };
        assert!(goal_distance(&goal, &ladder(Tier::Gold, 3, 0), Format::Constructed).is_reached());
        assert!(goal_distance(&goal, &ladder(Tier::Diamond, 4, 0), Format::Constructed).is_reached());
    }

    #[test]
    fn test_mythic_goal() {
        let progress = goal_distance(&Goal::Mythic, &ladder(Tier::Diamond, 1, 2), Format::Limited);
        assert_eq!(progress.bars_remaining(), 2);
        let mythic = RankPosition::Mythic(MythicStanding::Unplaced);
        assert!(goal_distance(&Goal::Mythic, &mythic, Format::Limited).is_reached());
    }

    #[test]
    fn test_distance_monotone_over_results() {
        let goal = Goal::Division { tier: Tier::Platinum, division: 1 };
        let mut position = ladder(Tier::Gold, 2, 0);
        let sequence = [true, false, true, true, false, false, true, true, true, true, true];
        let mut last = goal_distance(&goal, &position, Format::Constructed).bars_remaining();
        for won in sequence {
            position = apply_result(position, Format::Constructed, won).0;
            let now = goal_distance(&goal, &position, Format::Constructed).bars_remaining();
            if won {
                assert!(now <= last);
            } else {
                assert!(now >= last);
            }
            last = now;
        }
    }
}
