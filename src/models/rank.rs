use serde::{Deserialize, Serialize};
use std::fmt;

use super::{Result, TrackerError};

/// Ladder tiers in promotion order. `Mythic` is terminal and has no divisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Tier {
    Bronze,
    Silver,
    Gold,
    Platinum,
    Diamond,
    Mythic,
}

impl Tier {
    /// Tiers that use the division/pip representation.
    pub const LADDER: [Tier; 5] = [
        Tier::Bronze,
        Tier::Silver,
        Tier::Gold,
        Tier::Platinum,
        Tier::Diamond,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Bronze => "Bronze",
            Tier::Silver => "Silver",
            Tier::Gold => "Gold",
            Tier::Platinum => "Platinum",
            Tier::Diamond => "Diamond",
            Tier::Mythic => "Mythic",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "bronze" => Some(Tier::Bronze),
            "silver" => Some(Tier::Silver),
            "gold" => Some(Tier::Gold),
            "platinum" | "plat" => Some(Tier::Platinum),
            "diamond" => Some(Tier::Diamond),
            "mythic" => Some(Tier::Mythic),
            _ => None,
        }
    }

    pub fn next(&self) -> Option<Tier> {
        match self {
            Tier::Bronze => Some(Tier::Silver),
            Tier::Silver => Some(Tier::Gold),
            Tier::Gold => Some(Tier::Platinum),
            Tier::Platinum => Some(Tier::Diamond),
            Tier::Diamond => Some(Tier::Mythic),
            Tier::Mythic => None,
        }
    }

    pub fn is_mythic(&self) -> bool {
        matches!(self, Tier::Mythic)
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Queue family. Each format owns its own rank, floor, session and season.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Format {
    #[default]
    #[serde(
        rename = "CONSTRUCTED",
        alias = "Constructed",
        alias = "Constructed BO1",
        alias = "Constructed BO3"
    )]
    Constructed,
    #[serde(rename = "LIMITED", alias = "Limited")]
    Limited,
}

impl Format {
    pub const ALL: [Format; 2] = [Format::Constructed, Format::Limited];

    /// Pips per division, identical for every tier below Mythic.
    pub fn pip_capacity(&self) -> u8 {
        match self {
            Format::Constructed => 6,
            Format::Limited => 4,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Constructed => "constructed",
            Format::Limited => "limited",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "constructed" | "c" | "constructed bo1" | "constructed bo3" => {
                Some(Format::Constructed)
            }
            "limited" | "l" => Some(Format::Limited),
            _ => None,
        }
    }

    pub fn other(&self) -> Format {
        match self {
            Format::Constructed => Format::Limited,
            Format::Limited => Format::Constructed,
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Constructed => f.write_str("Constructed"),
            Format::Limited => f.write_str("Limited"),
        }
    }
}

/// A position below Mythic. Division 4 is entered first, division 1 is left last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LadderRank {
    pub tier: Tier,
    pub division: u8,
    pub pips: u8,
}

impl LadderRank {
    pub const ENTRY_DIVISION: u8 = 4;
    pub const TOP_DIVISION: u8 = 1;

    /// Validated constructor for manual input.
    pub fn new(tier: Tier, division: u8, pips: u8, format: Format) -> Result<Self> {
        if tier.is_mythic() {
            return Err(TrackerError::UnknownTier(format!(
                "{} has no divisions",
                tier
            )));
        }
        if !(Self::TOP_DIVISION..=Self::ENTRY_DIVISION).contains(&division) {
            return Err(TrackerError::InvalidDivision(division));
        }
        let capacity = format.pip_capacity();
        if pips >= capacity {
            return Err(TrackerError::InvalidPips { pips, capacity });
        }
        Ok(Self { tier, division, pips })
    }

    /// Division 4 with no pips: where a tier is entered.
    pub fn entry(tier: Tier) -> Self {
        Self {
            tier,
            division: Self::ENTRY_DIVISION,
            pips: 0,
        }
    }

    pub fn label(&self, format: Format) -> String {
        format!(
            "{} {} ({}/{})",
            self.tier,
            self.division,
            self.pips,
            format.pip_capacity()
        )
    }
}

impl fmt::Display for LadderRank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.tier, self.division)
    }
}

/// Standing inside Mythic. Only ever changed by manual edits.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum MythicStanding {
    #[default]
    Unplaced,
    Percentile(f64),
    Leaderboard(u32),
}

impl MythicStanding {
    pub fn percentile(value: f64) -> Result<Self> {
        if !value.is_finite() || !(0.0..=100.0).contains(&value) {
            return Err(TrackerError::InvalidPercentile(value));
        }
        Ok(MythicStanding::Percentile(value))
    }

    pub fn leaderboard(position: u32) -> Result<Self> {
        if position == 0 {
            return Err(TrackerError::InvalidLeaderboardPosition(position));
        }
        Ok(MythicStanding::Leaderboard(position))
    }

    /// Leaderboard positions outrank percentiles, which outrank no standing.
    pub fn is_better_than(&self, other: &MythicStanding) -> bool {
        use MythicStanding::*;
        match (self, other) {
            (Leaderboard(a), Leaderboard(b)) => a < b,
            (Leaderboard(_), _) => true,
            (_, Leaderboard(_)) => false,
            (Percentile(a), Percentile(b)) => a > b,
            (Percentile(_), Unplaced) => true,
            _ => false,
        }
    }
}

impl fmt::Display for MythicStanding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MythicStanding::Unplaced => f.write_str("Mythic"),
            MythicStanding::Percentile(p) => write!(f, "Mythic {:.1}%", p),
            MythicStanding::Leaderboard(n) => write!(f, "Mythic #{}", n),
        }
    }
}

/// Where a player stands: on the pip ladder or in the terminal Mythic phase.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RankPosition {
    Ladder(LadderRank),
    Mythic(MythicStanding),
}

impl Default for RankPosition {
    fn default() -> Self {
        RankPosition::Ladder(LadderRank::entry(Tier::Bronze))
    }
}

impl RankPosition {
    pub fn tier(&self) -> Tier {
        match self {
            RankPosition::Ladder(rank) => rank.tier,
            RankPosition::Mythic(_) => Tier::Mythic,
        }
    }

    pub fn is_mythic(&self) -> bool {
        matches!(self, RankPosition::Mythic(_))
    }

    pub fn ladder(&self) -> Option<&LadderRank> {
        match self {
            RankPosition::Ladder(rank) => Some(rank),
            RankPosition::Mythic(_) => None,
        }
    }

    pub fn label(&self, format: Format) -> String {
        match self {
            RankPosition::Ladder(rank) => rank.label(format),
            RankPosition::Mythic(standing) => standing.to_string(),
        }
    }
}

impl fmt::Display for RankPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RankPosition::Ladder(rank) => write!(f, "{}", rank),
            RankPosition::Mythic(standing) => write!(f, "{}", standing),
        }
    }
}

/// Session target: the start of a division, or Mythic itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Goal {
    Division { tier: Tier, division: u8 },
    Mythic,
}

impl Goal {
    pub fn new(tier: Tier, division: Option<u8>) -> Result<Self> {
        if tier.is_mythic() {
            return Ok(Goal::Mythic);
        }
        let division = division.unwrap_or(LadderRank::ENTRY_DIVISION);
        if !(LadderRank::TOP_DIVISION..=LadderRank::ENTRY_DIVISION).contains(&division) {
            return Err(TrackerError::InvalidDivision(division));
        }
        Ok(Goal::Division { tier, division })
    }

    /// Parses `"Mythic"`, `"Platinum"` (division 4) or `"Platinum 2"`.
    pub fn parse(text: &str) -> Result<Self> {
        let mut parts = text.split_whitespace();
        let tier_text = parts
            .next()
            .ok_or_else(|| TrackerError::InvalidGoal(text.to_string()))?;
        let tier = Tier::from_str(tier_text)
            .ok_or_else(|| TrackerError::UnknownTier(tier_text.to_string()))?;
        let division = match parts.next() {
            Some(d) => Some(
                d.parse::<u8>()
                    .map_err(|_| TrackerError::InvalidGoal(text.to_string()))?,
            ),
            None => None,
        };
        if parts.next().is_some() {
            return Err(TrackerError::InvalidGoal(text.to_string()));
        }
        Goal::new(tier, division)
    }

    pub fn target(&self) -> RankPosition {
        match self {
            Goal::Division { tier, division } => RankPosition::Ladder(LadderRank {
                tier: *tier,
                division: *division,
                pips: 0,
            }),
            Goal::Mythic => RankPosition::Mythic(MythicStanding::Unplaced),
        }
    }
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Goal::Division { tier, division } => write!(f, "{} {}", tier, division),
            Goal::Mythic => f.write_str("Mythic"),
        }
    }
}
