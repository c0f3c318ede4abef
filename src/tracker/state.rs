use crate::ladder::LadderState;
use crate::models::{Format, History, SeasonStats, Session, SessionSummary};

/// Everything tracked for one format.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FormatTrack {
    pub ladder: LadderState,
    pub session: Option<Session>,
    pub season: SeasonStats,
    pub history: History,
    /// Most recent finished sessions, oldest first.
    pub recent_sessions: Vec<SessionSummary>,
}

/// Whole tracker state, owned by the caller and passed by reference.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TrackerState {
    pub current_format: Format,
    pub constructed: FormatTrack,
    pub limited: FormatTrack,
}

impl TrackerState {
    pub fn new(current_format: Format) -> Self {
        Self {
            current_format,
            ..Self::default()
        }
    }

    pub fn track(&self, format: Format) -> &FormatTrack {
        match format {
            Format::Constructed => &self.constructed,
            Format::Limited => &self.limited,
        }
    }

    pub fn track_mut(&mut self, format: Format) -> &mut FormatTrack {
        match format {
            Format::Constructed => &mut self.constructed,
            Format::Limited => &mut self.limited,
        }
    }

    pub fn current(&self) -> &FormatTrack {
        self.track(self.current_format)
    }

    pub fn current_mut(&mut self) -> &mut FormatTrack {
        self.track_mut(self.current_format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LadderRank, RankPosition, Tier};

    #[test]
    fn test_formats_are_independent() {
        let mut state = TrackerState::new(Format::Limited);
        state.current_mut().ladder = LadderState::new(RankPosition::Ladder(LadderRank::entry(Tier::Gold)));
        assert_eq!(state.limited.ladder.floor(), Tier::Gold);
        assert_eq!(state.constructed.ladder.floor(), Tier::Bronze);
        assert_eq!(state.track(Format::Constructed), &FormatTrack::default());
    }
}
