use thiserror::Error;

/// Coarse classification used by callers to decide how to surface a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed manual input. State is untouched.
    Validation,
    /// Persisted data that cannot be brought back into range.
    InvariantViolation,
    /// Reading or writing the state file failed.
    Storage,
}

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("Division must be between 1 and 4, got {0}")]
    InvalidDivision(u8),

    #[error("Pips must be below {capacity}, got {pips}")]
    InvalidPips { pips: u8, capacity: u8 },

    #[error("Mythic percentile must be between 0 and 100, got {0}")]
    InvalidPercentile(f64),

    #[error("Mythic leaderboard position must be at least 1, got {0}")]
    InvalidLeaderboardPosition(u32),

    #[error("Rank is Mythic; a forced edit is required to return to the ladder")]
    MythicLocked,

    #[error("{requested} is below the {floor} tier floor; a forced edit is required")]
    BelowTierFloor { requested: String, floor: String },

    #[error("Mythic standing can only be edited while in Mythic")]
    NotMythic,

    #[error("Unknown tier: {0}")]
    UnknownTier(String),

    #[error("Unknown format: {0}")]
    UnknownFormat(String),

    #[error("Invalid goal: {0}")]
    InvalidGoal(String),

    #[error("Invalid date or time: {0}")]
    InvalidTimestamp(String),

    #[error("No active session")]
    NoActiveSession,

    #[error("Snapshot is unusable: {0}")]
    CorruptSnapshot(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl TrackerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TrackerError::CorruptSnapshot(_) => ErrorKind::InvariantViolation,
            TrackerError::Io(_)
            | TrackerError::SerializationError(_)
            | TrackerError::ConfigError(_) => ErrorKind::Storage,
            _ => ErrorKind::Validation,
        }
    }
}

pub type Result<T> = std::result::Result<T, TrackerError>;
