pub mod clock;
pub mod service;
pub mod state;

pub use clock::{Clock, SystemClock};
#[cfg(test)]
pub use clock::MockClock;
pub use service::Tracker;
pub use state::{FormatTrack, TrackerState};
