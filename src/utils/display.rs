use chrono::Duration;

use crate::models::{win_rate, GameResult};

/// `h:mm:ss`, negative spans shown as zero.
pub fn format_duration(duration: Duration) -> String {
    let total = duration.num_seconds().max(0);
    format!("{}:{:02}:{:02}", total / 3600, (total % 3600) / 60, total % 60)
}

/// `"5W-3L (62.5%)"`
pub fn format_record(wins: u32, losses: u32) -> String {
    format!("{}W-{}L ({:.1}%)", wins, losses, win_rate(wins, losses))
}

/// `"W3"`, `"L2"`, or `"-"` before any game.
pub fn format_streak(streak: i32) -> String {
    match streak {
        0 => "-".to_string(),
        s if s > 0 => format!("W{}", s),
        s => format!("L{}", -s),
    }
}

/// `"3d 4h 5m"`, `"4h 5m"` under a day, `"ENDED"` at zero, `"--"` without an end.
pub fn format_countdown(time_left: Option<Duration>) -> String {
    let total = match time_left {
        Some(left) if left > Duration::zero() => left.num_minutes(),
        Some(_) => return "ENDED".to_string(),
        None => return "--".to_string(),
    };
    let (days, hours, minutes) = (total / 1440, (total % 1440) / 60, total % 60);
    if days > 0 {
        format!("{}d {}h {}m", days, hours, minutes)
    } else {
        format!("{}h {}m", hours, minutes)
    }
}

pub fn format_bars(bars: i32) -> String {
    format!("{:+}", bars)
}

pub fn results_strip(results: &[GameResult]) -> String {
    results.iter().map(GameResult::as_char).collect()
}

/// Filled and empty pips, e.g. `"■■■□□□"` for 3 of 6.
pub fn pip_meter(pips: u8, capacity: u8) -> String {
    let filled = pips.min(capacity) as usize;
    let empty = capacity as usize - filled;
    format!("{}{}", "■".repeat(filled), "□".repeat(empty))
}
