use chrono::NaiveDate;

/// Results of one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryBucket {
    pub date: NaiveDate,
    pub wins: u32,
    pub losses: u32,
    pub bars_gained: i32,
}

/// Results gathered for a day but not yet folded into its bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DaySegment {
    pub date: NaiveDate,
    pub wins: u32,
    pub losses: u32,
    pub bars_gained: i32,
}

impl DaySegment {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            wins: 0,
            losses: 0,
            bars_gained: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.wins == 0 && self.losses == 0 && self.bars_gained == 0
    }
}

/// Wins, losses and bars summed over a span of days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PeriodSummary {
    pub wins: u32,
    pub losses: u32,
    pub bars_gained: i32,
}

impl PeriodSummary {
    pub fn games(&self) -> u32 {
        self.wins + self.losses
    }

    pub fn win_rate(&self) -> f64 {
        win_rate(self.wins, self.losses)
    }

    pub fn add(&mut self, wins: u32, losses: u32, bars_gained: i32) {
        self.wins += wins;
        self.losses += losses;
        self.bars_gained += bars_gained;
    }
}

impl From<&HistoryBucket> for PeriodSummary {
    fn from(bucket: &HistoryBucket) -> Self {
        Self {
            wins: bucket.wins,
            losses: bucket.losses,
            bars_gained: bucket.bars_gained,
        }
    }
}

/// Percentage of games won, 0 when no games were played.
pub fn win_rate(wins: u32, losses: u32) -> f64 {
    let total = wins + losses;
    if total == 0 {
        return 0.0;
    }
    wins as f64 / total as f64 * 100.0
}

/// Per-day buckets, kept sorted by date with at most one bucket per date.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct History {
    buckets: Vec<HistoryBucket>,
}

impl History {
    pub fn from_buckets(buckets: Vec<HistoryBucket>) -> Self {
        let mut history = Self::default();
        for bucket in buckets {
            history.fold(bucket.date, bucket.wins, bucket.losses, bucket.bars_gained);
        }
        history
    }

    pub fn buckets(&self) -> &[HistoryBucket] {
        &self.buckets
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Adds results to the bucket for `date`, creating it on first use.
    pub fn fold(&mut self, date: NaiveDate, wins: u32, losses: u32, bars_gained: i32) {
        match self.buckets.binary_search_by_key(&date, |b| b.date) {
            Ok(index) => {
                let bucket = &mut self.buckets[index];
                bucket.wins += wins;
                bucket.losses += losses;
                bucket.bars_gained += bars_gained;
            }
            Err(index) => self.buckets.insert(
                index,
                HistoryBucket {
                    date,
                    wins,
                    losses,
                    bars_gained,
                },
            ),
        }
    }

    pub fn fold_segment(&mut self, segment: &DaySegment) {
        if segment.is_empty() {
            return;
        }
        self.fold(segment.date, segment.wins, segment.losses, segment.bars_gained);
    }

    pub fn get(&self, date: NaiveDate) -> Option<&HistoryBucket> {
        self.buckets
            .binary_search_by_key(&date, |b| b.date)
            .ok()
            .map(|index| &self.buckets[index])
    }

    /// Sum over `from..=to`.
    pub fn period(&self, from: NaiveDate, to: NaiveDate) -> PeriodSummary {
        let mut summary = PeriodSummary::default();
        for bucket in self.buckets.iter().filter(|b| b.date >= from && b.date <= to) {
            summary.add(bucket.wins, bucket.losses, bucket.bars_gained);
        }
        summary
    }

    /// Day with the most bars gained; ties go to more wins, then the later day.
    pub fn best_day(&self) -> Option<&HistoryBucket> {
        self.buckets
            .iter()
            .filter(|b| b.wins + b.losses > 0)
            .max_by_key(|b| (b.bars_gained, b.wins, b.date))
    }

    /// Drops buckets older than `cutoff`; returns how many were removed.
    pub fn prune_before(&mut self, cutoff: NaiveDate) -> usize {
        let before = self.buckets.len();
        self.buckets.retain(|b| b.date >= cutoff);
        before - self.buckets.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    #[test]
    fn test_fold_keeps_dates_sorted_and_unique() {
        let mut history = History::default();
        history.fold(day(12), 1, 0, 2);
        history.fold(day(10), 2, 1, 3);
        history.fold(day(12), 0, 1, -1);

        let dates: Vec<_> = history.buckets().iter().map(|b| b.date).collect();
        assert_eq!(dates, vec![day(10), day(12)]);
        let twelfth = history.get(day(12)).unwrap();
        assert_eq!((twelfth.wins, twelfth.losses, twelfth.bars_gained), (1, 1, 1));
    }

    #[test]
    fn test_from_buckets_merges_duplicates() {
        let bucket = HistoryBucket { date: day(5), wins: 1, losses: 1, bars_gained: 1 };
        let history = History::from_buckets(vec![bucket, bucket]);
        assert_eq!(history.buckets().len(), 1);
        assert_eq!(history.get(day(5)).unwrap().wins, 2);
    }

    #[test]
    fn test_empty_segment_creates_no_bucket() {
        let mut history = History::default();
        history.fold_segment(&DaySegment::new(day(1)));
        assert!(history.is_empty());
    }

    #[test]
    fn test_period_sums_inclusive_range() {
        let mut history = History::default();
        for d in 1..=10 {
            history.fold(day(d), 1, 1, 1);
        }
        let summary = history.period(day(4), day(10));
        assert_eq!(summary, PeriodSummary { wins: 7, losses: 7, bars_gained: 7 });
        assert_eq!(summary.win_rate(), 50.0);
    }

    #[test]
    fn test_best_day() {
        let mut history = History::default();
        assert!(history.best_day().is_none());
        history.fold(day(1), 5, 1, 6);
        history.fold(day(2), 7, 2, 6);
        history.fold(day(3), 1, 4, -3);
        assert_eq!(history.best_day().unwrap().date, day(2));
    }

    #[test]
    fn test_prune_before() {
        let mut history = History::default();
        history.fold(day(1), 1, 0, 2);
        history.fold(day(20), 1, 0, 2);
        assert_eq!(history.prune_before(day(10)), 1);
        assert_eq!(history.buckets().len(), 1);
    }

    #[test]
    fn test_win_rate_empty() {
        assert_eq!(win_rate(0, 0), 0.0);
        assert_eq!(win_rate(3, 1), 75.0);
    }
}
