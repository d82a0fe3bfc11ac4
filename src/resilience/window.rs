//! Rolling outcome window.
//!
//! Outcomes land in one-second buckets arranged in a ring. A bucket whose
//! index has fallen out of the window is ignored on read and recycled on
//! write, so old outcomes age out without a background sweeper.

use std::time::Duration;
use tokio::time::Instant;

const BUCKET_WIDTH: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy)]
struct Bucket {
    index: u64,
    successes: u64,
    failures: u64,
}

impl Bucket {
    const EMPTY: Bucket = Bucket {
        index: u64::MAX,
        successes: 0,
        failures: 0,
    };
}

/// Success and failure totals currently inside the window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowTotals {
    pub successes: u64,
    pub failures: u64,
}

impl WindowTotals {
    pub fn total(&self) -> u64 {
        self.successes + self.failures
    }

    /// Failure share in percent; zero when nothing was recorded.
    pub fn error_percent(&self) -> f64 {
        match self.total() {
            0 => 0.0,
            total => self.failures as f64 * 100.0 / total as f64,
        }
    }
}

#[derive(Debug)]
pub struct RollingWindow {
    buckets: Vec<Bucket>,
    origin: Instant,
}

impl RollingWindow {
    pub fn new(length: Duration) -> Self {
        let slots = (length.as_secs()).max(1) as usize;
        Self {
            buckets: vec![Bucket::EMPTY; slots],
            origin: Instant::now(),
        }
    }

    fn index_at(&self, now: Instant) -> u64 {
        (now.saturating_duration_since(self.origin).as_millis() / BUCKET_WIDTH.as_millis()) as u64
    }

    fn is_live(&self, bucket: &Bucket, current: u64) -> bool {
        current
            .checked_sub(bucket.index)
            .is_some_and(|age| age < self.buckets.len() as u64)
    }

    pub fn record(&mut self, now: Instant, success: bool) {
        let index = self.index_at(now);
        let slots = self.buckets.len() as u64;
        let bucket = &mut self.buckets[(index % slots) as usize];
        if bucket.index != index {
            *bucket = Bucket {
                index,
                successes: 0,
                failures: 0,
            };
        }
        if success {
            bucket.successes += 1;
        } else {
            bucket.failures += 1;
        }
    }

    pub fn totals(&self, now: Instant) -> WindowTotals {
        let current = self.index_at(now);
        self.buckets
            .iter()
            .filter(|b| self.is_live(b, current))
            .fold(WindowTotals::default(), |acc, b| WindowTotals {
                successes: acc.successes + b.successes,
                failures: acc.failures + b.failures,
            })
    }

    pub fn clear(&mut self) {
        self.buckets.fill(Bucket::EMPTY);
    }
}
