use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};

/// Produces unique ids for new match records
pub trait MatchIdGenerator: Send + Sync {
    fn next_id(&self, from_newsletter_id: &str, to_newsletter_id: &str) -> String;
}

/// Random UUID v4 ids
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl MatchIdGenerator for UuidGenerator {
    fn next_id(&self, _from: &str, _to: &str) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

/// Ids of the form `match-{from}-{to}-{n}` with a per-generator counter
#[derive(Debug, Default)]
pub struct SequentialIdGenerator {
    counter: AtomicU64,
}

impl MatchIdGenerator for SequentialIdGenerator {
    fn next_id(&self, from: &str, to: &str) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        format!("match-{}-{}-{}", from, to, n)
    }
}

/// Source of the current time for timestamps and seasonal scoring
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock in UTC; seasonal scoring therefore uses the UTC month, not the host's local one
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always reports the same instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
