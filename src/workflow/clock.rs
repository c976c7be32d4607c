use chrono::{DateTime, Duration, Utc};

/// Source of "now" for the transition engine.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

/// Hands out strictly increasing timestamps, at least one millisecond apart,
/// even when the underlying clock stands still or goes backwards.
#[derive(Debug, Clone)]
pub(crate) struct Stamper {
    last: Option<DateTime<Utc>>,
}

impl Stamper {
    /// Starts after `floor`, usually the newest timestamp already in the ledger.
    pub(crate) fn after(floor: Option<DateTime<Utc>>) -> Self {
        Self { last: floor }
    }

    pub(crate) fn next(&mut self, clock: &impl Clock) -> DateTime<Utc> {
        let now = clock.now();
        let stamp = match self.last {
            Some(last) if now < last + Duration::milliseconds(1) => last + Duration::milliseconds(1),
            _ => now,
        };
        self.last = Some(stamp);
        stamp
    }
}
