use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset, Utc};
use std::sync::{Arc, RwLock};

/// Source of "now" for the booking core. Injected so that past-time and
/// "today" checks are deterministic under test.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to an instant that tests can move.
#[derive(Debug, Clone)]
pub struct FixedClock {
    instant: Arc<RwLock<DateTime<Utc>>>,
}

impl FixedClock {
    pub fn new(instant: DateTime<Utc>) -> Self {
        Self { instant: Arc::new(RwLock::new(instant)) }
    }

    pub fn set(&self, instant: DateTime<Utc>) {
        if let Ok(mut guard) = self.instant.write() {
            *guard = instant;
        }
    }

    pub fn advance(&self, by: chrono::Duration) {
        if let Ok(mut guard) = self.instant.write() {
            *guard += by;
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        match self.instant.read() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

/// Converts a clock reading into the clinic's wall-clock time, which is
/// what appointment dates and times are expressed in.
#[derive(Clone)]
pub struct ClinicTime {
    clock: Arc<dyn Clock>,
    offset: FixedOffset,
}

impl ClinicTime {
    pub fn new(clock: Arc<dyn Clock>, offset_minutes: i32) -> Self {
        let offset = FixedOffset::east_opt(offset_minutes * 60)
            .unwrap_or_else(|| {
                tracing::warn!("Clinic UTC offset {} minutes out of range, using UTC", offset_minutes);
                Utc.fix()
            });
        Self { clock, offset }
    }

    pub fn utc(clock: Arc<dyn Clock>) -> Self {
        Self::new(clock, 0)
    }

    pub fn now(&self) -> NaiveDateTime {
        self.clock.now().with_timezone(&self.offset).naive_local()
    }

    pub fn today(&self) -> NaiveDate {
        self.now().date()
    }

    pub fn now_utc(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// UTC instant of a clinic wall-clock time.
    pub fn to_utc(&self, local: NaiveDateTime) -> DateTime<Utc> {
        (local - chrono::Duration::seconds(i64::from(self.offset.local_minus_utc()))).and_utc()
    }
}

impl std::fmt::Debug for ClinicTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClinicTime").field("offset", &self.offset).finish()
    }
}
