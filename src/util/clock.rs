//! Current instant and runtime timezone detection.
//!
//! Timezone logic never reads the system clock directly; it asks a [`Clock`]
//! so tests can pin both "now" and the detected zone.

#[cfg(test)]
#[path = "clock_test.rs"]
mod clock_test;

use chrono::{DateTime, Utc};

/// Source of the current instant and the runtime's resolved IANA zone.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;

    /// The zone the runtime resolves for this user, e.g. `"America/New_York"`.
    /// `None` when the runtime cannot tell.
    fn detected_timezone(&self) -> Option<String>;
}

/// Wall clock plus the host's zone resolution (`Intl` in the browser).
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn detected_timezone(&self) -> Option<String> {
        match iana_time_zone::get_timezone() {
            Ok(tz) if !tz.is_empty() => Some(tz),
            Ok(_) => None,
            Err(e) => {
                log::debug!("timezone detection failed: {e}");
                None
            }
        }
    }
}

/// Clock pinned to one instant and one detected zone.
#[derive(Clone, Debug)]
pub struct FixedClock {
    pub now: DateTime<Utc>,
    pub timezone: Option<String>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>, timezone: Option<&str>) -> Self {
        Self { now, timezone: timezone.map(str::to_owned) }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }

    fn detected_timezone(&self) -> Option<String> {
        self.timezone.clone()
    }
}
