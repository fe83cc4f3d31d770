//! Conversion between UTC instants and wall-clock pairs in the user's timezone.
//!
//! SYSTEM CONTEXT
//! ==============
//! The feeder API stores and returns schedule times as UTC ISO strings
//! (`2025-06-15T18:30:00.000Z`). Schedule forms work in `YYYY-MM-DD` /
//! `HH:MM` fields expressed in the user's chosen IANA zone. This module is
//! the only place that crosses between the two.
//!
//! DESIGN
//! ======
//! Offsets come from `chrono-tz` for the specific calendar date being
//! converted, never from "now", so a January time and a July time in the same
//! zone pick up their own DST rules. Wall-clock times that fall in a
//! spring-forward gap move forward by the gap length; times repeated by a
//! fall-back overlap resolve to the first occurrence.
//!
//! ERROR HANDLING
//! ==============
//! Page-facing entry points return sentinels (`"N/A"`, `"Invalid Date"`,
//! empty wall-clock pair, empty string) instead of errors so a render path
//! never has to branch on failure. The `try_*` variants expose [`TimeError`]
//! for callers that want the reason.

#[cfg(test)]
#[path = "timezone_test.rs"]
mod timezone_test;

use std::str::FromStr;

use chrono::{
    DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, Offset, SecondsFormat, TimeZone, Timelike, Utc,
};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::clock::{Clock, SystemClock};
use super::storage::{KeyValueStore, LocalStorage};

/// Storage key holding the user's IANA zone id.
pub const TIMEZONE_STORAGE_KEY: &str = "userTimezone";

/// Zone used when nothing is stored and the runtime cannot resolve one.
pub const FALLBACK_TIMEZONE: &str = "UTC";

/// Rendered for a missing instant.
pub const NOT_AVAILABLE: &str = "N/A";

/// Rendered for an instant that does not parse.
pub const INVALID_DATE: &str = "Invalid Date";

const NAIVE_INSTANT_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S%.f"];

/// Why a date/time value could not be converted.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TimeError {
    #[error("invalid instant: {0:?}")]
    InvalidInstant(String),
    #[error("invalid date: {0:?}")]
    InvalidDate(String),
    #[error("invalid time: {0:?}")]
    InvalidTime(String),
    #[error("unknown timezone: {0:?}")]
    UnknownTimezone(String),
    #[error("unknown display mode: {0:?}")]
    InvalidDisplayMode(String),
}

/// Which fields [`TimezoneService::format_in_user_timezone`] renders.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    /// `Jan 15, 2025, 07:00:00 AM`
    #[default]
    DateTime,
    /// `Jan 15, 2025`
    Date,
    /// `07:00:00 AM`
    Time,
}

impl DisplayMode {
    fn pattern(self) -> &'static str {
        match self {
            Self::DateTime => "%b %-d, %Y, %I:%M:%S %p",
            Self::Date => "%b %-d, %Y",
            Self::Time => "%I:%M:%S %p",
        }
    }
}

impl FromStr for DisplayMode {
    type Err = TimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "datetime" => Ok(Self::DateTime),
            "date" => Ok(Self::Date),
            "time" => Ok(Self::Time),
            other => Err(TimeError::InvalidDisplayMode(other.to_owned())),
        }
    }
}

/// Calendar date and minute-precision time of day in the user's zone.
///
/// Serializes to `{"date": "YYYY-MM-DD", "time": "HH:MM"}`, the shape date
/// and time form inputs consume.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WallClock {
    pub date: String,
    pub time: String,
}

impl WallClock {
    pub fn new(date: impl Into<String>, time: impl Into<String>) -> Self {
        Self { date: date.into(), time: time.into() }
    }

    /// The pair returned for missing or unparseable instants.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.date.is_empty() && self.time.is_empty()
    }
}

/// Knobs for [`TimezoneService`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimezoneConfig {
    pub storage_key: String,
    pub fallback: String,
}

impl Default for TimezoneConfig {
    fn default() -> Self {
        Self {
            storage_key: TIMEZONE_STORAGE_KEY.to_owned(),
            fallback: FALLBACK_TIMEZONE.to_owned(),
        }
    }
}

/// Parse an API timestamp into a UTC instant.
///
/// Accepts RFC 3339 with `Z` or an explicit offset, and bare
/// `YYYY-MM-DDTHH:MM[:SS[.fff]]` / `YYYY-MM-DD`, which are read as UTC
/// because some stored records omit the designator.
///
/// # Errors
///
/// Returns [`TimeError::InvalidInstant`] when no accepted shape matches.
pub fn parse_instant(raw: &str) -> Result<DateTime<Utc>, TimeError> {
    let s = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    let naive = s.strip_suffix(['Z', 'z']).unwrap_or(s);
    for fmt in NAIVE_INSTANT_FORMATS {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(naive, fmt) {
            return Ok(ndt.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(naive, "%Y-%m-%d") {
        if let Some(ndt) = date.and_hms_opt(0, 0, 0) {
            return Ok(ndt.and_utc());
        }
    }

    Err(TimeError::InvalidInstant(raw.to_owned()))
}

/// Render an instant as `YYYY-MM-DDTHH:MM:SS.mmmZ`.
pub fn format_utc_iso(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse an IANA zone id.
///
/// # Errors
///
/// Returns [`TimeError::UnknownTimezone`] if the id is not in the tz database.
pub fn parse_timezone(id: &str) -> Result<Tz, TimeError> {
    id.trim()
        .parse::<Tz>()
        .map_err(|_| TimeError::UnknownTimezone(id.to_owned()))
}

/// Resolve a wall-clock reading in `tz` to the instant it denotes.
pub fn local_to_utc(tz: Tz, local: NaiveDateTime) -> DateTime<Utc> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) => dt.with_timezone(&Utc),
        LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
        LocalResult::None => {
            // Spring-forward gap: keep the offset in force before the jump.
            let before = tz.offset_from_utc_datetime(&(local - Duration::days(1))).fix();
            (local - Duration::seconds(i64::from(before.local_minus_utc()))).and_utc()
        }
    }
}

fn parse_form_date(date: &str) -> Result<NaiveDate, TimeError> {
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").map_err(|_| TimeError::InvalidDate(date.to_owned()))
}

fn parse_form_time(time: &str) -> Result<NaiveTime, TimeError> {
    let t = time.trim();
    let parsed = NaiveTime::parse_from_str(t, "%H:%M").or_else(|_| NaiveTime::parse_from_str(t, "%H:%M:%S"));
    let parsed = parsed.map_err(|_| TimeError::InvalidTime(time.to_owned()))?;
    // Form values carry minutes only; anything finer is dropped.
    parsed
        .with_second(0)
        .ok_or_else(|| TimeError::InvalidTime(time.to_owned()))
}

/// Timezone preference plus the conversions that depend on it.
///
/// Store and clock are injected so tests can pin the stored preference,
/// the runtime-detected zone and "now".
#[derive(Clone, Debug)]
pub struct TimezoneService<S, C> {
    store: S,
    clock: C,
    config: TimezoneConfig,
}

impl TimezoneService<LocalStorage, SystemClock> {
    /// Service backed by `localStorage` and the browser's zone resolution.
    pub fn browser() -> Self {
        Self::new(LocalStorage, SystemClock)
    }
}

impl<S: KeyValueStore, C: Clock> TimezoneService<S, C> {
    pub fn new(store: S, clock: C) -> Self {
        Self::with_config(store, clock, TimezoneConfig::default())
    }

    pub fn with_config(store: S, clock: C, config: TimezoneConfig) -> Self {
        Self { store, clock, config }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// The stored preference, else the runtime's zone, else `"UTC"`.
    pub fn user_timezone(&self) -> String {
        if let Some(stored) = self.store.get_item(&self.config.storage_key) {
            if !stored.trim().is_empty() {
                return stored;
            }
        }
        self.clock
            .detected_timezone()
            .unwrap_or_else(|| self.config.fallback.clone())
    }

    /// Persist `tz` as the user's preference. The id is not validated here;
    /// an unknown id makes later conversions fall back to UTC.
    pub fn set_user_timezone(&self, tz: &str) {
        self.store.set_item(&self.config.storage_key, tz);
    }

    /// Drop the stored preference so the runtime's zone applies again.
    pub fn clear_user_timezone(&self) {
        self.store.remove_item(&self.config.storage_key);
    }

    /// The preference as a tz database entry.
    ///
    /// # Errors
    ///
    /// Returns [`TimeError::UnknownTimezone`] if the stored id is unknown.
    pub fn user_zone(&self) -> Result<Tz, TimeError> {
        parse_timezone(&self.user_timezone())
    }

    fn zone_or_utc(&self) -> Tz {
        self.user_zone().unwrap_or_else(|e| {
            log::warn!("{e}; rendering in UTC");
            Tz::UTC
        })
    }

    /// Render `instant` in the user's zone.
    ///
    /// # Errors
    ///
    /// Fails if the instant does not parse or the preference names an unknown zone.
    pub fn try_format(&self, instant: &str, mode: DisplayMode) -> Result<String, TimeError> {
        let utc = parse_instant(instant)?;
        let tz = self.user_zone()?;
        Ok(utc.with_timezone(&tz).format(mode.pattern()).to_string())
    }

    /// Render `instant` for display: `"N/A"` when absent, `"Invalid Date"` when
    /// it does not parse.
    pub fn format_in_user_timezone(&self, instant: Option<&str>, mode: DisplayMode) -> String {
        let Some(raw) = instant.filter(|s| !s.trim().is_empty()) else {
            return NOT_AVAILABLE.to_owned();
        };
        let Ok(utc) = parse_instant(raw) else {
            return INVALID_DATE.to_owned();
        };
        utc.with_timezone(&self.zone_or_utc()).format(mode.pattern()).to_string()
    }

    /// Interpret a form date/time pair in the user's zone.
    ///
    /// # Errors
    ///
    /// Fails on a malformed date or time, or an unknown preferred zone.
    pub fn try_convert_to_utc(&self, date: &str, time: &str) -> Result<DateTime<Utc>, TimeError> {
        let local = parse_form_date(date)?.and_time(parse_form_time(time)?);
        let tz = self.user_zone()?;
        Ok(local_to_utc(tz, local))
    }

    /// Form date/time pair to a UTC ISO string with `:00.000` seconds.
    /// Returns an empty string if either field is malformed.
    pub fn convert_to_utc(&self, date: &str, time: &str) -> String {
        let local = match parse_form_date(date).and_then(|d| parse_form_time(time).map(|t| d.and_time(t))) {
            Ok(local) => local,
            Err(e) => {
                log::debug!("convert_to_utc rejected input: {e}");
                return String::new();
            }
        };
        format_utc_iso(local_to_utc(self.zone_or_utc(), local))
    }

    /// Split an instant into form fields in the user's zone.
    ///
    /// # Errors
    ///
    /// Fails if the instant does not parse or the preferred zone is unknown.
    pub fn try_local_date_time_from_utc(&self, instant: &str) -> Result<WallClock, TimeError> {
        let utc = parse_instant(instant)?;
        let tz = self.user_zone()?;
        Ok(wall_clock_in(utc, tz))
    }

    /// Split an instant into form fields; empty pair for missing or bad input.
    pub fn local_date_time_from_utc(&self, instant: Option<&str>) -> WallClock {
        let Some(raw) = instant.filter(|s| !s.trim().is_empty()) else {
            return WallClock::empty();
        };
        match parse_instant(raw) {
            Ok(utc) => wall_clock_in(utc, self.zone_or_utc()),
            Err(_) => WallClock::empty(),
        }
    }

    /// The current moment as form fields, for pre-filling a new schedule.
    pub fn now_wall_clock(&self) -> WallClock {
        wall_clock_in(self.clock.now(), self.zone_or_utc())
    }

    /// `"America/New_York (EST)"`, or the bare id if it cannot be resolved.
    pub fn timezone_display(&self) -> String {
        let id = self.user_timezone();
        let Ok(tz) = parse_timezone(&id) else {
            return id;
        };
        let short = self.clock.now().with_timezone(&tz).format("%Z").to_string();
        if short.is_empty() { id } else { format!("{id} ({short})") }
    }
}

fn wall_clock_in(utc: DateTime<Utc>, tz: Tz) -> WallClock {
    let local = utc.with_timezone(&tz);
    WallClock {
        date: local.format("%Y-%m-%d").to_string(),
        time: local.format("%H:%M").to_string(),
    }
}
