// LogDigest - core/window.rs
//
// Time window calculation: "last N minutes" into a fixed absolute cutoff.
// The host clock sits behind the `Clock` trait so runs can be pinned to a
// known instant.

use crate::core::model::TimeWindow;
use crate::util::error::ClockError;
use chrono::{DateTime, Duration, Local, NaiveDateTime, Utc};
use std::time::{SystemTime, UNIX_EPOCH};

/// Source of "now", in local wall-clock time.
///
/// Local naive time is the representation log lines carry in their
/// `[YYYY-MM-DD HH:MM:SS]` prefix, so cutoffs and line stamps compare
/// directly.
pub trait Clock {
    fn now(&self) -> Result<NaiveDateTime, ClockError>;
}

/// The host's wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Result<NaiveDateTime, ClockError> {
        let since_epoch = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|source| ClockError::BeforeEpoch { source })?;

        let seconds = since_epoch.as_secs();
        let utc = i64::try_from(seconds)
            .ok()
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, since_epoch.subsec_nanos()))
            .ok_or(ClockError::OutOfRange { seconds })?;

        Ok(utc.with_timezone(&Local).naive_local())
    }
}

/// A clock frozen at one instant. Used by tests and reproducible runs.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> Result<NaiveDateTime, ClockError> {
        Ok(self.0)
    }
}

/// Compute the time window for an optional "last N minutes" request.
///
/// `None` minutes means no temporal filtering. Otherwise the clock is read
/// exactly once and the cutoff is `now - minutes`.
pub fn compute_window(
    minutes: Option<u32>,
    clock: &dyn Clock,
) -> Result<Option<TimeWindow>, ClockError> {
    let Some(minutes) = minutes else {
        return Ok(None);
    };

    let now = clock.now()?;
    let cutoff = now
        .checked_sub_signed(Duration::minutes(i64::from(minutes)))
        .unwrap_or(NaiveDateTime::MIN);

    tracing::debug!(minutes, %now, %cutoff, "Time window computed");

    Ok(Some(TimeWindow { minutes, cutoff }))
}
