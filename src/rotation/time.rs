//! Schedule-triggered rotation
//!
//! Rollover instants advance by a fixed interval. For the midnight schedule
//! the interval is a calendar day, so when the UTC offset differs between
//! the previous and the next rollover (a DST change in between) the next
//! instant is shifted by the offset delta to keep it on local midnight.

use chrono::{DateTime, Local, Offset, TimeZone, Timelike};

use super::{RotationPolicy, RotationState};
use crate::config::Schedule;

const HOUR_SECS: i64 = 3_600;
const DAY_SECS: i64 = 86_400;

/// Rotate when the wall clock passes the next scheduled boundary.
#[derive(Debug, Clone)]
pub struct TimePolicy {
    schedule: Schedule,
    interval_secs: i64,
    next_rollover: DateTime<Local>,
}

impl TimePolicy {
    /// `anchor` is the time the active file was started (its mtime when
    /// resuming an existing file), so restarts keep the same schedule.
    pub fn new(schedule: Schedule, interval_secs: u64, anchor: DateTime<Local>) -> Self {
        let interval_secs = match schedule {
            Schedule::Midnight => DAY_SECS,
            Schedule::Hourly => HOUR_SECS,
            Schedule::Interval => (interval_secs.max(1)).min(i64::MAX as u64) as i64,
        };
        let next_rollover = first_rollover(schedule, interval_secs, &anchor);
        Self {
            schedule,
            interval_secs,
            next_rollover,
        }
    }

    pub fn next_rollover(&self) -> DateTime<Local> {
        self.next_rollover
    }
}

impl RotationPolicy for TimePolicy {
    fn should_rotate(&self, _state: &RotationState, _incoming: usize, now: DateTime<Local>) -> bool {
        now >= self.next_rollover
    }

    fn rotated(&mut self, now: DateTime<Local>) {
        let mut next = advance(self.schedule, self.interval_secs, &self.next_rollover);
        while next <= now {
            next = advance(self.schedule, self.interval_secs, &next);
        }
        self.next_rollover = next;
    }
}

/// First boundary strictly after `anchor`.
pub fn first_rollover<Tz: TimeZone>(
    schedule: Schedule,
    interval_secs: i64,
    anchor: &DateTime<Tz>,
) -> DateTime<Tz> {
    let fallback = anchor.clone() + chrono::Duration::seconds(interval_secs);
    match schedule {
        Schedule::Midnight => anchor
            .date_naive()
            .succ_opt()
            .and_then(|day| day.and_hms_opt(0, 0, 0))
            .and_then(|naive| anchor.timezone().from_local_datetime(&naive).earliest())
            .unwrap_or(fallback),
        Schedule::Hourly => anchor
            .with_minute(0)
            .and_then(|t| t.with_second(0))
            .and_then(|t| t.with_nanosecond(0))
            .map(|top| top + chrono::Duration::seconds(HOUR_SECS))
            .unwrap_or(fallback),
        Schedule::Interval => fallback,
    }
}

/// Boundary following `current`, with DST correction for daily schedules.
pub fn advance<Tz: TimeZone>(
    schedule: Schedule,
    interval_secs: i64,
    current: &DateTime<Tz>,
) -> DateTime<Tz> {
    let next = current.clone() + chrono::Duration::seconds(interval_secs);
    if schedule != Schedule::Midnight {
        return next;
    }
    let before = current.offset().fix().local_minus_utc();
    let after = next.offset().fix().local_minus_utc();
    if before == after {
        next
    } else {
        next + chrono::Duration::seconds(i64::from(before - after))
    }
}
