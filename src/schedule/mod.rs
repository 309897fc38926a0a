//! What Ava is doing right now, from her weekly routine.

mod schedules;

use chrono::{Datelike, Local, NaiveDateTime, NaiveTime, Weekday};
use tracing::warn;

use schedules::DaySchedule;

/// Time source for schedule lookups.
#[derive(Debug, Clone, Copy, Default)]
pub enum Clock {
    #[default]
    Local,
    /// Always report this instant.
    Fixed(NaiveDateTime),
}

#[derive(Debug, Clone, Default)]
pub struct ScheduleContextGenerator {
    clock: Clock,
}

impl ScheduleContextGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generator pinned to a fixed time.
    pub fn fixed(at: NaiveDateTime) -> Self {
        Self {
            clock: Clock::Fixed(at),
        }
    }

    pub fn now(&self) -> NaiveDateTime {
        match self.clock {
            Clock::Local => Local::now().naive_local(),
            Clock::Fixed(at) => at,
        }
    }

    /// Ava's activity at the generator's current time.
    pub fn current_activity(&self) -> Option<&'static str> {
        Self::activity_at(self.now())
    }

    /// Ava's activity at `at`, or `None` if no slot covers it.
    pub fn activity_at(at: NaiveDateTime) -> Option<&'static str> {
        let time = at.time();
        schedule_for(at.weekday())
            .iter()
            .find(|(slot, _)| match parse_slot(slot) {
                Some((start, end)) => slot_contains(start, end, time),
                None => {
                    warn!(slot, "Skipping malformed schedule slot");
                    false
                }
            })
            .map(|(_, activity)| *activity)
    }
}

fn schedule_for(day: Weekday) -> DaySchedule {
    match day {
        Weekday::Mon => schedules::MONDAY,
        Weekday::Tue => schedules::TUESDAY,
        Weekday::Wed => schedules::WEDNESDAY,
        Weekday::Thu => schedules::THURSDAY,
        Weekday::Fri => schedules::FRIDAY,
        Weekday::Sat => schedules::SATURDAY,
        Weekday::Sun => schedules::SUNDAY,
    }
}

fn parse_slot(slot: &str) -> Option<(NaiveTime, NaiveTime)> {
    let (start, end) = slot.split_once('-')?;
    let start = NaiveTime::parse_from_str(start.trim(), "%H:%M").ok()?;
    let end = NaiveTime::parse_from_str(end.trim(), "%H:%M").ok()?;
    Some((start, end))
}

/// Start inclusive, end exclusive. Wraps midnight when `start > end`.
fn slot_contains(start: NaiveTime, end: NaiveTime, time: NaiveTime) -> bool {
    if start <= end {
        start <= time && time < end
    } else {
        time >= start || time < end
    }
}
