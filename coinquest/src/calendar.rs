//! Calendar partitioning: Monday-anchored weeks and per-day task groups.
//!
//! A week window is derived from a reference date and a week offset: shift
//! the reference back to the Monday of its week, move `offset` whole weeks,
//! then take seven consecutive days. Nothing here reads the clock, so the
//! same inputs always produce the same window.

use chrono::{Datelike, Days, NaiveDate, TimeDelta};
use coinquest_proto::Task;
use serde::Serialize;

/// Number of days in a week window.
pub const DAYS_PER_WEEK: usize = 7;

/// Seven consecutive calendar days starting on a Monday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct WeekWindow {
    days: [NaiveDate; DAYS_PER_WEEK],
}

impl WeekWindow {
    /// Returns the days of the window, Monday first.
    #[must_use]
    pub const fn days(&self) -> &[NaiveDate; DAYS_PER_WEEK] {
        &self.days
    }

    /// Returns the Monday that opens the window.
    #[must_use]
    pub const fn start(&self) -> NaiveDate {
        self.days[0]
    }

    /// Returns the Sunday that closes the window.
    #[must_use]
    pub const fn end(&self) -> NaiveDate {
        self.days[DAYS_PER_WEEK - 1]
    }

    /// Returns `true` if `date` falls inside the window.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        (self.start()..=self.end()).contains(&date)
    }
}

/// Computes the week window `week_offset` weeks away from the week
/// containing `reference`.
///
/// Returns `None` only when the window would fall outside the range of
/// dates the calendar can represent.
#[must_use]
pub fn week_window(reference: NaiveDate, week_offset: i64) -> Option<WeekWindow> {
    let back = u64::from(reference.weekday().num_days_from_monday());
    let monday = reference.checked_sub_days(Days::new(back))?;
    let shift = TimeDelta::try_days(week_offset.checked_mul(7)?)?;
    let start = monday.checked_add_signed(shift)?;

    let mut days = [start; DAYS_PER_WEEK];
    for (i, day) in (0u64..).zip(days.iter_mut()) {
        *day = start.checked_add_days(Days::new(i))?;
    }
    Some(WeekWindow { days })
}

/// Returns the tasks due on `date`.
///
/// Due dates are calendar days, so the match is on year, month and day only.
pub fn tasks_on_date<'a, I>(tasks: I, date: NaiveDate) -> Vec<&'a Task>
where
    I: IntoIterator<Item = &'a Task>,
{
    tasks.into_iter().filter(|t| t.due_date == date).collect()
}

/// The tasks due on one day of a week window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayTasks<'a> {
    /// The day.
    pub date: NaiveDate,
    /// Tasks due on that day, in input order.
    pub tasks: Vec<&'a Task>,
}

/// Groups `tasks` by day across `window`.
///
/// Always yields seven entries, one per day, even when a day has no tasks.
/// Tasks due outside the window are dropped.
pub fn partition_week<'a, I>(tasks: I, window: &WeekWindow) -> Vec<DayTasks<'a>>
where
    I: IntoIterator<Item = &'a Task>,
{
    let mut days: Vec<DayTasks<'a>> = window
        .days()
        .iter()
        .map(|&date| DayTasks {
            date,
            tasks: Vec::new(),
        })
        .collect();

    for task in tasks {
        if !window.contains(task.due_date) {
            continue;
        }
        let index = (task.due_date - window.start()).num_days();
        if let Some(day) = usize::try_from(index).ok().and_then(|i| days.get_mut(i)) {
            day.tasks.push(task);
        }
    }
    days
}

/// Week navigation state: a fixed reference day plus a week offset.
///
/// Stepping never re-reads the clock; the window is re-derived from the
/// reference on every call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekCursor {
    reference: NaiveDate,
    offset: i64,
}

impl WeekCursor {
    /// Creates a cursor on the week containing `reference`.
    #[must_use]
    pub const fn new(reference: NaiveDate) -> Self {
        Self {
            reference,
            offset: 0,
        }
    }

    /// Creates a cursor `offset` weeks away from `reference`.
    #[must_use]
    pub const fn with_offset(reference: NaiveDate, offset: i64) -> Self {
        Self { reference, offset }
    }

    /// Returns the reference day.
    #[must_use]
    pub const fn reference(&self) -> NaiveDate {
        self.reference
    }

    /// Returns the current week offset.
    #[must_use]
    pub const fn offset(&self) -> i64 {
        self.offset
    }

    /// Moves one week forward.
    pub const fn next(&mut self) {
        self.offset = self.offset.saturating_add(1);
    }

    /// Moves one week back.
    pub const fn previous(&mut self) {
        self.offset = self.offset.saturating_sub(1);
    }

    /// Returns to the week containing the reference day.
    pub const fn reset(&mut self) {
        self.offset = 0;
    }

    /// Returns the window the cursor currently points at.
    #[must_use]
    pub fn window(&self) -> Option<WeekWindow> {
        week_window(self.reference, self.offset)
    }
}
