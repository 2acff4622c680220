//! Property-based tests for the engine's pure computations.
//!
//! Uses proptest to verify:
//! 1. Rewards are the floor of base times multiplier and never panic.
//! 2. Week windows always start on a Monday, hold seven consecutive days
//!    and tile the calendar across offsets.
//! 3. Room percentages stay in range and read 100 only when complete.

#![allow(clippy::unwrap_used)]

use chrono::{Datelike, Days, NaiveDate, Weekday};
use coinquest::calendar::{partition_week, week_window};
use coinquest::progress::percent;
use coinquest::reward::{reward, scaled_coins};
use coinquest_proto::{Category, CategoryId, Multiplier, Task, TaskId};
use proptest::prelude::*;
use rust_decimal::Decimal;

/// Strategy for multipliers between 0.01 and 100.00.
fn arb_multiplier() -> impl Strategy<Value = Decimal> {
    (1i64..=10_000).prop_map(|hundredths| Decimal::new(hundredths, 2))
}

/// Strategy for dates well inside the representable range.
fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (-200_000i64..200_000).prop_filter_map("date out of range", |offset| {
        let epoch = NaiveDate::from_ymd_opt(2000, 1, 1)?;
        if offset >= 0 {
            epoch.checked_add_days(Days::new(offset.unsigned_abs()))
        } else {
            epoch.checked_sub_days(Days::new(offset.unsigned_abs()))
        }
    })
}

fn task_due(id: u64, due: NaiveDate) -> Task {
    Task {
        id: TaskId::new(id),
        title: format!("task {id}"),
        description: None,
        category_id: CategoryId::new(1),
        base_coin_value: 1,
        due_date: due,
        completed: false,
        category: None,
    }
}

proptest! {
    #[test]
    fn reward_is_floor_of_product(base in 0u64..1_000_000, m in arb_multiplier()) {
        let coins = scaled_coins(base, m);
        let exact = Decimal::from(base) * m;
        prop_assert!(Decimal::from(coins) <= exact);
        prop_assert!(exact - Decimal::from(coins) < Decimal::ONE);
    }

    #[test]
    fn reward_never_panics(base in any::<u64>(), m in arb_multiplier()) {
        let _ = scaled_coins(base, m);
    }

    #[test]
    fn unit_multiplier_is_identity(base in any::<u64>()) {
        let category = Category::new(CategoryId::new(1), "Any", Multiplier::ONE);
        let mut task = task_due(1, NaiveDate::MIN);
        task.base_coin_value = base;
        prop_assert_eq!(reward(&task, &category), Ok(base));
    }

    #[test]
    fn window_starts_monday_and_is_contiguous(reference in arb_date(), offset in -520i64..520) {
        let window = week_window(reference, offset).unwrap();
        prop_assert_eq!(window.start().weekday(), Weekday::Mon);
        for pair in window.days().windows(2) {
            prop_assert_eq!(pair[0].succ_opt(), Some(pair[1]));
        }
        let next = week_window(reference, offset + 1).unwrap();
        prop_assert_eq!(window.end().succ_opt(), Some(next.start()));
    }

    #[test]
    fn reference_lies_in_its_own_week(reference in arb_date()) {
        let window = week_window(reference, 0).unwrap();
        prop_assert!(window.contains(reference));
    }

    #[test]
    fn week_offset_never_panics(reference in arb_date(), offset in any::<i64>()) {
        let _ = week_window(reference, offset);
    }

    #[test]
    fn partition_places_exactly_the_tasks_inside(
        reference in arb_date(),
        shifts in prop::collection::vec(-10i64..10, 0..30),
    ) {
        let window = week_window(reference, 0).unwrap();
        let tasks: Vec<Task> = (0u64..)
            .zip(&shifts)
            .filter_map(|(id, &shift)| {
                let due = if shift >= 0 {
                    window.start().checked_add_days(Days::new(shift.unsigned_abs()))
                } else {
                    window.start().checked_sub_days(Days::new(shift.unsigned_abs()))
                }?;
                Some(task_due(id, due))
            })
            .collect();
        let days = partition_week(&tasks, &window);

        prop_assert_eq!(days.len(), 7);
        let placed: usize = days.iter().map(|d| d.tasks.len()).sum();
        let inside = tasks.iter().filter(|t| window.contains(t.due_date)).count();
        prop_assert_eq!(placed, inside);
        for day in &days {
            prop_assert!(day.tasks.iter().all(|t| t.due_date == day.date));
        }
    }

    #[test]
    fn percent_in_range(total in 0usize..10_000, completed in 0usize..10_000) {
        let completed = completed.min(total);
        let p = percent(completed, total);
        prop_assert!(p <= 100);
        prop_assert_eq!(p == 100, total > 0 && completed == total);
    }

    #[test]
    fn percent_is_monotonic(total in 1usize..1_000, completed in 0usize..999) {
        let completed = completed.min(total - 1);
        prop_assert!(percent(completed, total) <= percent(completed + 1, total));
    }
}
