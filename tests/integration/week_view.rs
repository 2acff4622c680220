//! Integration tests for the week view.
//!
//! Covers window anchoring, week navigation and per-day grouping of a
//! fetched session's tasks.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use chrono::{Datelike, NaiveDate, Weekday};
use coinquest::calendar::{DAYS_PER_WEEK, WeekCursor, partition_week, tasks_on_date, week_window};
use coinquest::remote::memory::MemoryRemote;
use coinquest::session::Session;
use coinquest_proto::record::{ServerSnapshot, TodoRecord};
use coinquest_proto::{CategoryId, Task, TaskId};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn task(id: u64, due: NaiveDate) -> Task {
    Task {
        id: TaskId::new(id),
        title: format!("task {id}"),
        description: None,
        category_id: CategoryId::new(1),
        base_coin_value: 5,
        due_date: due,
        completed: false,
        category: None,
    }
}

// ---------------------------------------------------------------------------
// Window anchoring
// ---------------------------------------------------------------------------

#[test]
fn every_weekday_anchors_to_the_same_monday() {
    let monday = date(2025, 5, 12);
    for d in 12..=18 {
        let window = week_window(date(2025, 5, d), 0).unwrap();
        assert_eq!(window.start(), monday, "reference 2025-05-{d}");
        assert_eq!(window.end(), date(2025, 5, 18));
    }
}

#[test]
fn window_crosses_month_and_year_boundaries() {
    let window = week_window(date(2025, 1, 1), 0).unwrap();
    assert_eq!(window.start(), date(2024, 12, 30));
    assert_eq!(window.end(), date(2025, 1, 5));
    assert_eq!(window.days().len(), DAYS_PER_WEEK);
    assert!(window.contains(date(2024, 12, 31)));
}

#[test]
fn leap_day_is_included() {
    let window = week_window(date(2024, 2, 28), 0).unwrap();
    assert!(window.days().contains(&date(2024, 2, 29)));
    assert_eq!(window.end(), date(2024, 3, 3));
}

#[test]
fn offsets_move_whole_weeks() {
    let reference = date(2025, 5, 14);
    let back = week_window(reference, -1).unwrap();
    let here = week_window(reference, 0).unwrap();
    let ahead = week_window(reference, 52).unwrap();

    assert_eq!(back.start(), date(2025, 5, 5));
    assert_eq!(back.end().succ_opt(), Some(here.start()));
    assert_eq!(ahead.start(), date(2026, 5, 11));
    assert_eq!(ahead.start().weekday(), Weekday::Mon);
}

#[test]
fn unrepresentable_offsets_yield_none() {
    let reference = date(2025, 5, 14);
    assert!(week_window(reference, i64::MAX).is_none());
    assert!(week_window(reference, i64::MIN).is_none());
}

// ---------------------------------------------------------------------------
// Navigation
// ---------------------------------------------------------------------------

#[test]
fn cursor_steps_and_resets() {
    let mut cursor = WeekCursor::new(date(2025, 5, 14));
    cursor.next();
    cursor.next();
    assert_eq!(cursor.offset(), 2);
    assert_eq!(cursor.window().unwrap().start(), date(2025, 5, 26));

    cursor.previous();
    cursor.previous();
    cursor.previous();
    assert_eq!(cursor.window().unwrap().start(), date(2025, 5, 5));

    cursor.reset();
    assert_eq!(cursor, WeekCursor::new(date(2025, 5, 14)));
}

// ---------------------------------------------------------------------------
// Grouping
// ---------------------------------------------------------------------------

#[test]
fn tasks_match_on_calendar_day_only() {
    let tasks = [
        task(1, date(2025, 5, 14)),
        task(2, date(2025, 5, 15)),
        task(3, date(2025, 5, 14)),
    ];
    let found = tasks_on_date(&tasks, date(2025, 5, 14));
    let ids: Vec<u64> = found.iter().map(|t| t.id.get()).collect();
    assert_eq!(ids, vec![1, 3]);
    assert!(tasks_on_date(&tasks, date(2025, 5, 16)).is_empty());
}

#[test]
fn partition_yields_seven_days_and_drops_outsiders() {
    let tasks = [
        task(1, date(2025, 5, 12)),
        task(2, date(2025, 5, 18)),
        task(3, date(2025, 5, 19)),
        task(4, date(2025, 5, 11)),
    ];
    let window = week_window(date(2025, 5, 14), 0).unwrap();
    let days = partition_week(&tasks, &window);

    assert_eq!(days.len(), DAYS_PER_WEEK);
    assert_eq!(days[0].tasks[0].id, TaskId::new(1));
    assert_eq!(days[6].tasks[0].id, TaskId::new(2));
    let placed: usize = days.iter().map(|d| d.tasks.len()).sum();
    assert_eq!(placed, 2);
}

#[tokio::test]
async fn fixture_tasks_land_on_their_due_day() {
    let json = r#"{
        "todos": [
            {
                "todo_id": 1,
                "title": "Stretch",
                "category_id": 1,
                "base_coin_value": "5",
                "due_date": "2025-05-14T23:30:00.000Z",
                "completed": false
            },
            {
                "todo_id": 2,
                "title": "Read",
                "category_id": 1,
                "base_coin_value": 8,
                "due_date": "2025-05-16",
                "completed": true
            }
        ],
        "categories": [
            { "category_id": 1, "category_name": "Health", "difficulty_multiplier": "1.0" }
        ],
        "user": { "username": "sam", "email": "sam@example.com", "total_coins": 0, "wishes": [] }
    }"#;
    let snapshot: ServerSnapshot = serde_json::from_str(json).unwrap();
    let remote = MemoryRemote::from_snapshot(snapshot).unwrap();
    let session = Session::fetch(&remote).await.unwrap();

    let window = week_window(date(2025, 5, 14), 0).unwrap();
    let week = session.week(&window);
    assert_eq!(week[2].date, date(2025, 5, 14));
    assert_eq!(week[2].tasks[0].title, "Stretch");
    assert_eq!(week[4].tasks[0].title, "Read");

    // Exported records keep the calendar day.
    let exported: Vec<TodoRecord> = remote.snapshot().todos;
    assert_eq!(exported[0].due_date, "2025-05-14");
}
