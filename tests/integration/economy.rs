//! Integration tests for the coin economy.
//!
//! Drives the lifecycle manager end to end against an in-memory server:
//! completing tasks earns coins, fulfilling wishes spends them, and failed
//! or rejected operations leave both sides untouched.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use chrono::{NaiveDate, Utc};
use coinquest::lifecycle::{EngineError, InvalidInput, Lifecycle};
use coinquest::remote::RemoteError;
use coinquest::remote::memory::MemoryRemote;
use coinquest::session::Session;
use coinquest_proto::{
    Category, CategoryId, Multiplier, Task, TaskDraft, TaskId, Wallet, Wish, WishDraft, WishId,
};
use rust_decimal::Decimal;

// ---------------------------------------------------------------------------
// Helper functions
// ---------------------------------------------------------------------------

fn category(id: u64, multiplier: Decimal) -> Category {
    Category::new(
        CategoryId::new(id),
        format!("room {id}"),
        Multiplier::new(multiplier).unwrap(),
    )
}

fn task(id: u64, category_id: u64, base: u64) -> Task {
    Task {
        id: TaskId::new(id),
        title: format!("task {id}"),
        description: None,
        category_id: CategoryId::new(category_id),
        base_coin_value: base,
        due_date: NaiveDate::from_ymd_opt(2025, 5, 14).unwrap(),
        completed: false,
        category: None,
    }
}

fn wish(id: u64, cost: u64) -> Wish {
    Wish {
        id: WishId::new(id),
        title: format!("wish {id}"),
        description: "a treat".to_string(),
        coin_cost: cost,
        is_fulfilled: false,
        created_at: Utc::now(),
        fulfilled_at: None,
    }
}

async fn open(remote: MemoryRemote) -> (Lifecycle<MemoryRemote>, Session) {
    let session = Session::fetch(&remote).await.unwrap();
    (Lifecycle::new(remote), session)
}

// ---------------------------------------------------------------------------
// Earning and spending
// ---------------------------------------------------------------------------

#[tokio::test]
async fn earn_then_spend_to_zero() {
    let remote = MemoryRemote::new()
        .with_category(category(1, Decimal::TWO))
        .with_task(task(1, 1, 10))
        .with_wish(wish(1, 20));
    let (engine, mut session) = open(remote).await;
    assert_eq!(session.wallet(), Wallet::new(0));

    let completion = engine
        .complete_task(&mut session, TaskId::new(1))
        .await
        .unwrap();
    assert_eq!(completion.reward, 20);
    assert!(!completion.needs_reconcile());
    assert_eq!(session.wallet(), Wallet::new(20));

    let fulfilled = engine
        .fulfill_wish(&mut session, WishId::new(1))
        .await
        .unwrap();
    assert!(fulfilled.is_fulfilled);
    assert!(fulfilled.fulfilled_at.is_some());
    assert_eq!(session.wallet(), Wallet::new(0));
    assert_eq!(engine.remote().wallet(), Wallet::new(0));

    // A fresh fetch agrees with the locally applied state.
    let refetched = Session::fetch(engine.remote()).await.unwrap();
    assert_eq!(refetched.wallet(), session.wallet());
    assert!(refetched.task(TaskId::new(1)).unwrap().completed);
    assert!(refetched.wish(WishId::new(1)).unwrap().is_fulfilled);
}

#[tokio::test]
async fn fractional_reward_is_floored() {
    let remote = MemoryRemote::new()
        .with_category(category(1, Decimal::new(15, 1)))
        .with_task(task(1, 1, 7));
    let (engine, mut session) = open(remote).await;

    let completion = engine
        .complete_task(&mut session, TaskId::new(1))
        .await
        .unwrap();
    assert_eq!(completion.reward, 10);
    assert_eq!(session.wallet().total_coins, 10);
}

#[tokio::test]
async fn insufficient_funds_never_reaches_server() {
    let remote = MemoryRemote::new()
        .with_wallet(Wallet::new(40))
        .with_wish(wish(1, 50));
    let (engine, mut session) = open(remote).await;
    let before = session.clone();

    let err = engine
        .fulfill_wish(&mut session, WishId::new(1))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::InsufficientFunds {
            needed: 50,
            available: 40
        }
    );
    assert_eq!(session, before);
    assert!(!engine.remote().calls().contains(&"submit_wish_fulfillment"));
}

#[tokio::test]
async fn exact_balance_is_enough() {
    let remote = MemoryRemote::new()
        .with_wallet(Wallet::new(50))
        .with_wish(wish(1, 50));
    let (engine, mut session) = open(remote).await;

    engine
        .fulfill_wish(&mut session, WishId::new(1))
        .await
        .unwrap();
    assert_eq!(session.wallet().total_coins, 0);
}

#[tokio::test]
async fn double_completion_is_rejected() {
    let remote = MemoryRemote::new()
        .with_category(category(1, Decimal::ONE))
        .with_task(task(1, 1, 10));
    let (engine, mut session) = open(remote).await;

    engine
        .complete_task(&mut session, TaskId::new(1))
        .await
        .unwrap();
    let err = engine
        .complete_task(&mut session, TaskId::new(1))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::AlreadyCompleted(TaskId::new(1)));
    assert_eq!(session.wallet().total_coins, 10);
}

#[tokio::test]
async fn double_fulfillment_is_rejected() {
    let remote = MemoryRemote::new()
        .with_wallet(Wallet::new(100))
        .with_wish(wish(1, 30));
    let (engine, mut session) = open(remote).await;

    engine
        .fulfill_wish(&mut session, WishId::new(1))
        .await
        .unwrap();
    let err = engine
        .fulfill_wish(&mut session, WishId::new(1))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::AlreadyFulfilled(WishId::new(1)));
    assert_eq!(session.wallet().total_coins, 70);
}

// ---------------------------------------------------------------------------
// Failures leave the session untouched
// ---------------------------------------------------------------------------

#[tokio::test]
async fn server_failure_during_completion_changes_nothing() {
    let remote = MemoryRemote::new()
        .with_category(category(1, Decimal::ONE))
        .with_task(task(1, 1, 10));
    let (engine, mut session) = open(remote).await;
    let before = session.clone();

    engine
        .remote()
        .fail_next(RemoteError::Unreachable("connection reset".to_string()));
    let err = engine
        .complete_task(&mut session, TaskId::new(1))
        .await
        .unwrap_err();
    assert!(err.is_retryable());
    assert_eq!(session, before);

    // The same call succeeds once the server is back.
    engine
        .complete_task(&mut session, TaskId::new(1))
        .await
        .unwrap();
    assert_eq!(session.wallet().total_coins, 10);
}

#[tokio::test]
async fn unresolvable_category_is_not_submitted() {
    let remote = MemoryRemote::new().with_task(task(1, 7, 10));
    let (engine, mut session) = open(remote).await;

    let err = engine
        .complete_task(&mut session, TaskId::new(1))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::MissingCategory {
            task_id: TaskId::new(1),
            category_id: CategoryId::new(7)
        }
    );
    assert!(!engine.remote().calls().contains(&"submit_task_completion"));
}

#[tokio::test]
async fn embedded_category_is_used_when_list_lacks_it() {
    let mut t = task(1, 3, 10);
    t.category = Some(category(3, Decimal::new(25, 1)));
    let remote = MemoryRemote::new().with_task(t);
    let (engine, mut session) = open(remote).await;

    // The in-memory server also resolves through the embedded category.
    let completion = engine
        .complete_task(&mut session, TaskId::new(1))
        .await
        .unwrap();
    assert_eq!(completion.reward, 25);
}

#[tokio::test]
async fn server_bonus_is_reconciled_on_refresh() {
    let remote = MemoryRemote::new()
        .with_category(category(1, Decimal::ONE))
        .with_task(task(1, 1, 10));
    remote.set_completion_bonus(5);
    let (engine, mut session) = open(remote).await;

    let completion = engine
        .complete_task(&mut session, TaskId::new(1))
        .await
        .unwrap();
    assert!(completion.needs_reconcile());
    assert_eq!(session.wallet().total_coins, 10);

    session.refresh_wallet(engine.remote()).await.unwrap();
    assert_eq!(session.wallet().total_coins, 15);
}

// ---------------------------------------------------------------------------
// Creation and deletion
// ---------------------------------------------------------------------------

#[tokio::test]
async fn created_task_can_be_completed() {
    let remote = MemoryRemote::new().with_category(category(1, Decimal::new(15, 1)));
    let (engine, mut session) = open(remote).await;

    let draft = TaskDraft {
        title: "Read chapter 4".to_string(),
        description: String::new(),
        category_id: Some(CategoryId::new(1)),
        base_coin_value: "10".to_string(),
        due_date: "2025-05-14".to_string(),
    };
    let created = engine.add_task(&mut session, &draft).await.unwrap();
    assert_eq!(session.reward_of(&created), Ok(15));

    let completion = engine.complete_task(&mut session, created.id).await.unwrap();
    assert_eq!(completion.coins_earned, 15);
}

#[tokio::test]
async fn malformed_forms_are_rejected_locally() {
    let remote = MemoryRemote::new().with_category(category(1, Decimal::ONE));
    let (engine, mut session) = open(remote).await;

    let draft = TaskDraft {
        title: "Run".to_string(),
        category_id: Some(CategoryId::new(1)),
        base_coin_value: "-5".to_string(),
        due_date: "2025-05-14".to_string(),
        ..TaskDraft::default()
    };
    let err = engine.add_task(&mut session, &draft).await.unwrap_err();
    assert_eq!(
        err,
        EngineError::InvalidInput(InvalidInput::Negative {
            field: "base_coin_value"
        })
    );

    let wish_draft = WishDraft {
        title: String::new(),
        description: "x".to_string(),
        coin_cost: "5".to_string(),
    };
    let err = engine.add_wish(&mut session, &wish_draft).await.unwrap_err();
    assert_eq!(err, EngineError::InvalidInput(InvalidInput::TitleEmpty));

    assert_eq!(
        engine.remote().calls(),
        vec![
            "fetch_tasks",
            "fetch_categories",
            "fetch_wallet",
            "fetch_wishes",
            "fetch_account"
        ]
    );
}

#[tokio::test]
async fn deleting_pending_wish_keeps_balance() {
    let remote = MemoryRemote::new()
        .with_wallet(Wallet::new(30))
        .with_wish(wish(1, 10))
        .with_wish(wish(2, 10));
    let (engine, mut session) = open(remote).await;

    let removed = engine
        .delete_wish(&mut session, WishId::new(2))
        .await
        .unwrap();
    assert_eq!(removed.map(|w| w.id), Some(WishId::new(2)));
    assert_eq!(session.wallet().total_coins, 30);

    engine
        .fulfill_wish(&mut session, WishId::new(1))
        .await
        .unwrap();
    let err = engine
        .delete_wish(&mut session, WishId::new(1))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::AlreadyFulfilled(WishId::new(1)));
}

#[tokio::test]
async fn deleting_absent_records_is_a_no_op() {
    let (engine, mut session) = open(MemoryRemote::new()).await;
    assert_eq!(
        engine.delete_task(&mut session, TaskId::new(9)).await,
        Ok(None)
    );
    assert_eq!(
        engine.delete_wish(&mut session, WishId::new(9)).await,
        Ok(None)
    );
    assert_eq!(engine.remote().calls().len(), 5);
}
