use std::{sync::Arc, time::Duration};

use chrono::{NaiveDate, NaiveDateTime};
use dailydo::{
    AppContext, Config, FixedClock, MemoryStore, ResetOutcome, ResetScheduler, StoreAdapter,
    LAST_RESET_KEY,
};
use tokio::sync::Mutex;

fn at(day: u32, h: u32, m: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, day)
        .unwrap()
        .and_hms_opt(h, m, 0)
        .unwrap()
}

/// A context with one checked routine and the marker set to 2024-01-01.
fn context_with_checked_routine(clock: &FixedClock) -> AppContext {
    let store = StoreAdapter::new(MemoryStore::new());
    store.save(LAST_RESET_KEY, "2024-01-01").unwrap();

    let mut ctx = AppContext::new(Config::default(), store, Arc::new(clock.clone())).unwrap();
    let id = ctx.add_routine("meditate").unwrap();
    ctx.toggle_routine(id).unwrap();
    ctx
}

#[test]
fn reset_fires_once_per_day_after_cutoff() {
    let clock = FixedClock::new(at(2, 0, 59));
    let mut ctx = context_with_checked_routine(&clock);

    assert_eq!(ctx.run_daily_reset().unwrap(), ResetOutcome::BeforeCutoff);
    assert!(ctx.routines()[0].checked);

    clock.set(at(2, 1, 5));
    assert_eq!(
        ctx.run_daily_reset().unwrap(),
        ResetOutcome::Reset {
            cleared: 1,
            date: "2024-01-02".to_string()
        }
    );
    assert!(!ctx.routines()[0].checked);
    assert_eq!(ctx.last_reset().unwrap().as_deref(), Some("2024-01-02"));

    let id = ctx.routines()[0].id;
    ctx.toggle_routine(id).unwrap();
    clock.set(at(2, 1, 6));
    assert_eq!(ctx.run_daily_reset().unwrap(), ResetOutcome::AlreadyReset);
    assert!(ctx.routines()[0].checked);
}

#[test]
fn configured_cutoff_hour_is_honoured() {
    let clock = FixedClock::new(at(2, 3, 0));
    let store = StoreAdapter::new(MemoryStore::new());
    let config = Config {
        cutoff_hour: 4,
        ..Config::default()
    };
    let mut ctx = AppContext::new(config, store, Arc::new(clock.clone())).unwrap();

    assert_eq!(ctx.run_daily_reset().unwrap(), ResetOutcome::BeforeCutoff);
    clock.set(at(2, 4, 0));
    assert!(ctx.run_daily_reset().unwrap().did_reset());
}

#[tokio::test]
async fn scheduler_resets_on_its_timer() {
    let clock = FixedClock::new(at(2, 0, 30));
    let context = Arc::new(Mutex::new(context_with_checked_routine(&clock)));

    let mut scheduler = ResetScheduler::new(Duration::from_millis(20));
    scheduler.set_context(Arc::clone(&context));
    scheduler.start().await.unwrap();
    assert!(scheduler.get_status().unwrap().is_running);

    tokio::time::sleep(Duration::from_millis(80)).await;
    assert!(context.lock().await.routines()[0].checked);

    clock.set(at(2, 1, 5));
    tokio::time::sleep(Duration::from_millis(120)).await;
    {
        let ctx = context.lock().await;
        assert!(!ctx.routines()[0].checked);
        assert_eq!(ctx.last_reset().unwrap().as_deref(), Some("2024-01-02"));
    }

    let status = scheduler.get_status().unwrap();
    assert!(status.last_check_time.is_some());
    assert!(status.last_outcome.is_some());

    scheduler.stop().await.unwrap();
    assert!(!scheduler.get_status().unwrap().is_running);
}

#[tokio::test]
async fn check_now_reports_outcome() {
    let clock = FixedClock::new(at(2, 9, 0));
    let context = Arc::new(Mutex::new(context_with_checked_routine(&clock)));

    let mut scheduler = ResetScheduler::new(Duration::from_secs(3600));
    scheduler.set_context(Arc::clone(&context));
    scheduler.start().await.unwrap();

    assert!(scheduler.check_now().await.unwrap().did_reset());
    assert_eq!(scheduler.get_status().unwrap().last_check_time, Some(at(2, 9, 0)));

    clock.set(at(2, 9, 30));
    assert_eq!(
        scheduler.check_now().await.unwrap(),
        ResetOutcome::AlreadyReset
    );
    assert_eq!(scheduler.get_status().unwrap().last_check_time, Some(at(2, 9, 30)));

    scheduler.stop().await.unwrap();
    assert!(scheduler.check_now().await.is_err());
}

#[tokio::test]
async fn start_without_context_fails() {
    let mut scheduler = ResetScheduler::new(Duration::from_secs(60));
    assert!(scheduler.start().await.is_err());
    scheduler.stop().await.unwrap();
}
