// Clock Tests
// Tick polling, monotonic publishing, and start/stop lifecycle

use std::sync::Arc;
use std::time::Duration;
use tickwatch::clock::{ClockConfig, TickClock};
use tickwatch::ledger::{LedgerClient, MockLedgerClient};
use tokio::time::Instant;

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

async fn wait_until(cond: impl Fn() -> bool, timeout_ms: u64) -> bool {
    let deadline = Instant::now() + Duration::from_millis(timeout_ms);
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    cond()
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn fast_clock() -> Arc<TickClock> {
    init_tracing();
    Arc::new(TickClock::new(
        ClockConfig::new().with_poll_interval(Duration::from_millis(10)),
    ))
}

// ============================================================================
// POLLING
// ============================================================================

#[tokio::test]
async fn test_clock_publishes_polled_ticks() {
    let client = Arc::new(MockLedgerClient::new().with_tick(100));
    let clock = fast_clock();

    clock.ensure_running(client.clone() as Arc<dyn LedgerClient>);
    assert!(wait_until(|| clock.latest() == 100, 1000).await);

    client.set_tick(105);
    assert!(wait_until(|| clock.latest() == 105, 1000).await);

    clock.stop();
}

#[tokio::test]
async fn test_poll_failure_keeps_previous_value_and_retries() {
    let client = Arc::new(MockLedgerClient::new().with_tick(50).with_tick_failures(2));
    let clock = fast_clock();

    clock.ensure_running(client.clone() as Arc<dyn LedgerClient>);

    // The first two polls fail; the value stays at 0 and the loop keeps going
    assert!(wait_until(|| clock.latest() == 50, 1000).await);
    assert!(client.tick_queries() >= 3);

    clock.stop();
}

#[tokio::test]
async fn test_subscriber_sees_tick_advance() {
    let client = Arc::new(MockLedgerClient::new().with_tick(7));
    let clock = fast_clock();
    let mut rx = clock.subscribe();

    clock.ensure_running(client as Arc<dyn LedgerClient>);

    tokio::time::timeout(Duration::from_secs(1), rx.changed())
        .await
        .expect("tick advance not observed")
        .unwrap();
    assert_eq!(*rx.borrow(), 7);

    clock.stop();
}

// ============================================================================
// LIFECYCLE
// ============================================================================

#[tokio::test]
async fn test_ensure_running_is_idempotent() {
    let client = Arc::new(MockLedgerClient::new().with_tick(10));
    let clock = fast_clock();

    clock.ensure_running(client.clone() as Arc<dyn LedgerClient>);
    clock.ensure_running(client.clone() as Arc<dyn LedgerClient>);
    assert!(clock.is_running());

    assert!(wait_until(|| clock.latest() == 10, 1000).await);

    clock.stop();
    assert!(!clock.is_running());
    // stop twice is a no-op
    clock.stop();
}

#[tokio::test]
async fn test_stop_halts_polling() {
    let client = Arc::new(MockLedgerClient::new().with_tick(10));
    let clock = fast_clock();

    clock.ensure_running(client.clone() as Arc<dyn LedgerClient>);
    assert!(wait_until(|| clock.latest() == 10, 1000).await);

    clock.stop();
    tokio::time::sleep(Duration::from_millis(30)).await;

    let queries_after_stop = client.tick_queries();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(client.tick_queries(), queries_after_stop);

    // the last observed value stays readable
    assert_eq!(clock.latest(), 10);
}

#[tokio::test]
async fn test_restart_after_stop() {
    let client = Arc::new(MockLedgerClient::new().with_tick(10));
    let clock = fast_clock();

    clock.ensure_running(client.clone() as Arc<dyn LedgerClient>);
    assert!(wait_until(|| clock.latest() == 10, 1000).await);
    clock.stop();

    client.set_tick(20);
    clock.ensure_running(client.clone() as Arc<dyn LedgerClient>);
    assert!(wait_until(|| clock.latest() == 20, 1000).await);

    clock.stop();
}
