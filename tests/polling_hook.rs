use fetchdeck::config::METRICS_PATH;
use fetchdeck::data::Metric;
use fetchdeck::fetch::PollingHook;
use fetchdeck::mock::MockTransport;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, timeout};

fn demo() -> Arc<MockTransport> {
    Arc::new(MockTransport::demo().unwrap())
}

#[tokio::test(start_paused = true)]
async fn test_polls_on_interval() {
    let mock = demo();
    let hook: PollingHook<Vec<Metric>> =
        PollingHook::new(mock.clone(), METRICS_PATH, Some(Duration::from_millis(3000)));
    sleep(Duration::from_millis(8900)).await;
    assert_eq!(hook.attempts(), 3);
    assert_eq!(mock.hits(METRICS_PATH), 3);

    let state = hook.state();
    assert!(!state.is_loading);
    assert!(!state.error);
    assert_eq!(state.data.len(), 4);
}

#[tokio::test(start_paused = true)]
async fn test_no_interval_fetches_once() {
    let mock = demo();
    let none: PollingHook<Vec<Metric>> = PollingHook::new(mock.clone(), METRICS_PATH, None);
    let zero: PollingHook<Vec<Metric>> =
        PollingHook::new(mock.clone(), METRICS_PATH, Some(Duration::ZERO));
    sleep(Duration::from_secs(20)).await;
    assert_eq!(none.attempts(), 1);
    assert_eq!(zero.attempts(), 1);
    assert_eq!(mock.hits(METRICS_PATH), 2);
}

#[tokio::test(start_paused = true)]
async fn test_drop_stops_polling_and_writes() {
    let mock = demo();
    let hook: PollingHook<Vec<Metric>> =
        PollingHook::new(mock.clone(), METRICS_PATH, Some(Duration::from_secs(1)));
    let mut rx = hook.subscribe();
    sleep(Duration::from_millis(50)).await;
    drop(hook);

    sleep(Duration::from_secs(10)).await;
    let state = rx.borrow();
    assert!(state.is_loading);
    assert!(!state.error);
    assert!(state.data.is_empty());
    drop(state);
    assert_eq!(mock.hits(METRICS_PATH), 1);
}

#[tokio::test(start_paused = true)]
async fn test_url_change_replaces_schedule() {
    let mock = Arc::new(
        MockTransport::new()
            .route("/old", Duration::from_millis(10), 200, "[]")
            .route("/new", Duration::from_millis(10), 200, "[]"),
    );
    let mut hook: PollingHook<Vec<Metric>> =
        PollingHook::new(mock.clone(), "/old", Some(Duration::from_secs(1)));
    sleep(Duration::from_millis(1500)).await;
    assert_eq!(mock.hits("/old"), 2);

    hook.set_params("/new", Some(Duration::from_secs(1)));
    sleep(Duration::from_millis(3500)).await;
    assert_eq!(mock.hits("/old"), 2);
    assert_eq!(mock.hits("/new"), 4);
    assert_eq!(hook.url(), "/new");
}

#[tokio::test(start_paused = true)]
async fn test_failures_raise_flag_without_message() {
    let mock = Arc::new(MockTransport::new().route("*", Duration::from_millis(10), 503, "down"));
    let hook: PollingHook<Vec<Metric>> =
        PollingHook::new(mock, METRICS_PATH, Some(Duration::from_secs(1)));
    let mut rx = hook.subscribe();
    let state = rx.wait_for(|s| !s.is_loading).await.unwrap().clone();
    assert!(state.error);
    assert!(state.data.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_old_schedule_never_fires_after_param_change() {
    let mock = Arc::new(
        MockTransport::new()
            .route("/old", Duration::ZERO, 200, "[1]")
            .route("/new", Duration::ZERO, 200, "[2]"),
    );

    for round in 0..200 {
        let mut hook: PollingHook<Vec<u32>> =
            PollingHook::new(mock.clone(), "/old", Some(Duration::from_micros(200)));
        sleep(Duration::from_millis(1)).await;
        hook.set_params("/new", None);
        let attempts = hook.attempts();

        let mut rx = hook.subscribe();
        timeout(Duration::from_secs(1), rx.wait_for(|s| !s.is_loading))
            .await
            .unwrap()
            .unwrap();
        sleep(Duration::from_millis(5)).await;

        assert_eq!(hook.attempts(), attempts, "round {round}");
        assert_eq!(hook.state().data, vec![2], "round {round}");
    }
}
