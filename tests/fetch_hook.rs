use async_trait::async_trait;
use fetchdeck::fetch::{FetchError, FetchHook, Response, Transport};
use fetchdeck::mock::MockTransport;
use serde::Deserialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, PartialEq, Deserialize)]
struct Item {
    id: u32,
}

fn two_endpoints() -> Arc<MockTransport> {
    Arc::new(
        MockTransport::new()
            .route("/a", Duration::from_millis(800), 200, r#"[{"id":1}]"#)
            .route("/b", Duration::from_millis(100), 200, r#"[{"id":2}]"#)
            .route("/fails", Duration::from_millis(50), 500, "boom"),
    )
}

#[tokio::test(start_paused = true)]
async fn test_slow_key_is_superseded_by_fast_key() {
    let mock = two_endpoints();
    let mut hook: FetchHook<Vec<Item>> = FetchHook::new(mock.clone(), "/a");
    sleep(Duration::from_millis(10)).await;
    hook.set_key("/b");

    let mut rx = hook.subscribe();
    let state = rx.wait_for(|s| !s.is_loading).await.unwrap().clone();
    assert_eq!(state.data, vec![Item { id: 2 }]);
    assert!(state.error.is_none());

    // the slow response would have landed by now; it must not overwrite
    sleep(Duration::from_secs(2)).await;
    assert_eq!(hook.state().data, vec![Item { id: 2 }]);
    assert_eq!(mock.hits("/a"), 1);
    assert_eq!(mock.hits("/b"), 1);
}

#[tokio::test(start_paused = true)]
async fn test_failure_keeps_last_good_data() {
    let mock = two_endpoints();
    let mut hook: FetchHook<Vec<Item>> = FetchHook::new(mock, "/b");
    let mut rx = hook.subscribe();
    rx.wait_for(|s| !s.is_loading).await.unwrap();

    hook.set_key("/fails");
    let mut rx = hook.subscribe();
    let state = rx.wait_for(|s| !s.is_loading).await.unwrap().clone();
    assert_eq!(state.data, vec![Item { id: 2 }]);
    assert_eq!(state.error.as_deref(), Some("request failed with status 500"));
}

#[tokio::test(start_paused = true)]
async fn test_each_refetch_starts_an_attempt() {
    let mock = two_endpoints();
    let hook: FetchHook<Vec<Item>> = FetchHook::new(mock.clone(), "/b");
    let refetch = hook.refetch().clone();
    for _ in 0..3 {
        refetch.trigger();
    }
    assert_eq!(hook.attempts(), 4);
    assert_eq!(refetch.count(), 3);

    let mut rx = hook.subscribe();
    rx.wait_for(|s| !s.is_loading).await.unwrap();
    assert_eq!(hook.state().data, vec![Item { id: 2 }]);
    assert!(mock.hits("/b") >= 1);
}

#[tokio::test(start_paused = true)]
async fn test_refetch_handle_survives_state_changes() {
    let hook: FetchHook<Vec<Item>> = FetchHook::new(two_endpoints(), "/b");
    let first = hook.view().refetch;
    hook.refetch().trigger();
    let mut rx = hook.subscribe();
    rx.wait_for(|s| !s.is_loading).await.unwrap();
    assert!(first.ptr_eq(&hook.view().refetch));
}

#[tokio::test(start_paused = true)]
async fn test_data_is_never_absent() {
    let hook: FetchHook<Vec<Item>> = FetchHook::new(two_endpoints(), "/fails");
    let view = hook.view();
    assert!(view.is_loading);
    assert!(view.data.is_empty());
    assert!(view.is_initial_loading(!view.data.is_empty()));

    let mut rx = hook.subscribe();
    let state = rx.wait_for(|s| !s.is_loading).await.unwrap().clone();
    assert!(state.data.is_empty());
    assert!(state.error.is_some());
}

#[tokio::test(start_paused = true)]
async fn test_drop_mid_attempt_writes_nothing() {
    let mock = two_endpoints();
    let hook: FetchHook<Vec<Item>> = FetchHook::new(mock.clone(), "/a");
    let mut rx = hook.subscribe();
    sleep(Duration::from_millis(100)).await;
    drop(hook);

    sleep(Duration::from_secs(2)).await;
    let state = rx.borrow();
    assert!(state.is_loading);
    assert!(state.error.is_none());
    assert!(state.data.is_empty());
    drop(state);
    assert_eq!(mock.hits("/a"), 1);
}

/// Keeps every token it is handed and answers after a delay no matter what
#[derive(Default)]
struct Stubborn {
    tokens: Mutex<Vec<CancellationToken>>,
}

#[async_trait]
impl Transport for Stubborn {
    async fn get(&self, url: &str, cancel: &CancellationToken) -> Result<Response, FetchError> {
        let call = {
            let mut tokens = self.tokens.lock().unwrap();
            tokens.push(cancel.clone());
            tokens.len()
        };
        match url {
            "/slow-failure" => {
                sleep(Duration::from_millis(800)).await;
                Ok(Response::new(500, "boom"))
            }
            "/fast" => {
                sleep(Duration::from_millis(100)).await;
                Ok(Response::new(200, "[{\"id\":7}]"))
            }
            _ => {
                sleep(Duration::from_millis(800)).await;
                Ok(Response::new(200, format!("[{{\"id\":{call}}}]")))
            }
        }
    }
}

#[tokio::test(start_paused = true)]
async fn test_refetch_cancels_pending_predecessor() {
    let transport = Arc::new(Stubborn::default());
    let hook: FetchHook<Vec<Item>> = FetchHook::new(transport.clone(), "/slow");

    let settled = Arc::new(AtomicUsize::new(0));
    let mut rx = hook.subscribe();
    let counter = settled.clone();
    tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            if !rx.borrow_and_update().is_loading {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        }
    });

    sleep(Duration::from_millis(10)).await;
    hook.refetch().trigger();
    sleep(Duration::from_millis(10)).await;
    hook.refetch().trigger();
    sleep(Duration::from_secs(2)).await;

    let tokens = transport.tokens.lock().unwrap().clone();
    assert_eq!(tokens.len(), 3);
    assert!(tokens[0].is_cancelled());
    assert!(tokens[1].is_cancelled());
    assert!(!tokens[2].is_cancelled());

    assert_eq!(settled.load(Ordering::SeqCst), 1);
    let state = hook.state();
    assert_eq!(state.data, vec![Item { id: 3 }]);
    assert!(state.error.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_superseded_failure_is_ignored() {
    let transport = Arc::new(Stubborn::default());
    let mut hook: FetchHook<Vec<Item>> = FetchHook::new(transport.clone(), "/slow-failure");
    sleep(Duration::from_millis(10)).await;
    hook.set_key("/fast");

    sleep(Duration::from_secs(2)).await;
    let state = hook.state();
    assert!(!state.is_loading);
    assert!(state.error.is_none());
    assert_eq!(state.data, vec![Item { id: 7 }]);
    assert_eq!(transport.tokens.lock().unwrap().len(), 2);
}
