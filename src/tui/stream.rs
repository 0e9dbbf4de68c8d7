use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crossterm::event::Event;
use crossterm::event::{poll, read};
use futures::stream::Stream;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::error;

use crate::config::KEY_CHANNEL_CAPACITY;

/// Terminal events read on a blocking thread until `should_stop` is set
pub fn async_key_events(should_stop: Arc<AtomicBool>) -> impl Stream<Item = Event> {
    let (tx, rx) = mpsc::channel(KEY_CHANNEL_CAPACITY);

    tokio::task::spawn_blocking(move || {
        while !should_stop.load(Ordering::Relaxed) {
            match poll(Duration::from_millis(100)) {
                Ok(true) => {
                    if let Ok(event) = read() {
                        if tx.blocking_send(event).is_err() {
                            break;
                        }
                    }
                }
                Ok(false) => {}
                Err(e) => {
                    error!("Error polling for events: {e}");
                    break;
                }
            }
        }
    });

    ReceiverStream::new(rx)
}
