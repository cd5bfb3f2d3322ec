//! Cross-process home-city sync for the file store.
//!
//! Browsers announce storage edits from other tabs; a JSON file does not, so
//! the watcher polls it and publishes what changed as an external edit.

use std::future::Future;
use std::time::Duration;

use log::{debug, warn};
use techno_beacon::storage::{KeyValueStore, StorageChange, StorageEvents, StorageKey};
use tokio::time::{interval, MissedTickBehavior};

/// Poll `substrate` every `period` until `shutdown` resolves, publishing each
/// home-city change to `events` with no origin context. Returns how many
/// changes were published.
pub async fn poll_home_city<S, F>(
    substrate: &S,
    events: &StorageEvents,
    period: Duration,
    shutdown: F,
) -> usize
where
    S: KeyValueStore,
    F: Future<Output = ()>,
{
    let key = StorageKey::HomeCity.as_str();
    let mut last_seen = substrate.read(key).ok().flatten();
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(shutdown);

    let mut published = 0;
    loop {
        tokio::select! {
            () = &mut shutdown => break,
            _ = ticker.tick() => {
                let current = match substrate.read(key) {
                    Ok(value) => value,
                    Err(e) => {
                        warn!("home city poll failed: {e}");
                        continue;
                    }
                };
                if current != last_seen {
                    debug!("home city changed on disk: {current:?}");
                    let change = StorageChange::new(key, last_seen.take(), current.clone());
                    events.publish(None, &change);
                    last_seen = current;
                    published += 1;
                }
            }
        }
    }
    published
}
