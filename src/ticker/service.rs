//! Live Price Service
//!
//! Each tracked identifier owns one repeating timer. Every tick multiplies
//! the current price by `1 + u` with `u` uniform in [-1%, +1%) and publishes
//! the result. Ticks and `stop_updates` serialize on the same lock and
//! ticks publish while holding it, so no update for an identifier is
//! published after `stop_updates` for it has returned. Price-update
//! subscribers therefore must not call back into the ticker synchronously.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use rand::Rng;
use tracing::{debug, info};

use crate::pubsub::{PriceUpdate, PubSub};
use crate::tasks::{spawn_repeating, TimerHandle};
use crate::ticker::{DEFAULT_TICK_INTERVAL_SECS, MAX_STEP_FRACTION};

/// Per-identifier feed state.
#[derive(Debug)]
struct Tracked {
    price: f64,
    /// Distinguishes this feed from earlier ones for the same identifier
    generation: u64,
    timer: Option<TimerHandle>,
}

#[derive(Debug, Default)]
struct Feeds {
    next_generation: u64,
    tracked: HashMap<String, Tracked>,
}

// == Live Price Ticker ==
/// Simulated live price feeds keyed by market identifier.
#[derive(Debug, Clone)]
pub struct LivePriceTicker {
    feeds: Arc<Mutex<Feeds>>,
    pubsub: PubSub,
    period: Duration,
}

impl LivePriceTicker {
    /// Creates a ticker publishing on `pubsub` once per `period`.
    ///
    /// `period` must be non-zero; starting a feed with a zero period panics.
    pub fn new(pubsub: PubSub, period: Duration) -> Self {
        Self {
            feeds: Arc::new(Mutex::new(Feeds::default())),
            pubsub,
            period,
        }
    }

    /// Creates a ticker with the default one-minute period.
    pub fn with_default_period(pubsub: PubSub) -> Self {
        Self::new(pubsub, Duration::from_secs(DEFAULT_TICK_INTERVAL_SECS))
    }

    // == Start Updates ==
    /// Starts (or restarts) the feed for `id` at `initial_price`.
    ///
    /// Publishes one update right away, then one per period. A feed already
    /// running for `id` is replaced, never stacked. Must be called from
    /// within a tokio runtime.
    pub fn start_updates(&self, id: impl Into<String>, initial_price: f64) {
        let id = id.into();
        let mut feeds = self.lock();

        let generation = feeds.next_generation;
        feeds.next_generation += 1;

        // Dropping the previous handle cancels its timer
        let replaced = feeds
            .tracked
            .insert(
                id.clone(),
                Tracked {
                    price: initial_price,
                    generation,
                    timer: None,
                },
            )
            .is_some();

        info!(id = %id, initial_price, replaced, "live price updates started");

        step(&mut feeds, &id, generation, &self.pubsub);

        let timer = {
            let feeds = Arc::downgrade(&self.feeds);
            let pubsub = self.pubsub.clone();
            let id = id.clone();
            spawn_repeating(self.period, move || tick(&feeds, &id, generation, &pubsub))
        };

        if let Some(entry) = feeds.tracked.get_mut(&id) {
            entry.timer = Some(timer);
        }
    }

    // == Stop Updates ==
    /// Stops the feed for `id` and forgets its price.
    ///
    /// Returns whether a feed was running; unknown identifiers are a no-op.
    pub fn stop_updates(&self, id: &str) -> bool {
        let removed = self.lock().tracked.remove(id);
        match removed {
            Some(entry) => {
                if let Some(timer) = &entry.timer {
                    timer.cancel();
                }
                info!(id = %id, last_price = entry.price, "live price updates stopped");
                true
            }
            None => false,
        }
    }

    /// Stops every running feed.
    pub fn stop_all(&self) -> usize {
        let drained: Vec<_> = self.lock().tracked.drain().collect();
        let count = drained.len();
        if count > 0 {
            info!(count, "all live price updates stopped");
        }
        count
    }

    /// Latest simulated price for `id`, if it is tracked.
    pub fn current_price(&self, id: &str) -> Option<f64> {
        self.lock().tracked.get(id).map(|entry| entry.price)
    }

    pub fn is_tracking(&self, id: &str) -> bool {
        self.lock().tracked.contains_key(id)
    }

    /// Tracked identifiers in sorted order.
    pub fn tracked_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.lock().tracked.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    fn lock(&self) -> MutexGuard<'_, Feeds> {
        self.feeds.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Timer callback: advances the feed if it is still the one that armed this timer.
fn tick(feeds: &Weak<Mutex<Feeds>>, id: &str, generation: u64, pubsub: &PubSub) {
    let Some(feeds) = feeds.upgrade() else {
        return;
    };
    let mut feeds = feeds.lock().unwrap_or_else(PoisonError::into_inner);
    step(&mut feeds, id, generation, pubsub);
}

/// Applies one random step and publishes the new price.
fn step(feeds: &mut Feeds, id: &str, generation: u64, pubsub: &PubSub) {
    let Some(entry) = feeds.tracked.get_mut(id) else {
        return;
    };
    if entry.generation != generation {
        return;
    }

    let change = rand::thread_rng().gen_range(-MAX_STEP_FRACTION..MAX_STEP_FRACTION);
    entry.price *= 1.0 + change;
    debug!(id = %id, price = entry.price, change, "simulated price update");

    pubsub.publish(PriceUpdate {
        id: id.to_string(),
        price: entry.price,
    });
}
