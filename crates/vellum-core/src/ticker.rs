// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The per-frame tick source consumed by the preparation pipeline.
//!
//! The engine's frame loop owns the real ticker; this module only defines the
//! subscription contract plus [`ManualTicker`], a ticker that dispatches when
//! the host calls [`ManualTicker::tick`] once per frame.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// A callback invoked once per frame while subscribed.
pub type TickCallback = Arc<dyn Fn() + Send + Sync>;

/// An opaque token identifying one subscription on a [`Ticker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TickerSubscription(u64);

impl TickerSubscription {
    /// Creates a subscription token from a raw id.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw id of this subscription.
    pub const fn id(self) -> u64 {
        self.0
    }
}

/// A source of frame ticks.
///
/// Implementations must tolerate `add` and `remove` being called from inside
/// a callback that is currently being dispatched.
pub trait Ticker: Send + Sync {
    /// Subscribes `callback` to every subsequent tick.
    fn add(&self, callback: TickCallback) -> TickerSubscription;

    /// Cancels a subscription. Unknown subscriptions are ignored.
    fn remove(&self, subscription: TickerSubscription);
}

/// A [`Ticker`] driven explicitly by the host frame loop.
#[derive(Default)]
pub struct ManualTicker {
    next_id: AtomicU64,
    listeners: Mutex<Vec<(TickerSubscription, TickCallback)>>,
}

impl ManualTicker {
    /// Creates a ticker with no listeners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Dispatches one frame to every current listener, in subscription order.
    ///
    /// Listeners added during dispatch are first called on the next frame.
    pub fn tick(&self) {
        let snapshot: Vec<(TickerSubscription, TickCallback)> =
            self.listeners.lock().unwrap().clone();

        for (subscription, callback) in snapshot {
            // A previous listener may have removed this one during dispatch.
            if self.is_subscribed(subscription) {
                callback();
            }
        }
    }

    /// Returns the number of active subscriptions.
    pub fn listener_count(&self) -> usize {
        self.listeners.lock().unwrap().len()
    }

    /// Returns `true` if `subscription` is still active.
    pub fn is_subscribed(&self, subscription: TickerSubscription) -> bool {
        self.listeners
            .lock()
            .unwrap()
            .iter()
            .any(|(active, _)| *active == subscription)
    }
}

impl Ticker for ManualTicker {
    fn add(&self, callback: TickCallback) -> TickerSubscription {
        let subscription = TickerSubscription(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners.lock().unwrap().push((subscription, callback));
        log::trace!("Ticker subscription {} added.", subscription.id());
        subscription
    }

    fn remove(&self, subscription: TickerSubscription) {
        self.listeners
            .lock()
            .unwrap()
            .retain(|(active, _)| *active != subscription);
        log::trace!("Ticker subscription {} removed.", subscription.id());
    }
}

impl fmt::Debug for ManualTicker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManualTicker")
            .field("listeners", &self.listener_count())
            .finish()
    }
}
