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

//! The frame-sliced preparation scheduler.
//!
//! [`BasePrepare`] runs discovery synchronously when an item is submitted,
//! then drains the shared upload queue a slice per frame through the
//! [`Ticker`]. A drain cycle starts when the queue becomes non-empty and ends
//! when it is empty again; every completion registered during the cycle
//! settles at its end, in registration order.
//!
//! No lock is held while hooks or completions run, so both may call back into
//! the scheduler (for example to submit more items).

use crate::builtin::{default_find_hooks, default_upload_hooks};
use crate::config::PrepareConfig;
use crate::error::PrepareError;
use crate::helper::UploadHelper;
use crate::hooks::{FindHook, HookChain, UploadHook};
use crate::limiter::UploadLimiter;
use crate::queue::UploadQueue;
use std::borrow::Cow;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard};
use std::task::{Context, Poll};
use tokio::sync::oneshot;
use vellum_core::{PreparableRef, RendererHandle, Ticker, TickerSubscription};

type Completion = Box<dyn FnOnce() + Send>;

struct PrepareState {
    upload_hook_helper: Option<UploadHelper>,
    find_hooks: HookChain<FindHook>,
    upload_hooks: HookChain<UploadHook>,
    queue: UploadQueue,
    completes: Vec<Completion>,
    limiter: Box<dyn UploadLimiter>,
    // Invariant: `ticking` implies a non-empty queue and a subscription that
    // is either held or being acquired.
    ticking: bool,
    subscription: Option<TickerSubscription>,
    destroyed: bool,
}

struct Shared {
    renderer: RendererHandle,
    ticker: Arc<dyn Ticker>,
    state: Mutex<PrepareState>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, PrepareState> {
        self.state.lock().unwrap()
    }

    fn discover(&self, item: &PreparableRef) -> UploadQueue {
        let hooks = self.lock().find_hooks.clone();
        let mut staged = UploadQueue::new();
        Self::visit(&hooks, item, &mut staged);
        staged
    }

    fn visit(hooks: &HookChain<FindHook>, item: &PreparableRef, staged: &mut UploadQueue) {
        if !hooks.run(item, staged) {
            log::trace!("No find hook claimed the item.");
        }
        for child in item.children() {
            Self::visit(hooks, &child, staged);
        }
    }

    /// Queues whatever discovery finds for `item` and registers `complete`.
    /// Hands `complete` back when there is nothing to wait for.
    fn enqueue(
        self: &Arc<Self>,
        item: Option<&PreparableRef>,
        complete: Completion,
    ) -> Option<Completion> {
        let staged = match item {
            Some(item) => self.discover(item),
            None => UploadQueue::new(),
        };

        let start_ticking = {
            let mut state = self.lock();
            if state.destroyed {
                log::warn!("Upload requested on a destroyed preparer; completion forfeited.");
                return None;
            }
            let added = state.queue.append(staged);
            if state.queue.is_empty() {
                return Some(complete);
            }
            log::trace!("Queued {added} items ({} pending).", state.queue.len());
            state.completes.push(complete);
            !std::mem::replace(&mut state.ticking, true)
        };

        if start_ticking {
            self.subscribe();
        }
        None
    }

    fn subscribe(self: &Arc<Self>) {
        let weak = Arc::downgrade(self);
        let subscription = self.ticker.add(Arc::new(move || {
            if let Some(shared) = weak.upgrade() {
                shared.prepare_items();
            }
        }));

        let stale = {
            let mut state = self.lock();
            if state.ticking && state.subscription.is_none() {
                state.subscription = Some(subscription);
                false
            } else {
                true
            }
        };

        if stale {
            // The queue drained (or the preparer was destroyed) while subscribing.
            self.ticker.remove(subscription);
        } else {
            log::debug!("Drain cycle started; attached to ticker.");
        }
    }

    fn prepare_items(&self) {
        let (helper, hooks, boundary) = {
            let mut state = self.lock();
            if state.destroyed {
                return;
            }
            state.limiter.begin_frame();
            (
                state.upload_hook_helper.clone(),
                state.upload_hooks.clone(),
                state.queue.len(),
            )
        };

        // Only the items queued before this slice began are eligible; anything
        // hooks add meanwhile waits for a later slice.
        let mut processed = 0;
        while processed < boundary {
            let item = {
                let mut state = self.lock();
                if state.destroyed || !state.limiter.allowed_to_upload() {
                    break;
                }
                state.queue.pop_front()
            };
            let Some(item) = item else {
                break;
            };
            processed += 1;

            if item.is_destroyed() {
                log::trace!("Dropping destroyed item from the upload queue.");
                continue;
            }
            if !hooks.run(helper.as_ref(), &item) {
                log::trace!("No upload hook handled the item; it will not be retried.");
            }
        }

        let (subscription, completes) = {
            let mut state = self.lock();
            if state.destroyed || !state.queue.is_empty() {
                return;
            }
            state.ticking = false;
            (
                state.subscription.take(),
                std::mem::take(&mut state.completes),
            )
        };

        if let Some(subscription) = subscription {
            self.ticker.remove(subscription);
        }
        log::debug!(
            "Upload queue drained after {processed} items; settling {} completions.",
            completes.len()
        );
        for complete in completes {
            complete();
        }
    }

    fn destroy(&self) {
        let (subscription, forfeited) = {
            let mut state = self.lock();
            if state.destroyed {
                return;
            }
            state.destroyed = true;
            state.ticking = false;
            state.queue.clear();
            state.find_hooks.clear();
            state.upload_hooks.clear();
            state.upload_hook_helper = None;
            (
                state.subscription.take(),
                std::mem::take(&mut state.completes),
            )
        };

        if let Some(subscription) = subscription {
            self.ticker.remove(subscription);
        }
        log::info!(
            "Preparer destroyed; {} pending completions forfeited.",
            forfeited.len()
        );
        drop(forfeited);
    }
}

/// Prepares items for rendering by uploading them a slice per frame.
///
/// Created bound to one renderer and one ticker. Dropping the preparer
/// destroys it.
pub struct BasePrepare {
    shared: Arc<Shared>,
}

impl BasePrepare {
    /// Creates a preparer with the built-in hooks and default configuration.
    pub fn new(renderer: RendererHandle, ticker: Arc<dyn Ticker>) -> Self {
        Self::with_config(renderer, ticker, &PrepareConfig::default())
    }

    /// Creates a preparer with the built-in hooks and the given configuration.
    pub fn with_config(
        renderer: RendererHandle,
        ticker: Arc<dyn Ticker>,
        config: &PrepareConfig,
    ) -> Self {
        if let Err(e) = config.validate() {
            log::warn!("{e}; processing one item per frame instead.");
        }
        let state = PrepareState {
            upload_hook_helper: None,
            find_hooks: default_find_hooks(),
            upload_hooks: default_upload_hooks(),
            queue: UploadQueue::new(),
            completes: Vec::new(),
            limiter: config.limiter(),
            ticking: false,
            subscription: None,
            destroyed: false,
        };
        Self {
            shared: Arc::new(Shared {
                renderer,
                ticker,
                state: Mutex::new(state),
            }),
        }
    }

    /// The renderer this preparer was created for.
    pub fn renderer(&self) -> &RendererHandle {
        &self.shared.renderer
    }

    /// The helper passed to upload hooks, if one is set.
    pub fn upload_hook_helper(&self) -> Option<UploadHelper> {
        self.shared.lock().upload_hook_helper.clone()
    }

    /// Sets or clears the helper passed to upload hooks.
    pub fn set_upload_hook_helper(&self, helper: Option<UploadHelper>) -> &Self {
        self.shared.lock().upload_hook_helper = helper;
        self
    }

    /// Appends a find hook to the discovery chain.
    pub fn register_find_hook<H>(&self, name: impl Into<Cow<'static, str>>, hook: H) -> &Self
    where
        H: Fn(&PreparableRef, &mut UploadQueue) -> bool + Send + Sync + 'static,
    {
        self.shared.lock().find_hooks.register(name, hook);
        self
    }

    /// Appends an upload hook to the upload chain.
    pub fn register_upload_hook<H>(&self, name: impl Into<Cow<'static, str>>, hook: H) -> &Self
    where
        H: Fn(Option<&UploadHelper>, &PreparableRef) -> bool + Send + Sync + 'static,
    {
        self.shared.lock().upload_hooks.register(name, hook);
        self
    }

    /// A snapshot of the find chain.
    pub fn find_hooks(&self) -> HookChain<FindHook> {
        self.shared.lock().find_hooks.clone()
    }

    /// A snapshot of the upload chain.
    pub fn upload_hooks(&self) -> HookChain<UploadHook> {
        self.shared.lock().upload_hooks.clone()
    }

    /// Runs discovery on `item` and returns a handle that settles once the
    /// queue has fully drained, or immediately if nothing was queued.
    pub fn upload(&self, item: PreparableRef) -> PrepareHandle {
        self.submit(Some(&item))
    }

    /// Returns a handle for the current queue without adding anything.
    pub fn flush(&self) -> PrepareHandle {
        self.submit(None)
    }

    /// Like [`upload`](BasePrepare::upload), but settles by calling `callback`.
    ///
    /// The callback runs synchronously when nothing was queued. It is dropped
    /// uncalled if the preparer is destroyed first.
    pub fn upload_with<F>(&self, item: PreparableRef, callback: F)
    where
        F: FnOnce() + Send + 'static,
    {
        if let Some(complete) = self.shared.enqueue(Some(&item), Box::new(callback)) {
            complete();
        }
    }

    /// Processes one slice of the queue. Called by the ticker every frame
    /// while a drain cycle is active.
    pub fn prepare_items(&self) {
        self.shared.prepare_items();
    }

    /// Number of items waiting to be uploaded.
    pub fn queue_len(&self) -> usize {
        self.shared.lock().queue.len()
    }

    /// `true` if this exact item is waiting to be uploaded.
    pub fn queue_contains(&self, item: &PreparableRef) -> bool {
        self.shared.lock().queue.contains(item)
    }

    /// Number of completions waiting for the queue to drain.
    pub fn pending_completions(&self) -> usize {
        self.shared.lock().completes.len()
    }

    /// `true` while a drain cycle holds a ticker subscription.
    pub fn is_ticking(&self) -> bool {
        self.shared.lock().ticking
    }

    /// Detaches from the ticker and drops the queue, the hooks and every
    /// pending completion without settling them.
    pub fn destroy(&self) {
        self.shared.destroy();
    }

    fn submit(&self, item: Option<&PreparableRef>) -> PrepareHandle {
        let (sender, receiver) = oneshot::channel();
        let complete: Completion = Box::new(move || {
            let _ = sender.send(());
        });
        match self.shared.enqueue(item, complete) {
            Some(_) => PrepareHandle(HandleState::Settled),
            None => PrepareHandle(HandleState::Pending(receiver)),
        }
    }
}

impl Drop for BasePrepare {
    fn drop(&mut self) {
        self.shared.destroy();
    }
}

enum HandleState {
    Settled,
    Pending(oneshot::Receiver<()>),
    Abandoned,
}

/// Settles when the upload it was issued for has been prepared.
///
/// Resolves to [`PrepareError::Abandoned`] if the preparer is destroyed
/// before the queue drains.
#[must_use = "a PrepareHandle does nothing unless awaited or polled"]
pub struct PrepareHandle(HandleState);

impl PrepareHandle {
    /// Checks for completion without waiting.
    pub fn is_settled(&mut self) -> bool {
        if let HandleState::Pending(receiver) = &mut self.0 {
            match receiver.try_recv() {
                Ok(()) => self.0 = HandleState::Settled,
                Err(oneshot::error::TryRecvError::Closed) => self.0 = HandleState::Abandoned,
                Err(oneshot::error::TryRecvError::Empty) => {}
            }
        }
        matches!(self.0, HandleState::Settled)
    }
}

impl Future for PrepareHandle {
    type Output = Result<(), PrepareError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        match &mut this.0 {
            HandleState::Settled => Poll::Ready(Ok(())),
            HandleState::Abandoned => Poll::Ready(Err(PrepareError::Abandoned)),
            HandleState::Pending(receiver) => match Pin::new(receiver).poll(cx) {
                Poll::Ready(Ok(())) => {
                    this.0 = HandleState::Settled;
                    Poll::Ready(Ok(()))
                }
                Poll::Ready(Err(_)) => {
                    this.0 = HandleState::Abandoned;
                    Poll::Ready(Err(PrepareError::Abandoned))
                }
                Poll::Pending => Poll::Pending,
            },
        }
    }
}
