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

//! Ordered, short-circuiting chains of named hooks.

use crate::helper::UploadHelper;
use crate::queue::UploadQueue;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;
use vellum_core::PreparableRef;

/// Inspects a candidate item and pushes whatever it needs uploaded.
/// Returns `true` when the hook claimed the item.
pub type FindHook = dyn Fn(&PreparableRef, &mut UploadQueue) -> bool + Send + Sync;

/// Uploads a queued item. Returns `true` when the hook handled it.
pub type UploadHook = dyn Fn(Option<&UploadHelper>, &PreparableRef) -> bool + Send + Sync;

struct NamedHook<F: ?Sized> {
    name: Cow<'static, str>,
    hook: Arc<F>,
}

impl<F: ?Sized> Clone for NamedHook<F> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            hook: Arc::clone(&self.hook),
        }
    }
}

/// An ordered list of hooks. Hooks run front to back and the first one to
/// return `true` ends the run for that invocation.
///
/// Cloning a chain is cheap: the hooks themselves are shared.
pub struct HookChain<F: ?Sized> {
    hooks: Vec<NamedHook<F>>,
}

impl<F: ?Sized> HookChain<F> {
    /// Creates an empty chain.
    pub fn new() -> Self {
        Self { hooks: Vec::new() }
    }

    /// Appends an already shared hook under `name`. Names are labels only;
    /// duplicates are allowed.
    pub fn push(&mut self, name: impl Into<Cow<'static, str>>, hook: Arc<F>) -> &mut Self {
        self.hooks.push(NamedHook {
            name: name.into(),
            hook,
        });
        self
    }

    /// Number of registered hooks.
    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    /// `true` if no hook is registered.
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// `true` if a hook was registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.hooks.iter().any(|entry| entry.name == name)
    }

    /// Hook names in run order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.hooks.iter().map(|entry| entry.name.as_ref())
    }

    /// Drops every hook.
    pub fn clear(&mut self) {
        self.hooks.clear();
    }

    /// Calls `invoke` on each hook in order until one returns `true`.
    pub fn run_with(&self, mut invoke: impl FnMut(&F) -> bool) -> bool {
        self.hooks.iter().any(|entry| invoke(&entry.hook))
    }
}

impl HookChain<FindHook> {
    /// Appends a find hook.
    pub fn register<H>(&mut self, name: impl Into<Cow<'static, str>>, hook: H) -> &mut Self
    where
        H: Fn(&PreparableRef, &mut UploadQueue) -> bool + Send + Sync + 'static,
    {
        let hook: Arc<FindHook> = Arc::new(hook);
        self.push(name, hook)
    }

    /// Runs discovery for `item`, letting the claiming hook fill `queue`.
    pub fn run(&self, item: &PreparableRef, queue: &mut UploadQueue) -> bool {
        self.run_with(|hook| hook(item, queue))
    }
}

impl HookChain<UploadHook> {
    /// Appends an upload hook.
    pub fn register<H>(&mut self, name: impl Into<Cow<'static, str>>, hook: H) -> &mut Self
    where
        H: Fn(Option<&UploadHelper>, &PreparableRef) -> bool + Send + Sync + 'static,
    {
        let hook: Arc<UploadHook> = Arc::new(hook);
        self.push(name, hook)
    }

    /// Offers `item` to the upload hooks.
    pub fn run(&self, helper: Option<&UploadHelper>, item: &PreparableRef) -> bool {
        self.run_with(|hook| hook(helper, item))
    }
}

impl<F: ?Sized> Default for HookChain<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: ?Sized> Clone for HookChain<F> {
    fn clone(&self) -> Self {
        Self {
            hooks: self.hooks.clone(),
        }
    }
}

impl<F: ?Sized> fmt::Debug for HookChain<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::any::Any;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use vellum_core::Preparable;

    struct Item;

    impl Preparable for Item {
        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    fn counting_find_hook(
        calls: &Arc<AtomicUsize>,
        claims: bool,
    ) -> impl Fn(&PreparableRef, &mut UploadQueue) -> bool + Send + Sync + 'static {
        let calls = calls.clone();
        move |_item: &PreparableRef, _queue: &mut UploadQueue| {
            calls.fetch_add(1, Ordering::SeqCst);
            claims
        }
    }

    #[test]
    fn register_appends_and_is_reachable() {
        let mut chain = HookChain::<FindHook>::new();
        chain
            .register("first", |_: &PreparableRef, _: &mut UploadQueue| false)
            .register("second", |_: &PreparableRef, _: &mut UploadQueue| false);

        assert_eq!(chain.len(), 2);
        assert!(chain.contains("second"));
        assert_eq!(chain.names().collect::<Vec<_>>(), vec!["first", "second"]);
    }

    #[test]
    fn first_claiming_hook_short_circuits() {
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let third = Arc::new(AtomicUsize::new(0));
        let mut chain = HookChain::<FindHook>::new();
        chain
            .register("declines", counting_find_hook(&first, false))
            .register("claims", counting_find_hook(&second, true))
            .register("never", counting_find_hook(&third, true));

        let item: PreparableRef = Arc::new(Item);
        let mut queue = UploadQueue::new();

        assert!(chain.run(&item, &mut queue));
        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 1);
        assert_eq!(third.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn unmatched_run_returns_false() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut chain = HookChain::<FindHook>::new();
        chain.register("declines", counting_find_hook(&calls, false));

        let item: PreparableRef = Arc::new(Item);
        assert!(!chain.run(&item, &mut UploadQueue::new()));
        assert!(!HookChain::<FindHook>::new().run(&item, &mut UploadQueue::new()));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn upload_chain_passes_helper_through() {
        let mut chain = HookChain::<UploadHook>::new();
        chain.register("needs_helper", |helper: Option<&UploadHelper>, _: &PreparableRef| {
            helper.is_some()
        });

        let item: PreparableRef = Arc::new(Item);
        assert!(!chain.run(None, &item));
    }

    #[test]
    fn clones_share_hooks() {
        let mut chain = HookChain::<UploadHook>::new();
        chain.register("a", |_: Option<&UploadHelper>, _: &PreparableRef| true);
        let snapshot = chain.clone();
        chain.register("b", |_: Option<&UploadHelper>, _: &PreparableRef| true);

        assert_eq!(snapshot.len(), 1);
        assert_eq!(chain.len(), 2);
    }
}
