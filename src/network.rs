// SPDX-FileCopyrightText: 2026 Cotext Contributors
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Injected network-reachability capability.
//!
//! The OOM needs to know when the host goes on/offline without binding to a
//! process-global event source. Rather than a watcher thread pushing directly
//! into manager state (which would need interior mutability or async), a
//! subscription sends transition events into a channel that the manager drains
//! synchronously on its own schedule — the same bridge-a-callback-into-a-channel
//! shape the source uses to get `notify`'s watcher thread onto an async runtime,
//! adapted here to a plain `std::sync::mpsc` since the core stays synchronous.

use std::sync::mpsc::{self, Receiver, Sender};

/// A capability for observing host network reachability, injected so the core
/// is testable without a real event pump.
pub trait NetworkReachability: Send {
    /// The reachability flag at the moment of subscription.
    fn is_online(&self) -> bool;

    /// Registers `sender` to receive `true`/`false` on every reachability
    /// transition. Returns a handle that unsubscribes on drop.
    fn subscribe(&self, sender: Sender<bool>) -> SubscriptionHandle;
}

/// Unsubscribes from reachability notifications when dropped.
pub struct SubscriptionHandle {
    on_drop: Option<Box<dyn FnOnce() + Send>>,
}

impl SubscriptionHandle {
    #[must_use]
    pub fn new(on_drop: impl FnOnce() + Send + 'static) -> Self {
        Self {
            on_drop: Some(Box::new(on_drop)),
        }
    }

    /// A handle that does nothing on drop, for sources with no teardown to do.
    #[must_use]
    pub fn noop() -> Self {
        Self { on_drop: None }
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        if let Some(on_drop) = self.on_drop.take() {
            on_drop();
        }
    }
}

/// A channel the manager drains to learn about reachability transitions,
/// produced by [`NetworkReachability::subscribe`].
pub struct ReachabilityEvents {
    receiver: Receiver<bool>,
    _subscription: SubscriptionHandle,
}

impl ReachabilityEvents {
    #[must_use]
    pub fn subscribe(source: &dyn NetworkReachability) -> Self {
        let (sender, receiver) = mpsc::channel();
        let subscription = source.subscribe(sender);
        Self {
            receiver,
            _subscription: subscription,
        }
    }

    /// Drains every transition queued so far, in arrival order, so the caller
    /// can dispatch them serially without blocking when none are pending.
    pub fn drain(&self) -> Vec<bool> {
        self.receiver.try_iter().collect()
    }
}

/// A manually-driven [`NetworkReachability`] double for tests: starts at a
/// fixed state and only changes when the test calls [`ManualReachability::set_online`].
pub struct ManualReachability {
    state: std::sync::Mutex<ManualState>,
}

struct ManualState {
    online: bool,
    subscribers: Vec<Sender<bool>>,
}

impl ManualReachability {
    #[must_use]
    pub fn new(initial_online: bool) -> Self {
        Self {
            state: std::sync::Mutex::new(ManualState {
                online: initial_online,
                subscribers: Vec::new(),
            }),
        }
    }

    /// Pushes a transition to every current subscriber.
    pub fn set_online(&self, online: bool) {
        let mut state = self.state.lock().unwrap();
        state.online = online;
        state.subscribers.retain(|sender| sender.send(online).is_ok());
    }
}

impl NetworkReachability for ManualReachability {
    fn is_online(&self) -> bool {
        self.state.lock().unwrap().online
    }

    fn subscribe(&self, sender: Sender<bool>) -> SubscriptionHandle {
        self.state.lock().unwrap().subscribers.push(sender);
        SubscriptionHandle::noop()
    }
}
