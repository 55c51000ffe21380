// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! An observable routing information base for a single address family.

use crate::types::{Prefix, RibEntry};
use crate::{read_lock, write_lock};
use std::collections::BTreeMap;
use std::net::IpAddr;
use std::sync::{Arc, RwLock};

/// Callback invoked when an entry is inserted or replaced. The first
/// argument is the entry previously held for the prefix, if any.
pub type OnUpdateFn = Box<dyn Fn(Option<&RibEntry>, &RibEntry) + Send + Sync>;

/// Callback invoked when an entry is removed.
pub type OnRemoveFn = Box<dyn Fn(&RibEntry) + Send + Sync>;

/// A routing table holding at most one entry per distinct prefix, with
/// observer lists that are notified on every mutation.
///
/// Observer callbacks run while the table's write lock is held. A callback
/// must not call back into the same `Rib` for reads or writes; it may only
/// inspect the entries it was handed, or hand work to another thread (the
/// peer session's observers enqueue an event and return).
#[derive(Clone, Default)]
pub struct Rib {
    inner: Arc<RwLock<RibInner>>,
}

#[derive(Default)]
struct RibInner {
    entries: BTreeMap<Prefix, Arc<RibEntry>>,
    on_update: Vec<Option<OnUpdateFn>>,
    on_remove: Vec<Option<OnRemoveFn>>,
}

impl Rib {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the entry for a prefix. Prefixes match iff their address octets
    /// and mask lengths are equal.
    pub fn find(&self, prefix: &Prefix) -> Option<Arc<RibEntry>> {
        read_lock!(self.inner).entries.get(prefix).cloned()
    }

    /// Snapshot of all entries.
    pub fn entries(&self) -> Vec<Arc<RibEntry>> {
        read_lock!(self.inner).entries.values().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        read_lock!(self.inner).entries.is_empty()
    }

    /// Insert an entry, replacing any entry already held for the same
    /// prefix. Update observers fire with the replaced entry (if any) and
    /// the new one.
    pub fn update(&self, e: RibEntry) -> Arc<RibEntry> {
        let e = Arc::new(e);
        let mut inner = write_lock!(self.inner);
        let prev = inner.entries.insert(e.prefix, e.clone());
        for f in inner.on_update.iter().flatten() {
            f(prev.as_deref(), &e);
        }
        e
    }

    /// Remove a live entry. The removal is identity-based: if the prefix
    /// now maps to a different entry than the one passed in, nothing
    /// happens. Remove observers fire with the removed entry.
    pub fn remove(&self, e: &Arc<RibEntry>) {
        let mut inner = write_lock!(self.inner);
        match inner.entries.get(&e.prefix) {
            Some(curr) if Arc::ptr_eq(curr, e) => {}
            _ => return,
        }
        inner.entries.remove(&e.prefix);
        for f in inner.on_remove.iter().flatten() {
            f(e);
        }
    }

    /// Remove every entry learned from the given peer. Used when a session
    /// terminates so its advertisements are withdrawn.
    pub fn remove_peer_entries(&self, peer: IpAddr) {
        for e in self.entries() {
            if e.source == Some(peer) {
                self.remove(&e);
            }
        }
    }

    /// Register an update observer, returning a slot usable with
    /// [`Rib::unregister_on_update`]. Vacated slots are reused so that a
    /// long-lived table does not grow with peer churn.
    pub fn on_update(&self, f: OnUpdateFn) -> usize {
        let mut inner = write_lock!(self.inner);
        register(&mut inner.on_update, f)
    }

    pub fn unregister_on_update(&self, slot: usize) {
        write_lock!(self.inner).on_update[slot] = None;
    }

    /// Register a remove observer. Same slot semantics as
    /// [`Rib::on_update`].
    pub fn on_remove(&self, f: OnRemoveFn) -> usize {
        let mut inner = write_lock!(self.inner);
        register(&mut inner.on_remove, f)
    }

    pub fn unregister_on_remove(&self, slot: usize) {
        write_lock!(self.inner).on_remove[slot] = None;
    }
}

fn register<F>(slots: &mut Vec<Option<F>>, f: F) -> usize {
    for (i, slot) in slots.iter_mut().enumerate() {
        if slot.is_none() {
            *slot = Some(f);
            return i;
        }
    }
    slots.push(Some(f));
    slots.len() - 1
}
