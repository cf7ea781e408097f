//! Debounced dispatcher — coalesces bursts of calls per key.
//!
//! A window opens on the first [`schedule`](Debouncer::schedule) for a key.
//! Later calls for the same key replace the pending arguments and push the
//! deadline to `latest call + quiet period`. Windows only close when the
//! owner reports the passage of time through [`take_due`](Debouncer::take_due);
//! the debouncer never reads a clock itself.
//!
//! The "handler" half of a `(handler, key)` pair is part of `K`: callers
//! that debounce several kinds of work for the same target encode the kind
//! in the key.

use std::collections::HashMap;
use std::hash::Hash;

use chrono::TimeDelta;

use hkbridge_domain::time::Timestamp;

struct Window<A> {
    last_seen: Timestamp,
    args: A,
}

/// Per-key debounce windows driven by an injected time signal.
pub struct Debouncer<K, A> {
    quiet_period: TimeDelta,
    windows: HashMap<K, Window<A>>,
}

impl<K, A> Debouncer<K, A>
where
    K: Eq + Hash + Clone,
{
    #[must_use]
    pub fn new(quiet_period: TimeDelta) -> Self {
        Self {
            quiet_period,
            windows: HashMap::new(),
        }
    }

    #[must_use]
    pub fn quiet_period(&self) -> TimeDelta {
        self.quiet_period
    }

    /// Register `args` for `key` at time `now`.
    ///
    /// Within an open window the arguments are replaced (last write wins)
    /// and the deadline moves to `now + quiet period`. If the existing
    /// window had already settled before `now` but no time signal closed
    /// it yet, its arguments are returned so the caller can dispatch them;
    /// a fresh window then opens for `args`.
    pub fn schedule(&mut self, key: K, args: A, now: Timestamp) -> Option<A> {
        let fresh = Window {
            last_seen: now,
            args,
        };
        match self.windows.insert(key, fresh) {
            Some(previous) if previous.last_seen + self.quiet_period <= now => Some(previous.args),
            _ => None,
        }
    }

    /// Drop the pending window for `key`, returning its arguments.
    pub fn cancel(&mut self, key: &K) -> Option<A> {
        self.windows.remove(key).map(|w| w.args)
    }

    /// Drop every pending window whose key matches `predicate`.
    ///
    /// Returns how many windows were cancelled.
    pub fn cancel_where(&mut self, mut predicate: impl FnMut(&K) -> bool) -> usize {
        let before = self.windows.len();
        self.windows.retain(|key, _| !predicate(key));
        before - self.windows.len()
    }

    #[must_use]
    pub fn is_pending(&self, key: &K) -> bool {
        self.windows.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.windows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// Earliest deadline among open windows.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Timestamp> {
        self.windows
            .values()
            .map(|w| w.last_seen + self.quiet_period)
            .min()
    }

    /// Close every window whose deadline is at or before `now`.
    ///
    /// Returned entries are ordered by deadline.
    pub fn take_due(&mut self, now: Timestamp) -> Vec<(K, A)> {
        let quiet = self.quiet_period;
        let mut due: Vec<(Timestamp, K)> = self
            .windows
            .iter()
            .filter(|(_, w)| w.last_seen + quiet <= now)
            .map(|(key, w)| (w.last_seen, key.clone()))
            .collect();
        due.sort_by_key(|(last_seen, _)| *last_seen);

        due.into_iter()
            .filter_map(|(_, key)| {
                let window = self.windows.remove(&key)?;
                Some((key, window.args))
            })
            .collect()
    }

    /// Close due windows and hand each to `handler`. Returns the count.
    pub fn fire_due(&mut self, now: Timestamp, mut handler: impl FnMut(K, A)) -> usize {
        let due = self.take_due(now);
        let count = due.len();
        for (key, args) in due {
            handler(key, args);
        }
        count
    }
}
