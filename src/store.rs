use crossbeam_channel::{Receiver, Sender};
use std::cell::Cell;
use std::rc::Rc;
use tracing::{debug, warn};

use crate::clock::{epoch_seconds, Clock, ClockError};

/// Shared "current timestamp" for every countdown on screen.
///
/// Holds one value, `now`, in whole epoch seconds. The only way to change it is
/// [`ClockStore::refresh_now`], which an external driver calls about once per
/// second. Readers get live, read-only handles via [`ClockStore::reader`] or
/// change notifications via [`ClockStore::subscribe`].
///
/// The store lives on a single execution context (the UI thread) and is not
/// `Send`.
pub struct ClockStore<C: Clock> {
    clock: C,
    now: Rc<Cell<i64>>,
    subscribers: Vec<Sender<i64>>,
}

impl<C: Clock> ClockStore<C> {
    /// Create the store with `now` set from the clock.
    pub fn new(clock: C) -> Result<Self, ClockError> {
        let now = epoch_seconds(clock.now_millis()?);
        debug!("Clock store initialized at {}", now);

        Ok(Self {
            clock,
            now: Rc::new(Cell::new(now)),
            subscribers: Vec::new(),
        })
    }

    /// Last committed value.
    pub fn now(&self) -> i64 {
        self.now.get()
    }

    /// Re-read the clock and commit the floored value.
    ///
    /// On failure `now` is left untouched and the error goes back to the
    /// driver, which should skip the tick.
    pub fn refresh_now(&mut self) -> Result<(), ClockError> {
        let next = epoch_seconds(self.clock.now_millis()?);
        let previous = self.now.get();

        if next == previous {
            return Ok(());
        }
        if next < previous {
            warn!("Wall clock moved backward from {} to {}", previous, next);
        }

        self.now.set(next);
        self.notify(next);
        Ok(())
    }

    pub fn reader(&self) -> NowReader {
        NowReader {
            now: Rc::clone(&self.now),
        }
    }

    /// Register for change notifications. Each committed change is pushed
    /// once; same-second refreshes push nothing.
    pub fn subscribe(&mut self) -> NowSubscription {
        let (tx, rx) = crossbeam_channel::unbounded();
        self.subscribers.push(tx);
        NowSubscription { receiver: rx }
    }

    pub fn observer_count(&self) -> usize {
        self.subscribers.len()
    }

    fn notify(&mut self, value: i64) {
        let before = self.subscribers.len();
        // A failed send means the subscription was dropped
        self.subscribers.retain(|tx| tx.send(value).is_ok());

        let pruned = before - self.subscribers.len();
        if pruned > 0 {
            debug!("Pruned {} dropped clock subscriptions", pruned);
        }
    }
}

/// Read-only, live view of the store's `now`.
#[derive(Debug, Clone)]
pub struct NowReader {
    now: Rc<Cell<i64>>,
}

impl NowReader {
    pub fn get(&self) -> i64 {
        self.now.get()
    }
}

/// Receives every value the store commits after subscribing.
#[derive(Debug)]
pub struct NowSubscription {
    receiver: Receiver<i64>,
}

impl NowSubscription {
    /// Newest value pushed since the last call, if any.
    pub fn latest(&self) -> Option<i64> {
        self.receiver.try_iter().last()
    }
}
