use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;
use core::hash::Hash;
use hashbrown::HashMap;

use crate::*;

/// Payload dispatched through an [`EventEmitter`], routed by its kind.
pub trait Event {
    type Kind: Copy + Eq + Hash + fmt::Debug;

    fn kind(&self) -> Self::Kind;
}

/// Handle returned when subscribing, used to unsubscribe a single listener.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(u64);

/// Listeners get the shared context, the event, and the emitter itself so they can emit follow-up events or
/// tear down subscriptions.
pub type Listener<C, E> = Box<dyn FnMut(&mut C, &E, &mut EventEmitter<C, E>) -> Result<()>>;

struct InFlight<K> {
    kind: K,
    detached: Vec<ListenerId>,
    dropped: bool,
}

/// Synchronous publish/subscribe bus keyed by event kind.
///
/// Listeners of a kind run in registration order. An emission goes to the listeners registered when it
/// started; subscriptions changed from inside a listener apply to later emissions. A listener error stops
/// the emission and is returned to the caller of [`emit`](Self::emit).
pub struct EventEmitter<C, E: Event> {
    events: HashMap<E::Kind, Vec<(ListenerId, Listener<C, E>)>>,
    next_id: u64,
    epoch: u64,
    in_flight: Vec<InFlight<E::Kind>>,
}

impl<C, E: Event> EventEmitter<C, E> {
    pub fn new() -> Self {
        Self {
            events: HashMap::new(),
            next_id: 0,
            epoch: 0,
            in_flight: Vec::new(),
        }
    }

    pub fn on<F>(&mut self, kind: E::Kind, listener: F) -> ListenerId
    where
        F: FnMut(&mut C, &E, &mut Self) -> Result<()> + 'static,
    {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.events
            .entry(kind)
            .or_default()
            .push((id, Box::new(listener)));
        id
    }

    /// Runs every listener of `event.kind()`, returns whether there was any.
    pub fn emit(&mut self, ctx: &mut C, event: &E) -> Result<bool> {
        let kind = event.kind();
        let Some(mut listeners) = self.events.remove(&kind) else {
            log::trace!("No listeners for {:?}", kind);
            return Ok(false);
        };

        let epoch = self.epoch;
        self.in_flight.push(InFlight {
            kind,
            detached: Vec::new(),
            dropped: false,
        });

        let mut result = Ok(());
        for (_, listener) in listeners.iter_mut() {
            result = listener(&mut *ctx, event, &mut *self);
            if result.is_err() {
                break;
            }
        }

        let flight = self.in_flight.pop();
        let keep = self.epoch == epoch && flight.as_ref().is_none_or(|flight| !flight.dropped);
        if keep {
            if let Some(flight) = flight {
                listeners.retain(|(id, _)| !flight.detached.contains(id));
            }
            // registered while dispatching, so they go after the existing ones
            if let Some(added) = self.events.remove(&kind) {
                listeners.extend(added);
            }
            if !listeners.is_empty() {
                self.events.insert(kind, listeners);
            }
        }

        result.map(|()| true)
    }

    /// Removes one listener, or every listener of `kind` when `listener` is `None`.
    pub fn off(&mut self, kind: E::Kind, listener: Option<ListenerId>) {
        match listener {
            None => {
                self.events.remove(&kind);
            }
            Some(id) => {
                if let Some(listeners) = self.events.get_mut(&kind) {
                    listeners.retain(|(other, _)| *other != id);
                    if listeners.is_empty() {
                        self.events.remove(&kind);
                    }
                }
            }
        }

        for flight in self.in_flight.iter_mut().filter(|flight| flight.kind == kind) {
            match listener {
                None => flight.dropped = true,
                Some(id) => flight.detached.push(id),
            }
        }
    }

    /// Drops every listener of every kind, including those of an emission in progress.
    pub fn clear(&mut self) {
        self.events.clear();
        self.epoch = self.epoch.wrapping_add(1);
    }

    pub fn listener_count(&self, kind: E::Kind) -> usize {
        self.events.get(&kind).map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl<C, E: Event> Default for EventEmitter<C, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C, E: Event> fmt::Debug for EventEmitter<C, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventEmitter")
            .field("kinds", &self.events.len())
            .field("in_flight", &self.in_flight.len())
            .finish_non_exhaustive()
    }
}

/// Value holder that notifies subscribers whenever the value changes.
pub struct Signal<T> {
    value: T,
    listeners: Vec<(ListenerId, Box<dyn FnMut(&T)>)>,
    next_id: u64,
}

impl<T: PartialEq> Signal<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            listeners: Vec::new(),
            next_id: 0,
        }
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    /// Stores `value` and notifies subscribers, unless it equals the current one.
    pub fn set(&mut self, value: T) -> bool {
        if self.value == value {
            return false;
        }
        self.value = value;
        for (_, listener) in self.listeners.iter_mut() {
            listener(&self.value);
        }
        true
    }

    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&T) + 'static,
    {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(other, _)| *other != id);
        self.listeners.len() != before
    }
}

impl<T: fmt::Debug> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("value", &self.value)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
