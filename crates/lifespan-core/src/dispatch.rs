//! Named-event publish/subscribe.
//!
//! [`Dispatcher`] keeps, per [`EventName`], an ordered list of handlers.
//! [`Dispatcher::publish`] runs the handlers registered under the event's
//! name synchronously and in registration order, handing each one the same
//! mutable context. The first handler error stops the remaining handlers of
//! that event and is returned to the publisher.
//!
//! The dispatcher does not own the context; the caller lends it for the
//! duration of one publish.

use std::collections::BTreeMap;
use std::fmt;

use lifespan_types::{DashboardEvent, EventName};
use tracing::debug;

/// A registered event handler.
pub type Handler<C, E> = Box<dyn FnMut(&mut C, &DashboardEvent) -> Result<(), E>>;

/// Position of a handler within its event's list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId {
    /// Event the handler listens to.
    pub event: EventName,
    /// Zero-based registration position.
    pub position: usize,
}

/// Ordered handler lists keyed by event name.
pub struct Dispatcher<C, E> {
    handlers: BTreeMap<EventName, Vec<Handler<C, E>>>,
}

impl<C, E> Dispatcher<C, E> {
    /// A dispatcher with no subscriptions.
    pub const fn new() -> Self {
        Self {
            handlers: BTreeMap::new(),
        }
    }

    /// Register `handler` to run on every `event`, after any handlers
    /// already registered for it.
    pub fn subscribe<F>(&mut self, event: EventName, handler: F) -> SubscriptionId
    where
        F: FnMut(&mut C, &DashboardEvent) -> Result<(), E> + 'static,
    {
        let list = self.handlers.entry(event).or_default();
        list.push(Box::new(handler));
        SubscriptionId {
            event,
            position: list.len().saturating_sub(1),
        }
    }

    /// Run every handler registered under `event.name()`, in order.
    ///
    /// Returns how many handlers ran. An event nobody subscribed to runs
    /// nothing and returns `Ok(0)`.
    ///
    /// # Errors
    ///
    /// Returns the first handler error; handlers after it do not run.
    pub fn publish(&mut self, ctx: &mut C, event: &DashboardEvent) -> Result<usize, E> {
        let name = event.name();
        let Some(list) = self.handlers.get_mut(&name) else {
            debug!(event = %name, "no subscribers");
            return Ok(0);
        };

        let mut ran = 0_usize;
        for (position, handler) in list.iter_mut().enumerate() {
            debug!(event = %name, position, "running handler");
            handler(ctx, event)?;
            ran = ran.saturating_add(1);
        }
        Ok(ran)
    }

    /// Number of handlers registered for `event`.
    pub fn handler_count(&self, event: EventName) -> usize {
        self.handlers.get(&event).map_or(0, Vec::len)
    }

    /// Event names with at least one handler.
    pub fn subscribed_events(&self) -> impl Iterator<Item = EventName> + '_ {
        self.handlers
            .iter()
            .filter(|(_, list)| !list.is_empty())
            .map(|(name, _)| *name)
    }
}

impl<C, E> Default for Dispatcher<C, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C, E> fmt::Debug for Dispatcher<C, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: BTreeMap<EventName, usize> = self
            .handlers
            .iter()
            .map(|(name, list)| (*name, list.len()))
            .collect();
        f.debug_struct("Dispatcher")
            .field("handlers", &counts)
            .finish()
    }
}
