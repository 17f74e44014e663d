//! Synchronous publish/subscribe of domain events.

use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::{DomainEvent, Event, EventHandler, HandlerError};

type Registry = HashMap<&'static str, Vec<Subscription>>;

/// Type-erased view of a handler so lists for different payloads share a map.
trait ErasedHandler: Send + Sync {
    fn handle_any(&self, event: &dyn Any) -> Result<(), HandlerError>;
}

struct Typed<H>(Arc<H>);

impl<H: EventHandler> ErasedHandler for Typed<H> {
    fn handle_any(&self, event: &dyn Any) -> Result<(), HandlerError> {
        match event.downcast_ref::<DomainEvent<H::Event>>() {
            Some(event) => self.0.handle(event),
            None => {
                // Two payload types claimed the same tag.
                let event_type = <H::Event as Event>::EVENT_TYPE;
                tracing::warn!(
                    handler = self.0.name(),
                    event_type,
                    "skipping handler registered for a different payload type"
                );
                Ok(())
            }
        }
    }
}

/// One registered handler.
#[derive(Clone)]
pub struct Subscription {
    handler_name: &'static str,
    handler_addr: usize,
    handler: Arc<dyn ErasedHandler>,
}

impl Subscription {
    fn new<H: EventHandler>(handler: Arc<H>) -> Self {
        Self {
            handler_name: handler.name(),
            handler_addr: addr_of(&handler),
            handler: Arc::new(Typed(handler)),
        }
    }

    /// Returns the name of the registered handler.
    pub fn handler_name(&self) -> &'static str {
        self.handler_name
    }

    /// Returns true if this subscription holds exactly this handler instance.
    pub fn is<H: EventHandler>(&self, handler: &Arc<H>) -> bool {
        self.handler_addr == addr_of(handler)
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("handler_name", &self.handler_name)
            .finish_non_exhaustive()
    }
}

fn addr_of<H>(handler: &Arc<H>) -> usize {
    Arc::as_ptr(handler) as *const () as usize
}

/// Routes domain events to the handlers registered for their event type.
///
/// The dispatcher is an ordinary value: create one per owner and hand it to
/// collaborators (usually as `Arc<EventDispatcher>`). Delivery is synchronous
/// and in registration order; the first failing handler aborts the rest of
/// that notification.
///
/// Registry access is guarded by a read/write lock, so one dispatcher can be
/// shared across threads. Handlers run after the lock is released and may
/// register or unregister handlers themselves.
#[derive(Default)]
pub struct EventDispatcher {
    registry: RwLock<Registry>,
}

impl EventDispatcher {
    /// Creates a dispatcher with no handlers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a handler to the list for its event type.
    ///
    /// Registering the same instance twice delivers each event to it twice.
    pub fn register<H: EventHandler>(&self, handler: Arc<H>) {
        let event_type = <H::Event as Event>::EVENT_TYPE;
        let subscription = Subscription::new(handler);
        tracing::debug!(
            event_type,
            handler = subscription.handler_name,
            "registering event handler"
        );
        self.write()
            .entry(event_type)
            .or_default()
            .push(subscription);
    }

    /// Removes the first registration of this handler instance.
    ///
    /// Does nothing if it is not registered. The event type stays in the
    /// registry even when its last handler is removed.
    pub fn unregister<H: EventHandler>(&self, handler: &Arc<H>) {
        let event_type = <H::Event as Event>::EVENT_TYPE;
        let mut registry = self.write();
        if let Some(subscriptions) = registry.get_mut(event_type)
            && let Some(position) = subscriptions.iter().position(|s| s.is(handler))
        {
            subscriptions.remove(position);
            tracing::debug!(event_type, handler = handler.name(), "unregistered event handler");
        }
    }

    /// Drops every registration for every event type.
    pub fn unregister_all(&self) {
        self.write().clear();
        tracing::debug!("unregistered all event handlers");
    }

    /// Delivers an event to every handler registered for its type.
    ///
    /// With no handlers registered this is a no-op. A handler error is
    /// returned unchanged and the remaining handlers are not called.
    #[tracing::instrument(skip(self, event), fields(event_type = E::EVENT_TYPE, event_id = %event.event_id()))]
    pub fn notify<E: Event>(&self, event: &DomainEvent<E>) -> Result<(), HandlerError> {
        let subscriptions = {
            let registry = self.read();
            match registry.get(E::EVENT_TYPE) {
                Some(subscriptions) if !subscriptions.is_empty() => subscriptions.clone(),
                _ => {
                    tracing::trace!("no handlers registered");
                    return Ok(());
                }
            }
        };

        for subscription in &subscriptions {
            if let Err(err) = subscription.handler.handle_any(event) {
                metrics::counter!("domain_event_handler_failures_total", "event_type" => E::EVENT_TYPE)
                    .increment(1);
                tracing::warn!(
                    handler = subscription.handler_name,
                    error = %err,
                    "event handler failed, aborting notification"
                );
                return Err(err);
            }
        }

        metrics::counter!("domain_events_dispatched_total", "event_type" => E::EVENT_TYPE)
            .increment(1);

        tracing::debug!(handlers = subscriptions.len(), "event delivered");
        Ok(())
    }

    /// Returns a live read-only view of the registry.
    ///
    /// The view holds the registry's read lock; drop it before registering or
    /// unregistering on the same thread.
    pub fn registry(&self) -> RegistryView<'_> {
        RegistryView {
            registry: self.read(),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Registry> {
        self.registry.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Registry> {
        self.registry.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("registry", &*self.read())
            .finish()
    }
}

/// Read access to the handlers currently registered on a dispatcher.
pub struct RegistryView<'a> {
    registry: RwLockReadGuard<'a, Registry>,
}

impl RegistryView<'_> {
    /// Returns the handlers for an event type, or `None` if the type has
    /// never been registered (or was cleared by `unregister_all`).
    pub fn handlers(&self, event_type: &str) -> Option<&[Subscription]> {
        self.registry.get(event_type).map(Vec::as_slice)
    }

    /// Returns true if the event type has an entry, even an empty one.
    pub fn contains(&self, event_type: &str) -> bool {
        self.registry.contains_key(event_type)
    }

    /// Returns the registered event types in no particular order.
    pub fn event_types(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.registry.keys().copied()
    }

    /// Returns true if no event type has an entry.
    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }
}
