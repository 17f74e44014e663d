use crate::{DomainEvent, Event, HandlerError};

/// A single-purpose reaction to one kind of event.
///
/// Each handler is bound to exactly one payload type through [`Self::Event`],
/// which is also how the dispatcher knows which list to register it under.
/// Handlers are shared with the dispatcher through `Arc`, so any state they
/// keep must be internally synchronized.
pub trait EventHandler: Send + Sync + 'static {
    /// The event this handler reacts to.
    type Event: Event;

    /// Returns the handler name used in logs and registry introspection.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Reacts to an event.
    ///
    /// Returning an error stops delivery of this event to handlers registered
    /// after this one.
    fn handle(&self, event: &DomainEvent<Self::Event>) -> Result<(), HandlerError>;
}
