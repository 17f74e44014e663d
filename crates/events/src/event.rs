use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(Uuid);

impl EventId {
    /// Creates a new random event ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an event ID from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A payload type that can travel through an [`EventDispatcher`].
///
/// The implementing type is the token handlers are registered against, so a
/// handler for `E` only ever receives `DomainEvent<E>`. `EVENT_TYPE` is the
/// conventional tag shared by publishers and subscribers (e.g.
/// `"ProductCreatedEvent"`) and is what the registry is keyed by.
///
/// [`EventDispatcher`]: crate::EventDispatcher
pub trait Event: Send + Sync + 'static {
    /// The event type tag.
    const EVENT_TYPE: &'static str;
}

/// An immutable domain event: a typed payload stamped with when it occurred.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainEvent<E> {
    event_id: EventId,
    occurred_at: DateTime<Utc>,
    payload: E,
}

impl<E: Event> DomainEvent<E> {
    /// Wraps a payload, stamping it with a fresh ID and the current time.
    pub fn new(payload: E) -> Self {
        Self {
            event_id: EventId::new(),
            occurred_at: Utc::now(),
            payload,
        }
    }

    /// Returns the event type tag of the payload.
    pub fn event_type(&self) -> &'static str {
        E::EVENT_TYPE
    }
}

impl<E> DomainEvent<E> {
    /// Returns the event ID.
    pub fn event_id(&self) -> EventId {
        self.event_id
    }

    /// Returns when the event was constructed.
    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }

    /// Returns the event payload.
    pub fn payload(&self) -> &E {
        &self.payload
    }

    /// Consumes the event, returning its payload.
    pub fn into_payload(self) -> E {
        self.payload
    }
}
