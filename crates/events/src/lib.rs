//! In-process domain events.
//!
//! This crate provides:
//! - [`DomainEvent`], an immutable envelope stamped with when it occurred
//! - [`Event`], the type token tying a payload to its event type tag
//! - [`EventHandler`], a reaction bound to one event type
//! - [`EventDispatcher`], synchronous fan-out of events to registered handlers

pub mod dispatcher;
pub mod error;
pub mod event;
pub mod handler;

pub use dispatcher::{EventDispatcher, RegistryView, Subscription};
pub use error::HandlerError;
pub use event::{DomainEvent, Event, EventId};
pub use handler::EventHandler;
