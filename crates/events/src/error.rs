use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error raised by an event handler.
///
/// The dispatcher returns it to the publisher unchanged, and no further
/// handlers run for that notification.
#[derive(Debug, Error)]
#[error("handler {handler} failed: {source}")]
pub struct HandlerError {
    handler: String,
    #[source]
    source: BoxError,
}

impl HandlerError {
    /// Creates a handler error from an underlying cause.
    pub fn new(handler: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self {
            handler: handler.into(),
            source: source.into(),
        }
    }

    /// Returns the name of the handler that failed.
    pub fn handler(&self) -> &str {
        &self.handler
    }
}
