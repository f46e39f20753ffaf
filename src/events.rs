//! Dispatch lifecycle events.
//!
//! A [`DispatchChain`](crate::DispatchChain) can report every state
//! transition of its requests on an async stream. Reporting is best effort:
//! a full or closed channel never affects the dispatch.

use std::pin::Pin;

use futures_core::Stream;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

/// Buffer size used when the host has no better estimate.
pub const DEFAULT_EVENT_BUFFER: usize = 100;

/// Boxed async stream of lifecycle events.
pub type EventStream = Pin<Box<dyn Stream<Item = DispatchEvent> + Send>>;

/// States a request passes through while it executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DispatchState {
    /// `execute()` was entered
    Created,
    /// The request context is on top of the stack
    ContextPushed,
    /// A handler was resolved and instantiated
    RouteResolved,
    /// Namespace search paths were added
    PathsExtended,
    /// The handler returned
    HandlerInvoked,
    /// A failure was caught after the context was pushed
    ErrorCaught,
    /// Transient search paths were removed
    PathsRestored,
    /// The request context left the stack
    ContextPopped,
    /// The request completed with a response
    Done,
}

/// A state transition of one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchEvent {
    /// The state entered
    pub state: DispatchState,
    /// Normalized resource of the request
    pub resource: String,
    /// Context stack depth when the state was entered
    pub depth: usize,
}

/// Sending half of a lifecycle event stream.
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: mpsc::Sender<DispatchEvent>,
}

impl EventSender {
    /// Report an event without waiting.
    ///
    /// The event is handed back when the channel is full or closed.
    pub fn try_send(&self, event: DispatchEvent) -> Result<(), DispatchEvent> {
        self.tx.try_send(event).map_err(|e| match e {
            mpsc::error::TrySendError::Full(v) => v,
            mpsc::error::TrySendError::Closed(v) => v,
        })
    }

    /// Whether the stream was dropped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Create a sender and the stream it feeds.
///
/// At most `buffer` unread events are kept; later ones are dropped until the
/// stream catches up. A zero buffer is raised to one.
///
/// # Example
///
/// ```rust
/// use hmvc_dispatch::{create_stream, DEFAULT_EVENT_BUFFER};
///
/// let (sender, _events) = create_stream(DEFAULT_EVENT_BUFFER);
/// assert!(!sender.is_closed());
/// ```
pub fn create_stream(buffer: usize) -> (EventSender, EventStream) {
    let (tx, rx) = mpsc::channel(buffer.max(1));
    let stream: EventStream = Box::pin(ReceiverStream::new(rx));
    (EventSender { tx }, stream)
}
