//! Event publishing/subscription abstraction (mechanics only).
//!
//! A pub/sub mechanism for distributing applied events to consumers - in this
//! codebase, open editor screens observing the same catalog session (the
//! same role the store-subscription broadcast plays in the editing UI).
//!
//! The bus is intentionally **lightweight**:
//!
//! - **Transport-agnostic**: works with in-memory channels or anything else
//! - **At-least-once delivery**: consumers must be idempotent
//! - **No persistence**: the bus is for distribution, not storage; the
//!   persistence collaborator owns the record of truth
//!
//! Events are applied to the aggregate first, then published. A publish
//! failure never un-applies an event.

use std::sync::Arc;
use std::sync::mpsc::Receiver;
use std::time::Duration;

/// A subscription to an event stream.
///
/// Each subscription gets a copy of all events published to the bus
/// (broadcast semantics). Subscriptions are designed for single-threaded
/// consumption; messages arrive in publish order for a single publisher.
#[derive(Debug)]
pub struct Subscription<M> {
    receiver: Receiver<M>,
}

impl<M> Subscription<M> {
    pub fn new(receiver: Receiver<M>) -> Self {
        Self { receiver }
    }

    /// Block until the next message is available.
    pub fn recv(&self) -> Result<M, std::sync::mpsc::RecvError> {
        self.receiver.recv()
    }

    /// Try to receive a message without blocking.
    pub fn try_recv(&self) -> Result<M, std::sync::mpsc::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Block for up to `timeout` waiting for a message.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<M, std::sync::mpsc::RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }
}

/// Domain-agnostic event bus (pub/sub abstraction).
///
/// `publish()` can fail; failures are surfaced to the caller, which may retry
/// or log. Since events are already applied (and handed to persistence),
/// retrying publication is safe.
///
/// The trait requires `Send + Sync` so a bus can be shared across threads;
/// multiple publishers may publish concurrently.
pub trait EventBus<M>: Send + Sync {
    type Error: core::fmt::Debug + Send + Sync + 'static;

    fn publish(&self, message: M) -> Result<(), Self::Error>;

    fn subscribe(&self) -> Subscription<M>;
}

impl<M, B> EventBus<M> for Arc<B>
where
    B: EventBus<M> + ?Sized,
{
    type Error = B::Error;

    fn publish(&self, message: M) -> Result<(), Self::Error> {
        (**self).publish(message)
    }

    fn subscribe(&self) -> Subscription<M> {
        (**self).subscribe()
    }
}
