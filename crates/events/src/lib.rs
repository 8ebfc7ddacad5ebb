//! Event mechanics shared by the domain crates.
//!
//! Events are facts emitted by aggregate decision logic; this crate carries
//! the abstractions for describing, enveloping and distributing them. No IO,
//! no storage - the in-memory bus exists so open editor screens can observe
//! changes as they are applied.

pub mod bus;
pub mod command;
pub mod envelope;
pub mod event;
pub mod handler;
pub mod in_memory_bus;

pub use bus::{EventBus, Subscription};
pub use command::Command;
pub use envelope::EventEnvelope;
pub use event::Event;
pub use handler::{CommandHandler, execute};
pub use in_memory_bus::{InMemoryBusError, InMemoryEventBus};
