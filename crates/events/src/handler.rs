use crate::{Command, Event};

/// Handles a command and emits events (command handler abstraction).
///
/// This trait provides a generic interface for command handling that's
/// independent of the aggregate lifecycle. It's useful for:
///
/// - **Testing**: simple command handlers for integration tests
/// - **Alternative patterns**: handlers that don't use the full aggregate
///   lifecycle
///
/// ## Relationship to Aggregate Trait
///
/// The `Aggregate` trait provides `handle()` which is similar, but integrated
/// with the full lifecycle (version tracking, state management).
/// `CommandHandler` is a simpler, standalone command → events transformation.
pub trait CommandHandler {
    type Cmd: Command;
    type Ev: Event;
    type Error: core::fmt::Debug + Send + Sync + 'static;

    fn handle(&self, command: Self::Cmd) -> Result<Vec<Self::Ev>, Self::Error>;
}

/// Execute an aggregate command deterministically (no IO, no async).
///
/// The canonical lifecycle in one step:
///
/// 1. **Decide**: calls `aggregate.handle(command)` to get events (pure, no
///    mutation)
/// 2. **Evolve**: applies each event to the aggregate via
///    `aggregate.apply(event)`
///
/// A rejected command returns before any `apply`, so failures never leave
/// partial state behind.
///
/// The aggregate is responsible for maintaining its own version tracking
/// consistently during `apply()` (typically +1 per applied event).
pub fn execute<A>(aggregate: &mut A, command: &A::Command) -> Result<Vec<A::Event>, A::Error>
where
    A: merx_core::Aggregate,
{
    let events = A::handle(aggregate, command)?;
    for ev in &events {
        A::apply(aggregate, ev);
    }
    Ok(events)
}
