use merx_core::AggregateId;

/// A command targets a specific aggregate (command abstraction).
///
/// Commands represent **intent** - a request to perform an action on an
/// aggregate. They are **transient** (not persisted) and are transformed into
/// events (which are the facts).
///
/// ## Command vs Event
///
/// - **Command**: intent to do something (e.g. "Add variant X")
/// - **Event**: fact that something happened (e.g. "VariantAdded { .. }")
///
/// Commands are rejected if invalid (validation errors). Events represent
/// accepted changes.
///
/// ## Aggregate Targeting
///
/// Commands must specify which aggregate they target via
/// `target_aggregate_id()`. Each command operates on exactly one aggregate -
/// that is the consistency boundary; an editor screen never mutates two items
/// with one command.
///
/// ## Design Constraints
///
/// Commands must be `Clone` (retries, logging), `Send + Sync + 'static`
/// (they may cross thread boundaries on the bus side), and own all their
/// data.
pub trait Command: Clone + core::fmt::Debug + Send + Sync + 'static {
    fn target_aggregate_id(&self) -> AggregateId;
}
