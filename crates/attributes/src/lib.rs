//! Attribute registry domain module (event-sourced).
//!
//! The open, extensible sets of reusable descriptive values (colors,
//! materials, sizes, finishes) that variants draw from, implemented purely as
//! deterministic domain logic (no IO, no HTTP, no storage).

pub mod registry;

pub use registry::{
    AttributeCommand, AttributeEvent, AttributeKind, AttributeRegistry, AttributeValue,
    DefineValue, RegistryId, ValueDefined, default_code_for,
};
