//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value** - two with the
/// same attribute values are the same value. To "modify" one, build a new
/// one. Identity does not matter, only the values do.
///
/// ## Value Object vs Entity
///
/// - **Value Object**: no identity (`Dimensions { 100, 40, 20 }` equals any
///   other `Dimensions { 100, 40, 20 }`)
/// - **Entity**: has identity (two variants with the same id are the same
///   variant, even at different prices)
///
/// The trait requires `Clone + PartialEq + Debug` so values can be copied,
/// compared and logged freely.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
