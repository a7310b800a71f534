//! Value object trait: equality by value, not identity.
//!
//! Value objects have **no identity**; they are defined entirely by their attribute
//! values. A postal address copied from a customer onto its main site is the same
//! value, not a shared reference.

/// Marker trait for value objects.
///
/// - **Value Object**: no identity (two values with the same fields are equal)
/// - **Entity**: has identity (two documents with the same id are the same document)
///
/// The trait requires `Clone + PartialEq + Debug` so values can be copied between
/// documents, compared in tests and logged.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
