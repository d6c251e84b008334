//! # Bus Types
//!
//! Core data model for the session bus agent: wire type tags, the tagged
//! argument value, owned dictionaries, and remote object targets.
//!
//! ## Philosophy
//!
//! - **Tagged, not variadic**: argument lists are explicit sequences of
//!   [`Value`]s checked against a [`TypeTag`] schema, never untyped varargs
//! - **Owned, not borrowed-and-freed**: [`Dictionary`] owns its keys and
//!   values; release is tied to scope on every exit path
//! - **Immutable targets**: a [`ServiceTarget`] names a remote object and
//!   never changes after construction

pub mod schema;
pub mod target;
pub mod value;

pub use schema::{ScalarKind, TypeTag};
pub use target::ServiceTarget;
pub use value::{Dictionary, Value};
