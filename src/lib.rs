//! Depot: a generic repository data layer.
//!
//! Resolves entity metadata (table name, primary keys, identity and ignored
//! columns), synthesizes parameterized SQL for a fixed set of statement
//! shapes, and manages connection and transaction lifetimes behind a
//! per-entity [`Repository`]. The wire-level database client plugs in
//! behind the [`Client`] trait.

pub use depot_core::*;
