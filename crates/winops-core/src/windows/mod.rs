//! Top-level window discovery.
//!
//! One enumeration pass produces a snapshot of [`types::WindowRecord`]s;
//! [`filter`] applies the caller's title criteria to that snapshot. Records
//! are value copies; no live OS handle survives past the snapshot.

pub mod enumerate;
pub mod errors;
pub mod filter;
pub mod handler;
pub mod types;
