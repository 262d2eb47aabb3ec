//! Allocation and collection types for glsim.
//!
//! This module provides:
//! - Re-exports of hash collections using AHash
//! - [`ObjectTable`], generational storage for emulated objects

pub mod object_table;

pub use ahash::{AHashMap as HashMap, AHashSet as HashSet, RandomState};
pub use object_table::{ObjectTable, Slot};
