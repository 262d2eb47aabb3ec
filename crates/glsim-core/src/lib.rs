//! glsim Core
//!
//! Foundations shared by the glsim emulator crates: generational object
//! storage, small geometry types, math re-exports used for uniform values,
//! logging setup and optional profiling.

pub mod alloc;
pub mod geometry;
pub mod logging;
pub mod math;
pub mod profiling;
