//! Core Module - Rating Engine
//!
//! Rate table and premium calculator. No I/O, no HTTP, no shared mutable state.

pub mod calculator;
pub mod rate_table;

pub use calculator::*;
pub use rate_table::*;
