//! # gridcalc-core
//!
//! Core data types for the gridcalc formula engine.
//!
//! This crate provides the fundamental types shared by the engine:
//! - [`Value`] - Runtime values (numbers, strings, booleans, arrays, empty cells)
//! - Column-letter codec ([`column_index`], [`column_letters`]) for A1-style addressing
//!
//! ## Example
//!
//! ```rust
//! use gridcalc_core::{column_index, Value};
//!
//! assert_eq!(column_index("AA").unwrap(), 27);
//! assert_eq!(Value::from(true).as_number(), Some(1.0));
//! ```

pub mod address;
pub mod error;
pub mod value;

// Re-exports for convenience
pub use address::{column_index, column_letters};
pub use error::{Error, Result};
pub use value::Value;
