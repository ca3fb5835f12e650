//! Assignment metadata access for gridbot.
//!
//! This crate provides a trait-based, path-addressed read interface over a
//! unit's assignment/request metadata with a JSON reference implementation.

#![warn(missing_docs)]

pub mod json_data;
pub mod trait_;

pub use json_data::JsonData;
pub use trait_::{DataError, Result, UnitData};
