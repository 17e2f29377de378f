//! Shared helpers for the obelisk crates: value parsing, calldata shaping and
//! cooperative cancellation.

pub mod calldata;
pub mod parsers;
pub mod service;
