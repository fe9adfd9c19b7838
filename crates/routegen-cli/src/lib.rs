//! Routegen CLI library.
//!
//! Terminal styling and output formatting shared by the `routegen-cli`
//! binary and its tests.

pub mod output;
pub mod terminal;
