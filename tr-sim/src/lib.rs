//! tr-sim library
//!
//! Scenario loading and the command implementations behind the `tr-sim`
//! binary.

pub mod cli;
pub mod commands;
pub mod scenario;
pub mod utils;
