//! Shared utilities for the tr-sim CLI

pub mod format;
pub mod table;

pub use format::*;
pub use table::*;
