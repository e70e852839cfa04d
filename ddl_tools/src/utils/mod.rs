//! Utilities for ddl_tools
//!
//! This module provides utility functions used across the library.

pub mod logging;
pub mod naming;

// Re-export key utility functions
pub use naming::{apply_case, quote_identifier, quote_list, to_camel, CaseMode};
