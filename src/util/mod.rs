//! Utility functions
//!
//! Number/text conversion helpers used by the coercion module.

pub mod dtoa;
