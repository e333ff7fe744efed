//! CLI command implementations
//!
//! This module contains all CLI command implementations.

pub mod flatten;
pub mod init;
pub mod validate;
