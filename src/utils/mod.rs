//! Filesystem helpers: submission archives and destination-path validation.

pub mod archive;
pub mod validation;
