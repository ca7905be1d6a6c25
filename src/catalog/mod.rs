//! Loaded rosters and the students they enroll.
//!
//! - [`registry`]: unique students with email, full-name and last-name indices
//! - [`store`]: the [`RosterCatalog`](store::RosterCatalog) of courses loaded from roster CSVs
//! - [`inference`]: picking the course a batch of submissions belongs to

pub mod inference;
pub mod registry;
pub mod store;
