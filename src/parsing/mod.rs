//! Parsers for roster files, roster configuration, and registrar exports.
//!
//! This module provides parsers for:
//!
//! - **Roster CSV files**: one student per row, columns found by header name
//! - **Roster configuration**: the `ROSTERS` / `COURSESECTIONS` encodings
//! - **Registrar exports**: section rosters downloaded from the registrar,
//!   converted into roster CSV files
//!
//! ## Example
//!
//! ```rust,no_run
//! use roster_match::parsing::roster::parse_roster_file;
//! use std::path::Path;
//!
//! let rows = parse_roster_file(Path::new("roster.csv")).unwrap();
//! for row in &rows {
//!     println!("{} {} <{}>", row.first_name, row.last_name, row.email);
//! }
//! ```
//!
//! ## Accepted Roster Headers
//!
//! Header names are matched case-sensitively; the last listed spelling
//! present in the header is used, and a repeated name uses its last column.
//!
//! | Field | Accepted headers |
//! |-------|------------------|
//! | First name | `firstName`, `first`, `First` |
//! | Last name | `lastName`, `last`, `Last` |
//! | Email | `primaryEmail`, `Email`, `email1` |

pub mod config;
pub mod mycap;
pub mod roster;
