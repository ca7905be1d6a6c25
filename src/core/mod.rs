//! Core data types for roster matching.
//!
//! This module provides the fundamental types used throughout the library:
//!
//! - [`Student`](student::Student): A person enrolled in one or more course sections
//! - [`StudentId`](types::StudentId): Stable handle for a student owned by the registry
//! - [`Course`](course::Course): A course section loaded from one roster file
//! - [`name`]: Helpers for cleaning up display names
//!
//! ## Course Labels
//!
//! A course label names a course and its section, e.g. `CS261-9`. The part
//! before the trailing `-section` is the course prefix (`CS261`), which is
//! how sections of the same course are grouped and merged.
//!
//! | Label      | Prefix  | Section |
//! |------------|---------|---------|
//! | CS261-9    | CS261   | 9       |
//! | CS160-12   | CS160   | 12      |
//! | CS410      | CS410   | (none)  |

pub mod course;
pub mod name;
pub mod student;
pub mod types;
