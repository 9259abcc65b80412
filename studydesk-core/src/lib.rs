//! Studydesk Core Library
//!
//! Domain vocabulary for the studydesk resource assistant:
//! - Subject codes identify courses and are detected inside free text
//! - Units, resource kinds, and links address one stored resource field
//! - Listings present a subject as a fixed six-unit table
//! - Import entries validate bulk JSON uploads one item at a time

pub mod error;
pub mod import;
pub mod listing;
pub mod resource;
pub mod subject;

pub use error::Error;
pub use import::{ImportEntry, RawEntry};
pub use listing::{SubjectListing, UnitLinks};
pub use resource::{Link, ResourceKind, Unit};
pub use subject::SubjectCode;

/// Result type for studydesk-core operations
pub type Result<T> = std::result::Result<T, Error>;
