//! Core types for the privasee record service.
//!
//! This crate provides the types shared by the store adapter and the HTTP API:
//!
//! - **Identifiers**: [`RecordId`], the public integer identity of a record
//! - **Records**: [`Record`], [`NewRecord`], [`RecordPatch`], [`RecordFilter`]
//! - **Properties**: ordered key/value metadata with its string encoding
//!
//! # Example
//!
//! ```
//! use privasee_core::{NewRecord, Properties, Property, RecordId};
//!
//! let id: RecordId = "42".parse().unwrap();
//! assert_eq!(id.get(), 42);
//!
//! let props: Properties = vec![Property::new("region", "EU")].into();
//! let input = NewRecord::new("Do you store backups?", "alice@x.com").properties(props);
//! assert_eq!(input.properties.encode(), "region:EU");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod ids;
pub mod properties;
pub mod record;

pub use error::ValidationError;
pub use ids::{IdError, RecordId};
pub use properties::{Properties, Property};
pub use record::{NewRecord, Record, RecordFilter, RecordPatch};
