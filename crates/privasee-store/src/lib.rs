//! Record store adapter for privasee.
//!
//! Records live in a remote Airtable table. This crate maps them onto table
//! rows, assigns sequential `_recordId` values and compiles listing filters
//! into Airtable formulas.
//!
//! # Architecture
//!
//! - [`Table`]: primitive row operations (`select`, `create`, `update`,
//!   `destroy`), implemented by [`AirtableTable`] and [`MemoryTable`]
//! - [`Predicate`]: filter trees, compiled by [`formula::compile`] or
//!   evaluated in memory
//! - [`RecordStore`]: record-level operations, implemented by
//!   [`TableRecordStore`] over any table
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use privasee_core::{NewRecord, RecordFilter};
//! use privasee_store::{MemoryTable, RecordStore, TableRecordStore};
//!
//! # async fn example() -> privasee_store::Result<()> {
//! let store = TableRecordStore::new(Arc::new(MemoryTable::new()));
//!
//! let record = store.create(NewRecord::new("Do you have a DPO?", "alice@x.com")).await?;
//! let found = store.list(&RecordFilter::all().search("dpo")).await?;
//! assert_eq!(found[0].record_id, record.record_id);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod airtable;
pub mod counter;
pub mod error;
pub mod formula;
pub mod mapping;
pub mod memory;
pub mod predicate;
pub mod service;
pub mod table;

pub use airtable::{AirtableConfig, AirtableTable};
pub use counter::IdCounter;
pub use error::{Result, StoreError};
pub use memory::MemoryTable;
pub use predicate::{Literal, Predicate};
pub use service::{RecordStore, TableRecordStore};
pub use table::{Direction, Fields, Row, RowId, RowUpdate, SelectQuery, Sort, Table};
