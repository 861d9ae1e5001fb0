//! Typed data layer for Cloud Spanner.
//!
//! This crate re-exports the dialect neutral core: values and their conversions, table
//! specifications, the executor traits and the SQL writer. The Spanner dialect itself lives
//! in `cloudspan-spanner`.
pub use cloudspan_core::*;
