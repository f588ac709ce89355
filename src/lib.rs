//! Bakerboard - a small HTTP record service
//!
//! Bakerboard keeps two independent sets of records behind a JSON API:
//! - Messages posted by users, with creation and update timestamps
//! - Bakeries and the baked goods they sell
//!
//! Every request is handled against a shared [`storage::RecordStore`],
//! backed by SQLite.

pub mod api;
pub mod config;
pub mod error;
pub mod storage;
pub mod types;

pub use error::{Error, Result};
