//! Core types for sizewise.
//!
//! This crate provides the data structures shared by the scanning engine and its
//! consumers: the size-sorted result tree, filesystem metadata, scan configuration
//! and errors.

mod config;
mod entry;
mod error;
mod format;

pub use config::{ScanConfig, ScanConfigBuilder, ScanConfigBuilderError};
pub use entry::{DirEntry, EntryKind, Stat};
pub use error::ScanError;
pub use format::{format_size, percent_of, skipped_percent};
