//! Demo project data: CSV parsing and bulk listing into a [`ProjectStore`].
//!
//! [`ProjectStore`]: solar_core::ProjectStore

pub mod loader;

pub use loader::{DemoDataError, DemoProjectLoader, DemoProjectRecord, builtin_records};
