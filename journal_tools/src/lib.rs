//! # Journal tools
//!
//! A client for the journal bundle catalog. A journal bundle groups a set of courses and journals that are sold
//! together at a discount. Bundles are fetched by uuid and kept in a transient in-memory cache, since the catalog
//! changes rarely and offer conditions are evaluated on every basket view.
mod api;
mod cache;
mod config;
mod data_objects;
mod error;

pub use api::JournalApi;
pub use cache::TtlCache;
pub use config::JournalApiConfig;
pub use data_objects::{Course, CourseRun, Journal, JournalBundle, Seat};
pub use error::JournalApiError;
