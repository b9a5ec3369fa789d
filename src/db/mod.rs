//! Database module: models and schema for persistent storage.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows and the closed enums
//! - `schema.rs`: SQL DDL for initializing the database (SQLite-first)
//! - `sqlite.rs`: the `Storage` handle with all queries

pub mod models;
pub mod schema;
pub mod sqlite;

pub use models::{Account, ImageAsset, ImageCategory, Inquiry, InquiryStatus, Testimonial};
pub use schema::SQLITE_INIT;
pub use sqlite::{SqlitePool, Storage};
