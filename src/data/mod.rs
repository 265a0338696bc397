//! Data layer module
//!
//! Handles all data persistence:
//! - SQLite database operations
//! - Pagination primitives
//! - Entity models and read views

mod database;
mod models;
mod page;

pub use database::Database;
pub use models::*;
pub use page::{Page, PageParams, PageRequest, MAX_PAGE_SIZE};

#[cfg(test)]
mod database_test;
