//! Business logic between the HTTP handlers and the analyzer/database.

pub mod analysis;
