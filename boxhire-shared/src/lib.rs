//! # BoxHire Shared Library
//!
//! Types, persistence and business rules shared by the BoxHire API server
//! and the background worker.
//!
//! ## Module Organization
//!
//! - `db`: connection pool and migration runner
//! - `auth`: password hashing, JWT issuing, request authentication
//! - `models`: database models and the workflow state machines
//! - `pagination`: page/limit normalisation for list endpoints
//! - `export`: CSV rendering for staff lists

pub mod auth;
pub mod db;
pub mod export;
pub mod models;
pub mod pagination;

/// Current version of the BoxHire shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
