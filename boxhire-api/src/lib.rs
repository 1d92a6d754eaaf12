//! # BoxHire API Server Library
//!
//! HTTP API for the subscription box advisor and the campus hiring portal.
//!
//! ## Modules
//!
//! - `app`: application state, router and auth layers
//! - `config`: configuration from environment variables
//! - `error`: error type and HTTP response mapping
//! - `extract`: JSON, query and path extractors with API rejections
//! - `middleware`: security headers
//! - `routes`: route handlers grouped by resource
//! - `validation`: custom field validators

pub mod app;
pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod routes;
pub mod validation;
