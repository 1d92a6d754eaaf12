//! # BoxHire Worker Library
//!
//! Background maintenance for the hiring portal. The only job today is the
//! expiry sweep, which moves `CURRENT` jobs past their deadline to `PAST`.
//!
//! ## Modules
//!
//! - `config`: environment configuration
//! - `sweeper`: the periodic expiry loop

pub mod config;
pub mod sweeper;
