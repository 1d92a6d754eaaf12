/// API route handlers
///
/// Organized by resource:
///
/// - `health`: health check
/// - `auth`: registration, login, session and profile
/// - `boxes`: subscription box catalogue
/// - `reviews`: box reviews
/// - `dashboard`: catalogue statistics
/// - `company`: company side of the hiring portal
/// - `college`: college side of the hiring portal
/// - `staff`: employee and mentor request and CSV helpers

pub mod auth;
pub mod boxes;
pub mod college;
pub mod company;
pub mod dashboard;
pub mod health;
pub mod reviews;
pub mod staff;
