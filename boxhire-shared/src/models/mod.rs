/// Database models for BoxHire
///
/// # Box advisor
///
/// - `user`: accounts and roles (shared by both applications)
/// - `category`, `subscription_box`, `review`: the catalogue and its reviews
/// - `dashboard`: read-only aggregates
///
/// # Hiring portal
///
/// - `organization`: company and college records owned by portal accounts
/// - `employee`, `mentor`: staff lists scoped to their organisation
/// - `collaboration`: company ↔ college request workflow
/// - `job`: job approval and mentor assignment workflow
/// - `transition`: error type shared by the two workflows

pub mod category;
pub mod collaboration;
pub mod dashboard;
pub mod employee;
pub mod job;
pub mod mentor;
pub mod organization;
pub mod review;
pub mod subscription_box;
pub mod transition;
pub mod user;
