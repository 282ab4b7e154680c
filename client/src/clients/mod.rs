//! Typed facades, one per backend domain. Every facade is a thin
//! surface over [`crate::ApiClient`]; the authorization policy,
//! renewal and logout behavior live entirely in the shared transport.

pub mod agentic_services;
pub mod badges;
pub mod devices;
pub mod iam;
pub mod policies;
pub mod settings;

pub use agentic_services::AgenticServicesClient;
pub use badges::BadgeClient;
pub use devices::DevicesClient;
pub use iam::IamClient;
pub use policies::PolicyClient;
pub use settings::SettingsClient;
