pub mod audit;
pub mod auth;
pub mod error_details;
pub mod rbac;
