pub mod activity;
pub mod auth;
pub mod contracts;
pub mod dashboard;
pub mod health;
pub mod leads;
