pub mod activity_service;
pub mod auth;
pub mod contract_extractor;
pub mod contract_service;
pub mod dashboard_service;
pub mod geolocation;
pub mod lead_service;
