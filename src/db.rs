pub mod user_repo;
pub use user_repo::UserRepository;
pub mod lead_repo;
pub use lead_repo::LeadRepository;
pub mod contract_repo;
pub use contract_repo::ContractRepository;
pub mod dashboard_repo;
pub use dashboard_repo::DashboardRepository;
pub mod activity_repo;
pub use activity_repo::ActivityRepository;
