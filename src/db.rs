pub mod activity_repo;
pub use activity_repo::ActivityLogRepository;
pub mod analytics_repo;
pub use analytics_repo::AnalyticsRepository;
pub mod inventory_repo;
pub use inventory_repo::InventoryRepository;
pub mod request_repo;
pub use request_repo::RequestRepository;
pub mod user_repo;
pub use user_repo::UserRepository;
