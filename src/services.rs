pub mod activity_service;
pub use activity_service::ActivityService;
pub mod analytics_service;
pub use analytics_service::AnalyticsService;
pub mod inventory_service;
pub use inventory_service::InventoryService;
pub mod request_service;
pub use request_service::RequestService;
