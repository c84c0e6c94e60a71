pub mod app_config;
pub mod audit_repo;
pub mod calendar_repo;
pub mod database;
pub mod room_type_repo;
pub mod rules_repo;
pub mod seasonality_repo;
pub mod signals_repo;

pub use app_config::Config;
pub use audit_repo::{PostgresPricingAuditRepository, PostgresPricingRunRepository};
pub use calendar_repo::PostgresListingPriceRepository;
pub use database::DbClient;
pub use room_type_repo::PostgresRoomTypeRepository;
pub use rules_repo::PostgresPricingRulesRepository;
pub use seasonality_repo::PostgresSeasonalityRepository;
pub use signals_repo::{PostgresMarketFactorRepository, PostgresOccupancyProvider};
