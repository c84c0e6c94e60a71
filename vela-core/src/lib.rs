pub mod memory;
pub mod models;
pub mod repository;

pub use models::{
    DateOccupancy, ListingPrice, MarketFactor, PricingAudit, PricingRun, RoomType, SuggestedPrice,
};
pub use repository::{
    ListingPriceRepository, MarketFactorRepository, OccupancyProvider, PricingAuditRepository,
    PricingRulesRepository, PricingRunRepository, RepoError, RoomTypeRepository,
    SeasonalityRepository,
};
