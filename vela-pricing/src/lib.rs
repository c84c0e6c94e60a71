pub mod bucket;
pub mod calculator;
pub mod rules;
pub mod seasonality;

pub use bucket::{BucketRange, BucketTable, OccupancyGrid};
pub use calculator::{CalculationParams, DateFactors, PriceBreakdown, PriceCalculator, PriceQuote};
pub use rules::PricingRules;
pub use seasonality::{SeasonalityResolver, SeasonalitySetting};
