use crate::bucket::{BucketTable, OccupancyGrid};
use serde::Deserialize;
use std::collections::HashMap;

/// Per-room-type pricing tunables, upserted by admin tooling as a JSON
/// document. An absent document behaves as `PricingRules::default()`:
/// every lookup falls back to its neutral value.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PricingRules {
    /// Weekday short name ("Mon".."Sun") to factor.
    pub dow_adjustments: HashMap<String, f64>,
    /// Days-out to factor.
    pub lead_time_curve: BucketTable,
    /// Length-of-stay (nights) to factor.
    pub los_discounts: BucketTable,
    /// Lead-time bucket to occupancy-percent bucket to percent adjustment.
    pub occupancy_grid: OccupancyGrid,
}

impl PricingRules {
    pub fn dow_factor(&self, weekday_name: &str) -> f64 {
        self.dow_adjustments
            .get(weekday_name)
            .copied()
            .unwrap_or(1.0)
    }
}
