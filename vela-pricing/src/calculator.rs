use crate::rules::PricingRules;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Pre-resolved per-date market inputs. Everything here is supplied by
/// external signal pipelines; the calculator never derives these itself.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DateFactors {
    pub seasonality: f64,
    pub demand: f64,
    pub comp_pressure: f64,
    pub manual_multiplier: f64,
    /// Carried into the breakdown for transparency; not multiplied in.
    pub events_weight: f64,
    pub pickup_signal: f64,
    pub availability_signal: f64,
    pub comp_price_signal: f64,
}

impl Default for DateFactors {
    fn default() -> Self {
        Self {
            seasonality: 1.0,
            demand: 1.0,
            comp_pressure: 1.0,
            manual_multiplier: 1.0,
            events_weight: 0.0,
            pickup_signal: 0.0,
            availability_signal: 0.0,
            comp_price_signal: 0.0,
        }
    }
}

/// Everything needed to price one room-type/date cell.
#[derive(Debug, Clone)]
pub struct CalculationParams<'a> {
    pub base_price: f64,
    pub min_price: f64,
    pub max_price: f64,
    pub date: NaiveDate,
    /// Nights in the booking being priced; batch runs price single nights.
    pub length_of_stay: u32,
    /// Days between today and the stay date. Past dates are treated as 0.
    pub days_out: i64,
    pub factors: DateFactors,
    pub rules: &'a PricingRules,
    pub occupancy_pct: f64,
}

/// Every factor that produced a final price, kept for audit and display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    pub base_price: f64,
    pub seasonality: f64,
    pub dow_factor: f64,
    pub lead_time_factor: f64,
    pub los_factor: f64,
    pub demand: f64,
    pub comp_pressure: f64,
    pub manual_multiplier: f64,
    pub events_weight: f64,
    pub occupancy_factor: f64,
    pub occupancy_pct: f64,
    pub orphan_factor: f64,
    pub pickup_signal: f64,
    pub availability_signal: f64,
    pub comp_price_signal: f64,
    pub unclamped_price: f64,
    pub final_price: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PriceQuote {
    pub final_price: f64,
    pub breakdown: PriceBreakdown,
}

/// Combines base price, rule lookups, and the occupancy adjustment into a
/// single clamped nightly rate. Pure: the same params always produce the
/// same quote.
pub struct PriceCalculator;

impl PriceCalculator {
    pub fn calculate(params: &CalculationParams<'_>) -> PriceQuote {
        let days_out = params.days_out.max(0) as f64;
        let factors = params.factors;

        let weekday = params.date.format("%a").to_string();
        let dow_factor = params.rules.dow_factor(&weekday);
        let lead_time_factor = params.rules.lead_time_curve.lookup(days_out, 1.0);
        let los_factor = params
            .rules
            .los_discounts
            .lookup(params.length_of_stay as f64, 1.0);

        let occupancy_adjustment = params
            .rules
            .occupancy_grid
            .percent_adjustment(days_out, params.occupancy_pct);
        let occupancy_factor = 1.0 + occupancy_adjustment / 100.0;

        // Reserved for the gap-penalty feature; always neutral for now.
        let orphan_factor = 1.0;

        let unclamped_price = params.base_price
            * factors.seasonality
            * dow_factor
            * lead_time_factor
            * los_factor
            * factors.demand
            * factors.comp_pressure
            * factors.manual_multiplier
            * occupancy_factor
            * orphan_factor;

        let final_price = unclamped_price.max(params.min_price).min(params.max_price);

        PriceQuote {
            final_price,
            breakdown: PriceBreakdown {
                base_price: params.base_price,
                seasonality: factors.seasonality,
                dow_factor,
                lead_time_factor,
                los_factor,
                demand: factors.demand,
                comp_pressure: factors.comp_pressure,
                manual_multiplier: factors.manual_multiplier,
                events_weight: factors.events_weight,
                occupancy_factor,
                occupancy_pct: round2(params.occupancy_pct),
                orphan_factor,
                pickup_signal: factors.pickup_signal,
                availability_signal: factors.availability_signal,
                comp_price_signal: factors.comp_price_signal,
                unclamped_price,
                final_price,
            },
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
