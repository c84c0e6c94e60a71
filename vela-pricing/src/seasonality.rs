use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named season window with a rate multiplier, managed by admin tooling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeasonalitySetting {
    pub id: Uuid,
    /// None means the season applies globally, not to one location.
    pub location_id: Option<Uuid>,
    pub season_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub multiplier: f64,
    /// Recurring seasons match on month/day every year.
    pub year_recurring: bool,
    pub is_active: bool,
    pub display_order: i32,
}

/// Resolves a seasonality multiplier for a date against a loaded snapshot
/// of season definitions. The first window containing the date wins;
/// no match resolves to the neutral 1.0.
pub struct SeasonalityResolver {
    seasons: Vec<SeasonalitySetting>,
}

impl SeasonalityResolver {
    pub fn new(mut seasons: Vec<SeasonalitySetting>) -> Self {
        seasons.sort_by_key(|s| s.display_order);
        Self { seasons }
    }

    /// A resolver with no seasons: every date resolves to 1.0.
    pub fn neutral() -> Self {
        Self { seasons: Vec::new() }
    }

    pub fn resolve(&self, date: NaiveDate) -> f64 {
        for season in &self.seasons {
            if !season.is_active {
                continue;
            }
            if window_contains(season, date) {
                return season.multiplier;
            }
        }
        1.0
    }
}

fn window_contains(season: &SeasonalitySetting, date: NaiveDate) -> bool {
    if !season.year_recurring {
        return season.start_date <= date && date <= season.end_date;
    }

    // Recurring windows compare month/day only, as MMDD integers.
    let start = month_day(season.start_date);
    let end = month_day(season.end_date);
    let check = month_day(date);

    if start <= end {
        start <= check && check <= end
    } else {
        // The window crosses the new year, e.g. Dec 1 - Feb 28
        check >= start || check <= end
    }
}

fn month_day(date: NaiveDate) -> u32 {
    date.month() * 100 + date.day()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn season(
        name: &str,
        start: NaiveDate,
        end: NaiveDate,
        multiplier: f64,
        recurring: bool,
        order: i32,
    ) -> SeasonalitySetting {
        SeasonalitySetting {
            id: Uuid::new_v4(),
            location_id: None,
            season_name: name.to_string(),
            start_date: start,
            end_date: end,
            multiplier,
            year_recurring: recurring,
            is_active: true,
            display_order: order,
        }
    }

    #[test]
    fn test_no_seasons_resolves_to_neutral() {
        let resolver = SeasonalityResolver::neutral();
        assert_eq!(resolver.resolve(date(2024, 7, 1)), 1.0);
    }

    #[test]
    fn test_fixed_window_inclusive_bounds() {
        let resolver = SeasonalityResolver::new(vec![season(
            "Summer",
            date(2024, 6, 1),
            date(2024, 8, 31),
            1.3,
            false,
            1,
        )]);

        assert_eq!(resolver.resolve(date(2024, 6, 1)), 1.3);
        assert_eq!(resolver.resolve(date(2024, 8, 31)), 1.3);
        assert_eq!(resolver.resolve(date(2024, 5, 31)), 1.0);
        assert_eq!(resolver.resolve(date(2024, 9, 1)), 1.0);
        // A different year falls outside a non-recurring window
        assert_eq!(resolver.resolve(date(2025, 7, 1)), 1.0);
    }

    #[test]
    fn test_recurring_window_wraps_the_new_year() {
        let resolver = SeasonalityResolver::new(vec![season(
            "Winter",
            date(2023, 12, 1),
            date(2024, 2, 28),
            1.4,
            true,
            1,
        )]);

        assert_eq!(resolver.resolve(date(2024, 12, 15)), 1.4);
        assert_eq!(resolver.resolve(date(2024, 1, 15)), 1.4);
        assert_eq!(resolver.resolve(date(2024, 2, 15)), 1.4);
        assert_eq!(resolver.resolve(date(2024, 3, 15)), 1.0);
        assert_eq!(resolver.resolve(date(2024, 11, 15)), 1.0);
    }

    #[test]
    fn test_recurring_window_ignores_year() {
        let resolver = SeasonalityResolver::new(vec![season(
            "Easter",
            date(2020, 4, 1),
            date(2020, 4, 15),
            1.2,
            true,
            1,
        )]);

        assert_eq!(resolver.resolve(date(2026, 4, 10)), 1.2);
        assert_eq!(resolver.resolve(date(2026, 4, 20)), 1.0);
    }

    #[test]
    fn test_display_order_decides_between_overlapping_seasons() {
        let resolver = SeasonalityResolver::new(vec![
            season("Broad", date(2024, 1, 1), date(2024, 12, 31), 1.1, false, 2),
            season("Peak", date(2024, 7, 1), date(2024, 7, 31), 1.5, false, 1),
        ]);

        assert_eq!(resolver.resolve(date(2024, 7, 15)), 1.5);
        assert_eq!(resolver.resolve(date(2024, 3, 15)), 1.1);
    }

    #[test]
    fn test_inactive_seasons_are_skipped() {
        let mut inactive = season("Off", date(2024, 1, 1), date(2024, 12, 31), 2.0, false, 1);
        inactive.is_active = false;
        let resolver = SeasonalityResolver::new(vec![inactive]);

        assert_eq!(resolver.resolve(date(2024, 6, 1)), 1.0);
    }
}
