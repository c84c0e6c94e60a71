use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use std::fmt;
use tracing::warn;

/// One parsed range entry. Both bounds are inclusive; an absent upper
/// bound means the range is open-ended.
#[derive(Debug, Clone, PartialEq)]
pub struct BucketRange {
    pub lower: f64,
    pub upper: Option<f64>,
    pub value: f64,
}

impl BucketRange {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && self.upper.map_or(true, |upper| value <= upper)
    }
}

/// Range-keyed lookup table built from `"lo-hi"` / `"lo+"` keys.
///
/// Entries keep the order they were supplied in, and the first matching
/// range wins, not the tightest one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BucketTable {
    ranges: Vec<BucketRange>,
}

impl BucketTable {
    /// Build a table from ordered `(key, value)` pairs. Keys that do not
    /// parse as a range are skipped.
    pub fn from_entries<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        let mut ranges = Vec::new();
        for (key, value) in entries {
            match parse_range_key(key) {
                Some((lower, upper)) => ranges.push(BucketRange { lower, upper, value }),
                None => warn!(key = %key, "Ignoring malformed bucket key"),
            }
        }
        Self { ranges }
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Resolve `value` to the first matching range's value, or `default`
    /// when nothing matches. The neutral default is the caller's to pick:
    /// 1.0 for multiplicative factors, 0.0 for percent adjustments.
    pub fn lookup(&self, value: f64, default: f64) -> f64 {
        self.ranges
            .iter()
            .find(|range| range.contains(value))
            .map(|range| range.value)
            .unwrap_or(default)
    }

    pub fn ranges(&self) -> &[BucketRange] {
        &self.ranges
    }
}

/// Parse `"lo-hi"` or `"lo+"` into bounds. Returns `None` for anything else.
fn parse_range_key(key: &str) -> Option<(f64, Option<f64>)> {
    let key = key.trim();
    if let Some(lower) = key.strip_suffix('+') {
        let lower: f64 = lower.trim().parse().ok()?;
        return Some((lower, None));
    }
    let (lower, upper) = key.split_once('-')?;
    let lower: f64 = lower.trim().parse().ok()?;
    let upper: f64 = upper.trim().parse().ok()?;
    Some((lower, Some(upper)))
}

// Deserialized straight from the admin-supplied JSON object, walking the
// map in document order so that key order stays significant.
impl<'de> Deserialize<'de> for BucketTable {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct TableVisitor;

        impl<'de> Visitor<'de> for TableVisitor {
            type Value = BucketTable;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a map of \"lo-hi\" / \"lo+\" keys to numbers")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut ranges = Vec::new();
                while let Some((key, value)) = access.next_entry::<String, f64>()? {
                    match parse_range_key(&key) {
                        Some((lower, upper)) => ranges.push(BucketRange { lower, upper, value }),
                        None => warn!(key = %key, "Ignoring malformed bucket key"),
                    }
                }
                Ok(BucketTable { ranges })
            }
        }

        deserializer.deserialize_map(TableVisitor)
    }
}

/// Two-level table: a lead-time (days-out) bucket selects an
/// occupancy-percent table whose values are percent adjustments.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OccupancyGrid {
    lead_buckets: LeadBuckets,
}

#[derive(Debug, Clone, Default, PartialEq)]
struct LeadBuckets(Vec<LeadBucket>);

#[derive(Debug, Clone, PartialEq)]
struct LeadBucket {
    lower: f64,
    upper: Option<f64>,
    table: BucketTable,
}

impl OccupancyGrid {
    pub fn is_empty(&self) -> bool {
        self.lead_buckets.0.is_empty()
    }

    /// Select the occupancy sub-table for `days_out`. When no lead-time
    /// bucket matches, fall back to the most distant bucket present
    /// (the one with the greatest lower bound, conventionally `"61+"`).
    fn sub_table(&self, days_out: f64) -> Option<&BucketTable> {
        let buckets = &self.lead_buckets.0;
        buckets
            .iter()
            .find(|bucket| {
                days_out >= bucket.lower && bucket.upper.map_or(true, |upper| days_out <= upper)
            })
            .or_else(|| {
                buckets
                    .iter()
                    .max_by(|a, b| a.lower.total_cmp(&b.lower))
            })
            .map(|bucket| &bucket.table)
    }

    /// Percent adjustment for the given lead time and occupancy level.
    /// 0.0 means no adjustment.
    pub fn percent_adjustment(&self, days_out: f64, occupancy_pct: f64) -> f64 {
        self.sub_table(days_out)
            .map(|table| table.lookup(occupancy_pct, 0.0))
            .unwrap_or(0.0)
    }
}

impl<'de> Deserialize<'de> for LeadBuckets {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct GridVisitor;

        impl<'de> Visitor<'de> for GridVisitor {
            type Value = LeadBuckets;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a map of lead-time bucket keys to occupancy tables")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut buckets = Vec::new();
                while let Some((key, table)) = access.next_entry::<String, BucketTable>()? {
                    match parse_range_key(&key) {
                        Some((lower, upper)) => buckets.push(LeadBucket { lower, upper, table }),
                        None => warn!(key = %key, "Ignoring malformed lead-time bucket key"),
                    }
                }
                Ok(LeadBuckets(buckets))
            }
        }

        deserializer.deserialize_map(GridVisitor)
    }
}
