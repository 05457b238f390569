//! Aggregate market statistics over a filtered record list. Pure functions:
//! input order is never touched and repeated calls give identical output.

use std::sync::LazyLock;

use regex::Regex;

use crate::listing::PropertyRecord;

// Some listings carry a construction year where the district should be;
// such records are junk for price statistics.
static YEAR_PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^20\d{2}$").unwrap());

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MarketStats {
    pub count: usize,
    pub mean_price: f64,
    pub mean_price_per_m2: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupStats {
    pub key: String,
    pub count: usize,
    pub mean_price: f64,
    pub min_price: f64,
    pub max_price: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupDimension {
    Act16,
    Renovated,
    Furnished,
    Seller,
    Category,
}

impl GroupDimension {
    pub fn label(self) -> &'static str {
        match self {
            GroupDimension::Act16 => "act16",
            GroupDimension::Renovated => "renovated",
            GroupDimension::Furnished => "furnished",
            GroupDimension::Seller => "seller",
            GroupDimension::Category => "category",
        }
    }

    fn key(self, rec: &PropertyRecord) -> String {
        let con = rec.construction.as_ref();
        match self {
            GroupDimension::Act16 => tri_state(con.and_then(|c| c.has_act16)),
            GroupDimension::Renovated => tri_state(con.and_then(|c| c.is_renovated)),
            GroupDimension::Furnished => tri_state(con.and_then(|c| c.is_furnished)),
            GroupDimension::Seller => match rec.is_private_seller {
                Some(true) => "private".to_string(),
                Some(false) => "broker".to_string(),
                None => "unknown".to_string(),
            },
            GroupDimension::Category => rec
                .category
                .clone()
                .unwrap_or_else(|| "unknown".to_string()),
        }
    }
}

fn tri_state(value: Option<bool>) -> String {
    match value {
        Some(true) => "yes".to_string(),
        Some(false) => "no".to_string(),
        None => "unknown".to_string(),
    }
}

/// The record's price, when it counts toward statistics: a positive number
/// on a record whose district is not a year stand-in.
fn valid_price(rec: &PropertyRecord) -> Option<f64> {
    let price = rec.price_value?;
    if !price.is_finite() || price <= 0.0 {
        return None;
    }
    if rec.district().is_some_and(|d| YEAR_PLACEHOLDER_RE.is_match(d)) {
        return None;
    }
    Some(price)
}

pub fn market_stats(records: &[PropertyRecord]) -> MarketStats {
    let mut count = 0usize;
    let mut price_sum = 0.0;
    let mut per_m2_sum = 0.0;
    let mut per_m2_count = 0usize;

    for rec in records {
        let Some(price) = valid_price(rec) else {
            continue;
        };
        count += 1;
        price_sum += price;

        if let Some(area) = rec.area_m2.filter(|a| a.is_finite() && *a > 0.0) {
            per_m2_sum += price / area;
            per_m2_count += 1;
        }
    }

    MarketStats {
        count,
        mean_price: if count == 0 { 0.0 } else { price_sum / count as f64 },
        mean_price_per_m2: if per_m2_count == 0 {
            0.0
        } else {
            per_m2_sum / per_m2_count as f64
        },
    }
}

/// Partitions valid records by the dimension's value and summarizes price per
/// partition. Partitions come back sorted by descending count; ties keep the
/// order the keys were first seen in.
pub fn grouped_mean_price(records: &[PropertyRecord], dim: GroupDimension) -> Vec<GroupStats> {
    let mut partitions: Vec<(String, Vec<f64>)> = Vec::new();

    for rec in records {
        let Some(price) = valid_price(rec) else {
            continue;
        };
        let key = dim.key(rec);
        match partitions.iter_mut().find(|(k, _)| *k == key) {
            Some((_, prices)) => prices.push(price),
            None => partitions.push((key, vec![price])),
        }
    }

    let mut groups: Vec<GroupStats> = partitions
        .into_iter()
        .map(|(key, prices)| GroupStats {
            key,
            count: prices.len(),
            mean_price: prices.iter().sum::<f64>() / prices.len() as f64,
            min_price: prices.iter().copied().fold(f64::INFINITY, f64::min),
            max_price: prices.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        })
        .collect();

    // stable: ties stay in first-seen order
    groups.sort_by(|a, b| b.count.cmp(&a.count));
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::models::{ConstructionInfo, Location};

    fn record(id: &str, price: Option<f64>, area: Option<f64>, district: &str) -> PropertyRecord {
        PropertyRecord {
            id: id.to_string(),
            category: None,
            url: format!("https://example.com/{id}"),
            price_value: price,
            price_currency: None,
            includes_vat: None,
            area_m2: area,
            views: None,
            last_modified: None,
            description: None,
            is_private_seller: None,
            created_at: None,
            location: Some(Location {
                city: None,
                district: Some(district.to_string()),
            }),
            floor: None,
            construction: None,
            contact: None,
            monthly_payment: None,
            features: Vec::new(),
            images: Vec::new(),
        }
    }

    #[test]
    fn empty_input_yields_zeroes() {
        let stats = market_stats(&[]);
        assert_eq!(stats, MarketStats::default());
    }

    #[test]
    fn no_valid_records_never_divides_by_zero() {
        let records = vec![
            record("a", None, Some(50.0), "Лозенец"),
            record("b", Some(0.0), Some(50.0), "Лозенец"),
            record("c", Some(-10.0), Some(50.0), "Лозенец"),
        ];
        let stats = market_stats(&records);
        assert_eq!(stats.count, 0);
        assert_eq!(stats.mean_price, 0.0);
        assert_eq!(stats.mean_price_per_m2, 0.0);
    }

    #[test]
    fn year_placeholder_district_excluded() {
        let records = vec![
            record("a", Some(100000.0), Some(50.0), "Lozenets"),
            record("b", Some(200000.0), None, "2024"),
        ];
        let stats = market_stats(&records);
        assert_eq!(stats.count, 1);
        assert_eq!(stats.mean_price, 100000.0);
        assert_eq!(stats.mean_price_per_m2, 2000.0);
    }

    #[test]
    fn mean_per_m2_is_mean_of_ratios() {
        let records = vec![
            record("a", Some(100000.0), Some(50.0), "Lozenets"),
            record("b", Some(100000.0), Some(100.0), "Mladost"),
        ];
        let stats = market_stats(&records);
        assert_eq!(stats.count, 2);
        // (2000 + 1000) / 2, not 200000 / 150
        assert_eq!(stats.mean_price_per_m2, 1500.0);
    }

    #[test]
    fn records_without_area_still_count_for_mean_price() {
        let records = vec![
            record("a", Some(100000.0), None, "Lozenets"),
            record("b", Some(300000.0), Some(100.0), "Mladost"),
        ];
        let stats = market_stats(&records);
        assert_eq!(stats.count, 2);
        assert_eq!(stats.mean_price, 200000.0);
        assert_eq!(stats.mean_price_per_m2, 3000.0);
    }

    fn with_act16(id: &str, price: f64, has_act16: Option<bool>) -> PropertyRecord {
        let mut rec = record(id, Some(price), None, "Lozenets");
        rec.construction = Some(ConstructionInfo {
            kind: None,
            year: None,
            has_central_heating: None,
            is_renovated: None,
            is_furnished: None,
            has_act16,
            is_interior: None,
            confidence: None,
            act16_plan_date: None,
            act16_details: None,
        });
        rec
    }

    #[test]
    fn groups_partition_and_summarize() {
        let records = vec![
            with_act16("a", 100000.0, Some(true)),
            with_act16("b", 300000.0, Some(true)),
            with_act16("c", 150000.0, Some(false)),
            with_act16("d", 250000.0, None),
        ];
        let groups = grouped_mean_price(&records, GroupDimension::Act16);
        assert_eq!(groups.len(), 3);

        assert_eq!(groups[0].key, "yes");
        assert_eq!(groups[0].count, 2);
        assert_eq!(groups[0].mean_price, 200000.0);
        assert_eq!(groups[0].min_price, 100000.0);
        assert_eq!(groups[0].max_price, 300000.0);

        // count ties keep first-seen order: "no" before "unknown"
        assert_eq!(groups[1].key, "no");
        assert_eq!(groups[2].key, "unknown");
    }

    #[test]
    fn groups_skip_invalid_records() {
        let records = vec![
            with_act16("a", 100000.0, Some(true)),
            with_act16("b", 0.0, Some(true)),
        ];
        let groups = grouped_mean_price(&records, GroupDimension::Act16);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].count, 1);
    }

    #[test]
    fn aggregation_leaves_input_untouched() {
        let records = vec![
            record("a", Some(100000.0), Some(50.0), "Lozenets"),
            record("b", Some(200000.0), Some(80.0), "Mladost"),
        ];
        let before = records.clone();
        let first = market_stats(&records);
        let second = market_stats(&records);
        assert_eq!(records, before);
        assert_eq!(first, second);
    }
}
