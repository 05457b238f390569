use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{info, warn};

use crate::listing::{normalize, PropertyRecord};
use crate::query::stats::{self, GroupDimension, GroupStats, MarketStats};
use crate::query::{FilterSpec, RawFilter};
use crate::storage::postgres::Storage;

const GROUP_DIMENSIONS: &[GroupDimension] = &[
    GroupDimension::Act16,
    GroupDimension::Renovated,
    GroupDimension::Furnished,
    GroupDimension::Seller,
    GroupDimension::Category,
];

/// One full browse pass: everything the presentation layer needs to render
/// the current filter state.
#[derive(Debug)]
pub struct BrowseResult {
    generation: u64,
    /// All records the pass saw, normalized, before local filtering.
    pub records: Vec<PropertyRecord>,
    pub filtered: Vec<PropertyRecord>,
    pub stats: MarketStats,
    pub groups: Vec<(GroupDimension, Vec<GroupStats>)>,
}

pub struct BrowserService {
    storage: Storage,
    generation: AtomicU64,
}

impl BrowserService {
    pub fn new(storage: Storage) -> Self {
        Self {
            storage,
            generation: AtomicU64::new(0),
        }
    }

    /// Runs fetch -> normalize -> filter -> aggregate for one filter state.
    /// A data-access failure degrades to an empty result set; nothing in the
    /// pass is user-fatal.
    pub async fn refresh(&self, raw: &RawFilter) -> BrowseResult {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let spec = FilterSpec::from_raw(raw);

        let rows = match self.storage.fetch_properties(&spec).await {
            Ok(rows) => rows,
            Err(e) => {
                warn!(error = %e, "Property fetch failed, serving empty result set");
                Vec::new()
            }
        };

        let records: Vec<PropertyRecord> = rows.into_iter().map(normalize::from_raw).collect();
        let filtered = spec.apply(&records);
        let stats = stats::market_stats(&filtered);
        let groups = GROUP_DIMENSIONS
            .iter()
            .map(|&dim| (dim, stats::grouped_mean_price(&filtered, dim)))
            .collect();

        info!(
            generation,
            fetched = records.len(),
            kept = filtered.len(),
            "Browse pass complete"
        );

        BrowseResult {
            generation,
            records,
            filtered,
            stats,
            groups,
        }
    }

    /// A result is stale once a newer pass has started; only the latest
    /// filter state is worth rendering, regardless of completion order.
    pub fn is_current(&self, result: &BrowseResult) -> bool {
        result.generation == self.generation.load(Ordering::SeqCst)
    }
}

/// Distinct category values, sorted, for populating selection controls.
pub fn distinct_categories(records: &[PropertyRecord]) -> Vec<String> {
    let mut values: Vec<String> = records
        .iter()
        .filter_map(|r| r.category.clone())
        .collect();
    values.sort();
    values.dedup();
    values
}

/// Distinct district values, sorted.
pub fn distinct_districts(records: &[PropertyRecord]) -> Vec<String> {
    let mut values: Vec<String> = records
        .iter()
        .filter_map(|r| r.district().map(str::to_string))
        .collect();
    values.sort();
    values.dedup();
    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::models::Location;

    fn record(id: &str, category: Option<&str>, district: Option<&str>) -> PropertyRecord {
        PropertyRecord {
            id: id.to_string(),
            category: category.map(str::to_string),
            url: format!("https://example.com/{id}"),
            price_value: None,
            price_currency: None,
            includes_vat: None,
            area_m2: None,
            views: None,
            last_modified: None,
            description: None,
            is_private_seller: None,
            created_at: None,
            location: district.map(|d| Location {
                city: None,
                district: Some(d.to_string()),
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
    fn distinct_lists_are_sorted_and_deduplicated() {
        let records = vec![
            record("a", Some("two-bedroom"), Some("Младост")),
            record("b", Some("one-bedroom"), Some("Лозенец")),
            record("c", Some("two-bedroom"), None),
            record("d", None, Some("Лозенец")),
        ];

        assert_eq!(distinct_categories(&records), ["one-bedroom", "two-bedroom"]);
        assert_eq!(distinct_districts(&records), ["Лозенец", "Младост"]);
    }
}
