use std::collections::HashSet;

use chrono::NaiveDate;
use serde::Deserialize;

use crate::listing::PropertyRecord;

/// Filter state as it arrives from the UI: everything is optional text.
/// Parsing never fails; unusable text just deactivates that field.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawFilter {
    /// Comma-separated id allow-list.
    pub ids: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub min_area: Option<String>,
    pub max_area: Option<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    pub district: Option<String>,
    pub min_year: Option<String>,
    pub max_year: Option<String>,
    pub renovated: Option<String>,
    pub furnished: Option<String>,
    pub act16: Option<String>,
    /// Act 16 planned-completion bounds, ISO dates.
    pub plan_from: Option<String>,
    pub plan_to: Option<String>,
    pub seller: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Toggle {
    #[default]
    Any,
    Yes,
    No,
}

impl Toggle {
    fn parse(text: Option<&str>) -> Self {
        match text.map(|t| t.trim().to_ascii_lowercase()).as_deref() {
            Some("yes") | Some("true") | Some("1") => Toggle::Yes,
            Some("no") | Some("false") | Some("0") => Toggle::No,
            _ => Toggle::Any,
        }
    }

    fn admits(self, value: Option<bool>) -> bool {
        match self {
            Toggle::Any => true,
            Toggle::Yes => value == Some(true),
            Toggle::No => value == Some(false),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SellerKind {
    #[default]
    Any,
    Private,
    Broker,
}

impl SellerKind {
    fn parse(text: Option<&str>) -> Self {
        match text.map(|t| t.trim().to_ascii_lowercase()).as_deref() {
            Some("private") => SellerKind::Private,
            Some("broker") => SellerKind::Broker,
            _ => SellerKind::Any,
        }
    }

    fn admits(self, is_private: Option<bool>) -> bool {
        match self {
            SellerKind::Any => true,
            SellerKind::Private => is_private == Some(true),
            SellerKind::Broker => is_private == Some(false),
        }
    }
}

/// Parsed filter specification. All predicates are conjunctive; a `None`
/// field (or `Any` toggle) imposes no constraint, so the default spec is
/// the identity filter.
#[derive(Debug, Clone, Default)]
pub struct FilterSpec {
    pub ids: Option<HashSet<String>>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub min_area: Option<f64>,
    pub max_area: Option<f64>,
    pub categories: Vec<String>,
    /// Lowercased search text, matched as a substring of the district.
    pub district: Option<String>,
    pub min_year: Option<i32>,
    pub max_year: Option<i32>,
    pub renovated: Toggle,
    pub furnished: Toggle,
    pub act16: Toggle,
    pub plan_from: Option<NaiveDate>,
    pub plan_to: Option<NaiveDate>,
    pub seller: SellerKind,
}

fn parse_num<T: std::str::FromStr>(text: &Option<String>) -> Option<T> {
    text.as_deref().and_then(|t| t.trim().parse().ok())
}

fn parse_date(text: &Option<String>) -> Option<NaiveDate> {
    text.as_deref()
        .and_then(|t| NaiveDate::parse_from_str(t.trim(), "%Y-%m-%d").ok())
}

impl FilterSpec {
    pub fn from_raw(raw: &RawFilter) -> Self {
        let ids: HashSet<String> = raw
            .ids
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        let district = raw
            .district
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);

        FilterSpec {
            ids: (!ids.is_empty()).then_some(ids),
            min_price: parse_num(&raw.min_price),
            max_price: parse_num(&raw.max_price),
            min_area: parse_num(&raw.min_area),
            max_area: parse_num(&raw.max_area),
            categories: raw
                .categories
                .iter()
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .collect(),
            district,
            min_year: parse_num(&raw.min_year),
            max_year: parse_num(&raw.max_year),
            renovated: Toggle::parse(raw.renovated.as_deref()),
            furnished: Toggle::parse(raw.furnished.as_deref()),
            act16: Toggle::parse(raw.act16.as_deref()),
            plan_from: parse_date(&raw.plan_from),
            plan_to: parse_date(&raw.plan_to),
            seller: SellerKind::parse(raw.seller.as_deref()),
        }
    }

    /// Keeps the records satisfying every active predicate, in input order.
    pub fn apply(&self, records: &[PropertyRecord]) -> Vec<PropertyRecord> {
        records
            .iter()
            .filter(|r| self.matches(r))
            .cloned()
            .collect()
    }

    pub fn matches(&self, rec: &PropertyRecord) -> bool {
        if let Some(ids) = &self.ids {
            if !ids.contains(&rec.id) {
                return false;
            }
        }

        if self.min_price.is_some() || self.max_price.is_some() {
            let Some(price) = rec.price_value else {
                return false;
            };
            if self.min_price.is_some_and(|min| price < min)
                || self.max_price.is_some_and(|max| price > max)
            {
                return false;
            }
        }

        if self.min_area.is_some() || self.max_area.is_some() {
            let Some(area) = rec.area_m2 else {
                return false;
            };
            if self.min_area.is_some_and(|min| area < min)
                || self.max_area.is_some_and(|max| area > max)
            {
                return false;
            }
        }

        if !self.categories.is_empty() {
            let Some(category) = rec.category.as_deref() else {
                return false;
            };
            if !self.categories.iter().any(|c| c == category) {
                return false;
            }
        }

        if let Some(needle) = &self.district {
            let Some(district) = rec.district() else {
                return false;
            };
            if !district.to_lowercase().contains(needle.as_str()) {
                return false;
            }
        }

        // Records without a construction year pass active year bounds:
        // a missing year is unknown, not out of range.
        if let Some(year) = rec.construction_year() {
            if self.min_year.is_some_and(|min| year < min)
                || self.max_year.is_some_and(|max| year > max)
            {
                return false;
            }
        }

        let con = rec.construction.as_ref();
        if !self.renovated.admits(con.and_then(|c| c.is_renovated)) {
            return false;
        }
        if !self.furnished.admits(con.and_then(|c| c.is_furnished)) {
            return false;
        }
        if !self.act16.admits(con.and_then(|c| c.has_act16)) {
            return false;
        }

        // Same unknown-passes policy for the planned completion date.
        if let Some(plan) = con.and_then(|c| c.act16_plan_date) {
            if self.plan_from.is_some_and(|from| plan < from)
                || self.plan_to.is_some_and(|to| plan > to)
            {
                return false;
            }
        }

        if !self.seller.admits(rec.is_private_seller) {
            return false;
        }

        true
    }
}
