use std::collections::HashMap;

use anyhow::Result;
use sqlx::{postgres::PgPoolOptions, FromRow, PgPool, Postgres, QueryBuilder};

use crate::listing::models::{RawImage, RawProperty};
use crate::query::filter::SellerKind;
use crate::query::FilterSpec;

/// Row id reserved for scraper metadata, never a real listing.
const METADATA_SENTINEL_ID: &str = "metadata";

pub struct Storage {
    pool: PgPool,
}

#[derive(FromRow)]
struct FeatureRow {
    property_id: String,
    feature: String,
}

#[derive(FromRow)]
struct ImageRow {
    property_id: String,
    url: String,
    storage_url: Option<String>,
    position: Option<i32>,
}

impl Storage {
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Fetches all listings joined with their one-to-one sub-relations, with
    /// features and images attached from their own tables. Simple predicates
    /// are pushed down to narrow the result set; the local filter makes the
    /// final call on every predicate, so pushdown must only ever fetch a
    /// superset of what local filtering would keep.
    pub async fn fetch_properties(&self, spec: &FilterSpec) -> Result<Vec<RawProperty>> {
        let mut properties: Vec<RawProperty> = build_properties_query(spec)
            .build_query_as()
            .fetch_all(&self.pool)
            .await?;

        let mut features = self.fetch_features().await?;
        let mut images = self.fetch_images().await?;

        for prop in &mut properties {
            prop.features = features.remove(&prop.id);
            prop.images = images.remove(&prop.id);
        }

        Ok(properties)
    }

    async fn fetch_features(&self) -> Result<HashMap<String, Vec<String>>> {
        let rows: Vec<FeatureRow> = sqlx::query_as("SELECT property_id, feature FROM features")
            .fetch_all(&self.pool)
            .await?;

        let mut by_property: HashMap<String, Vec<String>> = HashMap::new();
        for row in rows {
            by_property.entry(row.property_id).or_default().push(row.feature);
        }
        Ok(by_property)
    }

    async fn fetch_images(&self) -> Result<HashMap<String, Vec<RawImage>>> {
        let rows: Vec<ImageRow> =
            sqlx::query_as("SELECT property_id, url, storage_url, position FROM images")
                .fetch_all(&self.pool)
                .await?;

        let mut by_property: HashMap<String, Vec<RawImage>> = HashMap::new();
        for row in rows {
            by_property.entry(row.property_id).or_default().push(RawImage {
                url: row.url,
                storage_url: row.storage_url,
                position: row.position,
            });
        }
        Ok(by_property)
    }
}

/// Price, area, and district clauses keep NULL rows: normalization may still
/// backfill those fields from feature text, so excluding NULLs here would
/// drop rows the local filter would keep. Only ids, category, and seller are
/// pushed down exactly, since nothing backfills them.
fn build_properties_query(spec: &FilterSpec) -> QueryBuilder<'static, Postgres> {
    let mut query: QueryBuilder<Postgres> = QueryBuilder::new(
        r#"
        SELECT p.id, p.type AS category, p.url,
               p.price_value::float8 AS price_value, p.price_currency, p.includes_vat,
               p.area_m2::float8 AS area_m2, p.views, p.last_modified, p.description,
               p.is_private_seller, p.created_at::timestamptz AS created_at,
               l.property_id AS loc_id, l.city, l.district,
               fl.property_id AS floor_id, fl.current_floor, fl.total_floors,
               c.property_id AS con_id, c.type AS construction_type,
               c.year AS construction_year, c.has_central_heating,
               c.is_renovated, c.is_furnished, c.has_act16, c.is_interior,
               c.confidence, c.act16_plan_date, c.act16_details,
               ct.property_id AS contact_id, ct.broker_name, ct.phone,
               mp.property_id AS payment_id, mp.value::float8 AS payment_value,
               mp.currency AS payment_currency
        FROM properties p
        LEFT JOIN locations l ON l.property_id = p.id
        LEFT JOIN floor_info fl ON fl.property_id = p.id
        LEFT JOIN construction_info c ON c.property_id = p.id
        LEFT JOIN contact_info ct ON ct.property_id = p.id
        LEFT JOIN monthly_payments mp ON mp.property_id = p.id
        WHERE p.id <> "#,
    );
    query.push_bind(METADATA_SENTINEL_ID);

    if let Some(ids) = &spec.ids {
        let ids: Vec<String> = ids.iter().cloned().collect();
        query.push(" AND p.id = ANY(").push_bind(ids).push(")");
    }
    if let Some(min) = spec.min_price {
        query
            .push(" AND (p.price_value >= ")
            .push_bind(min)
            .push(" OR p.price_value IS NULL)");
    }
    if let Some(max) = spec.max_price {
        query
            .push(" AND (p.price_value <= ")
            .push_bind(max)
            .push(" OR p.price_value IS NULL)");
    }
    if let Some(min) = spec.min_area {
        query
            .push(" AND (p.area_m2 >= ")
            .push_bind(min)
            .push(" OR p.area_m2 IS NULL)");
    }
    if let Some(max) = spec.max_area {
        query
            .push(" AND (p.area_m2 <= ")
            .push_bind(max)
            .push(" OR p.area_m2 IS NULL)");
    }
    if !spec.categories.is_empty() {
        query
            .push(" AND p.type = ANY(")
            .push_bind(spec.categories.clone())
            .push(")");
    }
    match spec.seller {
        SellerKind::Private => {
            query.push(" AND p.is_private_seller = TRUE");
        }
        SellerKind::Broker => {
            query.push(" AND p.is_private_seller = FALSE");
        }
        SellerKind::Any => {}
    }
    if let Some(district) = &spec.district {
        query
            .push(" AND (l.district ILIKE ")
            .push_bind(format!("%{district}%"))
            .push(" OR l.district IS NULL)");
    }
    query.push(" ORDER BY p.created_at DESC, p.id");

    query
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::RawFilter;

    #[test]
    fn pushdown_keeps_rows_missing_pushed_fields() {
        let spec = FilterSpec::from_raw(&RawFilter {
            min_price: Some("100000".to_string()),
            max_area: Some("120".to_string()),
            district: Some("Лозенец".to_string()),
            ..Default::default()
        });

        let sql = build_properties_query(&spec).into_sql();
        assert!(sql.contains("OR p.price_value IS NULL"));
        assert!(sql.contains("OR p.area_m2 IS NULL"));
        assert!(sql.contains("OR l.district IS NULL"));
    }

    #[test]
    fn unfiltered_query_only_excludes_sentinel() {
        let spec = FilterSpec::default();
        let sql = build_properties_query(&spec).into_sql();
        assert!(sql.contains("WHERE p.id <> $1"));
        assert!(!sql.contains(" AND "));
    }
}
