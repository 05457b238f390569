use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    pub city: Option<String>,
    pub district: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FloorInfo {
    pub current_floor: Option<i32>,
    pub total_floors: Option<i32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConstructionInfo {
    pub kind: Option<String>,
    pub year: Option<i32>,
    pub has_central_heating: Option<bool>,
    pub is_renovated: Option<bool>,
    pub is_furnished: Option<bool>,
    pub has_act16: Option<bool>,
    pub is_interior: Option<bool>,
    pub confidence: Option<String>,
    pub act16_plan_date: Option<NaiveDate>,
    pub act16_details: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContactInfo {
    pub broker_name: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyPayment {
    pub value: Option<f64>,
    pub currency: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pub url: String,
    pub storage_url: Option<String>,
    pub position: Option<i32>,
}

/// A listing after normalization: sub-relations defaulted, images sorted,
/// missing price/area/district backfilled from feature text where possible.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyRecord {
    pub id: String,
    pub category: Option<String>,
    pub url: String,
    pub price_value: Option<f64>,
    pub price_currency: Option<String>,
    pub includes_vat: Option<bool>,
    pub area_m2: Option<f64>,
    pub views: Option<i32>,
    pub last_modified: Option<String>,
    pub description: Option<String>,
    pub is_private_seller: Option<bool>,
    pub created_at: Option<DateTime<Utc>>,
    pub location: Option<Location>,
    pub floor: Option<FloorInfo>,
    pub construction: Option<ConstructionInfo>,
    pub contact: Option<ContactInfo>,
    pub monthly_payment: Option<MonthlyPayment>,
    pub features: Vec<String>,
    pub images: Vec<Image>,
}

impl PropertyRecord {
    pub fn district(&self) -> Option<&str> {
        self.location.as_ref()?.district.as_deref()
    }

    pub fn construction_year(&self) -> Option<i32> {
        self.construction.as_ref()?.year
    }
}

/// One row of the joined property query. LEFT JOINs leave every sub-relation
/// column nullable; presence of a relation is keyed off its primary column.
#[derive(Debug, FromRow)]
pub struct RawProperty {
    pub id: String,
    pub category: Option<String>,
    pub url: String,
    pub price_value: Option<f64>,
    pub price_currency: Option<String>,
    pub includes_vat: Option<bool>,
    pub area_m2: Option<f64>,
    pub views: Option<i32>,
    pub last_modified: Option<String>,
    pub description: Option<String>,
    pub is_private_seller: Option<bool>,
    pub created_at: Option<DateTime<Utc>>,

    pub loc_id: Option<String>,
    pub city: Option<String>,
    pub district: Option<String>,

    pub floor_id: Option<String>,
    pub current_floor: Option<i32>,
    pub total_floors: Option<i32>,

    pub con_id: Option<String>,
    pub construction_type: Option<String>,
    pub construction_year: Option<i32>,
    pub has_central_heating: Option<bool>,
    pub is_renovated: Option<bool>,
    pub is_furnished: Option<bool>,
    pub has_act16: Option<bool>,
    pub is_interior: Option<bool>,
    pub confidence: Option<String>,
    pub act16_plan_date: Option<NaiveDate>,
    pub act16_details: Option<String>,

    pub contact_id: Option<String>,
    pub broker_name: Option<String>,
    pub phone: Option<String>,

    pub payment_id: Option<String>,
    pub payment_value: Option<f64>,
    pub payment_currency: Option<String>,

    /// Attached after the join query from the features table.
    #[sqlx(skip)]
    pub features: Option<Vec<String>>,
    /// Attached after the join query from the images table.
    #[sqlx(skip)]
    pub images: Option<Vec<RawImage>>,
}

#[derive(Debug, Clone, FromRow)]
pub struct RawImage {
    pub url: String,
    pub storage_url: Option<String>,
    pub position: Option<i32>,
}
