use super::extract;
use super::models::{
    ConstructionInfo, ContactInfo, FloorInfo, Image, Location, MonthlyPayment, PropertyRecord,
    RawProperty,
};

/// Builds a normalized record from one joined row: defaults absent relations,
/// sorts images, then backfills missing fields from feature text.
pub fn from_raw(raw: RawProperty) -> PropertyRecord {
    normalize(assemble(raw))
}

fn assemble(raw: RawProperty) -> PropertyRecord {
    let location = raw.loc_id.is_some().then(|| Location {
        city: raw.city,
        district: raw.district,
    });

    let floor = raw.floor_id.is_some().then(|| FloorInfo {
        current_floor: raw.current_floor,
        total_floors: raw.total_floors,
    });

    let construction = raw.con_id.is_some().then(|| ConstructionInfo {
        kind: raw.construction_type,
        year: raw.construction_year,
        has_central_heating: raw.has_central_heating,
        is_renovated: raw.is_renovated,
        is_furnished: raw.is_furnished,
        has_act16: raw.has_act16,
        is_interior: raw.is_interior,
        confidence: raw.confidence,
        act16_plan_date: raw.act16_plan_date,
        act16_details: raw.act16_details,
    });

    let contact = raw.contact_id.is_some().then(|| ContactInfo {
        broker_name: raw.broker_name,
        phone: raw.phone,
    });

    let monthly_payment = raw.payment_id.is_some().then(|| MonthlyPayment {
        value: raw.payment_value,
        currency: raw.payment_currency,
    });

    let images = raw
        .images
        .unwrap_or_default()
        .into_iter()
        .map(|img| Image {
            url: img.url,
            storage_url: img.storage_url,
            position: img.position,
        })
        .collect();

    PropertyRecord {
        id: raw.id,
        category: raw.category,
        url: raw.url,
        price_value: raw.price_value,
        price_currency: raw.price_currency,
        includes_vat: raw.includes_vat,
        area_m2: raw.area_m2,
        views: raw.views,
        last_modified: raw.last_modified,
        description: raw.description,
        is_private_seller: raw.is_private_seller,
        created_at: raw.created_at,
        location,
        floor,
        construction,
        contact,
        monthly_payment,
        features: raw.features.unwrap_or_default(),
        images,
    }
}

/// Idempotent: running this on an already-normalized record changes nothing.
pub fn normalize(mut rec: PropertyRecord) -> PropertyRecord {
    rec.images.sort_by_key(|img| img.position.unwrap_or(0));

    if rec.price_value.is_none() {
        rec.price_value = rec.features.iter().find_map(|f| extract::price_from_feature(f));
    }

    if rec.area_m2.is_none() {
        rec.area_m2 = rec.features.iter().find_map(|f| extract::area_from_feature(f));
    }

    let has_district = rec
        .location
        .as_ref()
        .is_some_and(|loc| loc.district.is_some());
    if !has_district {
        if let Some(district) = rec.features.iter().find_map(|f| extract::district_from_feature(f))
        {
            match rec.location.as_mut() {
                Some(loc) => loc.district = Some(district),
                None => {
                    rec.location = Some(Location {
                        city: None,
                        district: Some(district),
                    });
                }
            }
        }
    }

    rec
}
