//! Builders for sample records, shared by the in-memory backend's demo
//! catalogue and by tests.

use chrono::Utc;
use rust_decimal::Decimal;

use crate::portfolio::Investment;
use crate::properties::{Property, PropertyStatus, PropertyType};

/// An active residential property in Toronto.
pub fn property(
    id: &str,
    name: &str,
    share_price: Decimal,
    total_shares: i64,
    available_shares: i64,
) -> Property {
    let now = Utc::now();
    Property {
        id: id.to_string(),
        name: name.to_string(),
        address: format!("{} Queen St W", 100 + total_shares % 900),
        city: "Toronto".to_string(),
        state: Some("ON".to_string()),
        country: "Canada".to_string(),
        postal_code: None,
        description: None,
        property_type: PropertyType::Residential,
        total_value: share_price * Decimal::from(total_shares),
        share_price,
        total_shares,
        available_shares,
        annual_return_rate: None,
        images: Vec::new(),
        thumbnail_url: None,
        status: PropertyStatus::Active,
        created_at: now,
        updated_at: now,
    }
}

pub fn investment(
    user_id: &str,
    property_id: &str,
    shares_owned: i64,
    average_purchase_price: Decimal,
) -> Investment {
    let now = Utc::now();
    Investment {
        id: format!("inv-{}-{}", user_id, property_id),
        user_id: user_id.to_string(),
        property_id: property_id.to_string(),
        shares_owned,
        average_purchase_price,
        total_invested: average_purchase_price * Decimal::from(shares_owned),
        created_at: now,
        updated_at: now,
        property: None,
    }
}

/// A small catalogue used by demo mode.
pub fn demo_catalogue() -> Vec<Property> {
    use rust_decimal_macros::dec;

    let mut lofts = property("prop-harbour-lofts", "Harbour Lofts", dec!(100), 10_000, 6_250);
    lofts.city = "Halifax".to_string();
    lofts.state = Some("NS".to_string());
    lofts.address = "1881 Hollis St".to_string();
    lofts.annual_return_rate = Some(dec!(7.2));

    let mut plaza = property("prop-king-plaza", "King Street Plaza", dec!(250), 8_000, 1_200);
    plaza.property_type = PropertyType::Commercial;
    plaza.address = "350 King St E".to_string();
    plaza.annual_return_rate = Some(dec!(8.5));

    let mut yards = property("prop-rail-yards", "Rail Yards Logistics", dec!(50), 40_000, 40_000);
    yards.property_type = PropertyType::Industrial;
    yards.city = "Calgary".to_string();
    yards.state = Some("AB".to_string());
    yards.address = "4100 Ogden Rd SE".to_string();
    yards.status = PropertyStatus::ComingSoon;
    yards.annual_return_rate = Some(dec!(6.1));

    let mut commons = property("prop-main-commons", "Main Street Commons", dec!(75), 12_000, 0);
    commons.property_type = PropertyType::Mixed;
    commons.city = "Vancouver".to_string();
    commons.state = Some("BC".to_string());
    commons.address = "2800 Main St".to_string();
    commons.status = PropertyStatus::SoldOut;
    commons.annual_return_rate = Some(dec!(5.4));

    vec![lofts, plaza, yards, commons]
}
