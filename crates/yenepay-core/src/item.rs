//! # Item Types
//!
//! Sellable line entries for a checkout session.

use crate::error::{CheckoutError, CheckoutResult};
use crate::wire::{to_wire_map, WireMap};
use serde::Serialize;

/// A line item as the gateway expects it
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// Unique identifier of the item within the merchant's catalog
    item_id: String,

    /// Display name
    item_name: String,

    /// Unit price in the merchant's currency
    unit_price: f64,

    /// Quantity
    quantity: u32,
}

impl Item {
    /// Create a validated item.
    ///
    /// Fails with `CheckoutError::Validation` if the price is negative or not
    /// finite, or if the quantity is negative.
    pub fn new(
        item_id: impl Into<String>,
        item_name: impl Into<String>,
        unit_price: f64,
        quantity: i64,
    ) -> CheckoutResult<Self> {
        Ok(Self {
            item_id: item_id.into(),
            item_name: item_name.into(),
            unit_price: validate_price(unit_price)?,
            quantity: validate_quantity(quantity)?,
        })
    }

    pub fn item_id(&self) -> &str {
        &self.item_id
    }

    pub fn item_name(&self) -> &str {
        &self.item_name
    }

    pub fn unit_price(&self) -> f64 {
        self.unit_price
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn set_item_id(&mut self, item_id: impl Into<String>) {
        self.item_id = item_id.into();
    }

    pub fn set_item_name(&mut self, item_name: impl Into<String>) {
        self.item_name = item_name.into();
    }

    /// Set the unit price (rejects negative and non-finite values)
    pub fn set_unit_price(&mut self, unit_price: f64) -> CheckoutResult<()> {
        self.unit_price = validate_price(unit_price)?;
        Ok(())
    }

    /// Set the quantity (rejects negative values)
    pub fn set_quantity(&mut self, quantity: i64) -> CheckoutResult<()> {
        self.quantity = validate_quantity(quantity)?;
        Ok(())
    }

    /// Unit price times quantity
    pub fn total(&self) -> f64 {
        self.unit_price * f64::from(self.quantity)
    }

    /// Flat map keyed by the gateway's field names
    pub fn as_dict(&self) -> CheckoutResult<WireMap> {
        to_wire_map(self)
    }

    pub(crate) fn merge_quantity(&mut self, extra: u32) {
        self.quantity = self.quantity.saturating_add(extra);
    }
}

fn validate_price(price: f64) -> CheckoutResult<f64> {
    if !price.is_finite() {
        return Err(CheckoutError::Validation(format!(
            "invalid price: got non-finite price {}",
            price
        )));
    }
    if price < 0.0 {
        return Err(CheckoutError::Validation(format!(
            "invalid price: got negative price {}",
            price
        )));
    }
    Ok(price)
}

fn validate_quantity(quantity: i64) -> CheckoutResult<u32> {
    if quantity < 0 {
        return Err(CheckoutError::Validation(format!(
            "invalid quantity: got negative quantity {}",
            quantity
        )));
    }
    u32::try_from(quantity).map_err(|_| {
        CheckoutError::Validation(format!("invalid quantity: {} is too large", quantity))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_negative_values_rejected() {
        for (price, quantity) in [(-0.01, 1), (10.0, -1), (-5.0, -5)] {
            let err = Item::new("item-0", "Car", price, quantity).unwrap_err();
            assert!(matches!(err, CheckoutError::Validation(_)));
        }
    }

    #[test]
    fn test_non_finite_price_rejected() {
        assert!(Item::new("item-0", "Car", f64::NAN, 1).is_err());
        assert!(Item::new("item-0", "Car", f64::INFINITY, 1).is_err());
    }

    #[test]
    fn test_zero_values_accepted() {
        let item = Item::new("free", "Sample", 0.0, 0).unwrap();
        assert_eq!(item.unit_price(), 0.0);
        assert_eq!(item.quantity(), 0);
    }

    #[test]
    fn test_as_dict_uses_gateway_names() {
        let item = Item::new("item-0", "Car", 100.0, 2).unwrap();
        let dict = item.as_dict().unwrap();

        assert_eq!(
            serde_json::Value::Object(dict),
            json!({
                "itemId": "item-0",
                "itemName": "Car",
                "unitPrice": 100.0,
                "quantity": 2
            })
        );
    }

    #[test]
    fn test_setters_validate() {
        let mut item = Item::new("item-1", "Plane", 120.0, 1).unwrap();

        assert!(item.set_unit_price(-1.0).is_err());
        assert!(item.set_quantity(-3).is_err());
        assert_eq!(item.unit_price(), 120.0);
        assert_eq!(item.quantity(), 1);

        item.set_quantity(4).unwrap();
        assert_eq!(item.total(), 480.0);
    }

    #[test]
    fn test_merge_quantity_saturates() {
        let mut item = Item::new("item-0", "Car", 1.0, i64::from(u32::MAX)).unwrap();
        item.merge_quantity(10);
        assert_eq!(item.quantity(), u32::MAX);
    }
}
