use repairdesk_macros::Keyed;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::require_non_empty;
use crate::error::SyncError;
use crate::record::{Draft, Endpoints, Operation, Record};
use crate::session::CurrentUser;
use crate::status::StockStatus;

const STATUS_FIELD: &str = "status";

/// A stocked part or accessory.
///
/// `status` is never taken from the wire: it is recomputed from
/// `quantity` and `minimum_stock` whenever the item enters a store or is merged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Keyed)]
#[keyed(collection = "inventory_items")]
pub struct InventoryItem {
    #[keyed(id)]
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier: Option<String>,
    pub quantity: u32,
    #[serde(rename = "minimumStock", alias = "minStock", default)]
    pub minimum_stock: u32,
    pub price: f64,
    #[serde(skip_deserializing, default)]
    pub status: StockStatus,
}

impl InventoryItem {
    /// Value of the units on hand.
    pub fn stock_value(&self) -> f64 {
        f64::from(self.quantity) * self.price
    }
}

/// Payload for adding an item to inventory.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewInventoryItem {
    pub name: String,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplier: Option<String>,
    pub quantity: u32,
    #[serde(rename = "minimumStock")]
    pub minimum_stock: u32,
    pub price: f64,
}

impl Draft for NewInventoryItem {
    fn validate(&self) -> Result<(), SyncError> {
        require_non_empty("name", &self.name)?;
        require_non_empty("category", &self.category)?;
        validate_price(self.price)
    }

    fn to_body(&self) -> Result<Value, serde_json::Error> {
        let mut body = serde_json::to_value(self)?;
        if let Value::Object(fields) = &mut body {
            let status = StockStatus::derive(self.quantity, self.minimum_stock);
            fields.insert(STATUS_FIELD.into(), serde_json::to_value(status)?);
        }
        Ok(body)
    }
}

/// Stock and catalogue fields an admin may change.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InventoryPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
    #[serde(rename = "minimumStock", skip_serializing_if = "Option::is_none")]
    pub minimum_stock: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}

impl InventoryPatch {
    /// The quick stock update form: quantity, minimum and price together.
    pub fn stock(quantity: u32, minimum_stock: u32, price: f64) -> Self {
        Self {
            quantity: Some(quantity),
            minimum_stock: Some(minimum_stock),
            price: Some(price),
            ..Self::default()
        }
    }

    pub fn quantity(quantity: u32) -> Self {
        Self {
            quantity: Some(quantity),
            ..Self::default()
        }
    }
}

fn validate_price(price: f64) -> Result<(), SyncError> {
    if price.is_finite() && price >= 0.0 {
        Ok(())
    } else {
        Err(SyncError::Invalid {
            field: "price",
            message: "must be a non-negative amount".into(),
        })
    }
}

impl Record for InventoryItem {
    type Status = StockStatus;
    type Draft = NewInventoryItem;
    type Patch = InventoryPatch;

    const ENDPOINTS: Endpoints = Endpoints::rest("/inventory");

    fn status(&self) -> Option<StockStatus> {
        Some(StockStatus::derive(self.quantity, self.minimum_stock))
    }

    fn refresh_derived(&mut self) {
        self.status = StockStatus::derive(self.quantity, self.minimum_stock);
    }

    fn outgoing_patch(
        current: Option<&Self>,
        patch: &InventoryPatch,
    ) -> Result<Value, serde_json::Error> {
        let mut body = serde_json::to_value(patch)?;
        let quantity = patch.quantity.or(current.map(|c| c.quantity));
        let minimum = patch.minimum_stock.or(current.map(|c| c.minimum_stock));
        if let (Some(quantity), Some(minimum), Value::Object(fields)) =
            (quantity, minimum, &mut body)
        {
            let status = StockStatus::derive(quantity, minimum);
            fields.insert(STATUS_FIELD.into(), serde_json::to_value(status)?);
        }
        Ok(body)
    }

    fn validate_patch(patch: &InventoryPatch) -> Result<(), SyncError> {
        if let Some(name) = &patch.name {
            require_non_empty("name", name)?;
        }
        if let Some(category) = &patch.category {
            require_non_empty("category", category)?;
        }
        match patch.price {
            Some(price) => validate_price(price),
            None => Ok(()),
        }
    }

    fn authorize(op: Operation, user: Option<&CurrentUser>) -> Result<(), String> {
        match op {
            Operation::Update if !user.map(|u| u.role.is_admin()).unwrap_or(false) => {
                Err("You do not have permission to update stock.".into())
            }
            _ => Ok(()),
        }
    }
}
