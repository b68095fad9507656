//! Derived status values and badge tones.
//!
//! [`StockStatus::derive`] is the single source of truth for inventory
//! stock levels; the controller calls it before sending an update and the
//! store calls it after every merge.

use serde::{Deserialize, Serialize};

use crate::domain::{QuoteStatus, RequestStatus, Timeline, Urgency};
use crate::record::StatusKind;

/// Stock level of an inventory item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StockStatus {
    #[serde(rename = "In Stock")]
    InStock,
    #[serde(rename = "Low Stock")]
    LowStock,
    #[default]
    #[serde(rename = "Out of Stock")]
    OutOfStock,
}

impl StockStatus {
    /// Stock level from quantity on hand and the reorder threshold.
    ///
    /// Zero on hand is always out of stock, whatever the minimum; at or
    /// below the minimum is low.
    pub fn derive(quantity: u32, minimum_stock: u32) -> Self {
        if quantity == 0 {
            StockStatus::OutOfStock
        } else if quantity <= minimum_stock {
            StockStatus::LowStock
        } else {
            StockStatus::InStock
        }
    }
}

impl StatusKind for StockStatus {
    const ALL: &'static [Self] = &[
        StockStatus::InStock,
        StockStatus::LowStock,
        StockStatus::OutOfStock,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            StockStatus::InStock => "In Stock",
            StockStatus::LowStock => "Low Stock",
            StockStatus::OutOfStock => "Out of Stock",
        }
    }
}

/// Badge colour used by the view layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Red,
    Orange,
    Yellow,
    Green,
    Blue,
    Gray,
}

impl Tone {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Red => "red",
            Tone::Orange => "orange",
            Tone::Yellow => "yellow",
            Tone::Green => "green",
            Tone::Blue => "blue",
            Tone::Gray => "gray",
        }
    }
}

/// Anything rendered as a coloured badge.
pub trait Badge {
    fn tone(&self) -> Tone;
}

impl Badge for Urgency {
    fn tone(&self) -> Tone {
        match self {
            Urgency::Critical => Tone::Red,
            Urgency::High => Tone::Orange,
            Urgency::Medium => Tone::Yellow,
            Urgency::Low => Tone::Green,
        }
    }
}

impl Badge for Timeline {
    fn tone(&self) -> Tone {
        match self {
            Timeline::Express => Tone::Red,
            Timeline::Standard => Tone::Orange,
            Timeline::SameDay => Tone::Yellow,
        }
    }
}

impl Badge for RequestStatus {
    fn tone(&self) -> Tone {
        match self {
            RequestStatus::Pending => Tone::Yellow,
            RequestStatus::Scheduled => Tone::Blue,
            RequestStatus::Resolved => Tone::Green,
        }
    }
}

impl Badge for QuoteStatus {
    fn tone(&self) -> Tone {
        match self {
            QuoteStatus::Pending => Tone::Yellow,
            QuoteStatus::Reviewed => Tone::Orange,
            QuoteStatus::Quoted => Tone::Blue,
            QuoteStatus::Accepted => Tone::Green,
            QuoteStatus::Declined => Tone::Red,
        }
    }
}

impl Badge for StockStatus {
    fn tone(&self) -> Tone {
        match self {
            StockStatus::InStock => Tone::Green,
            StockStatus::LowStock => Tone::Yellow,
            StockStatus::OutOfStock => Tone::Red,
        }
    }
}

impl<B: Badge> Badge for Option<B> {
    fn tone(&self) -> Tone {
        self.as_ref().map(Badge::tone).unwrap_or(Tone::Gray)
    }
}
