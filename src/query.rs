//! Client-side filtering and search over store contents.
//!
//! Filters never touch a store; they borrow the records a view already
//! read and return the matching subset in collection order.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::domain::{
    InventoryItem, QuoteRequest, QuoteStatus, RequestStatus, Role, SupportRequest, Timeline,
    Urgency, User, UserRef,
};
use crate::record::Record;
use crate::status::StockStatus;

/// A predicate over one record kind.
pub trait Filter<R: Record> {
    fn matches(&self, record: &R) -> bool;

    /// The matching records, in their original order.
    fn apply<'a>(&self, records: &'a [R]) -> Vec<&'a R> {
        records.iter().filter(|r| self.matches(r)).collect()
    }
}

/// Case-insensitive substring match against any of `fields`. A blank
/// needle matches everything.
fn search_hit<'a>(needle: Option<&str>, fields: impl IntoIterator<Item = &'a str>) -> bool {
    let Some(needle) = needle.map(str::trim).filter(|n| !n.is_empty()) else {
        return true;
    };
    let needle = needle.to_lowercase();
    fields
        .into_iter()
        .any(|field| field.to_lowercase().contains(&needle))
}

fn customer_name(user: &UserRef) -> &str {
    user.name().unwrap_or_default()
}

#[derive(Debug, Clone, Default)]
pub struct SupportFilter {
    pub status: Option<RequestStatus>,
    pub urgency: Option<Urgency>,
    pub search: Option<String>,
}

impl Filter<SupportRequest> for SupportFilter {
    fn matches(&self, request: &SupportRequest) -> bool {
        self.status.map_or(true, |s| request.status == s)
            && self.urgency.map_or(true, |u| request.urgency == u)
            && search_hit(
                self.search.as_deref(),
                [
                    request.id.as_str(),
                    request.issue.as_str(),
                    request.device.as_str(),
                    customer_name(&request.user_id),
                ],
            )
    }
}

#[derive(Debug, Clone, Default)]
pub struct QuoteFilter {
    pub status: Option<QuoteStatus>,
    pub timeline: Option<Timeline>,
    pub search: Option<String>,
}

impl Filter<QuoteRequest> for QuoteFilter {
    fn matches(&self, quote: &QuoteRequest) -> bool {
        self.status.map_or(true, |s| quote.status == s)
            && self.timeline.map_or(true, |t| quote.timeline == t)
            && search_hit(
                self.search.as_deref(),
                [
                    quote.id.as_str(),
                    quote.service_type.as_str(),
                    customer_name(&quote.user_id),
                ],
            )
    }
}

#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    pub role: Option<Role>,
    pub staff_only: bool,
    pub search: Option<String>,
}

impl UserFilter {
    /// Users a ticket or quote can be assigned to.
    pub fn technicians() -> Self {
        Self {
            role: Some(Role::Technician),
            ..Self::default()
        }
    }
}

impl Filter<User> for UserFilter {
    fn matches(&self, user: &User) -> bool {
        self.role.map_or(true, |r| user.role == r)
            && (!self.staff_only || user.role.is_staff())
            && search_hit(
                self.search.as_deref(),
                [user.name.as_str(), user.email.as_str()],
            )
    }
}

#[derive(Debug, Clone, Default)]
pub struct InventoryFilter {
    pub category: Option<String>,
    pub status: Option<StockStatus>,
    pub search: Option<String>,
}

impl Filter<InventoryItem> for InventoryFilter {
    fn matches(&self, item: &InventoryItem) -> bool {
        self.category
            .as_deref()
            .map_or(true, |c| item.category.eq_ignore_ascii_case(c))
            && self.status.map_or(true, |s| item.status == s)
            && search_hit(
                self.search.as_deref(),
                [
                    item.name.as_str(),
                    item.sku.as_deref().unwrap_or_default(),
                    item.supplier.as_deref().unwrap_or_default(),
                ],
            )
    }
}

/// Headline figures for the inventory page.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventorySummary {
    pub total_items: usize,
    pub low_stock: usize,
    pub out_of_stock: usize,
    pub total_value: f64,
    /// Distinct categories, sorted.
    pub categories: Vec<String>,
}

impl InventorySummary {
    pub fn of(items: &[InventoryItem]) -> Self {
        let categories: BTreeSet<&str> = items.iter().map(|i| i.category.as_str()).collect();
        Self {
            total_items: items.len(),
            low_stock: items
                .iter()
                .filter(|i| i.status == StockStatus::LowStock)
                .count(),
            out_of_stock: items
                .iter()
                .filter(|i| i.status == StockStatus::OutOfStock)
                .count(),
            total_value: items.iter().map(InventoryItem::stock_value).sum(),
            categories: categories.into_iter().map(str::to_string).collect(),
        }
    }
}
