//! Listing item carried by the demo catalog and the CLI.
//!
//! The engine is generic over its item type; this is the concrete one used by
//! [`InMemoryCatalog`](crate::source::memory::InMemoryCatalog).

use super::identifiers::{CategoryId, ItemId};
use super::surface::{ListingSurface, SortKey};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A single row of a storefront listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    /// Unique ID.
    pub id: ItemId,
    /// Surface the item belongs to.
    pub surface: ListingSurface,
    /// Display title, also the search target.
    pub title: String,
    /// Category, if any.
    pub category: Option<CategoryId>,
    /// Price in minor currency units.
    pub price_cents: u64,
    /// Merchandising rank, lower first.
    pub featured_rank: u32,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl CatalogItem {
    /// Case-insensitive substring match on the title. Empty terms match everything.
    pub fn matches_search(&self, term: &str) -> bool {
        term.is_empty() || self.title.to_lowercase().contains(&term.to_lowercase())
    }

    /// Whether the item belongs to `category` (`None` matches everything).
    pub fn in_category(&self, category: Option<&CategoryId>) -> bool {
        match category {
            Some(wanted) => self.category.as_ref() == Some(wanted),
            None => true,
        }
    }

    /// Total order for `sort`; ties break on ID so results are stable.
    pub fn compare(&self, other: &Self, sort: SortKey) -> Ordering {
        let primary = match sort {
            SortKey::Newest => other.created_at.cmp(&self.created_at),
            SortKey::Oldest => self.created_at.cmp(&other.created_at),
            SortKey::PriceAsc => self.price_cents.cmp(&other.price_cents),
            SortKey::PriceDesc => other.price_cents.cmp(&self.price_cents),
            SortKey::NameAsc => self.title.cmp(&other.title),
            SortKey::NameDesc => other.title.cmp(&self.title),
            SortKey::Featured => self.featured_rank.cmp(&other.featured_rank),
        };
        primary.then_with(|| self.id.cmp(&other.id))
    }
}
