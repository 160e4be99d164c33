//! Listing surfaces and their sort keys.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Ordering requested for a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Most recently created first.
    Newest,
    /// Oldest first.
    Oldest,
    /// Cheapest first.
    PriceAsc,
    /// Most expensive first.
    PriceDesc,
    /// Alphabetical by title.
    NameAsc,
    /// Reverse alphabetical by title.
    NameDesc,
    /// Merchandising order. Only served through cursors by the store.
    Featured,
}

impl SortKey {
    /// All sort keys in declaration order.
    pub const ALL: [SortKey; 7] = [
        SortKey::Newest,
        SortKey::Oldest,
        SortKey::PriceAsc,
        SortKey::PriceDesc,
        SortKey::NameAsc,
        SortKey::NameDesc,
        SortKey::Featured,
    ];

    /// Stable snake_case name, matching the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Newest => "newest",
            SortKey::Oldest => "oldest",
            SortKey::PriceAsc => "price_asc",
            SortKey::PriceDesc => "price_desc",
            SortKey::NameAsc => "name_asc",
            SortKey::NameDesc => "name_desc",
            SortKey::Featured => "featured",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = UnknownSortKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        SortKey::ALL
            .into_iter()
            .find(|key| key.as_str() == normalized)
            .ok_or_else(|| UnknownSortKey(s.to_string()))
    }
}

/// Rejected sort key name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown sort key: {0:?}")]
pub struct UnknownSortKey(pub String);

/// A storefront listing surface. Each surface is browsed as its own feed;
/// items of different surfaces never share a feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingSurface {
    /// Product catalog.
    Products,
    /// Customer orders.
    Orders,
    /// Wishlist entries.
    WishlistItems,
    /// Blog posts.
    Posts,
    /// Bookable services.
    Services,
}

impl ListingSurface {
    /// All surfaces in declaration order.
    pub const ALL: [ListingSurface; 5] = [
        ListingSurface::Products,
        ListingSurface::Orders,
        ListingSurface::WishlistItems,
        ListingSurface::Posts,
        ListingSurface::Services,
    ];

    /// Stable snake_case name, matching the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingSurface::Products => "products",
            ListingSurface::Orders => "orders",
            ListingSurface::WishlistItems => "wishlist_items",
            ListingSurface::Posts => "posts",
            ListingSurface::Services => "services",
        }
    }

    /// Page size used when no settings override it.
    pub fn default_page_size(&self) -> usize {
        match self {
            ListingSurface::Products | ListingSurface::Services => 12,
            ListingSurface::Orders | ListingSurface::WishlistItems => 20,
            ListingSurface::Posts => 10,
        }
    }

    /// Page sizes offered to the user when no settings override them.
    pub fn default_page_size_options(&self) -> Vec<usize> {
        match self {
            ListingSurface::Products | ListingSurface::Services => vec![12, 20, 40],
            ListingSurface::Orders | ListingSurface::WishlistItems => vec![20, 50],
            ListingSurface::Posts => vec![10, 20],
        }
    }

    /// Sort applied when no settings override it.
    pub fn default_sort(&self) -> SortKey {
        match self {
            ListingSurface::Products => SortKey::Featured,
            ListingSurface::Services => SortKey::NameAsc,
            ListingSurface::Orders | ListingSurface::WishlistItems | ListingSurface::Posts => {
                SortKey::Newest
            }
        }
    }

    /// Sorts the store can answer with true `limit/offset` queries on this surface.
    pub fn offset_eligible_sorts(&self) -> Vec<SortKey> {
        match self {
            ListingSurface::Products => vec![
                SortKey::Newest,
                SortKey::Oldest,
                SortKey::PriceAsc,
                SortKey::PriceDesc,
            ],
            ListingSurface::Orders => vec![SortKey::Newest, SortKey::Oldest],
            ListingSurface::WishlistItems => vec![SortKey::Newest],
            ListingSurface::Posts => vec![SortKey::Newest, SortKey::Oldest],
            ListingSurface::Services => vec![SortKey::Newest, SortKey::NameAsc],
        }
    }
}

impl fmt::Display for ListingSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ListingSurface {
    type Err = UnknownSurface;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        let normalized = match normalized.as_str() {
            "wishlist" => "wishlist_items".to_string(),
            _ => normalized,
        };
        ListingSurface::ALL
            .into_iter()
            .find(|surface| surface.as_str() == normalized)
            .ok_or_else(|| UnknownSurface(s.to_string()))
    }
}

/// Rejected surface name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown listing surface: {0:?}")]
pub struct UnknownSurface(pub String);

/// How a surface presents its listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaginationType {
    /// Numbered pages.
    #[default]
    Paginated,
    /// One growing list loaded as the user scrolls.
    InfiniteScroll,
}

impl PaginationType {
    /// Canonical name.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaginationType::Paginated => "paginated",
            PaginationType::InfiniteScroll => "infinite_scroll",
        }
    }
}

impl fmt::Display for PaginationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_key_round_trips_through_display() {
        for key in SortKey::ALL {
            assert_eq!(key.to_string().parse::<SortKey>(), Ok(key));
        }
    }

    #[test]
    fn sort_key_accepts_kebab_case() {
        assert_eq!("price-desc".parse::<SortKey>(), Ok(SortKey::PriceDesc));
    }

    #[test]
    fn sort_key_rejects_unknown_name() {
        let err = "cheapest".parse::<SortKey>().unwrap_err();
        assert_eq!(err, UnknownSortKey("cheapest".to_string()));
    }

    #[test]
    fn surface_parses_wishlist_alias() {
        assert_eq!(
            "wishlist".parse::<ListingSurface>(),
            Ok(ListingSurface::WishlistItems)
        );
    }

    #[test]
    fn featured_is_never_offset_eligible_by_default() {
        for surface in ListingSurface::ALL {
            assert!(
                !surface.offset_eligible_sorts().contains(&SortKey::Featured),
                "{surface} should serve featured order through cursors"
            );
        }
    }

    #[test]
    fn default_page_size_is_among_default_options() {
        for surface in ListingSurface::ALL {
            assert!(surface
                .default_page_size_options()
                .contains(&surface.default_page_size()));
        }
    }
}
