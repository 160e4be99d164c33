//! Listing settings normalisation.
//!
//! Stored listing settings come in two shapes. Version 1 only knew a boolean
//! `showPagination`; version 2 names the pagination type. [`normalize`] runs
//! once at load and maps either into [`ListingSettings`]:
//!
//! | version | `paginationType`                 | `showPagination` | result          |
//! |---------|----------------------------------|------------------|-----------------|
//! | 1       | (ignored)                        | `true` / absent  | Paginated       |
//! | 1       | (ignored)                        | `false`          | InfiniteScroll  |
//! | 2       | `paginated` / `pages`            | (ignored)        | Paginated       |
//! | 2       | `infinite` / `infinite_scroll`   | (ignored)        | InfiniteScroll  |
//! | 2       | absent                           | as version 1     | as version 1    |
//!
//! A missing version is inferred: 2 when `paginationType` is present, else 1.

use crate::model::{ListingSurface, PageSize, PaginationType, SortKey};
use serde::Deserialize;
use thiserror::Error;

/// Newest settings version understood.
pub const CURRENT_SETTINGS_VERSION: u32 = 2;

/// Errors while normalising listing settings.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SettingsError {
    /// Version newer (or older) than anything known.
    #[error("Unsupported settings version {0}")]
    UnsupportedVersion(u32),

    /// `paginationType` value not in the table.
    #[error("Unknown pagination type {0:?}")]
    UnknownPaginationType(String),

    /// `pageSize` or an option is zero.
    #[error("Invalid page size {0}")]
    InvalidPageSize(usize),

    /// `pageSize` missing from explicit `pageSizeOptions`.
    #[error("Page size {page_size} is not one of the offered options {options:?}")]
    PageSizeNotOffered {
        /// Requested page size.
        page_size: usize,
        /// Offered options.
        options: Vec<usize>,
    },

    /// `defaultSort` not a known sort key.
    #[error("Unknown default sort {0:?}")]
    UnknownSort(String),
}

/// Listing settings as stored, before normalisation.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct RawListingSettings {
    /// Settings version.
    #[serde(default)]
    pub version: Option<u32>,

    /// Legacy pagination toggle.
    #[serde(default, alias = "show_pagination")]
    pub show_pagination: Option<bool>,

    /// Pagination type name.
    #[serde(default, alias = "pagination_type")]
    pub pagination_type: Option<String>,

    /// Default page size.
    #[serde(default, alias = "page_size")]
    pub page_size: Option<usize>,

    /// Page sizes the user can pick.
    #[serde(default, alias = "page_size_options")]
    pub page_size_options: Option<Vec<usize>>,

    /// Default sort key name.
    #[serde(default, alias = "default_sort")]
    pub default_sort: Option<String>,
}

/// Canonical listing settings for one surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingSettings {
    /// Numbered pages or infinite scroll.
    pub pagination_type: PaginationType,
    /// Page size on first visit.
    pub page_size: PageSize,
    /// Page sizes offered, ascending.
    pub page_size_options: Vec<PageSize>,
    /// Sort on first visit.
    pub default_sort: SortKey,
}

impl ListingSettings {
    /// Built-in settings for `surface`.
    pub fn defaults_for(surface: ListingSurface) -> Self {
        let page_size_options: Vec<PageSize> = surface
            .default_page_size_options()
            .into_iter()
            .filter_map(|size| PageSize::new(size).ok())
            .collect();
        let page_size = PageSize::new(surface.default_page_size())
            .ok()
            .or_else(|| page_size_options.first().copied())
            .unwrap_or(PageSize::MIN);
        Self {
            pagination_type: PaginationType::Paginated,
            page_size,
            page_size_options,
            default_sort: surface.default_sort(),
        }
    }

    /// Same settings with `page_size`, added to the options if missing.
    pub fn with_page_size(mut self, page_size: PageSize) -> Self {
        if !self.page_size_options.contains(&page_size) {
            self.page_size_options.push(page_size);
            self.page_size_options.sort();
        }
        self.page_size = page_size;
        self
    }

    /// Same settings with another pagination type.
    pub fn with_pagination_type(mut self, pagination_type: PaginationType) -> Self {
        self.pagination_type = pagination_type;
        self
    }
}

/// Map stored settings for `surface` to canonical form.
///
/// # Errors
///
/// Returns [`SettingsError`] for versions or values outside the table.
pub fn normalize(surface: ListingSurface, raw: &RawListingSettings) -> Result<ListingSettings, SettingsError> {
    let defaults = ListingSettings::defaults_for(surface);

    let version = raw
        .version
        .unwrap_or(if raw.pagination_type.is_some() { 2 } else { 1 });
    let pagination_type = match version {
        1 => legacy_pagination_type(raw.show_pagination),
        2 => match raw.pagination_type.as_deref() {
            Some(name) => parse_pagination_type(name)?,
            None => legacy_pagination_type(raw.show_pagination),
        },
        other => return Err(SettingsError::UnsupportedVersion(other)),
    };

    let explicit_options = raw
        .page_size_options
        .as_ref()
        .map(|options| {
            let mut sizes = options
                .iter()
                .map(|&size| PageSize::new(size).map_err(|_| SettingsError::InvalidPageSize(size)))
                .collect::<Result<Vec<_>, _>>()?;
            sizes.sort();
            sizes.dedup();
            Ok::<_, SettingsError>(sizes)
        })
        .transpose()?;

    let mut settings = ListingSettings {
        pagination_type,
        page_size: defaults.page_size,
        page_size_options: explicit_options.clone().unwrap_or(defaults.page_size_options),
        default_sort: defaults.default_sort,
    };

    match (raw.page_size, &explicit_options) {
        (Some(size), Some(options)) => {
            let page_size = PageSize::new(size).map_err(|_| SettingsError::InvalidPageSize(size))?;
            if !options.contains(&page_size) {
                return Err(SettingsError::PageSizeNotOffered {
                    page_size: size,
                    options: options.iter().map(PageSize::get).collect(),
                });
            }
            settings.page_size = page_size;
        }
        (Some(size), None) => {
            let page_size = PageSize::new(size).map_err(|_| SettingsError::InvalidPageSize(size))?;
            settings = settings.with_page_size(page_size);
        }
        (None, Some(options)) => {
            if !options.contains(&settings.page_size) {
                if let Some(first) = options.first() {
                    settings.page_size = *first;
                }
            }
        }
        (None, None) => {}
    }

    if let Some(name) = &raw.default_sort {
        settings.default_sort = name
            .parse()
            .map_err(|_| SettingsError::UnknownSort(name.clone()))?;
    }

    Ok(settings)
}

fn legacy_pagination_type(show_pagination: Option<bool>) -> PaginationType {
    match show_pagination {
        Some(false) => PaginationType::InfiniteScroll,
        Some(true) | None => PaginationType::Paginated,
    }
}

fn parse_pagination_type(name: &str) -> Result<PaginationType, SettingsError> {
    match name.trim().to_ascii_lowercase().replace('-', "_").as_str() {
        "paginated" | "pages" => Ok(PaginationType::Paginated),
        "infinite" | "infinite_scroll" => Ok(PaginationType::InfiniteScroll),
        _ => Err(SettingsError::UnknownPaginationType(name.to_string())),
    }
}
