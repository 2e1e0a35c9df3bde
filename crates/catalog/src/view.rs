use crate::codec::MediaType;
use crate::fetch::{Catalog, CatalogSource};
use crate::record::MediaRecord;
use std::fmt;
use std::str::FromStr;

/// Which records a view shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Filter {
    #[default]
    All,
    Only(MediaType),
}

impl Filter {
    pub fn matches(&self, record: &MediaRecord) -> bool {
        match self {
            Self::All => true,
            Self::Only(media_type) => record.media_type == *media_type,
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Only(media_type) => fmt::Display::fmt(media_type, f),
        }
    }
}

impl FromStr for Filter {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> crate::error::Result<Self> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        s.parse().map(Self::Only)
    }
}

/// What the last refresh produced, as far as a UI cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    /// Nothing loaded yet, or the gallery has no media.
    Empty,
    Loaded,
    /// The last refresh failed; any records shown are from before it.
    Unavailable,
}

/// The most recently fetched catalog plus the state a gallery screen needs.
///
/// Holds no connection and does no I/O; callers fetch a [`Catalog`] and hand
/// it over with [`set_catalog()`](Self::set_catalog).
#[derive(Debug, Default)]
pub struct CatalogView {
    catalog: Option<Catalog>,
    unavailable: bool,
}

impl CatalogView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace everything with a freshly fetched catalog.
    pub fn set_catalog(&mut self, catalog: Catalog) {
        self.catalog = Some(catalog);
        self.unavailable = false;
    }

    /// Record that the last refresh failed. Previously loaded records are kept.
    pub fn mark_unavailable(&mut self) {
        self.unavailable = true;
    }

    pub fn state(&self) -> ViewState {
        match &self.catalog {
            _ if self.unavailable => ViewState::Unavailable,
            Some(catalog) if !catalog.records.is_empty() => ViewState::Loaded,
            _ => ViewState::Empty,
        }
    }

    pub fn source(&self) -> Option<&CatalogSource> {
        self.catalog.as_ref().map(|catalog| &catalog.source)
    }

    pub fn records(&self) -> &[MediaRecord] {
        self.catalog.as_ref().map(|catalog| catalog.records.as_slice()).unwrap_or_default()
    }

    /// Records matching `filter`, in catalog order (newest first).
    pub fn filter(&self, filter: Filter) -> Vec<&MediaRecord> {
        self.records().iter().filter(|record| filter.matches(record)).collect()
    }
}
