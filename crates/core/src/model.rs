//! Catalog value types shared by the cache and the pipeline.

use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

/// Named partition of the remote listing.
///
/// The two categories live in separate snapshots and are only merged when
/// an extended query reads them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    General,
    Restricted,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::General => "general",
            Category::Restricted => "restricted",
        }
    }

    /// The category merged after this one in extended mode.
    pub fn counterpart(&self) -> Category {
        match self {
            Category::General => Category::Restricted,
            Category::Restricted => Category::General,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One selectable file from the remote listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingEntry {
    pub name: String,
    pub content_location: Url,
}

impl ListingEntry {
    pub fn new(name: impl Into<String>, content_location: Url) -> Self {
        Self { name: name.into(), content_location }
    }
}
