// src/model.rs
//! Canonical item model shared by both source adapters.
//!
//! Everything downstream of the adapters (filter, ledger diff, aggregation,
//! notification) operates on `ContentItem` only; the raw catalog/feed shapes
//! never leak past `sources/`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Catalog,
    Blog,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Catalog => "catalog",
            SourceKind::Blog => "blog",
        }
    }
}

impl std::str::FromStr for SourceKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "catalog" => Ok(SourceKind::Catalog),
            "blog" => Ok(SourceKind::Blog),
            other => Err(anyhow::anyhow!("unknown source kind: {other}")),
        }
    }
}

/// Catalog-only metadata consumed by the exclusion rules.
/// Blog entries carry the default (the blog source is curated, see filter.rs).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemMeta {
    pub genres: Vec<String>,
    pub performers: usize,
    /// Item comment + review text, used by the duplicate-content rule.
    pub notes: String,
    pub image_large: String,
    pub image_small: String,
    pub has_sample_media: bool,
}

/// One normalized release, regardless of which source produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    /// Stable dedup key: catalog content id, or the canonical post URL for
    /// blog entries. Never empty — id-less results are dropped at the adapter.
    pub id: String,
    pub title: String,
    /// `YYYY-MM-DD HH:MM:SS`, comparable lexicographically across sources.
    pub published_at: String,
    pub detail_url: String,
    pub thumbnail_url: String,
    pub source: SourceKind,
    /// Display name of the subscription this item was fetched for.
    pub entity: String,
    #[serde(default)]
    pub meta: ItemMeta,
}

impl ContentItem {
    /// Release date coarse to day granularity, as shown in notifications.
    pub fn release_day(&self) -> &str {
        let s = self.published_at.as_str();
        if s.len() >= 10 {
            &s[..10]
        } else {
            s
        }
    }
}

/// One tracked performer, read once per run. Created and deleted by the
/// registration collaborator; the poll run never mutates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub display_name: String,
    /// Catalog performer id, or the canonical blog category path.
    pub external_ref: String,
    pub source: SourceKind,
    /// Presentation-only grouping; carried through, never interpreted.
    #[serde(default)]
    pub group_label: String,
}
