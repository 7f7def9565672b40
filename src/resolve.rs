// src/resolve.rs
//! Canonical category resolution for the blog source.
//!
//! The blog's search is keyword based and cross-contaminated: querying a
//! short or ambiguous name returns posts from co-starring performers'
//! categories too, and the single top hit is frequently the wrong one. The
//! resolver therefore majority-votes the category path over the whole result
//! set. The vote can still misattribute when a co-star's category out-hits
//! the queried performer's in a given result set; the losing paths are logged
//! at debug level so a suspect resolution can be audited.

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::time::Duration;

use crate::sources::blog::{image_urls, parse_feed, pick_thumbnail, FeedEntry};

/// Listing/index sections of the site; their posts are navigation pages, not
/// release articles, and never vote.
const DIRECTORY_SECTIONS: &[&str] = &["category", "tag", "archives"];

/// Article URLs follow a fixed two-segment shape: `{section}/{slug}/post-{id}`.
static RE_POST_PATH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https?://[^/]+/([^/]+)/([^/]+)/post-\d+").unwrap());

/// One article retained by the resolution, newest first.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedArticle {
    pub title: String,
    pub url: String,
    pub published_at: String,
    pub thumbnail_url: String,
}

/// Outcome of resolving a free-text query. An empty `canonical_path` means
/// "unresolved" — the caller treats that as a not-found search, not an error.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryResolution {
    pub canonical_path: String,
    pub matching_articles: Vec<ResolvedArticle>,
    pub match_count: usize,
}

impl CategoryResolution {
    pub fn is_resolved(&self) -> bool {
        !self.canonical_path.is_empty()
    }
}

fn extract_path(link: &str) -> Option<String> {
    let caps = RE_POST_PATH.captures(link)?;
    let section = &caps[1];
    if DIRECTORY_SECTIONS.contains(&section) {
        return None;
    }
    Some(format!("{section}/{}", &caps[2]))
}

/// Majority vote over already-parsed search results. Pure, no I/O.
///
/// Ties on occurrence count break toward the path seen first in feed order;
/// that determinism is load-bearing for repeat registrations.
pub fn resolve_from_entries(entries: &[FeedEntry]) -> CategoryResolution {
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut first_seen: Vec<String> = Vec::new();

    for entry in entries {
        let Some(path) = extract_path(&entry.link) else {
            continue;
        };
        let n = counts.entry(path.clone()).or_insert(0);
        if *n == 0 {
            first_seen.push(path);
        }
        *n += 1;
    }

    // Strictly-greater comparison in first-seen order, so ties keep the
    // earlier path.
    let mut winner: Option<&String> = None;
    for path in &first_seen {
        if winner.map_or(true, |w| counts[path.as_str()] > counts[w.as_str()]) {
            winner = Some(path);
        }
    }
    let Some(winner) = winner.cloned() else {
        return CategoryResolution::default();
    };

    for path in &first_seen {
        if *path != winner {
            tracing::debug!(path = %path, hits = counts[path.as_str()], "losing category path");
        }
    }

    let matching: Vec<ResolvedArticle> = entries
        .iter()
        .filter(|e| extract_path(&e.link).as_deref() == Some(winner.as_str()))
        .map(|e| ResolvedArticle {
            title: e.title.clone(),
            url: e.link.clone(),
            published_at: e.published_at.clone(),
            thumbnail_url: pick_thumbnail(&image_urls(&e.body)),
        })
        .collect();

    CategoryResolution {
        canonical_path: winner,
        match_count: matching.len(),
        matching_articles: matching,
    }
}

enum Mode {
    Fixture(String),
    Http {
        base_url: String,
        client: reqwest::Client,
    },
}

pub struct CategoryResolver {
    mode: Mode,
    timeout: Duration,
}

impl CategoryResolver {
    pub fn new(base_url: String, timeout: Duration) -> Self {
        Self {
            mode: Mode::Http {
                base_url: base_url.trim_end_matches('/').to_string(),
                client: reqwest::Client::new(),
            },
            timeout,
        }
    }

    /// Resolve against a canned search feed instead of the network.
    pub fn from_fixture_str(xml: &str) -> Self {
        Self {
            mode: Mode::Fixture(xml.to_string()),
            timeout: Duration::from_secs(15),
        }
    }

    pub async fn resolve(&self, query: &str) -> Result<CategoryResolution> {
        let entries = match &self.mode {
            Mode::Fixture(xml) => parse_feed(xml)?,
            Mode::Http { base_url, client } => {
                let body = client
                    .get(format!("{base_url}/"))
                    .timeout(self.timeout)
                    .query(&[("s", query), ("feed", "rss2")])
                    .send()
                    .await
                    .context("search feed get()")?
                    .error_for_status()
                    .context("search feed status")?
                    .text()
                    .await
                    .context("search feed body")?;
                parse_feed(&body)?
            }
        };
        Ok(resolve_from_entries(&entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(link: &str) -> FeedEntry {
        FeedEntry {
            title: format!("post at {link}"),
            link: link.to_string(),
            published_at: "2024-06-01 00:00:00".into(),
            body: String::new(),
        }
    }

    #[test]
    fn majority_path_wins_and_refilters() {
        let mut entries = Vec::new();
        for i in 0..3 {
            entries.push(entry(&format!("https://blog.test/av/alpha/post-{i}")));
        }
        for i in 0..5 {
            entries.push(entry(&format!("https://blog.test/av/beta/post-1{i}")));
        }
        for i in 0..2 {
            entries.push(entry(&format!("https://blog.test/av/gamma/post-2{i}")));
        }

        let res = resolve_from_entries(&entries);
        assert_eq!(res.canonical_path, "av/beta");
        assert_eq!(res.match_count, 5);
        assert!(res
            .matching_articles
            .iter()
            .all(|a| a.url.contains("/av/beta/")));
    }

    #[test]
    fn two_way_tie_breaks_on_first_seen() {
        let entries = vec![
            entry("https://blog.test/av/beta/post-1"),
            entry("https://blog.test/av/alpha/post-2"),
            entry("https://blog.test/av/alpha/post-3"),
            entry("https://blog.test/av/beta/post-4"),
        ];
        let res = resolve_from_entries(&entries);
        assert_eq!(res.canonical_path, "av/beta");
        assert_eq!(res.match_count, 2);
    }

    #[test]
    fn directory_listings_never_vote() {
        let entries = vec![
            entry("https://blog.test/category/new/post-1"),
            entry("https://blog.test/category/new/post-2"),
            entry("https://blog.test/av/alpha/post-3"),
        ];
        let res = resolve_from_entries(&entries);
        assert_eq!(res.canonical_path, "av/alpha");
    }

    #[test]
    fn no_extractable_path_is_unresolved_not_error() {
        let entries = vec![entry("https://blog.test/about"), entry("https://blog.test/")];
        let res = resolve_from_entries(&entries);
        assert!(!res.is_resolved());
        assert!(res.matching_articles.is_empty());
        assert_eq!(res.match_count, 0);

        let res = resolve_from_entries(&[]);
        assert!(!res.is_resolved());
    }
}
