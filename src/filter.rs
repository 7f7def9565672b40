// src/filter.rs
//! Exclusion rule chain for catalog items.
//!
//! A single ordered pass: every rule must pass (AND), the first failing rule
//! drops the item, and accumulation stops once `max_items` survivors are
//! collected. Input order (newest first) is preserved. Blog entries are not
//! run through this chain — that source is curated upstream.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::ContentItem;

/// Titles containing any of these are promotional re-cuts, not new releases.
pub const EXCLUDE_WORDS: &[&str] = &[
    "ベスト",
    "総集編",
    "傑作選",
    "プレミアム",
    "BEST",
    "100選",
    "4時間",
    "8時間",
    "【数量限定】",
];

/// Store-exclusive / outlet / bonus-edition label prefixes.
pub const EXCLUDE_TITLE_PREFIXES: &[&str] =
    &["【FANZA限定】", "【特選アウトレット】", "【プレコレ】", "【特典版】"];

/// Physical-media re-issues carry one of these suffixes.
pub const EXCLUDE_TITLE_SUFFIXES: &[&str] = &["（BOD）", "（ブルーレイディスク）"];

pub const EXCLUDE_GENRES: &[&str] = &["4時間以上作品", "VR専用"];

/// Omnibus releases credit more performers than this.
pub const MAX_PERFORMERS: usize = 4;

/// Default cap for the per-entity display strip. The notifier scans with a
/// much larger cap so a burst of releases is not silently truncated.
pub const MAX_ITEMS_PER_ENTITY: usize = 5;

/// "identical content to [X]" marker in the item comment or review text.
static DUPE_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new("と同じ内容です。").unwrap());

/// "now printing" placeholder cover, i.e. no real package image yet.
static PLACEHOLDER_IMAGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)now[_-]?printing|printing\.(?:jpe?g|png|gif)").unwrap());

fn title_excluded(title: &str) -> bool {
    if EXCLUDE_WORDS.iter().any(|w| title.contains(w)) {
        return true;
    }
    if EXCLUDE_TITLE_PREFIXES.iter().any(|p| title.starts_with(p)) {
        return true;
    }
    let trimmed = title.trim_end();
    EXCLUDE_TITLE_SUFFIXES.iter().any(|s| trimmed.ends_with(s))
}

fn image_excluded(item: &ContentItem) -> bool {
    let large = item.meta.image_large.as_str();
    let small = item.meta.image_small.as_str();
    if large.is_empty() && small.is_empty() {
        return true;
    }
    PLACEHOLDER_IMAGE.is_match(large) || PLACEHOLDER_IMAGE.is_match(small)
}

/// True when `item` survives every exclusion rule.
pub fn passes(item: &ContentItem, require_sample_media: bool) -> bool {
    if title_excluded(&item.title) {
        return false;
    }
    if item
        .meta
        .genres
        .iter()
        .any(|g| EXCLUDE_GENRES.contains(&g.as_str()))
    {
        return false;
    }
    if item.meta.performers > MAX_PERFORMERS {
        return false;
    }
    if DUPE_PATTERN.is_match(&item.meta.notes) {
        return false;
    }
    if image_excluded(item) {
        return false;
    }
    if require_sample_media && !item.meta.has_sample_media {
        return false;
    }
    true
}

/// Filter `items` in order, returning at most `max_items` survivors.
pub fn filter_items(
    items: &[ContentItem],
    max_items: usize,
    require_sample_media: bool,
) -> Vec<ContentItem> {
    let mut kept = Vec::with_capacity(max_items.min(items.len()));
    for item in items {
        if !passes(item, require_sample_media) {
            continue;
        }
        kept.push(item.clone());
        if kept.len() >= max_items {
            break;
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ItemMeta, SourceKind};

    fn item(title: &str) -> ContentItem {
        ContentItem {
            id: format!("id-{title}"),
            title: title.to_string(),
            published_at: "2024-06-01 00:00:00".into(),
            detail_url: "https://example.test/d".into(),
            thumbnail_url: "https://example.test/t.jpg".into(),
            source: SourceKind::Catalog,
            entity: "e".into(),
            meta: ItemMeta {
                image_large: "https://example.test/pl.jpg".into(),
                ..ItemMeta::default()
            },
        }
    }

    #[test]
    fn keyword_denylist_drops_compilations() {
        assert!(!passes(&item("永遠のBEST 50選"), false));
        assert!(!passes(&item("厳選総集編4時間"), false));
        assert!(passes(&item("新作タイトル"), false));
    }

    #[test]
    fn prefix_and_suffix_denylists() {
        assert!(!passes(&item("【FANZA限定】新作"), false));
        assert!(!passes(&item("新作タイトル（ブルーレイディスク）"), false));
        // Suffix check ignores trailing whitespace.
        assert!(!passes(&item("新作タイトル（BOD） "), false));
    }

    #[test]
    fn genre_and_performer_rules() {
        let mut it = item("新作");
        it.meta.genres = vec!["単体作品".into(), "VR専用".into()];
        assert!(!passes(&it, false));

        let mut it = item("新作");
        it.meta.performers = 5;
        assert!(!passes(&it, false));
        it.meta.performers = 4;
        assert!(passes(&it, false));
    }

    #[test]
    fn duplicate_content_marker_in_notes() {
        let mut it = item("新作");
        it.meta.notes = "この作品は「○○」と同じ内容です。".into();
        assert!(!passes(&it, false));
    }

    #[test]
    fn placeholder_or_missing_images_are_dropped() {
        let mut it = item("新作");
        it.meta.image_large.clear();
        it.meta.image_small.clear();
        assert!(!passes(&it, false));

        let mut it = item("新作");
        it.meta.image_large = "https://example.test/now_printing.jpg".into();
        assert!(!passes(&it, false));
    }

    #[test]
    fn sample_media_rule_is_flag_gated() {
        let it = item("新作");
        assert!(passes(&it, false));
        assert!(!passes(&it, true));

        let mut with_sample = item("新作");
        with_sample.meta.has_sample_media = true;
        assert!(passes(&with_sample, true));
    }

    #[test]
    fn cap_stops_accumulation_and_preserves_order() {
        let items: Vec<ContentItem> = (0..8).map(|i| item(&format!("新作{i}"))).collect();
        let out = filter_items(&items, 5, false);
        assert_eq!(out.len(), 5);
        let titles: Vec<&str> = out.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["新作0", "新作1", "新作2", "新作3", "新作4"]);
    }

    #[test]
    fn removing_an_excluded_item_does_not_change_other_verdicts() {
        let mut items = vec![item("新作A"), item("BEST盤"), item("新作B")];
        let full = filter_items(&items, 10, false);
        items.remove(1);
        let without = filter_items(&items, 10, false);
        assert_eq!(full, without);
    }
}
