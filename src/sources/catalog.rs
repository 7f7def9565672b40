// src/sources/catalog.rs
//! Structured catalog source: the affiliate ItemList API.
//!
//! The endpoint returns everything we need structurally (id, title, date,
//! images, detail URL), so normalization here is a direct field mapping with
//! tolerant deserialization. Items without a content id or title are dropped.

use anyhow::{Context, Result};
use metrics::{counter, histogram};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

use crate::model::{ContentItem, ItemMeta, SourceKind, Subscription};
use crate::sources::{normalize_catalog_date, SourceAdapter};

pub const DEFAULT_ITEM_ENDPOINT: &str = "https://api.dmm.com/affiliate/v3/ItemList";
pub const DEFAULT_PERFORMER_ENDPOINT: &str = "https://api.dmm.com/affiliate/v3/ActressSearch";

// --- wire model (tolerant: every field optional) ---

#[derive(Debug, Deserialize)]
struct ApiResponse {
    result: Option<ApiResult>,
}

#[derive(Debug, Deserialize)]
struct ApiResult {
    #[serde(default)]
    items: Vec<RawItem>,
    #[serde(default)]
    actress: Vec<RawPerformer>,
}

#[derive(Debug, Deserialize)]
struct RawItem {
    content_id: Option<String>,
    title: Option<String>,
    date: Option<String>,
    #[serde(rename = "URL")]
    url: Option<String>,
    #[serde(rename = "affiliateURL")]
    affiliate_url: Option<String>,
    #[serde(rename = "imageURL")]
    image_url: Option<ImageUrls>,
    #[serde(rename = "sampleImageURL")]
    sample_image_url: Option<Value>,
    #[serde(rename = "sampleMovieURL")]
    sample_movie_url: Option<Value>,
    iteminfo: Option<ItemInfo>,
    // Object upstream ({count, average}); only string payloads feed the
    // duplicate-content rule.
    review: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
struct ImageUrls {
    #[serde(default)]
    list: Option<String>,
    #[serde(default)]
    small: Option<String>,
    #[serde(default)]
    large: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ItemInfo {
    #[serde(default)]
    genre: Vec<Named>,
    #[serde(default)]
    actress: Vec<Named>,
    comment: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Named {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawPerformer {
    id: Option<Value>,
    name: Option<String>,
    #[serde(rename = "imageURL")]
    image_url: Option<ImageUrls>,
}

/// Performer search hit, consumed by the registration collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct PerformerHit {
    pub id: String,
    pub name: String,
    pub image_url: String,
}

fn value_present(v: &Option<Value>) -> bool {
    match v {
        None | Some(Value::Null) => false,
        Some(Value::Object(o)) => !o.is_empty(),
        Some(Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    }
}

fn value_as_id(v: &Option<Value>) -> String {
    match v {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

enum Mode {
    Fixture(String),
    Http {
        item_endpoint: String,
        performer_endpoint: String,
        client: reqwest::Client,
    },
}

pub struct CatalogAdapter {
    mode: Mode,
    api_id: String,
    affiliate_id: String,
    timeout: Duration,
}

impl CatalogAdapter {
    pub fn new(api_id: String, affiliate_id: String, timeout: Duration) -> Self {
        Self::with_endpoints(
            api_id,
            affiliate_id,
            timeout,
            DEFAULT_ITEM_ENDPOINT.to_string(),
            DEFAULT_PERFORMER_ENDPOINT.to_string(),
        )
    }

    pub fn with_endpoints(
        api_id: String,
        affiliate_id: String,
        timeout: Duration,
        item_endpoint: String,
        performer_endpoint: String,
    ) -> Self {
        Self {
            mode: Mode::Http {
                item_endpoint,
                performer_endpoint,
                client: reqwest::Client::new(),
            },
            api_id,
            affiliate_id,
            timeout,
        }
    }

    /// Parse a canned ItemList JSON body instead of calling the network.
    pub fn from_fixture_str(body: &str) -> Self {
        Self {
            mode: Mode::Fixture(body.to_string()),
            api_id: String::new(),
            affiliate_id: String::new(),
            timeout: Duration::from_secs(15),
        }
    }

    fn parse_items(body: &str, entity: &str) -> Result<Vec<ContentItem>> {
        let t0 = std::time::Instant::now();
        let resp: ApiResponse = serde_json::from_str(body).context("parsing catalog json")?;
        let raw = resp.result.map(|r| r.items).unwrap_or_default();

        let mut out = Vec::with_capacity(raw.len());
        for it in raw {
            let id = it.content_id.clone().unwrap_or_default();
            let title = it.title.clone().unwrap_or_default();
            if id.is_empty() || title.is_empty() {
                continue;
            }

            let images = it.image_url.unwrap_or_default();
            let large = images.large.unwrap_or_default();
            let small = images
                .small
                .or(images.list)
                .unwrap_or_default();

            let info = it.iteminfo.unwrap_or_default();
            let mut notes = info.comment.unwrap_or_default();
            if let Some(Value::String(review)) = &it.review {
                if !notes.is_empty() {
                    notes.push(' ');
                }
                notes.push_str(review);
            }

            let detail_url = it
                .affiliate_url
                .or(it.url)
                .unwrap_or_else(|| format!("https://www.dmm.co.jp/digital/videoa/-/detail/=/cid={id}/"));

            let thumbnail = if !large.is_empty() {
                large.clone()
            } else {
                small.clone()
            };

            out.push(ContentItem {
                id,
                title,
                published_at: normalize_catalog_date(it.date.as_deref().unwrap_or_default()),
                detail_url,
                thumbnail_url: thumbnail,
                source: SourceKind::Catalog,
                entity: entity.to_string(),
                meta: ItemMeta {
                    genres: info.genre.into_iter().filter_map(|g| g.name).collect(),
                    performers: info.actress.len(),
                    notes,
                    image_large: large,
                    image_small: small,
                    has_sample_media: value_present(&it.sample_movie_url)
                        || value_present(&it.sample_image_url),
                },
            });
        }

        histogram!("source_parse_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
        counter!("source_items_total", "source" => "catalog").increment(out.len() as u64);
        Ok(out)
    }

    /// Search performers by keyword. Registration glue only; the poll run
    /// never calls this.
    pub async fn search_performers(&self, keyword: &str, hits: usize) -> Result<Vec<PerformerHit>> {
        let Mode::Http {
            performer_endpoint,
            client,
            ..
        } = &self.mode
        else {
            anyhow::bail!("performer search is unavailable in fixture mode");
        };

        let hits = hits.to_string();
        let body = client
            .get(performer_endpoint)
            .timeout(self.timeout)
            .query(&[
                ("api_id", self.api_id.as_str()),
                ("affiliate_id", self.affiliate_id.as_str()),
                ("keyword", keyword),
                ("hits", hits.as_str()),
                ("output", "json"),
            ])
            .send()
            .await
            .context("performer search get()")?
            .error_for_status()
            .context("performer search status")?
            .text()
            .await
            .context("performer search body")?;

        let resp: ApiResponse = serde_json::from_str(&body).context("parsing performer json")?;
        let raw = resp.result.map(|r| r.actress).unwrap_or_default();
        let found = raw
            .into_iter()
            .filter_map(|p| {
                let id = value_as_id(&p.id);
                let name = p.name.unwrap_or_default();
                if id.is_empty() || name.is_empty() {
                    return None;
                }
                let images = p.image_url.unwrap_or_default();
                let image_url = images
                    .small
                    .or(images.large)
                    .unwrap_or_default();
                Some(PerformerHit { id, name, image_url })
            })
            .collect();
        Ok(found)
    }
}

#[async_trait::async_trait]
impl SourceAdapter for CatalogAdapter {
    async fn fetch_latest(&self, sub: &Subscription, limit: usize) -> Result<Vec<ContentItem>> {
        let mut items = match &self.mode {
            Mode::Fixture(body) => Self::parse_items(body, &sub.display_name)?,
            Mode::Http {
                item_endpoint,
                client,
                ..
            } => {
                let hits = limit.to_string();
                let body = client
                    .get(item_endpoint)
                    .timeout(self.timeout)
                    .query(&[
                        ("api_id", self.api_id.as_str()),
                        ("affiliate_id", self.affiliate_id.as_str()),
                        ("site", "FANZA"),
                        ("service", "digital"),
                        ("floor", "videoa"),
                        ("article", "actress"),
                        ("article_id", sub.external_ref.as_str()),
                        ("hits", hits.as_str()),
                        ("sort", "date"),
                        ("output", "json"),
                    ])
                    .send()
                    .await
                    .context("catalog get()")?
                    .error_for_status()
                    .context("catalog status")?
                    .text()
                    .await
                    .context("catalog body")?;
                Self::parse_items(&body, &sub.display_name)?
            }
        };
        items.truncate(limit);
        Ok(items)
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Catalog
    }

    fn name(&self) -> &'static str {
        "catalog"
    }
}
