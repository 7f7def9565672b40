// tests/common/mod.rs
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use release_radar::model::{ContentItem, ItemMeta, SourceKind, Subscription};
use release_radar::notify::{Notifier, ReleaseBatch};
use release_radar::sources::SourceAdapter;

/// Adapter that replays a fixed item list for every subscription.
pub struct StaticAdapter {
    pub kind: SourceKind,
    pub items: Vec<ContentItem>,
}

#[async_trait::async_trait]
impl SourceAdapter for StaticAdapter {
    async fn fetch_latest(
        &self,
        sub: &Subscription,
        limit: usize,
    ) -> anyhow::Result<Vec<ContentItem>> {
        Ok(self
            .items
            .iter()
            .take(limit)
            .cloned()
            .map(|mut it| {
                it.entity = sub.display_name.clone();
                it
            })
            .collect())
    }

    fn kind(&self) -> SourceKind {
        self.kind
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

/// Adapter that always fails, for outage-isolation tests.
pub struct BrokenAdapter {
    pub kind: SourceKind,
}

#[async_trait::async_trait]
impl SourceAdapter for BrokenAdapter {
    async fn fetch_latest(
        &self,
        _sub: &Subscription,
        _limit: usize,
    ) -> anyhow::Result<Vec<ContentItem>> {
        anyhow::bail!("simulated upstream outage")
    }

    fn kind(&self) -> SourceKind {
        self.kind
    }

    fn name(&self) -> &'static str {
        "broken"
    }
}

/// Sink that records every delivered batch; optionally fails every send.
pub struct RecordingSink {
    pub sent: Arc<Mutex<Vec<ReleaseBatch>>>,
    pub fail: bool,
}

impl RecordingSink {
    pub fn new() -> (Self, Arc<Mutex<Vec<ReleaseBatch>>>) {
        let sent = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                sent: sent.clone(),
                fail: false,
            },
            sent,
        )
    }

    pub fn failing() -> (Self, Arc<Mutex<Vec<ReleaseBatch>>>) {
        let (mut sink, sent) = Self::new();
        sink.fail = true;
        (sink, sent)
    }
}

#[async_trait::async_trait]
impl Notifier for RecordingSink {
    async fn send(&self, batch: &ReleaseBatch) -> anyhow::Result<()> {
        if self.fail {
            anyhow::bail!("simulated webhook failure");
        }
        self.sent.lock().unwrap().push(batch.clone());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

pub fn catalog_item(id: &str, date: &str, title: &str) -> ContentItem {
    ContentItem {
        id: id.to_string(),
        title: title.to_string(),
        published_at: date.to_string(),
        detail_url: format!("https://example.test/detail/{id}"),
        thumbnail_url: format!("https://pics.example.test/{id}pl.jpg"),
        source: SourceKind::Catalog,
        entity: String::new(),
        meta: ItemMeta {
            image_large: format!("https://pics.example.test/{id}pl.jpg"),
            ..ItemMeta::default()
        },
    }
}

pub fn blog_item(url: &str, date: &str, title: &str) -> ContentItem {
    ContentItem {
        id: url.to_string(),
        title: title.to_string(),
        published_at: date.to_string(),
        detail_url: url.to_string(),
        thumbnail_url: String::new(),
        source: SourceKind::Blog,
        entity: String::new(),
        meta: ItemMeta::default(),
    }
}

pub fn catalog_sub(name: &str, id: &str) -> Subscription {
    Subscription {
        display_name: name.to_string(),
        external_ref: id.to_string(),
        source: SourceKind::Catalog,
        group_label: String::new(),
    }
}

pub fn blog_sub(name: &str, path: &str) -> Subscription {
    Subscription {
        display_name: name.to_string(),
        external_ref: path.to_string(),
        source: SourceKind::Blog,
        group_label: String::new(),
    }
}
