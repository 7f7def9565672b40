pub mod discord;

use crate::model::ContentItem;

/// Webhook embed limit; a bigger batch is truncated at send time.
pub const MAX_ITEMS_PER_MESSAGE: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseItem {
    pub title: String,
    pub url: String,
    /// Coarse release day, `YYYY-MM-DD`.
    pub date: String,
    pub thumbnail_url: String,
}

impl From<&ContentItem> for ReleaseItem {
    fn from(item: &ContentItem) -> Self {
        Self {
            title: item.title.clone(),
            url: item.detail_url.clone(),
            date: item.release_day().to_string(),
            thumbnail_url: item.thumbnail_url.clone(),
        }
    }
}

/// One batched notification for one entity.
#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseBatch {
    pub entity: String,
    pub items: Vec<ReleaseItem>,
}

impl ReleaseBatch {
    pub fn from_items(entity: &str, items: &[ContentItem]) -> Self {
        Self {
            entity: entity.to_string(),
            items: items.iter().map(ReleaseItem::from).collect(),
        }
    }

    pub fn headline(&self) -> String {
        format!(
            "🎬 **{}** の新作が {} 件見つかりました！",
            self.entity,
            self.items.len()
        )
    }
}

/// Delivery outcome is boolean-like: Ok or an error the orchestrator logs.
/// No retry contract beyond what the implementation does internally.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, batch: &ReleaseBatch) -> anyhow::Result<()>;

    fn name(&self) -> &'static str;
}
