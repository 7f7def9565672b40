use anyhow::{anyhow, Result};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use super::{Notifier, ReleaseBatch, MAX_ITEMS_PER_MESSAGE};

const EMBED_COLOR: u32 = 0xFF6699;

#[derive(Clone)]
pub struct DiscordNotifier {
    webhook: String,
    client: Client,
    timeout: Duration,
    max_retries: u8,
}

impl DiscordNotifier {
    pub fn new(webhook: String) -> Self {
        Self {
            webhook,
            client: Client::new(),
            timeout: Duration::from_secs(15),
            max_retries: 3,
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    pub fn with_retries(mut self, retries: u8) -> Self {
        self.max_retries = retries;
        self
    }
}

#[async_trait::async_trait]
impl Notifier for DiscordNotifier {
    async fn send(&self, batch: &ReleaseBatch) -> Result<()> {
        if batch.items.is_empty() {
            return Ok(());
        }
        let payload = WebhookPayload::from_batch(batch);

        let mut attempt: u8 = 0;
        loop {
            attempt += 1;
            let res = self
                .client
                .post(&self.webhook)
                .timeout(self.timeout)
                .json(&payload)
                .send()
                .await;

            match res {
                Ok(rsp) => {
                    if let Err(e) = rsp.error_for_status_ref() {
                        if attempt < self.max_retries {
                            tokio::time::sleep(Duration::from_millis(500u64 << (attempt - 1)))
                                .await;
                            continue;
                        }
                        return Err(anyhow!("Discord webhook HTTP error: {e}"));
                    }
                    return Ok(());
                }
                Err(e) => {
                    if attempt < self.max_retries {
                        tokio::time::sleep(Duration::from_millis(500u64 << (attempt - 1))).await;
                        continue;
                    }
                    return Err(anyhow!("Discord webhook request failed: {e}"));
                }
            }
        }
    }

    fn name(&self) -> &'static str {
        "discord"
    }
}

#[derive(Debug, Serialize)]
struct WebhookPayload {
    content: String,
    embeds: Vec<Embed>,
}

#[derive(Debug, Serialize)]
struct Embed {
    title: String,
    url: String,
    color: u32,
    fields: Vec<EmbedField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    thumbnail: Option<EmbedThumbnail>,
}

#[derive(Debug, Serialize)]
struct EmbedField {
    name: String,
    value: String,
    inline: bool,
}

#[derive(Debug, Serialize)]
struct EmbedThumbnail {
    url: String,
}

impl WebhookPayload {
    fn from_batch(batch: &ReleaseBatch) -> Self {
        let embeds = batch
            .items
            .iter()
            .take(MAX_ITEMS_PER_MESSAGE)
            .map(|it| Embed {
                title: it.title.clone(),
                url: it.url.clone(),
                color: EMBED_COLOR,
                fields: vec![EmbedField {
                    name: "発売日".to_string(),
                    value: it.date.clone(),
                    inline: true,
                }],
                thumbnail: if it.thumbnail_url.is_empty() {
                    None
                } else {
                    Some(EmbedThumbnail {
                        url: it.thumbnail_url.clone(),
                    })
                },
            })
            .collect();

        Self {
            content: batch.headline(),
            embeds,
        }
    }
}
