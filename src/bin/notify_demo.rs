//! Demo that pushes one fake release batch through the configured webhook.
//! Useful for checking the channel wiring without touching the ledger.

use release_radar::notify::discord::DiscordNotifier;
use release_radar::notify::{Notifier, ReleaseBatch, ReleaseItem};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_target(false).init();
    let _ = dotenvy::dotenv();

    let Ok(webhook) = std::env::var("DISCORD_WEBHOOK_URL") else {
        eprintln!("DISCORD_WEBHOOK_URL is not set; nothing to do.");
        return;
    };

    let sink = DiscordNotifier::new(webhook);
    let batch = ReleaseBatch {
        entity: "テスト".to_string(),
        items: vec![ReleaseItem {
            title: "notify-demo 動作確認".to_string(),
            url: "https://example.invalid/demo".to_string(),
            date: "2024-01-01".to_string(),
            thumbnail_url: String::new(),
        }],
    };

    match sink.send(&batch).await {
        Ok(()) => println!("notify-demo done"),
        Err(e) => eprintln!("notify-demo failed: {e:#}"),
    }
}
