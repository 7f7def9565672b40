//! Registration collaborator: search performers (catalog) or resolve a blog
//! category, then append subscription rows. The poll run itself never writes
//! the subscription table.

use anyhow::Result;
use clap::Parser;
use std::time::Duration;

use release_radar::config::RadarConfig;
use release_radar::model::{SourceKind, Subscription};
use release_radar::resolve::CategoryResolver;
use release_radar::sources::catalog::CatalogAdapter;
use release_radar::store::JsonlStore;
use release_radar::subscriptions;

#[derive(Parser, Debug)]
#[command(name = "register", about = "Register performers for release polling")]
struct Args {
    /// Performer names to register.
    #[arg(required = true)]
    names: Vec<String>,

    /// Resolve against the blog instead of the catalog performer search.
    #[arg(long)]
    blog: bool,

    /// Presentation group label stored with each row.
    #[arg(long, default_value = "")]
    group: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_target(false).init();
    let _ = dotenvy::dotenv();

    let args = Args::parse();
    let cfg = RadarConfig::load()?;
    let store = JsonlStore::new(&cfg.data_dir);
    let timeout = Duration::from_secs(cfg.http_timeout_secs);

    let mut to_add: Vec<Subscription> = Vec::new();

    if args.blog {
        if cfg.blog_base_url.is_empty() {
            anyhow::bail!("BLOG_BASE_URL is not configured");
        }
        let resolver = CategoryResolver::new(cfg.blog_base_url.clone(), timeout);
        for name in &args.names {
            let res = resolver.resolve(name).await?;
            if !res.is_resolved() {
                // Unresolved is a not-found search, not an error.
                println!("「{name}」: 見つかりません");
                continue;
            }
            println!(
                "「{name}」 → {} ({} 記事)",
                res.canonical_path, res.match_count
            );
            to_add.push(Subscription {
                display_name: name.clone(),
                external_ref: res.canonical_path,
                source: SourceKind::Blog,
                group_label: args.group.clone(),
            });
        }
    } else {
        cfg.validate()?;
        let catalog = CatalogAdapter::with_endpoints(
            cfg.api_id.clone(),
            cfg.affiliate_id.clone(),
            timeout,
            cfg.catalog_endpoint.clone(),
            cfg.performer_search_endpoint.clone(),
        );
        for name in &args.names {
            let hits = catalog.search_performers(name, 5).await?;
            match hits.len() {
                0 => println!("「{name}」: 見つかりません"),
                1 => {
                    let hit = &hits[0];
                    println!("「{}」 → id {}", hit.name, hit.id);
                    to_add.push(Subscription {
                        display_name: hit.name.clone(),
                        external_ref: hit.id.clone(),
                        source: SourceKind::Catalog,
                        group_label: args.group.clone(),
                    });
                }
                _ => {
                    // Ambiguous: register an exact-name hit if there is one,
                    // otherwise list the candidates and let the operator retry.
                    if let Some(hit) = hits.iter().find(|h| &h.name == name) {
                        println!("「{}」 → id {}", hit.name, hit.id);
                        to_add.push(Subscription {
                            display_name: hit.name.clone(),
                            external_ref: hit.id.clone(),
                            source: SourceKind::Catalog,
                            group_label: args.group.clone(),
                        });
                    } else {
                        println!("「{name}」: 候補が複数あります:");
                        for hit in &hits {
                            println!("  {} (id {})", hit.name, hit.id);
                        }
                    }
                }
            }
        }
    }

    if to_add.is_empty() {
        println!("登録なし");
        return Ok(());
    }
    subscriptions::register_all(&store, &to_add).await?;
    println!("{} 件登録しました", to_add.len());
    Ok(())
}
