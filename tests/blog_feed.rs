// tests/blog_feed.rs
use release_radar::model::{SourceKind, Subscription};
use release_radar::sources::blog::BlogAdapter;
use release_radar::sources::SourceAdapter;

fn sub() -> Subscription {
    Subscription {
        display_name: "アルファ".into(),
        external_ref: "av/alpha".into(),
        source: SourceKind::Blog,
        group_label: String::new(),
    }
}

#[tokio::test]
async fn feed_entries_become_normalized_items() {
    let adapter = BlogAdapter::from_fixture_str(include_str!("fixtures/blog_feed.xml"));
    let items = adapter.fetch_latest(&sub(), 30).await.unwrap();

    // The title-less entry is gone.
    assert_eq!(items.len(), 3);

    // Package image beats banner and numbered samples.
    assert_eq!(
        items[0].thumbnail_url,
        "https://img.example.jp/works/abc00111/abc00111pl.jpg"
    );
    // No package image: the only candidates are a banner and a numbered
    // sample, so the fallback is the first image found.
    assert_eq!(
        items[1].thumbnail_url,
        "https://img.example.jp/common/banner_wide.png"
    );
    // No images at all.
    assert_eq!(items[2].thumbnail_url, "");

    // +0900 feed time lands as sortable UTC.
    assert_eq!(items[0].published_at, "2024-06-01 01:30:00");

    // The post URL is both the dedup id and the detail link.
    assert_eq!(items[0].id, "https://blog.example.jp/av/alpha/post-1001");
    assert_eq!(items[0].id, items[0].detail_url);
    assert_eq!(items[0].entity, "アルファ");
    assert_eq!(items[0].source, SourceKind::Blog);
}

#[tokio::test]
async fn limit_truncates_the_feed() {
    let adapter = BlogAdapter::from_fixture_str(include_str!("fixtures/blog_feed.xml"));
    let items = adapter.fetch_latest(&sub(), 2).await.unwrap();
    assert_eq!(items.len(), 2);
}

#[tokio::test]
async fn unresolved_blog_subscription_is_an_error() {
    let adapter = BlogAdapter::from_fixture_str(include_str!("fixtures/blog_feed.xml"));
    let mut s = sub();
    s.external_ref = String::new();
    assert!(adapter.fetch_latest(&s, 30).await.is_err());
}
