// tests/catalog_filter.rs
use release_radar::filter::filter_items;
use release_radar::model::{SourceKind, Subscription};
use release_radar::sources::catalog::CatalogAdapter;
use release_radar::sources::SourceAdapter;

fn sub() -> Subscription {
    Subscription {
        display_name: "甲".into(),
        external_ref: "1008887".into(),
        source: SourceKind::Catalog,
        group_label: String::new(),
    }
}

#[tokio::test]
async fn rule_chain_excludes_every_promotional_variant() {
    let adapter = CatalogAdapter::from_fixture_str(include_str!("fixtures/catalog_items.json"));
    let raw = adapter.fetch_latest(&sub(), 30).await.unwrap();
    assert_eq!(raw.len(), 8);

    let kept = filter_items(&raw, 30, false);
    let ids: Vec<&str> = kept.iter().map(|i| i.id.as_str()).collect();
    // Survivor: the plain new release. Excluded: BEST compilation, store
    // exclusive, Blu-ray re-issue, 4h+ genre, 5-performer omnibus,
    // identical-content re-release, now-printing placeholder.
    assert_eq!(ids, vec!["abc00120"]);
}

#[tokio::test]
async fn sample_media_flag_tightens_the_chain() {
    let adapter = CatalogAdapter::from_fixture_str(include_str!("fixtures/catalog_items.json"));
    let raw = adapter.fetch_latest(&sub(), 30).await.unwrap();

    // abc00120 carries a sample movie, so it survives even the strict mode.
    let strict = filter_items(&raw, 30, true);
    assert_eq!(strict.len(), 1);
    assert!(strict[0].meta.has_sample_media);
}
