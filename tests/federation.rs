//! Federation scenarios through the public repository API.
//!
//! Run with: cargo test --test federation
//!
//! Both sides run on the in-memory stores; no external dependencies.

use std::sync::Arc;

use gamestore::identity::to_guid;
use gamestore::interfaces::GameStore;
use gamestore::model::legacy::{LegacyOrder, LegacyOrderDetail, LegacyProduct};
use gamestore::model::{Comment, Game};
use gamestore::pipeline::{
    DefaultPipelineFactory, GameFilter, GamePipeline, GameSort, PageSize, PipelineFactory,
};
use gamestore::repository::FederatedRepositories;
use gamestore::storage::{
    CanonicalStores, CatalogStores, DataSource, LegacyStores, MockCatalogStore, MockLegacyStore,
    StorageError,
};

struct Catalog {
    canonical: Arc<MockCatalogStore>,
    legacy: Arc<MockLegacyStore>,
    repos: FederatedRepositories,
}

fn catalog() -> Catalog {
    let canonical = Arc::new(MockCatalogStore::new());
    let legacy = Arc::new(MockLegacyStore::new());
    let repos = FederatedRepositories::new(CatalogStores::new(
        CanonicalStores::from_backend(canonical.clone()),
        LegacyStores::from_backend(legacy.clone()),
    ));
    Catalog {
        canonical,
        legacy,
        repos,
    }
}

fn product(id: i32, key: &str, price: f64) -> LegacyProduct {
    let mut product = LegacyProduct::new(id, key, key.to_uppercase());
    product.unit_price = price;
    product
}

fn pipeline(filter: &GameFilter, include_deleted: bool) -> GamePipeline {
    DefaultPipelineFactory::new().create(filter, include_deleted)
}

#[tokio::test]
async fn test_canonical_shape_wins_for_shared_key() {
    let c = catalog();
    let halo = Game::new("halo", "Halo: Combat Evolved", 59.99);
    GameStore::add(c.canonical.as_ref(), &halo).await.unwrap();
    c.legacy.insert_product(product(42, "halo", 9.99)).await;

    let page = c
        .repos
        .games
        .list(&pipeline(&GameFilter::default(), false))
        .await
        .unwrap();

    assert_eq!(page.count, 1);
    assert_eq!(page.games, vec![halo]);
}

#[tokio::test]
async fn test_deleted_legacy_game_never_appears_twice() {
    let c = catalog();
    c.legacy.insert_product(product(7, "doom", 4.99)).await;
    c.repos.games.delete(to_guid(7)).await.unwrap();

    let hidden = c
        .repos
        .games
        .list(&pipeline(&GameFilter::default(), false))
        .await
        .unwrap();
    assert!(hidden.games.iter().all(|g| g.key != "doom"));

    let permitted = c
        .repos
        .games
        .list(&pipeline(&GameFilter::default(), true))
        .await
        .unwrap();
    let dooms: Vec<&Game> = permitted.games.iter().filter(|g| g.key == "doom").collect();
    assert_eq!(dooms.len(), 1);
    assert!(dooms[0].is_deleted);
}

#[tokio::test]
async fn test_every_page_is_a_slice_of_the_global_order() {
    let c = catalog();
    let mut expected: Vec<(f64, String)> = Vec::new();
    for i in 0..7 {
        let key = format!("canon-{i}");
        let price = f64::from((i * 7) % 10);
        GameStore::add(c.canonical.as_ref(), &Game::new(key.clone(), "C", price))
            .await
            .unwrap();
        expected.push((price, key));
    }
    for i in 0..6 {
        let key = format!("legacy-{i}");
        let price = f64::from((i * 3) % 10);
        c.legacy.insert_product(product(i + 1, &key, price)).await;
        expected.push((price, key));
    }
    expected.sort_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
    let expected: Vec<String> = expected.into_iter().map(|(_, key)| key).collect();

    let mut walked = Vec::new();
    for page in 1..=5 {
        let filter = GameFilter::default()
            .with_sort(GameSort::PriceAsc)
            .with_page(page, PageSize::Limited(3));
        let list = c.repos.games.list(&pipeline(&filter, false)).await.unwrap();
        assert_eq!(list.count, 13);
        walked.extend(list.games.into_iter().map(|g| g.key));
    }

    assert_eq!(walked, expected);
}

#[tokio::test]
async fn test_platform_filter_excludes_legacy_rows() {
    let c = catalog();
    c.legacy.insert_product(product(1, "chai", 18.0)).await;
    c.legacy.insert_product(product(2, "chang", 19.0)).await;

    let filter = GameFilter {
        platforms: vec![uuid::Uuid::new_v4()],
        ..GameFilter::default()
    };
    let page = c.repos.games.list(&pipeline(&filter, false)).await.unwrap();

    assert!(page.games.is_empty());
    assert_eq!(page.count, 0);
}

#[tokio::test]
async fn test_unavailable_legacy_store_fails_the_read() {
    let c = catalog();
    c.legacy.insert_product(product(1, "chai", 18.0)).await;
    c.legacy.set_fail_on_read(true).await;

    let err = c
        .repos
        .games
        .list(&pipeline(&GameFilter::default(), false))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        StorageError::SourceUnavailable {
            store: DataSource::Legacy,
            ..
        }
    ));
}

#[tokio::test]
async fn test_comment_on_ordered_legacy_game_migrates_it() {
    let c = catalog();
    c.legacy.insert_product(product(99, "chai", 18.0)).await;
    c.legacy
        .insert_order(
            LegacyOrder {
                order_id: 10248,
                customer_id: "VINET".to_string(),
                order_date: Some("1996-07-04 00:00:00.000".to_string()),
                shipped_date: None,
                ship_via: None,
                freight: None,
            },
            vec![LegacyOrderDetail {
                order_id: 10248,
                product_id: 99,
                unit_price: 18.0,
                quantity: 2,
                discount: 0.0,
            }],
        )
        .await;
    let order = c.repos.orders.get_by_id(to_guid(10248)).await.unwrap().unwrap();
    assert_eq!(order.items[0].game_id, to_guid(99));
    assert!(!GameStore::exists(c.canonical.as_ref(), to_guid(99)).await.unwrap());
    let before = c.legacy.product(99).await;

    c.repos
        .comments
        .add(Comment::new(to_guid(99), "ana", "great with milk"))
        .await
        .unwrap();

    assert!(GameStore::exists(c.canonical.as_ref(), to_guid(99)).await.unwrap());
    assert!(c.repos.games.exists(to_guid(99)).await.unwrap());
    assert_eq!(c.legacy.product(99).await, before);
}
