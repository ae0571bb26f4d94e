use uuid::Uuid;

use crate::interfaces::{
    CommentStore, GameStore, GenreStore, LegacyOrderStore, OrderStore, ProductStore,
};
use crate::model::legacy::{LegacyOrder, LegacyOrderDetail, LegacyProduct};
use crate::model::{Comment, Game, Genre, Order};
use crate::pipeline::{GamePredicate, GameQuery, GameSort, PageWindow, ProductQuery};
use crate::storage::StorageError;

use super::*;

fn product(id: i32, key: &str, price: f64) -> LegacyProduct {
    let mut product = LegacyProduct::new(id, key, key.to_uppercase());
    product.unit_price = price;
    product
}

#[tokio::test]
async fn test_mock_game_add_and_get() {
    let store = MockCatalogStore::new();
    let game = Game::new("halo", "Halo", 59.99);

    GameStore::add(&store, &game).await.unwrap();

    let by_id = GameStore::get_by_id(&store, game.id).await.unwrap().unwrap();
    assert_eq!(by_id.key, "halo");
    let by_key = GameStore::get_by_key(&store, "halo").await.unwrap().unwrap();
    assert_eq!(by_key.id, game.id);
    assert!(GameStore::exists(&store, game.id).await.unwrap());
}

#[tokio::test]
async fn test_mock_game_duplicate_key_rejected() {
    let store = MockCatalogStore::new();
    GameStore::add(&store, &Game::new("halo", "Halo", 1.0))
        .await
        .unwrap();

    let err = GameStore::add(&store, &Game::new("halo", "Halo Again", 2.0))
        .await
        .unwrap_err();
    assert!(err.is_duplicate());
    assert_eq!(store.game_count().await, 1);
}

#[tokio::test]
async fn test_mock_soft_delete_keeps_tombstone() {
    let store = MockCatalogStore::new();
    let game = Game::new("doom", "Doom", 9.99);
    GameStore::add(&store, &game).await.unwrap();

    GameStore::soft_delete(&store, game.id).await.unwrap();

    let stored = GameStore::get_by_key(&store, "doom").await.unwrap().unwrap();
    assert!(stored.is_deleted);
    let index = GameStore::key_index(&store).await.unwrap();
    assert!(index.keys.contains("doom"));
    assert!(index.deleted.contains("doom"));
    assert_eq!(GameStore::count(&store).await.unwrap(), 0);
}

#[tokio::test]
async fn test_mock_find_counts_all_matches() {
    let store = MockCatalogStore::new();
    for (key, price) in [("a", 5.0), ("b", 15.0), ("c", 25.0)] {
        GameStore::add(&store, &Game::new(key, key, price)).await.unwrap();
    }

    let query = GameQuery {
        predicates: vec![GamePredicate::PriceBetween {
            min: Some(10.0),
            max: None,
        }],
        order: Some(GameSort::PriceDesc),
        window: PageWindow::new(0, Some(1)),
    };
    let list = GameStore::find(&store, &query).await.unwrap();
    assert_eq!(list.count, 2);
    assert_eq!(list.keys(), vec!["c"]);
}

#[tokio::test]
async fn test_mock_comment_count_is_computed() {
    let store = MockCatalogStore::new();
    let game = Game::new("halo", "Halo", 1.0);
    GameStore::add(&store, &game).await.unwrap();
    CommentStore::add(&store, &Comment::new(game.id, "ann", "first"))
        .await
        .unwrap();
    CommentStore::add(&store, &Comment::new(game.id, "bob", "second"))
        .await
        .unwrap();

    let stored = GameStore::get_by_id(&store, game.id).await.unwrap().unwrap();
    assert_eq!(stored.comment_count, 2);
}

#[tokio::test]
async fn test_mock_fail_on_read_and_write() {
    let store = MockCatalogStore::new();
    store.set_fail_on_read(true).await;
    let err = GameStore::find(&store, &GameQuery::new()).await.unwrap_err();
    assert!(matches!(err, StorageError::Unavailable(_)));

    store.set_fail_on_read(false).await;
    store.set_fail_on_write(true).await;
    let err = GenreStore::add(&store, &Genre::new("Strategy"))
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::Unavailable(_)));
    assert_eq!(store.genre_count().await, 0);
}

#[tokio::test]
async fn test_mock_update_many_is_all_or_nothing() {
    let store = MockCatalogStore::new();
    let game_id = Uuid::new_v4();
    let mut root = Comment::new(game_id, "ann", "root");
    CommentStore::add(&store, &root).await.unwrap();

    root.is_deleted = true;
    let stranger = Comment::new(game_id, "bob", "never stored");
    let err = CommentStore::update_many(&store, &[root.clone(), stranger])
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    let stored = CommentStore::get_by_id(&store, root.id).await.unwrap().unwrap();
    assert!(!stored.is_deleted);
}

#[tokio::test]
async fn test_mock_order_add_and_update() {
    let store = MockCatalogStore::new();
    let mut order = Order::new("ALFKI");
    OrderStore::add(&store, &order).await.unwrap();
    assert!(OrderStore::add(&store, &order).await.unwrap_err().is_duplicate());

    order.customer = "BONAP".to_string();
    OrderStore::update(&store, &order).await.unwrap();
    let stored = OrderStore::get_by_id(&store, order.id).await.unwrap().unwrap();
    assert_eq!(stored.customer, "BONAP");
}

#[tokio::test]
async fn test_mock_legacy_find_and_exclusion() {
    let store = MockLegacyStore::new();
    store.insert_product(product(1, "chai", 18.0)).await;
    store.insert_product(product(2, "chang", 19.0)).await;
    store.insert_product(product(3, "tofu", 23.25)).await;

    let query = ProductQuery::new().excluding_keys(vec!["chang".to_string()]);
    let page = ProductStore::find(&store, &query).await.unwrap();
    assert_eq!(page.count, 2);
    let keys: Vec<String> = page.products.iter().map(|p| p.catalog_key()).collect();
    assert_eq!(keys, vec!["chai", "tofu"]);
    assert_eq!(store.find_calls().await, 1);
}

#[tokio::test]
async fn test_mock_legacy_suppressed_query_skips_store() {
    let store = MockLegacyStore::new();
    store.insert_product(product(1, "chai", 18.0)).await;
    store.set_fail_on_read(true).await;

    let page = ProductStore::find(&store, &ProductQuery::new().suppress())
        .await
        .unwrap();
    assert!(page.products.is_empty());
    assert_eq!(page.count, 0);
    assert_eq!(store.find_calls().await, 0);
}

#[tokio::test]
async fn test_mock_legacy_counters() {
    let store = MockLegacyStore::new();
    store.insert_product(product(7, "ikura", 31.0)).await;

    ProductStore::adjust_units_in_stock(&store, 7, -2).await.unwrap();
    ProductStore::increment_view_count(&store, 7).await.unwrap();

    let stored = store.product(7).await.unwrap();
    assert_eq!(stored.units_in_stock, -2);
    assert_eq!(stored.view_count, 1);
    assert!(ProductStore::increment_view_count(&store, 8)
        .await
        .unwrap_err()
        .is_not_found());
}

#[tokio::test]
async fn test_mock_legacy_order_details() {
    let store = MockLegacyStore::new();
    let order = LegacyOrder {
        order_id: 10248,
        customer_id: "VINET".to_string(),
        order_date: Some("1996-07-04 00:00:00.000".to_string()),
        shipped_date: None,
        ship_via: None,
        freight: None,
    };
    let detail = LegacyOrderDetail {
        order_id: 10248,
        product_id: 11,
        unit_price: 14.0,
        quantity: 12,
        discount: 0.0,
    };
    store.insert_order(order, vec![detail]).await;

    let details = LegacyOrderStore::details_for(&store, &[10248]).await.unwrap();
    assert_eq!(details.len(), 1);
    assert!(LegacyOrderStore::details_for(&store, &[1]).await.unwrap().is_empty());
}
