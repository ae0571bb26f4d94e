//! Unit tests for the canonical SQLite store (in-memory).

use chrono::{TimeZone, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use uuid::Uuid;

use super::SqliteCatalogStore;
use crate::interfaces::{CommentStore, GameStore, GenreStore, OrderStore, PublisherStore};
use crate::model::{Comment, Game, Genre, Order, OrderItem, OrderStatus, Publisher};
use crate::pipeline::{GamePredicate, GameQuery, GameSort, PageWindow};

async fn test_store() -> SqliteCatalogStore {
    let opts = SqliteConnectOptions::new()
        .filename(":memory:")
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(opts)
        .await
        .expect("failed to create in-memory pool");

    let store = SqliteCatalogStore::new(pool);
    store.init().await.expect("failed to init schema");
    store
}

fn game(key: &str, price: f64) -> Game {
    Game::new(key, key.to_uppercase(), price)
}

#[tokio::test]
async fn test_game_round_trip_with_links() {
    let store = test_store().await;
    let mut halo = game("halo", 59.99);
    halo.description = Some("Ring world".to_string());
    halo.published_at = Some(Utc.with_ymd_and_hms(2001, 11, 15, 0, 0, 0).unwrap());
    halo.publisher_id = Some(Uuid::new_v4());
    halo.genre_ids = vec![Uuid::new_v4(), Uuid::new_v4()];
    halo.genre_ids.sort_by_key(|id| id.to_string());
    halo.platform_ids = vec![Uuid::new_v4()];

    GameStore::add(&store, &halo).await.unwrap();

    let stored = GameStore::get_by_key(&store, "halo").await.unwrap().unwrap();
    assert_eq!(stored, halo);
}

#[tokio::test]
async fn test_duplicate_key_maps_to_duplicate() {
    let store = test_store().await;
    GameStore::add(&store, &game("doom", 9.99)).await.unwrap();

    let err = GameStore::add(&store, &game("doom", 19.99)).await.unwrap_err();
    assert!(err.is_duplicate());
}

#[tokio::test]
async fn test_failed_add_leaves_no_links() {
    let store = test_store().await;
    let original = game("doom", 9.99);
    GameStore::add(&store, &original).await.unwrap();

    let mut clash = game("doom", 1.0);
    clash.genre_ids = vec![Uuid::new_v4()];
    assert!(GameStore::add(&store, &clash).await.is_err());

    let stored = GameStore::get_by_key(&store, "doom").await.unwrap().unwrap();
    assert_eq!(stored.id, original.id);
    assert!(stored.genre_ids.is_empty());
}

#[tokio::test]
async fn test_find_filters_sorts_and_windows() {
    let store = test_store().await;
    for (key, price) in [("a", 5.0), ("b", 15.0), ("c", 25.0), ("d", 35.0)] {
        GameStore::add(&store, &game(key, price)).await.unwrap();
    }

    let query = GameQuery {
        predicates: vec![GamePredicate::PriceBetween {
            min: Some(10.0),
            max: Some(30.0),
        }],
        order: Some(GameSort::PriceDesc),
        window: PageWindow::new(1, Some(5)),
    };
    let list = GameStore::find(&store, &query).await.unwrap();
    assert_eq!(list.count, 2);
    assert_eq!(list.keys(), vec!["b"]);
}

#[tokio::test]
async fn test_find_offset_without_take() {
    let store = test_store().await;
    for key in ["a", "b", "c"] {
        GameStore::add(&store, &game(key, 1.0)).await.unwrap();
    }

    let query = GameQuery {
        window: PageWindow::new(1, None),
        ..GameQuery::new()
    };
    let list = GameStore::find(&store, &query).await.unwrap();
    assert_eq!(list.count, 3);
    assert_eq!(list.keys(), vec!["b", "c"]);
}

#[tokio::test]
async fn test_name_filter_escapes_wildcards() {
    let store = test_store().await;
    let mut percent = game("percent", 1.0);
    percent.name = "100% Orange Juice".to_string();
    GameStore::add(&store, &percent).await.unwrap();
    let mut plain = game("plain", 1.0);
    plain.name = "1000 Orange Juice".to_string();
    GameStore::add(&store, &plain).await.unwrap();

    let query = GameQuery::new().filter(GamePredicate::NameContains("0% orange".to_string()));
    let list = GameStore::find(&store, &query).await.unwrap();
    assert_eq!(list.keys(), vec!["percent"]);
}

#[tokio::test]
async fn test_genre_and_key_predicates() {
    let store = test_store().await;
    let shooter = Uuid::new_v4();
    let mut halo = game("halo", 1.0);
    halo.genre_ids = vec![shooter];
    GameStore::add(&store, &halo).await.unwrap();
    let mut doom = game("doom", 1.0);
    doom.genre_ids = vec![shooter];
    GameStore::add(&store, &doom).await.unwrap();
    GameStore::add(&store, &game("myst", 1.0)).await.unwrap();

    let query = GameQuery::new()
        .filter(GamePredicate::GenreIn(vec![shooter]))
        .filter(GamePredicate::KeyNotIn(["doom".to_string()].into()));
    let list = GameStore::find(&store, &query).await.unwrap();
    assert_eq!(list.keys(), vec!["halo"]);
}

#[tokio::test]
async fn test_new_sort_puts_undated_last() {
    let store = test_store().await;
    let mut old = game("old", 1.0);
    old.published_at = Some(Utc.with_ymd_and_hms(1993, 12, 10, 0, 0, 0).unwrap());
    let mut recent = game("recent", 1.0);
    recent.published_at = Some(Utc.with_ymd_and_hms(2020, 3, 20, 0, 0, 0).unwrap());
    for g in [game("aaa-undated", 1.0), old, recent] {
        GameStore::add(&store, &g).await.unwrap();
    }

    let query = GameQuery {
        order: Some(GameSort::New),
        ..GameQuery::new()
    };
    let list = GameStore::find(&store, &query).await.unwrap();
    assert_eq!(list.keys(), vec!["recent", "old", "aaa-undated"]);
}

#[tokio::test]
async fn test_most_commented_uses_comment_count() {
    let store = test_store().await;
    let quiet = game("quiet", 1.0);
    let busy = game("busy", 1.0);
    GameStore::add(&store, &quiet).await.unwrap();
    GameStore::add(&store, &busy).await.unwrap();
    for body in ["one", "two"] {
        CommentStore::add(&store, &Comment::new(busy.id, "ann", body))
            .await
            .unwrap();
    }

    let query = GameQuery {
        order: Some(GameSort::MostCommented),
        ..GameQuery::new()
    };
    let list = GameStore::find(&store, &query).await.unwrap();
    assert_eq!(list.keys(), vec!["busy", "quiet"]);
    assert_eq!(list.games[0].comment_count, 2);
}

#[tokio::test]
async fn test_soft_delete_and_counters() {
    let store = test_store().await;
    let halo = game("halo", 1.0);
    GameStore::add(&store, &halo).await.unwrap();

    GameStore::adjust_units_in_stock(&store, halo.id, 5).await.unwrap();
    GameStore::increment_views(&store, halo.id).await.unwrap();
    GameStore::soft_delete(&store, halo.id).await.unwrap();

    let stored = GameStore::get_by_id(&store, halo.id).await.unwrap().unwrap();
    assert_eq!(stored.units_in_stock, 5);
    assert_eq!(stored.views, 1);
    assert!(stored.is_deleted);
    assert_eq!(GameStore::count(&store).await.unwrap(), 0);

    let index = GameStore::key_index(&store).await.unwrap();
    assert!(index.deleted.contains("halo"));

    let missing = GameStore::increment_views(&store, Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(missing.is_not_found());
}

#[tokio::test]
async fn test_genre_and_publisher_uniqueness() {
    let store = test_store().await;
    GenreStore::add(&store, &Genre::new("Strategy")).await.unwrap();
    assert!(GenreStore::add(&store, &Genre::new("Strategy"))
        .await
        .unwrap_err()
        .is_duplicate());

    let publisher = Publisher::new("Exotic Liquids");
    PublisherStore::add(&store, &publisher).await.unwrap();
    PublisherStore::soft_delete(&store, publisher.id).await.unwrap();

    assert!(PublisherStore::list(&store, false).await.unwrap().is_empty());
    let all = PublisherStore::list(&store, true).await.unwrap();
    assert_eq!(all.len(), 1);
    assert!(all[0].is_deleted);
}

#[tokio::test]
async fn test_order_round_trip() {
    let store = test_store().await;
    let mut order = Order::new("ALFKI");
    order.ordered_at = Some(Utc.with_ymd_and_hms(1997, 8, 25, 0, 0, 0).unwrap());
    order.items = vec![OrderItem {
        game_id: Uuid::new_v4(),
        price: 45.6,
        quantity: 15,
        discount: 0,
    }];
    OrderStore::add(&store, &order).await.unwrap();

    order.status = OrderStatus::Paid;
    order.items.clear();
    OrderStore::update(&store, &order).await.unwrap();

    let stored = OrderStore::get_by_id(&store, order.id).await.unwrap().unwrap();
    assert_eq!(stored.status, OrderStatus::Paid);
    assert!(stored.items.is_empty());
    assert!(OrderStore::exists(&store, order.id).await.unwrap());
}

#[tokio::test]
async fn test_comment_update_many_rolls_back() {
    let store = test_store().await;
    let game_id = Uuid::new_v4();
    let mut root = Comment::new(game_id, "ann", "root");
    CommentStore::add(&store, &root).await.unwrap();

    root.is_deleted = true;
    let never_stored = Comment::new(game_id, "bob", "ghost");
    let err = CommentStore::update_many(&store, &[root.clone(), never_stored])
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    let stored = CommentStore::get_by_id(&store, root.id).await.unwrap().unwrap();
    assert!(!stored.is_deleted);
}
