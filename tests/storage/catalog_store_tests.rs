//! Canonical store interface tests.
//!
//! These tests verify the contract of the GameStore, GenreStore,
//! PublisherStore, OrderStore and CommentStore traits. Every test works in
//! its own key/name namespace, so they can share one store.

use chrono::{TimeZone, Utc};
use uuid::Uuid;

use gamestore::interfaces::{CommentStore, GameStore, GenreStore, OrderStore, PublisherStore};
use gamestore::model::{Comment, Game, Genre, Order, OrderItem, OrderStatus, Publisher};
use gamestore::pipeline::{GamePredicate, GameQuery, GameSort, PageWindow};

/// Unique token for namespacing keys and names.
pub fn token() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Create a game whose key and name carry `ns`.
pub fn make_game(ns: &str, suffix: &str, price: f64) -> Game {
    Game::new(format!("{ns}-{suffix}"), format!("{ns} {suffix}"), price)
}

fn keys(games: &[Game]) -> Vec<String> {
    games.iter().map(|g| g.key.clone()).collect()
}

// =============================================================================
// GameStore tests
// =============================================================================

pub async fn test_add_and_get_game<S: GameStore>(store: &S) {
    let ns = token();
    let mut game = make_game(&ns, "halo", 59.99);
    game.description = Some("Ring world".to_string());
    game.published_at = Some(Utc.with_ymd_and_hms(2001, 11, 15, 0, 0, 0).unwrap());
    game.genre_ids = vec![Uuid::new_v4()];

    GameStore::add(store, &game).await.expect("add should succeed");

    let by_id = GameStore::get_by_id(store, game.id)
        .await
        .expect("get_by_id should succeed")
        .expect("game should exist");
    assert_eq!(by_id, game);

    let by_key = GameStore::get_by_key(store, &game.key)
        .await
        .expect("get_by_key should succeed")
        .expect("game should exist");
    assert_eq!(by_key.id, game.id);
    assert!(GameStore::exists(store, game.id).await.unwrap());
    assert!(!GameStore::exists(store, Uuid::new_v4()).await.unwrap());
}

pub async fn test_duplicate_key_rejected<S: GameStore>(store: &S) {
    let ns = token();
    let first = make_game(&ns, "doom", 4.99);
    let second = make_game(&ns, "doom", 9.99);

    GameStore::add(store, &first).await.expect("add should succeed");
    let err = GameStore::add(store, &second)
        .await
        .expect_err("second add with the same key should fail");

    assert!(err.is_duplicate(), "expected Duplicate, got {err}");
}

pub async fn test_find_filters_sorts_and_windows<S: GameStore>(store: &S) {
    let ns = token();
    for (suffix, price) in [("a", 10.0), ("b", 40.0), ("c", 20.0), ("d", 30.0)] {
        GameStore::add(store, &make_game(&ns, suffix, price)).await.unwrap();
    }

    let query = GameQuery {
        order: Some(GameSort::PriceDesc),
        window: PageWindow::new(1, Some(2)),
        ..GameQuery::new().filter(GamePredicate::NameContains(ns.to_uppercase()))
    };
    let page = GameStore::find(store, &query).await.unwrap();

    assert_eq!(page.count, 4);
    assert_eq!(keys(&page.games), vec![format!("{ns}-d"), format!("{ns}-c")]);

    let cheap = GameQuery::new()
        .filter(GamePredicate::NameContains(ns.clone()))
        .filter(GamePredicate::PriceBetween {
            min: None,
            max: Some(20.0),
        });
    let page = GameStore::find(store, &cheap).await.unwrap();
    assert_eq!(keys(&page.games), vec![format!("{ns}-a"), format!("{ns}-c")]);
}

pub async fn test_find_name_folds_non_ascii<S: GameStore>(store: &S) {
    let ns = token();
    let mut screen = Game::new(format!("{ns}-ecran"), format!("{ns} Écran Noir"), 5.0);
    let plain = Game::new(format!("{ns}-plain"), format!("{ns} Ecran"), 5.0);
    GameStore::add(store, &screen).await.unwrap();
    GameStore::add(store, &plain).await.unwrap();

    for needle in [format!("{ns} écran"), format!("{} ÉCRAN", ns.to_uppercase())] {
        let query = GameQuery::new().filter(GamePredicate::NameContains(needle.clone()));
        let page = GameStore::find(store, &query).await.unwrap();
        assert_eq!(keys(&page.games), vec![screen.key.clone()], "needle {needle}");
    }

    screen.name = format!("{ns} Ökonom");
    GameStore::update(store, &screen).await.unwrap();
    let query = GameQuery::new()
        .filter(GamePredicate::NameContains("ÖKONOM".to_string()))
        .filter(GamePredicate::NameContains(ns.clone()));
    let page = GameStore::find(store, &query).await.unwrap();
    assert_eq!(keys(&page.games), vec![screen.key]);
}

pub async fn test_find_new_puts_undated_last<S: GameStore>(store: &S) {
    let ns = token();
    let mut old = make_game(&ns, "old", 1.0);
    old.published_at = Some(Utc.with_ymd_and_hms(2010, 1, 1, 0, 0, 0).unwrap());
    let mut fresh = make_game(&ns, "fresh", 1.0);
    fresh.published_at = Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
    let undated = make_game(&ns, "undated", 1.0);
    for game in [&undated, &old, &fresh] {
        GameStore::add(store, game).await.unwrap();
    }

    let query = GameQuery {
        order: Some(GameSort::New),
        ..GameQuery::new().filter(GamePredicate::NameContains(ns.clone()))
    };
    let page = GameStore::find(store, &query).await.unwrap();

    assert_eq!(keys(&page.games), vec![fresh.key, old.key, undated.key]);
}

pub async fn test_soft_delete_leaves_tombstone<S: GameStore>(store: &S) {
    let ns = token();
    let game = make_game(&ns, "gone", 1.0);
    GameStore::add(store, &game).await.unwrap();

    GameStore::soft_delete(store, game.id).await.unwrap();

    let index = GameStore::key_index(store).await.unwrap();
    assert!(index.keys.contains(&game.key));
    assert!(index.deleted.contains(&game.key));

    let live = GameQuery::new()
        .filter(GamePredicate::NameContains(ns.clone()))
        .filter(GamePredicate::NotDeleted);
    assert_eq!(GameStore::find(store, &live).await.unwrap().count, 0);
    assert!(GameStore::get_by_id(store, game.id).await.unwrap().unwrap().is_deleted);
}

pub async fn test_counters<S: GameStore>(store: &S) {
    let ns = token();
    let mut game = make_game(&ns, "stock", 1.0);
    game.units_in_stock = 10;
    GameStore::add(store, &game).await.unwrap();

    GameStore::adjust_units_in_stock(store, game.id, -4).await.unwrap();
    GameStore::increment_views(store, game.id).await.unwrap();
    GameStore::increment_views(store, game.id).await.unwrap();

    let stored = GameStore::get_by_id(store, game.id).await.unwrap().unwrap();
    assert_eq!(stored.units_in_stock, 6);
    assert_eq!(stored.views, 2);

    let err = GameStore::increment_views(store, Uuid::new_v4())
        .await
        .expect_err("unknown game");
    assert!(err.is_not_found());
}

pub async fn test_update_missing_game_is_not_found<S: GameStore>(store: &S) {
    let game = make_game(&token(), "ghost", 1.0);
    let err = GameStore::update(store, &game).await.expect_err("unknown game");
    assert!(err.is_not_found());
}

// =============================================================================
// GenreStore / PublisherStore tests
// =============================================================================

pub async fn test_genre_names_are_unique<S: GenreStore>(store: &S) {
    let name = format!("Strategy {}", token());
    GenreStore::add(store, &Genre::new(name.clone())).await.unwrap();

    let err = GenreStore::add(store, &Genre::new(name.clone()))
        .await
        .expect_err("duplicate name");
    assert!(err.is_duplicate());

    let found = GenreStore::get_by_name(store, &name).await.unwrap().unwrap();
    GenreStore::soft_delete(store, found.id).await.unwrap();
    let live = GenreStore::list(store, false).await.unwrap();
    assert!(live.iter().all(|g| g.name != name));
    let tombstone = GenreStore::list(store, true)
        .await
        .unwrap()
        .into_iter()
        .find(|g| g.name == name)
        .expect("tombstone kept");
    assert!(tombstone.is_deleted);
}

pub async fn test_publisher_round_trip<S: PublisherStore>(store: &S) {
    let mut publisher = Publisher::new(format!("Valve {}", token()));
    publisher.home_page = Some("https://valve.example".to_string());
    PublisherStore::add(store, &publisher).await.unwrap();

    publisher.description = Some("Bellevue".to_string());
    PublisherStore::update(store, &publisher).await.unwrap();

    let stored = PublisherStore::get_by_company_name(store, &publisher.company_name)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored, publisher);
}

// =============================================================================
// OrderStore / CommentStore tests
// =============================================================================

pub async fn test_order_round_trip<S: OrderStore>(store: &S) {
    let mut order = Order::new(format!("cust-{}", token()));
    order.ordered_at = Some(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap());
    order.items.push(OrderItem {
        game_id: Uuid::new_v4(),
        price: 20.0,
        quantity: 2,
        discount: 10,
    });
    OrderStore::add(store, &order).await.unwrap();

    order.status = OrderStatus::Paid;
    order.items.clear();
    OrderStore::update(store, &order).await.unwrap();

    let stored = OrderStore::get_by_id(store, order.id).await.unwrap().unwrap();
    assert_eq!(stored, order);
    assert!(OrderStore::exists(store, order.id).await.unwrap());
}

pub async fn test_comment_update_many_is_all_or_nothing<S: CommentStore>(store: &S) {
    let game_id = Uuid::new_v4();
    let root = Comment::new(game_id, "ana", "first");
    let reply = Comment::reply_to(&root, "bo", "second", Some("first".to_string()));
    CommentStore::add(store, &root).await.unwrap();
    CommentStore::add(store, &reply).await.unwrap();

    let ghost = Comment::new(game_id, "cy", "never stored");
    let edited = Comment {
        quote: None,
        ..reply.clone()
    };
    let err = CommentStore::update_many(store, &[edited, ghost])
        .await
        .expect_err("missing comment");
    assert!(err.is_not_found());

    let thread = CommentStore::list_by_game(store, game_id).await.unwrap();
    assert_eq!(thread.len(), 2);
    let stored = CommentStore::get_by_id(store, reply.id).await.unwrap().unwrap();
    assert_eq!(stored.quote.as_deref(), Some("first"));
}

// =============================================================================
// Test runner macro
// =============================================================================

/// Run all canonical store interface tests against a store implementation.
#[macro_export]
macro_rules! run_catalog_store_tests {
    ($store:expr) => {
        use $crate::storage::catalog_store_tests::*;

        // game tests
        test_add_and_get_game($store).await;
        println!("  test_add_and_get_game: PASSED");

        test_duplicate_key_rejected($store).await;
        println!("  test_duplicate_key_rejected: PASSED");

        test_find_filters_sorts_and_windows($store).await;
        println!("  test_find_filters_sorts_and_windows: PASSED");

        test_find_name_folds_non_ascii($store).await;
        println!("  test_find_name_folds_non_ascii: PASSED");

        test_find_new_puts_undated_last($store).await;
        println!("  test_find_new_puts_undated_last: PASSED");

        test_soft_delete_leaves_tombstone($store).await;
        println!("  test_soft_delete_leaves_tombstone: PASSED");

        test_counters($store).await;
        println!("  test_counters: PASSED");

        test_update_missing_game_is_not_found($store).await;
        println!("  test_update_missing_game_is_not_found: PASSED");

        // taxonomy tests
        test_genre_names_are_unique($store).await;
        println!("  test_genre_names_are_unique: PASSED");

        test_publisher_round_trip($store).await;
        println!("  test_publisher_round_trip: PASSED");

        // order and comment tests
        test_order_round_trip($store).await;
        println!("  test_order_round_trip: PASSED");

        test_comment_update_many_is_all_or_nothing($store).await;
        println!("  test_comment_update_many_is_all_or_nothing: PASSED");
    };
}
