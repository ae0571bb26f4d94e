//! Federated order repository.
//!
//! Legacy orders are historical: they are projected with their lines on
//! read and only copied into the canonical store when they are edited.

use std::cmp::Ordering;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;
use uuid::Uuid;

use super::{canonical_unavailable, legacy_unavailable};
use crate::identity::to_legacy_id;
use crate::interfaces::{LegacyOrderStore, OrderRepository, OrderStore};
use crate::mapper::{map_orders_by_id, project_order};
use crate::migration::Migrator;
use crate::model::{Order, OrderStatus};
use crate::storage::{Result, StorageError};

pub struct FederatedOrderRepository {
    canonical: Arc<dyn OrderStore>,
    legacy: Arc<dyn LegacyOrderStore>,
    migrator: Migrator,
}

impl FederatedOrderRepository {
    pub fn new(
        canonical: Arc<dyn OrderStore>,
        legacy: Arc<dyn LegacyOrderStore>,
        migrator: Migrator,
    ) -> Self {
        Self {
            canonical,
            legacy,
            migrator,
        }
    }

    async fn legacy_order(&self, id: Uuid) -> Result<Option<Order>> {
        let Some(order_id) = to_legacy_id(id) else {
            return Ok(None);
        };
        let Some(order) = self
            .legacy
            .get_by_id(order_id)
            .await
            .map_err(legacy_unavailable)?
        else {
            return Ok(None);
        };
        let details = self
            .legacy
            .details_for(&[order_id])
            .await
            .map_err(legacy_unavailable)?;
        project_order(&order, &details).map(Some)
    }

    /// Every legacy order, projected. One unreadable order fails the read.
    async fn legacy_orders(&self) -> Result<Vec<Order>> {
        let orders = self.legacy.list().await.map_err(legacy_unavailable)?;
        let ids: Vec<i32> = orders.iter().map(|o| o.order_id).collect();
        let details = self
            .legacy
            .details_for(&ids)
            .await
            .map_err(legacy_unavailable)?;

        orders
            .iter()
            .map(|order| {
                project_order(order, &details).inspect_err(|e| {
                    warn!(
                        order_id = order.order_id,
                        error = %e,
                        "Unreadable legacy order"
                    )
                })
            })
            .collect()
    }
}

/// Newest first; undated orders last.
fn newest_first(a: &Order, b: &Order) -> Ordering {
    match (a.ordered_at, b.ordered_at) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then_with(|| a.id.cmp(&b.id))
}

#[async_trait]
impl OrderRepository for FederatedOrderRepository {
    async fn list(&self) -> Result<Vec<Order>> {
        let (canonical, legacy) = tokio::try_join!(
            async { self.canonical.list().await.map_err(canonical_unavailable) },
            self.legacy_orders(),
        )?;

        let mut orders = map_orders_by_id(canonical, legacy);
        orders.sort_by(newest_first);
        Ok(orders)
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Order>> {
        if let Some(order) = self.canonical.get_by_id(id).await? {
            return Ok(Some(order));
        }
        self.legacy_order(id).await
    }

    async fn add(&self, mut order: Order) -> Result<()> {
        self.migrator.ensure_order_games(&mut order).await?;
        self.canonical.add(&order).await
    }

    async fn update(&self, mut order: Order) -> Result<()> {
        if self.canonical.exists(order.id).await? {
            self.migrator.ensure_order_games(&mut order).await?;
            return self.canonical.update(&order).await;
        }
        if self.legacy_order(order.id).await?.is_none() {
            return Err(StorageError::not_found("order", order.id));
        }
        let stored = self.migrator.migrate_order(order.clone()).await?;
        if stored != order {
            // A concurrent writer migrated the plain copy first.
            self.migrator.ensure_order_games(&mut order).await?;
            self.canonical.update(&order).await?;
        }
        Ok(())
    }

    async fn set_status(&self, id: Uuid, status: OrderStatus) -> Result<()> {
        let mut order = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| StorageError::not_found("order", id))?;
        order.status = status;
        self.update(order).await
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::identity::to_guid;
    use crate::interfaces::GameStore;
    use crate::model::legacy::{LegacyOrder, LegacyOrderDetail, LegacyProduct};
    use crate::model::{Game, OrderItem};
    use crate::storage::{CanonicalStores, LegacyStores, MockCatalogStore, MockLegacyStore};

    struct Fixture {
        canonical: Arc<MockCatalogStore>,
        legacy: Arc<MockLegacyStore>,
        repo: FederatedOrderRepository,
    }

    fn legacy_order(id: i32, date: &str, shipped: bool) -> LegacyOrder {
        LegacyOrder {
            order_id: id,
            customer_id: "VINET".to_string(),
            order_date: Some(date.to_string()),
            shipped_date: shipped.then(|| "1996-07-16 00:00:00.000".to_string()),
            ship_via: Some(3),
            freight: Some(32.38),
        }
    }

    fn detail(order_id: i32, product_id: i32) -> LegacyOrderDetail {
        LegacyOrderDetail {
            order_id,
            product_id,
            unit_price: 14.0,
            quantity: 12,
            discount: 0.0,
        }
    }

    async fn fixture() -> Fixture {
        let canonical = Arc::new(MockCatalogStore::new());
        let legacy = Arc::new(MockLegacyStore::new());
        legacy.insert_product(LegacyProduct::new(11, "queso", "Queso Cabrales")).await;
        legacy
            .insert_order(
                legacy_order(10248, "1996-07-04 00:00:00.000", true),
                vec![detail(10248, 11)],
            )
            .await;
        legacy
            .insert_order(legacy_order(10249, "1996-07-05 00:00:00.000", false), Vec::new())
            .await;
        let migrator = Migrator::new(
            CanonicalStores::from_backend(canonical.clone()),
            LegacyStores::from_backend(legacy.clone()),
        );
        let repo = FederatedOrderRepository::new(canonical.clone(), legacy.clone(), migrator);
        Fixture {
            canonical,
            legacy,
            repo,
        }
    }

    async fn insert_unreadable_order(f: &Fixture) {
        f.legacy
            .insert_order(legacy_order(10250, "someday", false), Vec::new())
            .await;
    }

    #[tokio::test]
    async fn test_list_merges_newest_first() {
        let f = fixture().await;
        let mut recent = Order::new("ALFKI");
        recent.ordered_at = Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        f.repo.add(recent.clone()).await.unwrap();

        let orders = f.repo.list().await.unwrap();

        let ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![recent.id, to_guid(10249), to_guid(10248)]);
        assert_eq!(orders[2].status, OrderStatus::Shipped);
        assert_eq!(orders[2].items[0].game_id, to_guid(11));
    }

    #[tokio::test]
    async fn test_unreadable_order_fails_the_list() {
        let f = fixture().await;
        insert_unreadable_order(&f).await;

        let err = f.repo.list().await.unwrap_err();

        assert!(matches!(err, StorageError::IncompleteProjection { .. }));
    }

    #[tokio::test]
    async fn test_unreadable_order_by_id_is_an_error() {
        let f = fixture().await;
        insert_unreadable_order(&f).await;
        let err = f.repo.get_by_id(to_guid(10250)).await.unwrap_err();
        assert!(matches!(err, StorageError::IncompleteProjection { .. }));
    }

    #[tokio::test]
    async fn test_set_status_migrates_legacy_order() {
        let f = fixture().await;

        f.repo
            .set_status(to_guid(10248), OrderStatus::Cancelled)
            .await
            .unwrap();

        let stored = OrderStore::get_by_id(f.canonical.as_ref(), to_guid(10248))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, OrderStatus::Cancelled);
        assert!(GameStore::exists(f.canonical.as_ref(), to_guid(11)).await.unwrap());
        assert_eq!(f.repo.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_add_migrates_referenced_legacy_games() {
        let f = fixture().await;
        let local = Game::new("halo", "Halo", 59.99);
        GameStore::add(f.canonical.as_ref(), &local).await.unwrap();

        let mut order = Order::new("ALFKI");
        for game_id in [local.id, to_guid(11)] {
            order.items.push(OrderItem {
                game_id,
                price: 1.0,
                quantity: 1,
                discount: 0,
            });
        }
        f.repo.add(order.clone()).await.unwrap();

        assert!(GameStore::exists(f.canonical.as_ref(), to_guid(11)).await.unwrap());
        let stored = f.repo.get_by_id(order.id).await.unwrap().unwrap();
        assert_eq!(stored.items.len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_order_is_not_found() {
        let f = fixture().await;
        let err = f
            .repo
            .set_status(Uuid::new_v4(), OrderStatus::Paid)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
