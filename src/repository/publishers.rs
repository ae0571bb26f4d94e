//! Federated publisher repository. Legacy suppliers project onto publishers
//! and merge with canonical publishers by company name.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use super::{canonical_unavailable, legacy_unavailable};
use crate::identity::to_legacy_id;
use crate::interfaces::{PublisherRepository, PublisherStore, SupplierStore};
use crate::mapper::map_publishers_by_company_name;
use crate::migration::Migrator;
use crate::model::Publisher;
use crate::storage::Result;

pub struct FederatedPublisherRepository {
    canonical: Arc<dyn PublisherStore>,
    suppliers: Arc<dyn SupplierStore>,
    migrator: Migrator,
}

impl FederatedPublisherRepository {
    pub fn new(
        canonical: Arc<dyn PublisherStore>,
        suppliers: Arc<dyn SupplierStore>,
        migrator: Migrator,
    ) -> Self {
        Self {
            canonical,
            suppliers,
            migrator,
        }
    }
}

#[async_trait]
impl PublisherRepository for FederatedPublisherRepository {
    async fn list(&self) -> Result<Vec<Publisher>> {
        let (stored, suppliers) = tokio::try_join!(
            async { self.canonical.list(true).await.map_err(canonical_unavailable) },
            async { self.suppliers.list().await.map_err(legacy_unavailable) },
        )?;

        let (deleted, live): (Vec<Publisher>, Vec<Publisher>) =
            stored.into_iter().partition(|p| p.is_deleted);
        let deleted: HashSet<String> = deleted.into_iter().map(|p| p.company_name).collect();
        let projected = suppliers.iter().map(Publisher::from).collect();

        let mut publishers = map_publishers_by_company_name(live, projected, &deleted);
        publishers.sort_by(|a, b| a.company_name.cmp(&b.company_name));
        Ok(publishers)
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Publisher>> {
        if let Some(publisher) = self.canonical.get_by_id(id).await? {
            return Ok(Some(publisher));
        }
        let Some(supplier_id) = to_legacy_id(id) else {
            return Ok(None);
        };
        let supplier = self
            .suppliers
            .get_by_id(supplier_id)
            .await
            .map_err(legacy_unavailable)?;
        let Some(supplier) = supplier else {
            return Ok(None);
        };

        let projected = Publisher::from(&supplier);
        match self
            .canonical
            .get_by_company_name(&projected.company_name)
            .await?
        {
            Some(canonical) if canonical.is_deleted => Ok(None),
            Some(canonical) => Ok(Some(canonical)),
            None => Ok(Some(projected)),
        }
    }

    async fn get_by_company_name(&self, company_name: &str) -> Result<Option<Publisher>> {
        if let Some(publisher) = self.canonical.get_by_company_name(company_name).await? {
            return Ok((!publisher.is_deleted).then_some(publisher));
        }
        let suppliers = self.suppliers.list().await.map_err(legacy_unavailable)?;
        Ok(suppliers
            .iter()
            .find(|s| s.company_name == company_name)
            .map(Publisher::from))
    }

    async fn add(&self, publisher: Publisher) -> Result<()> {
        self.canonical.add(&publisher).await
    }

    async fn update(&self, mut publisher: Publisher) -> Result<()> {
        publisher.id = self.migrator.ensure_publisher(publisher.id).await?.id;
        self.canonical.update(&publisher).await
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let publisher = self.migrator.ensure_publisher(id).await?;
        self.canonical.soft_delete(publisher.id).await
    }
}
