//! Federated genre repository. Legacy categories project onto genres and
//! merge with canonical genres by name.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use super::{canonical_unavailable, legacy_unavailable};
use crate::identity::to_legacy_id;
use crate::interfaces::{CategoryStore, GenreRepository, GenreStore};
use crate::mapper::map_genres_by_name;
use crate::migration::Migrator;
use crate::model::Genre;
use crate::storage::Result;

pub struct FederatedGenreRepository {
    canonical: Arc<dyn GenreStore>,
    categories: Arc<dyn CategoryStore>,
    migrator: Migrator,
}

impl FederatedGenreRepository {
    pub fn new(
        canonical: Arc<dyn GenreStore>,
        categories: Arc<dyn CategoryStore>,
        migrator: Migrator,
    ) -> Self {
        Self {
            canonical,
            categories,
            migrator,
        }
    }

    /// A canonical genre with the projection's name shadows it; a tombstone hides it.
    async fn shadowed(&self, projected: Genre) -> Result<Option<Genre>> {
        match self.canonical.get_by_name(&projected.name).await? {
            Some(canonical) if canonical.is_deleted => Ok(None),
            Some(canonical) => Ok(Some(canonical)),
            None => Ok(Some(projected)),
        }
    }

    async fn resolve_parent(&self, genre: &mut Genre) -> Result<()> {
        if let Some(parent_id) = genre.parent_id {
            if to_legacy_id(parent_id).is_some() {
                genre.parent_id = Some(self.migrator.ensure_genre(parent_id).await?.id);
            }
        }
        Ok(())
    }
}

#[async_trait]
impl GenreRepository for FederatedGenreRepository {
    async fn list(&self) -> Result<Vec<Genre>> {
        let (stored, categories) = tokio::try_join!(
            async { self.canonical.list(true).await.map_err(canonical_unavailable) },
            async { self.categories.list().await.map_err(legacy_unavailable) },
        )?;

        let (deleted, live): (Vec<Genre>, Vec<Genre>) =
            stored.into_iter().partition(|g| g.is_deleted);
        let deleted: HashSet<String> = deleted.into_iter().map(|g| g.name).collect();
        let projected = categories.iter().map(Genre::from).collect();

        let mut genres = map_genres_by_name(live, projected, &deleted);
        genres.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(genres)
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Genre>> {
        if let Some(genre) = self.canonical.get_by_id(id).await? {
            return Ok(Some(genre));
        }
        let Some(category_id) = to_legacy_id(id) else {
            return Ok(None);
        };
        let category = self
            .categories
            .get_by_id(category_id)
            .await
            .map_err(legacy_unavailable)?;
        match category {
            Some(category) => self.shadowed(Genre::from(&category)).await,
            None => Ok(None),
        }
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<Genre>> {
        if let Some(genre) = self.canonical.get_by_name(name).await? {
            return Ok((!genre.is_deleted).then_some(genre));
        }
        let categories = self.categories.list().await.map_err(legacy_unavailable)?;
        Ok(categories
            .iter()
            .find(|c| c.category_name == name)
            .map(Genre::from))
    }

    async fn add(&self, mut genre: Genre) -> Result<()> {
        self.resolve_parent(&mut genre).await?;
        self.canonical.add(&genre).await
    }

    async fn update(&self, mut genre: Genre) -> Result<()> {
        genre.id = self.migrator.ensure_genre(genre.id).await?.id;
        self.resolve_parent(&mut genre).await?;
        self.canonical.update(&genre).await
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let genre = self.migrator.ensure_genre(id).await?;
        self.canonical.soft_delete(genre.id).await
    }
}
