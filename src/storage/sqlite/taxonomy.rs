//! SQLite GenreStore and PublisherStore implementations.

use async_trait::async_trait;
use sea_query::{Expr, Order, Query, SqliteQueryBuilder};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use super::{duplicate_or, flag, parse_opt_uuid, parse_uuid, SqliteCatalogStore};
use crate::interfaces::{GenreStore, PublisherStore};
use crate::model::{Genre, Publisher};
use crate::storage::schema::{Genres, Publishers};
use crate::storage::{Result, StorageError};

const GENRE_COLUMNS: [Genres; 5] = [
    Genres::Id,
    Genres::Name,
    Genres::ParentId,
    Genres::Description,
    Genres::IsDeleted,
];

const PUBLISHER_COLUMNS: [Publishers; 5] = [
    Publishers::Id,
    Publishers::CompanyName,
    Publishers::Description,
    Publishers::HomePage,
    Publishers::IsDeleted,
];

fn genre_from_row(row: &SqliteRow) -> Result<Genre> {
    Ok(Genre {
        id: parse_uuid(&row.try_get::<String, _>("id")?)?,
        name: row.try_get("name")?,
        parent_id: parse_opt_uuid(row.try_get("parent_id")?)?,
        description: row.try_get("description")?,
        is_deleted: row.try_get("is_deleted")?,
    })
}

fn publisher_from_row(row: &SqliteRow) -> Result<Publisher> {
    Ok(Publisher {
        id: parse_uuid(&row.try_get::<String, _>("id")?)?,
        company_name: row.try_get("company_name")?,
        description: row.try_get("description")?,
        home_page: row.try_get("home_page")?,
        is_deleted: row.try_get("is_deleted")?,
    })
}

impl SqliteCatalogStore {
    async fn fetch_genres(&self, sql: String) -> Result<Vec<Genre>> {
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.iter().map(genre_from_row).collect()
    }

    async fn fetch_publishers(&self, sql: String) -> Result<Vec<Publisher>> {
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.iter().map(publisher_from_row).collect()
    }

    async fn execute_single(&self, sql: String, entity: &'static str, id: Uuid) -> Result<()> {
        let result = sqlx::query(&sql).execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(StorageError::not_found(entity, id));
        }
        Ok(())
    }
}

#[async_trait]
impl GenreStore for SqliteCatalogStore {
    async fn list(&self, include_deleted: bool) -> Result<Vec<Genre>> {
        let sql = {
            let mut select = Query::select();
            select
                .columns(GENRE_COLUMNS)
                .from(Genres::Table)
                .order_by(Genres::Name, Order::Asc);
            if !include_deleted {
                select.and_where(Expr::col(Genres::IsDeleted).eq(0));
            }
            select.to_string(SqliteQueryBuilder)
        };
        self.fetch_genres(sql).await
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Genre>> {
        let sql = Query::select()
            .columns(GENRE_COLUMNS)
            .from(Genres::Table)
            .and_where(Expr::col(Genres::Id).eq(id.to_string()))
            .to_string(SqliteQueryBuilder);
        Ok(self.fetch_genres(sql).await?.into_iter().next())
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<Genre>> {
        let sql = Query::select()
            .columns(GENRE_COLUMNS)
            .from(Genres::Table)
            .and_where(Expr::col(Genres::Name).eq(name))
            .to_string(SqliteQueryBuilder);
        Ok(self.fetch_genres(sql).await?.into_iter().next())
    }

    async fn add(&self, genre: &Genre) -> Result<()> {
        let sql = Query::insert()
            .into_table(Genres::Table)
            .columns(GENRE_COLUMNS)
            .values_panic([
                genre.id.to_string().into(),
                genre.name.clone().into(),
                genre.parent_id.map(|id| id.to_string()).into(),
                genre.description.clone().into(),
                flag(genre.is_deleted).into(),
            ])
            .to_string(SqliteQueryBuilder);

        sqlx::query(&sql)
            .execute(&self.pool)
            .await
            .map_err(|e| duplicate_or(e, "genre", &genre.name))?;
        Ok(())
    }

    async fn update(&self, genre: &Genre) -> Result<()> {
        let sql = Query::update()
            .table(Genres::Table)
            .values([
                (Genres::Name, genre.name.clone().into()),
                (
                    Genres::ParentId,
                    genre.parent_id.map(|id| id.to_string()).into(),
                ),
                (Genres::Description, genre.description.clone().into()),
                (Genres::IsDeleted, flag(genre.is_deleted).into()),
            ])
            .and_where(Expr::col(Genres::Id).eq(genre.id.to_string()))
            .to_string(SqliteQueryBuilder);

        let result = sqlx::query(&sql)
            .execute(&self.pool)
            .await
            .map_err(|e| duplicate_or(e, "genre", &genre.name))?;
        if result.rows_affected() == 0 {
            return Err(StorageError::not_found("genre", genre.id));
        }
        Ok(())
    }

    async fn soft_delete(&self, id: Uuid) -> Result<()> {
        let sql = Query::update()
            .table(Genres::Table)
            .value(Genres::IsDeleted, 1)
            .and_where(Expr::col(Genres::Id).eq(id.to_string()))
            .to_string(SqliteQueryBuilder);
        self.execute_single(sql, "genre", id).await
    }
}

#[async_trait]
impl PublisherStore for SqliteCatalogStore {
    async fn list(&self, include_deleted: bool) -> Result<Vec<Publisher>> {
        let sql = {
            let mut select = Query::select();
            select
                .columns(PUBLISHER_COLUMNS)
                .from(Publishers::Table)
                .order_by(Publishers::CompanyName, Order::Asc);
            if !include_deleted {
                select.and_where(Expr::col(Publishers::IsDeleted).eq(0));
            }
            select.to_string(SqliteQueryBuilder)
        };
        self.fetch_publishers(sql).await
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Publisher>> {
        let sql = Query::select()
            .columns(PUBLISHER_COLUMNS)
            .from(Publishers::Table)
            .and_where(Expr::col(Publishers::Id).eq(id.to_string()))
            .to_string(SqliteQueryBuilder);
        Ok(self.fetch_publishers(sql).await?.into_iter().next())
    }

    async fn get_by_company_name(&self, company_name: &str) -> Result<Option<Publisher>> {
        let sql = Query::select()
            .columns(PUBLISHER_COLUMNS)
            .from(Publishers::Table)
            .and_where(Expr::col(Publishers::CompanyName).eq(company_name))
            .to_string(SqliteQueryBuilder);
        Ok(self.fetch_publishers(sql).await?.into_iter().next())
    }

    async fn add(&self, publisher: &Publisher) -> Result<()> {
        let sql = Query::insert()
            .into_table(Publishers::Table)
            .columns(PUBLISHER_COLUMNS)
            .values_panic([
                publisher.id.to_string().into(),
                publisher.company_name.clone().into(),
                publisher.description.clone().into(),
                publisher.home_page.clone().into(),
                flag(publisher.is_deleted).into(),
            ])
            .to_string(SqliteQueryBuilder);

        sqlx::query(&sql)
            .execute(&self.pool)
            .await
            .map_err(|e| duplicate_or(e, "publisher", &publisher.company_name))?;
        Ok(())
    }

    async fn update(&self, publisher: &Publisher) -> Result<()> {
        let sql = Query::update()
            .table(Publishers::Table)
            .values([
                (Publishers::CompanyName, publisher.company_name.clone().into()),
                (Publishers::Description, publisher.description.clone().into()),
                (Publishers::HomePage, publisher.home_page.clone().into()),
                (Publishers::IsDeleted, flag(publisher.is_deleted).into()),
            ])
            .and_where(Expr::col(Publishers::Id).eq(publisher.id.to_string()))
            .to_string(SqliteQueryBuilder);

        let result = sqlx::query(&sql)
            .execute(&self.pool)
            .await
            .map_err(|e| duplicate_or(e, "publisher", &publisher.company_name))?;
        if result.rows_affected() == 0 {
            return Err(StorageError::not_found("publisher", publisher.id));
        }
        Ok(())
    }

    async fn soft_delete(&self, id: Uuid) -> Result<()> {
        let sql = Query::update()
            .table(Publishers::Table)
            .value(Publishers::IsDeleted, 1)
            .and_where(Expr::col(Publishers::Id).eq(id.to_string()))
            .to_string(SqliteQueryBuilder);
        self.execute_single(sql, "publisher", id).await
    }
}
