//! SQLite GameStore implementation.

use std::collections::HashMap;

use async_trait::async_trait;
use sea_query::{
    Alias, Cond, Condition, Expr, LikeExpr, Order, Query, SelectStatement, SimpleExpr,
    SqliteQueryBuilder,
};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};
use uuid::Uuid;

use super::{
    duplicate_or, finish, flag, format_timestamp, parse_opt_uuid, parse_timestamp, parse_uuid,
    SqliteCatalogStore,
};
use crate::interfaces::{GameStore, KeyIndex};
use crate::model::{Game, GameList};
use crate::pipeline::{GamePredicate, GameQuery, GameSort};
use crate::storage::schema::{GameGenres, GamePlatforms, Games, COMMENT_COUNT_SQL};
use crate::storage::{Result, StorageError};

const GAME_COLUMNS: [Games; 11] = [
    Games::Id,
    Games::Key,
    Games::Name,
    Games::Description,
    Games::Price,
    Games::UnitsInStock,
    Games::Discount,
    Games::Views,
    Games::PublishedAt,
    Games::PublisherId,
    Games::IsDeleted,
];

const LIKE_ESCAPE: char = '!';

/// Escape LIKE wildcards so user text matches literally.
fn like_pattern(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for ch in needle.to_lowercase().chars() {
        if matches!(ch, '%' | '_' | LIKE_ESCAPE) {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

fn uuid_strings(ids: &[Uuid]) -> Vec<String> {
    ids.iter().map(Uuid::to_string).collect()
}

/// Translate predicates into a WHERE condition.
fn game_condition(predicates: &[GamePredicate]) -> Condition {
    predicates.iter().fold(Cond::all(), |cond, predicate| {
        let expr = match predicate {
            GamePredicate::NameContains(needle) => Expr::col(Games::NameFolded)
                .like(LikeExpr::new(like_pattern(needle)).escape(LIKE_ESCAPE)),
            GamePredicate::GenreIn(ids) => Expr::col(Games::Id).in_subquery(
                Query::select()
                    .column(GameGenres::GameId)
                    .from(GameGenres::Table)
                    .and_where(Expr::col(GameGenres::GenreId).is_in(uuid_strings(ids)))
                    .to_owned(),
            ),
            GamePredicate::PlatformIn(ids) => Expr::col(Games::Id).in_subquery(
                Query::select()
                    .column(GamePlatforms::GameId)
                    .from(GamePlatforms::Table)
                    .and_where(Expr::col(GamePlatforms::PlatformId).is_in(uuid_strings(ids)))
                    .to_owned(),
            ),
            GamePredicate::PriceBetween { min, max } => {
                let mut range = Cond::all();
                if let Some(min) = min {
                    range = range.add(Expr::col(Games::Price).gte(*min));
                }
                if let Some(max) = max {
                    range = range.add(Expr::col(Games::Price).lte(*max));
                }
                return cond.add(range);
            }
            GamePredicate::PublisherIs(id) => Expr::col(Games::PublisherId).eq(id.to_string()),
            GamePredicate::PublishedSince(since) => {
                Expr::col(Games::PublishedAt).gte(format_timestamp(*since))
            }
            GamePredicate::NotDeleted => Expr::col(Games::IsDeleted).eq(0),
            GamePredicate::KeyNotIn(keys) => Expr::col(Games::Key).is_not_in(keys.iter().cloned()),
        };
        cond.add(expr)
    })
}

/// Apply ordering; the key is always the final tie-break.
fn apply_order(select: &mut SelectStatement, order: Option<GameSort>) {
    match order {
        Some(GameSort::MostPopular) => {
            select.order_by(Games::Views, Order::Desc);
        }
        Some(GameSort::MostCommented) => {
            select.order_by_expr(Expr::cust(COMMENT_COUNT_SQL), Order::Desc);
        }
        Some(GameSort::PriceAsc) => {
            select.order_by(Games::Price, Order::Asc);
        }
        Some(GameSort::PriceDesc) => {
            select.order_by(Games::Price, Order::Desc);
        }
        Some(GameSort::New) => {
            select
                .order_by_expr(Expr::col(Games::PublishedAt).is_null(), Order::Asc)
                .order_by(Games::PublishedAt, Order::Desc);
        }
        None => {}
    }
    select.order_by(Games::Key, Order::Asc);
}

fn select_games() -> SelectStatement {
    Query::select()
        .columns(GAME_COLUMNS)
        .expr_as(Expr::cust(COMMENT_COUNT_SQL), Alias::new("comment_count"))
        .from(Games::Table)
        .to_owned()
}

fn select_one(filter: SimpleExpr) -> String {
    select_games()
        .and_where(filter)
        .limit(1)
        .to_string(SqliteQueryBuilder)
}

fn game_from_row(row: &SqliteRow) -> Result<Game> {
    let comment_count: i64 = row.try_get("comment_count")?;
    Ok(Game {
        id: parse_uuid(&row.try_get::<String, _>("id")?)?,
        key: row.try_get("game_key")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        price: row.try_get("price")?,
        units_in_stock: row.try_get("units_in_stock")?,
        discount: row.try_get("discount")?,
        views: row.try_get("views")?,
        published_at: parse_timestamp(row.try_get("published_at")?)?,
        publisher_id: parse_opt_uuid(row.try_get("publisher_id")?)?,
        genre_ids: Vec::new(),
        platform_ids: Vec::new(),
        comment_count: u32::try_from(comment_count)
            .map_err(|_| StorageError::InvalidValue(format!("comment count {comment_count}")))?,
        is_deleted: row.try_get("is_deleted")?,
    })
}

impl SqliteCatalogStore {
    async fn fetch_games(&self, sql: String) -> Result<Vec<Game>> {
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        let mut games = rows.iter().map(game_from_row).collect::<Result<Vec<_>>>()?;
        self.load_links(&mut games).await?;
        Ok(games)
    }

    /// Fill genre and platform ids for already-loaded games.
    async fn load_links(&self, games: &mut [Game]) -> Result<()> {
        if games.is_empty() {
            return Ok(());
        }
        let ids: Vec<String> = games.iter().map(|g| g.id.to_string()).collect();

        let genre_sql = Query::select()
            .columns([GameGenres::GameId, GameGenres::GenreId])
            .from(GameGenres::Table)
            .and_where(Expr::col(GameGenres::GameId).is_in(ids.clone()))
            .order_by(GameGenres::GenreId, Order::Asc)
            .to_string(SqliteQueryBuilder);
        let platform_sql = Query::select()
            .columns([GamePlatforms::GameId, GamePlatforms::PlatformId])
            .from(GamePlatforms::Table)
            .and_where(Expr::col(GamePlatforms::GameId).is_in(ids))
            .order_by(GamePlatforms::PlatformId, Order::Asc)
            .to_string(SqliteQueryBuilder);

        let mut genres: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        for row in sqlx::query(&genre_sql).fetch_all(&self.pool).await? {
            let game_id = parse_uuid(&row.try_get::<String, _>("game_id")?)?;
            let genre_id = parse_uuid(&row.try_get::<String, _>("genre_id")?)?;
            genres.entry(game_id).or_default().push(genre_id);
        }
        let mut platforms: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        for row in sqlx::query(&platform_sql).fetch_all(&self.pool).await? {
            let game_id = parse_uuid(&row.try_get::<String, _>("game_id")?)?;
            let platform_id = parse_uuid(&row.try_get::<String, _>("platform_id")?)?;
            platforms.entry(game_id).or_default().push(platform_id);
        }

        for game in games.iter_mut() {
            game.genre_ids = genres.remove(&game.id).unwrap_or_default();
            game.platform_ids = platforms.remove(&game.id).unwrap_or_default();
        }
        Ok(())
    }

    async fn fetch_one_game(&self, sql: String) -> Result<Option<Game>> {
        Ok(self.fetch_games(sql).await?.into_iter().next())
    }

    async fn write_links(conn: &mut SqliteConnection, game: &Game) -> Result<()> {
        let id = game.id.to_string();

        for table_delete in [
            Query::delete()
                .from_table(GameGenres::Table)
                .and_where(Expr::col(GameGenres::GameId).eq(&id))
                .to_string(SqliteQueryBuilder),
            Query::delete()
                .from_table(GamePlatforms::Table)
                .and_where(Expr::col(GamePlatforms::GameId).eq(&id))
                .to_string(SqliteQueryBuilder),
        ] {
            sqlx::query(&table_delete).execute(&mut *conn).await?;
        }

        for genre_id in &game.genre_ids {
            let sql = Query::insert()
                .into_table(GameGenres::Table)
                .columns([GameGenres::GameId, GameGenres::GenreId])
                .values_panic([id.clone().into(), genre_id.to_string().into()])
                .to_string(SqliteQueryBuilder);
            sqlx::query(&sql).execute(&mut *conn).await?;
        }
        for platform_id in &game.platform_ids {
            let sql = Query::insert()
                .into_table(GamePlatforms::Table)
                .columns([GamePlatforms::GameId, GamePlatforms::PlatformId])
                .values_panic([id.clone().into(), platform_id.to_string().into()])
                .to_string(SqliteQueryBuilder);
            sqlx::query(&sql).execute(&mut *conn).await?;
        }
        Ok(())
    }

    async fn insert_game(conn: &mut SqliteConnection, game: &Game) -> Result<()> {
        let sql = Query::insert()
            .into_table(Games::Table)
            .columns(GAME_COLUMNS.into_iter().chain([Games::NameFolded]))
            .values_panic([
                game.id.to_string().into(),
                game.key.clone().into(),
                game.name.clone().into(),
                game.description.clone().into(),
                game.price.into(),
                game.units_in_stock.into(),
                game.discount.into(),
                game.views.into(),
                game.published_at.map(format_timestamp).into(),
                game.publisher_id.map(|id| id.to_string()).into(),
                flag(game.is_deleted).into(),
                game.name.to_lowercase().into(),
            ])
            .to_string(SqliteQueryBuilder);

        sqlx::query(&sql)
            .execute(&mut *conn)
            .await
            .map_err(|e| duplicate_or(e, "game", &game.key))?;
        Self::write_links(conn, game).await
    }

    async fn replace_game(conn: &mut SqliteConnection, game: &Game) -> Result<()> {
        let sql = Query::update()
            .table(Games::Table)
            .values([
                (Games::Key, game.key.clone().into()),
                (Games::Name, game.name.clone().into()),
                (Games::NameFolded, game.name.to_lowercase().into()),
                (Games::Description, game.description.clone().into()),
                (Games::Price, game.price.into()),
                (Games::UnitsInStock, game.units_in_stock.into()),
                (Games::Discount, game.discount.into()),
                (Games::Views, game.views.into()),
                (
                    Games::PublishedAt,
                    game.published_at.map(format_timestamp).into(),
                ),
                (
                    Games::PublisherId,
                    game.publisher_id.map(|id| id.to_string()).into(),
                ),
                (Games::IsDeleted, flag(game.is_deleted).into()),
            ])
            .and_where(Expr::col(Games::Id).eq(game.id.to_string()))
            .to_string(SqliteQueryBuilder);

        let result = sqlx::query(&sql)
            .execute(&mut *conn)
            .await
            .map_err(|e| duplicate_or(e, "game", &game.key))?;
        if result.rows_affected() == 0 {
            return Err(StorageError::not_found("game", game.id));
        }
        Self::write_links(conn, game).await
    }

    /// Run a single-row UPDATE, failing with NotFound when nothing matched.
    async fn update_game_column(&self, id: Uuid, sql: String) -> Result<()> {
        let result = sqlx::query(&sql).execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(StorageError::not_found("game", id));
        }
        Ok(())
    }
}

#[async_trait]
impl GameStore for SqliteCatalogStore {
    async fn find(&self, query: &GameQuery) -> Result<GameList> {
        let (count_sql, select_sql) = {
            let cond = game_condition(&query.predicates);
            let count_sql = Query::select()
                .expr(Expr::col(Games::Id).count())
                .from(Games::Table)
                .cond_where(cond.clone())
                .to_string(SqliteQueryBuilder);

            let mut select = select_games().cond_where(cond).to_owned();
            apply_order(&mut select, query.order);
            // SQLite requires a LIMIT before OFFSET.
            match query.window.take {
                Some(take) => {
                    select.limit(take);
                }
                None if query.window.skip > 0 => {
                    select.limit(i64::MAX as u64);
                }
                None => {}
            }
            if query.window.skip > 0 {
                select.offset(query.window.skip);
            }
            (count_sql, select.to_string(SqliteQueryBuilder))
        };

        let count: i64 = sqlx::query(&count_sql)
            .fetch_one(&self.pool)
            .await?
            .try_get(0)?;
        let games = self.fetch_games(select_sql).await?;
        Ok(GameList::new(games, count.max(0) as u64))
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Game>> {
        let sql = select_one(Expr::col(Games::Id).eq(id.to_string()));
        self.fetch_one_game(sql).await
    }

    async fn get_by_key(&self, key: &str) -> Result<Option<Game>> {
        let sql = select_one(Expr::col(Games::Key).eq(key));
        self.fetch_one_game(sql).await
    }

    async fn exists(&self, id: Uuid) -> Result<bool> {
        let sql = Query::select()
            .column(Games::Id)
            .from(Games::Table)
            .and_where(Expr::col(Games::Id).eq(id.to_string()))
            .limit(1)
            .to_string(SqliteQueryBuilder);
        Ok(sqlx::query(&sql).fetch_optional(&self.pool).await?.is_some())
    }

    async fn key_index(&self) -> Result<KeyIndex> {
        let sql = Query::select()
            .columns([Games::Key, Games::IsDeleted])
            .from(Games::Table)
            .to_string(SqliteQueryBuilder);

        let mut index = KeyIndex::default();
        for row in sqlx::query(&sql).fetch_all(&self.pool).await? {
            let key: String = row.try_get("game_key")?;
            index.insert(key, row.try_get::<bool, _>("is_deleted")?);
        }
        Ok(index)
    }

    async fn add(&self, game: &Game) -> Result<()> {
        let mut tx = self.begin().await?;
        let result = Self::insert_game(&mut tx, game).await;
        finish(tx, result).await
    }

    async fn update(&self, game: &Game) -> Result<()> {
        let mut tx = self.begin().await?;
        let result = Self::replace_game(&mut tx, game).await;
        finish(tx, result).await
    }

    async fn soft_delete(&self, id: Uuid) -> Result<()> {
        let sql = Query::update()
            .table(Games::Table)
            .value(Games::IsDeleted, 1)
            .and_where(Expr::col(Games::Id).eq(id.to_string()))
            .to_string(SqliteQueryBuilder);
        self.update_game_column(id, sql).await
    }

    async fn adjust_units_in_stock(&self, id: Uuid, delta: i32) -> Result<()> {
        let sql = Query::update()
            .table(Games::Table)
            .value(Games::UnitsInStock, Expr::col(Games::UnitsInStock).add(delta))
            .and_where(Expr::col(Games::Id).eq(id.to_string()))
            .to_string(SqliteQueryBuilder);
        self.update_game_column(id, sql).await
    }

    async fn increment_views(&self, id: Uuid) -> Result<()> {
        let sql = Query::update()
            .table(Games::Table)
            .value(Games::Views, Expr::col(Games::Views).add(1))
            .and_where(Expr::col(Games::Id).eq(id.to_string()))
            .to_string(SqliteQueryBuilder);
        self.update_game_column(id, sql).await
    }

    async fn count(&self) -> Result<u64> {
        let sql = Query::select()
            .expr(Expr::col(Games::Id).count())
            .from(Games::Table)
            .and_where(Expr::col(Games::IsDeleted).eq(0))
            .to_string(SqliteQueryBuilder);
        let count: i64 = sqlx::query(&sql).fetch_one(&self.pool).await?.try_get(0)?;
        Ok(count.max(0) as u64)
    }
}
