//! SQLite CommentStore implementation.

use async_trait::async_trait;
use sea_query::{Expr, Order, Query, SqliteQueryBuilder};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};
use uuid::Uuid;

use super::{duplicate_or, finish, flag, parse_opt_uuid, parse_uuid, SqliteCatalogStore};
use crate::interfaces::CommentStore;
use crate::model::Comment;
use crate::storage::schema::Comments;
use crate::storage::{Result, StorageError};

const COMMENT_COLUMNS: [Comments; 7] = [
    Comments::Id,
    Comments::GameId,
    Comments::ParentId,
    Comments::Author,
    Comments::Body,
    Comments::Quote,
    Comments::IsDeleted,
];

fn comment_from_row(row: &SqliteRow) -> Result<Comment> {
    Ok(Comment {
        id: parse_uuid(&row.try_get::<String, _>("id")?)?,
        game_id: parse_uuid(&row.try_get::<String, _>("game_id")?)?,
        parent_id: parse_opt_uuid(row.try_get("parent_id")?)?,
        author: row.try_get("author")?,
        body: row.try_get("body")?,
        quote: row.try_get("quote")?,
        is_deleted: row.try_get("is_deleted")?,
    })
}

impl SqliteCatalogStore {
    async fn replace_comment(conn: &mut SqliteConnection, comment: &Comment) -> Result<()> {
        let sql = Query::update()
            .table(Comments::Table)
            .values([
                (
                    Comments::ParentId,
                    comment.parent_id.map(|id| id.to_string()).into(),
                ),
                (Comments::Author, comment.author.clone().into()),
                (Comments::Body, comment.body.clone().into()),
                (Comments::Quote, comment.quote.clone().into()),
                (Comments::IsDeleted, flag(comment.is_deleted).into()),
            ])
            .and_where(Expr::col(Comments::Id).eq(comment.id.to_string()))
            .to_string(SqliteQueryBuilder);

        let result = sqlx::query(&sql).execute(&mut *conn).await?;
        if result.rows_affected() == 0 {
            return Err(StorageError::not_found("comment", comment.id));
        }
        Ok(())
    }

    async fn replace_comments(conn: &mut SqliteConnection, comments: &[Comment]) -> Result<()> {
        for comment in comments {
            Self::replace_comment(conn, comment).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl CommentStore for SqliteCatalogStore {
    async fn list_by_game(&self, game_id: Uuid) -> Result<Vec<Comment>> {
        let sql = Query::select()
            .columns(COMMENT_COLUMNS)
            .from(Comments::Table)
            .and_where(Expr::col(Comments::GameId).eq(game_id.to_string()))
            .order_by(Comments::Id, Order::Asc)
            .to_string(SqliteQueryBuilder);

        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.iter().map(comment_from_row).collect()
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Comment>> {
        let sql = Query::select()
            .columns(COMMENT_COLUMNS)
            .from(Comments::Table)
            .and_where(Expr::col(Comments::Id).eq(id.to_string()))
            .to_string(SqliteQueryBuilder);

        let row = sqlx::query(&sql).fetch_optional(&self.pool).await?;
        row.as_ref().map(comment_from_row).transpose()
    }

    async fn add(&self, comment: &Comment) -> Result<()> {
        let sql = Query::insert()
            .into_table(Comments::Table)
            .columns(COMMENT_COLUMNS)
            .values_panic([
                comment.id.to_string().into(),
                comment.game_id.to_string().into(),
                comment.parent_id.map(|id| id.to_string()).into(),
                comment.author.clone().into(),
                comment.body.clone().into(),
                comment.quote.clone().into(),
                flag(comment.is_deleted).into(),
            ])
            .to_string(SqliteQueryBuilder);

        sqlx::query(&sql)
            .execute(&self.pool)
            .await
            .map_err(|e| duplicate_or(e, "comment", &comment.id.to_string()))?;
        Ok(())
    }

    async fn update(&self, comment: &Comment) -> Result<()> {
        self.update_many(std::slice::from_ref(comment)).await
    }

    async fn update_many(&self, comments: &[Comment]) -> Result<()> {
        if comments.is_empty() {
            return Ok(());
        }
        let mut tx = self.begin().await?;
        let result = Self::replace_comments(&mut tx, comments).await;
        finish(tx, result).await
    }
}
