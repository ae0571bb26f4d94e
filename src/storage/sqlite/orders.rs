//! SQLite OrderStore implementation.

use std::collections::HashMap;

use async_trait::async_trait;
use sea_query::{Expr, Order as SortOrder, Query, SqliteQueryBuilder};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};
use uuid::Uuid;

use super::{duplicate_or, finish, format_timestamp, parse_timestamp, parse_uuid, SqliteCatalogStore};
use crate::interfaces::OrderStore;
use crate::model::{Order, OrderItem, OrderStatus};
use crate::storage::schema::{OrderItems, Orders};
use crate::storage::{Result, StorageError};

fn order_from_row(row: &SqliteRow) -> Result<Order> {
    let status: String = row.try_get("status")?;
    Ok(Order {
        id: parse_uuid(&row.try_get::<String, _>("id")?)?,
        customer: row.try_get("customer")?,
        ordered_at: parse_timestamp(row.try_get("ordered_at")?)?,
        status: status.parse::<OrderStatus>().map_err(StorageError::InvalidValue)?,
        items: Vec::new(),
    })
}

impl SqliteCatalogStore {
    async fn fetch_orders(&self, sql: String) -> Result<Vec<Order>> {
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        let mut orders = rows.iter().map(order_from_row).collect::<Result<Vec<_>>>()?;
        if orders.is_empty() {
            return Ok(orders);
        }

        let ids: Vec<String> = orders.iter().map(|o| o.id.to_string()).collect();
        let items_sql = Query::select()
            .columns([
                OrderItems::OrderId,
                OrderItems::GameId,
                OrderItems::Price,
                OrderItems::Quantity,
                OrderItems::Discount,
            ])
            .from(OrderItems::Table)
            .and_where(Expr::col(OrderItems::OrderId).is_in(ids))
            .order_by(OrderItems::GameId, SortOrder::Asc)
            .to_string(SqliteQueryBuilder);

        let mut items: HashMap<Uuid, Vec<OrderItem>> = HashMap::new();
        for row in sqlx::query(&items_sql).fetch_all(&self.pool).await? {
            let order_id = parse_uuid(&row.try_get::<String, _>("order_id")?)?;
            items.entry(order_id).or_default().push(OrderItem {
                game_id: parse_uuid(&row.try_get::<String, _>("game_id")?)?,
                price: row.try_get("price")?,
                quantity: row.try_get("quantity")?,
                discount: row.try_get("discount")?,
            });
        }
        for order in orders.iter_mut() {
            order.items = items.remove(&order.id).unwrap_or_default();
        }
        Ok(orders)
    }

    async fn write_items(conn: &mut SqliteConnection, order: &Order) -> Result<()> {
        let id = order.id.to_string();
        let delete = Query::delete()
            .from_table(OrderItems::Table)
            .and_where(Expr::col(OrderItems::OrderId).eq(&id))
            .to_string(SqliteQueryBuilder);
        sqlx::query(&delete).execute(&mut *conn).await?;

        for item in &order.items {
            let sql = Query::insert()
                .into_table(OrderItems::Table)
                .columns([
                    OrderItems::OrderId,
                    OrderItems::GameId,
                    OrderItems::Price,
                    OrderItems::Quantity,
                    OrderItems::Discount,
                ])
                .values_panic([
                    id.clone().into(),
                    item.game_id.to_string().into(),
                    item.price.into(),
                    item.quantity.into(),
                    item.discount.into(),
                ])
                .to_string(SqliteQueryBuilder);
            sqlx::query(&sql).execute(&mut *conn).await?;
        }
        Ok(())
    }

    async fn insert_order(conn: &mut SqliteConnection, order: &Order) -> Result<()> {
        let sql = Query::insert()
            .into_table(Orders::Table)
            .columns([Orders::Id, Orders::Customer, Orders::OrderedAt, Orders::Status])
            .values_panic([
                order.id.to_string().into(),
                order.customer.clone().into(),
                order.ordered_at.map(format_timestamp).into(),
                order.status.as_str().into(),
            ])
            .to_string(SqliteQueryBuilder);

        sqlx::query(&sql)
            .execute(&mut *conn)
            .await
            .map_err(|e| duplicate_or(e, "order", &order.id.to_string()))?;
        Self::write_items(conn, order).await
    }

    async fn replace_order(conn: &mut SqliteConnection, order: &Order) -> Result<()> {
        let sql = Query::update()
            .table(Orders::Table)
            .values([
                (Orders::Customer, order.customer.clone().into()),
                (Orders::OrderedAt, order.ordered_at.map(format_timestamp).into()),
                (Orders::Status, order.status.as_str().into()),
            ])
            .and_where(Expr::col(Orders::Id).eq(order.id.to_string()))
            .to_string(SqliteQueryBuilder);

        let result = sqlx::query(&sql).execute(&mut *conn).await?;
        if result.rows_affected() == 0 {
            return Err(StorageError::not_found("order", order.id));
        }
        Self::write_items(conn, order).await
    }
}

#[async_trait]
impl OrderStore for SqliteCatalogStore {
    async fn list(&self) -> Result<Vec<Order>> {
        let sql = Query::select()
            .columns([Orders::Id, Orders::Customer, Orders::OrderedAt, Orders::Status])
            .from(Orders::Table)
            .order_by(Orders::OrderedAt, SortOrder::Desc)
            .to_string(SqliteQueryBuilder);
        self.fetch_orders(sql).await
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Order>> {
        let sql = Query::select()
            .columns([Orders::Id, Orders::Customer, Orders::OrderedAt, Orders::Status])
            .from(Orders::Table)
            .and_where(Expr::col(Orders::Id).eq(id.to_string()))
            .to_string(SqliteQueryBuilder);
        Ok(self.fetch_orders(sql).await?.into_iter().next())
    }

    async fn exists(&self, id: Uuid) -> Result<bool> {
        let sql = Query::select()
            .column(Orders::Id)
            .from(Orders::Table)
            .and_where(Expr::col(Orders::Id).eq(id.to_string()))
            .to_string(SqliteQueryBuilder);
        Ok(sqlx::query(&sql).fetch_optional(&self.pool).await?.is_some())
    }

    async fn add(&self, order: &Order) -> Result<()> {
        let mut tx = self.begin().await?;
        let result = Self::insert_order(&mut tx, order).await;
        finish(tx, result).await
    }

    async fn update(&self, order: &Order) -> Result<()> {
        let mut tx = self.begin().await?;
        let result = Self::replace_order(&mut tx, order).await;
        finish(tx, result).await
    }
}
