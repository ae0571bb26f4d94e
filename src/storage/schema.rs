//! Canonical database schema definitions using sea-query.
//!
//! These define the table and column identifiers for type-safe query building.

use sea_query::Iden;

/// Games table schema.
#[derive(Iden, Clone, Copy)]
pub enum Games {
    Table,
    #[iden = "id"]
    Id,
    #[iden = "game_key"]
    Key,
    #[iden = "name"]
    Name,
    /// Lowercased name; SQLite's `lower()` only folds ASCII.
    #[iden = "name_folded"]
    NameFolded,
    #[iden = "description"]
    Description,
    #[iden = "price"]
    Price,
    #[iden = "units_in_stock"]
    UnitsInStock,
    #[iden = "discount"]
    Discount,
    #[iden = "views"]
    Views,
    #[iden = "published_at"]
    PublishedAt,
    #[iden = "publisher_id"]
    PublisherId,
    #[iden = "is_deleted"]
    IsDeleted,
}

/// Game-to-genre link table schema.
#[derive(Iden, Clone, Copy)]
pub enum GameGenres {
    Table,
    #[iden = "game_id"]
    GameId,
    #[iden = "genre_id"]
    GenreId,
}

/// Game-to-platform link table schema.
#[derive(Iden, Clone, Copy)]
pub enum GamePlatforms {
    Table,
    #[iden = "game_id"]
    GameId,
    #[iden = "platform_id"]
    PlatformId,
}

/// Genres table schema.
#[derive(Iden, Clone, Copy)]
pub enum Genres {
    Table,
    #[iden = "id"]
    Id,
    #[iden = "name"]
    Name,
    #[iden = "parent_id"]
    ParentId,
    #[iden = "description"]
    Description,
    #[iden = "is_deleted"]
    IsDeleted,
}

/// Publishers table schema.
#[derive(Iden, Clone, Copy)]
pub enum Publishers {
    Table,
    #[iden = "id"]
    Id,
    #[iden = "company_name"]
    CompanyName,
    #[iden = "description"]
    Description,
    #[iden = "home_page"]
    HomePage,
    #[iden = "is_deleted"]
    IsDeleted,
}

/// Orders table schema.
#[derive(Iden, Clone, Copy)]
pub enum Orders {
    Table,
    #[iden = "id"]
    Id,
    #[iden = "customer"]
    Customer,
    #[iden = "ordered_at"]
    OrderedAt,
    #[iden = "status"]
    Status,
}

/// Order items table schema.
#[derive(Iden, Clone, Copy)]
pub enum OrderItems {
    Table,
    #[iden = "order_id"]
    OrderId,
    #[iden = "game_id"]
    GameId,
    #[iden = "price"]
    Price,
    #[iden = "quantity"]
    Quantity,
    #[iden = "discount"]
    Discount,
}

/// Comments table schema.
#[derive(Iden, Clone, Copy)]
pub enum Comments {
    Table,
    #[iden = "id"]
    Id,
    #[iden = "game_id"]
    GameId,
    #[iden = "parent_id"]
    ParentId,
    #[iden = "author"]
    Author,
    #[iden = "body"]
    Body,
    #[iden = "quote"]
    Quote,
    #[iden = "is_deleted"]
    IsDeleted,
}

/// Correlated subquery counting a game's comments.
pub const COMMENT_COUNT_SQL: &str =
    "(SELECT COUNT(*) FROM comments WHERE comments.game_id = games.id)";

/// SQL for creating the canonical catalog tables.
pub const CREATE_CATALOG_TABLES: &str = r#"
CREATE TABLE IF NOT EXISTS genres (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    parent_id TEXT,
    description TEXT,
    is_deleted INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS publishers (
    id TEXT PRIMARY KEY,
    company_name TEXT NOT NULL UNIQUE,
    description TEXT,
    home_page TEXT,
    is_deleted INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS games (
    id TEXT PRIMARY KEY,
    game_key TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    name_folded TEXT NOT NULL,
    description TEXT,
    price REAL NOT NULL,
    units_in_stock INTEGER NOT NULL DEFAULT 0,
    discount INTEGER NOT NULL DEFAULT 0,
    views INTEGER NOT NULL DEFAULT 0,
    published_at TEXT,
    publisher_id TEXT,
    is_deleted INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS game_genres (
    game_id TEXT NOT NULL,
    genre_id TEXT NOT NULL,
    PRIMARY KEY (game_id, genre_id)
);

CREATE TABLE IF NOT EXISTS game_platforms (
    game_id TEXT NOT NULL,
    platform_id TEXT NOT NULL,
    PRIMARY KEY (game_id, platform_id)
);

CREATE TABLE IF NOT EXISTS orders (
    id TEXT PRIMARY KEY,
    customer TEXT NOT NULL,
    ordered_at TEXT,
    status TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS order_items (
    order_id TEXT NOT NULL,
    game_id TEXT NOT NULL,
    price REAL NOT NULL,
    quantity INTEGER NOT NULL,
    discount INTEGER NOT NULL DEFAULT 0,
    PRIMARY KEY (order_id, game_id)
);

CREATE TABLE IF NOT EXISTS comments (
    id TEXT PRIMARY KEY,
    game_id TEXT NOT NULL,
    parent_id TEXT,
    author TEXT NOT NULL,
    body TEXT NOT NULL,
    quote TEXT,
    is_deleted INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_comments_game ON comments(game_id);
CREATE INDEX IF NOT EXISTS idx_order_items_order ON order_items(order_id);
"#;
