//! Canonical comment record.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Body written over a deleted comment. Replies keep their position in the tree.
pub const DELETED_COMMENT_BODY: &str = "A comment/quote was deleted";

/// A comment on a game. Comments form a forest keyed by `parent_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub game_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub author: String,
    pub body: String,
    /// Text quoted from an ancestor comment, if any.
    pub quote: Option<String>,
    pub is_deleted: bool,
}

impl Comment {
    pub fn new(game_id: Uuid, author: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            game_id,
            parent_id: None,
            author: author.into(),
            body: body.into(),
            quote: None,
            is_deleted: false,
        }
    }

    /// Create a reply to `parent`, optionally quoting it.
    pub fn reply_to(
        parent: &Comment,
        author: impl Into<String>,
        body: impl Into<String>,
        quote: Option<String>,
    ) -> Self {
        Self {
            parent_id: Some(parent.id),
            quote,
            ..Self::new(parent.game_id, author, body)
        }
    }
}
