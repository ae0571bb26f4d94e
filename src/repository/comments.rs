//! Comment repository. Comments only live in the canonical store, but every
//! write migrates the legacy-origin game it is attached to.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use crate::interfaces::{CommentRepository, CommentStore};
use crate::migration::Migrator;
use crate::model::{Comment, DELETED_COMMENT_BODY};
use crate::storage::{Result, StorageError};

pub struct FederatedCommentRepository {
    canonical: Arc<dyn CommentStore>,
    migrator: Migrator,
}

impl FederatedCommentRepository {
    pub fn new(canonical: Arc<dyn CommentStore>, migrator: Migrator) -> Self {
        Self {
            canonical,
            migrator,
        }
    }
}

/// Descendants of `root` in breadth-first order.
///
/// Fails with `CommentCycle` when the parent links loop back on themselves.
fn descendants(root: Uuid, comments: &[Comment]) -> Result<Vec<Uuid>> {
    let mut children: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
    for comment in comments {
        if let Some(parent_id) = comment.parent_id {
            children.entry(parent_id).or_default().push(comment.id);
        }
    }

    let mut visited: HashSet<Uuid> = HashSet::from([root]);
    let mut found = Vec::new();
    let mut worklist = vec![root];
    while let Some(id) = worklist.pop() {
        for child in children.get(&id).map(Vec::as_slice).unwrap_or_default() {
            if !visited.insert(*child) {
                return Err(StorageError::CommentCycle { id: root });
            }
            found.push(*child);
            worklist.push(*child);
        }
    }
    Ok(found)
}

#[async_trait]
impl CommentRepository for FederatedCommentRepository {
    async fn list_by_game(&self, game_id: Uuid) -> Result<Vec<Comment>> {
        self.canonical.list_by_game(game_id).await
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Comment>> {
        self.canonical.get_by_id(id).await
    }

    async fn add(&self, mut comment: Comment) -> Result<()> {
        let game = self.migrator.ensure_game(comment.game_id).await?;
        comment.game_id = game.id;

        if let Some(parent_id) = comment.parent_id {
            let parent = self
                .canonical
                .get_by_id(parent_id)
                .await?
                .ok_or_else(|| StorageError::not_found("comment", parent_id))?;
            if parent.game_id != comment.game_id {
                return Err(StorageError::InvalidValue(format!(
                    "reply {} belongs to a different game than comment {}",
                    comment.id, parent_id
                )));
            }
        }
        self.canonical.add(&comment).await
    }

    async fn update(&self, mut comment: Comment) -> Result<()> {
        let game = self.migrator.ensure_game(comment.game_id).await?;
        comment.game_id = game.id;
        self.canonical.update(&comment).await
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let comment = self
            .canonical
            .get_by_id(id)
            .await?
            .ok_or_else(|| StorageError::not_found("comment", id))?;
        let thread = self.canonical.list_by_game(comment.game_id).await?;
        let affected: HashSet<Uuid> = descendants(id, &thread)?.into_iter().collect();

        let mut updated = Vec::with_capacity(affected.len() + 1);
        updated.push(Comment {
            body: DELETED_COMMENT_BODY.to_string(),
            is_deleted: true,
            ..comment
        });
        updated.extend(
            thread
                .into_iter()
                .filter(|c| affected.contains(&c.id) && c.quote.is_some())
                .map(|c| Comment { quote: None, ..c }),
        );

        debug!(comment_id = %id, rewritten = updated.len(), "Deleting comment");
        self.canonical.update_many(&updated).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::to_guid;
    use crate::interfaces::{GameStore, ProductStore};
    use crate::model::legacy::LegacyProduct;
    use crate::model::Game;
    use crate::storage::{CanonicalStores, LegacyStores, MockCatalogStore, MockLegacyStore};

    struct Fixture {
        canonical: Arc<MockCatalogStore>,
        legacy: Arc<MockLegacyStore>,
        repo: FederatedCommentRepository,
        game: Game,
    }

    async fn fixture() -> Fixture {
        let canonical = Arc::new(MockCatalogStore::new());
        let legacy = Arc::new(MockLegacyStore::new());
        legacy.insert_product(LegacyProduct::new(99, "chai", "Chai")).await;
        let game = Game::new("halo", "Halo", 59.99);
        GameStore::add(canonical.as_ref(), &game).await.unwrap();
        let migrator = Migrator::new(
            CanonicalStores::from_backend(canonical.clone()),
            LegacyStores::from_backend(legacy.clone()),
        );
        let repo = FederatedCommentRepository::new(canonical.clone(), migrator);
        Fixture {
            canonical,
            legacy,
            repo,
            game,
        }
    }

    fn quoted_reply(parent: &Comment, author: &str) -> Comment {
        Comment::reply_to(parent, author, "agreed", Some(parent.body.clone()))
    }

    #[tokio::test]
    async fn test_comment_on_legacy_game_migrates_it() {
        let f = fixture().await;
        let before = f.legacy.product(99).await.unwrap();

        f.repo
            .add(Comment::new(to_guid(99), "ana", "great tea"))
            .await
            .unwrap();

        assert!(GameStore::exists(f.canonical.as_ref(), to_guid(99)).await.unwrap());
        assert_eq!(
            ProductStore::get_by_id(f.legacy.as_ref(), 99).await.unwrap(),
            Some(before)
        );
        assert_eq!(f.repo.list_by_game(to_guid(99)).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_strips_quotes_from_every_descendant() {
        let f = fixture().await;
        let root = Comment::new(f.game.id, "ana", "first");
        let reply = quoted_reply(&root, "bo");
        let nested = quoted_reply(&reply, "cy");
        let sibling = Comment::new(f.game.id, "di", "unrelated");
        let sibling_reply = quoted_reply(&sibling, "ed");
        for comment in [&root, &reply, &nested, &sibling, &sibling_reply] {
            f.repo.add(comment.clone()).await.unwrap();
        }

        f.repo.delete(root.id).await.unwrap();

        let deleted = f.repo.get_by_id(root.id).await.unwrap().unwrap();
        assert!(deleted.is_deleted);
        assert_eq!(deleted.body, DELETED_COMMENT_BODY);
        for id in [reply.id, nested.id] {
            let comment = f.repo.get_by_id(id).await.unwrap().unwrap();
            assert_eq!(comment.quote, None);
            assert!(!comment.is_deleted);
        }
        let untouched = f.repo.get_by_id(sibling_reply.id).await.unwrap().unwrap();
        assert_eq!(untouched.quote.as_deref(), Some("unrelated"));
    }

    #[test]
    fn test_parent_cycle_is_detected() {
        let game_id = Uuid::new_v4();
        let mut a = Comment::new(game_id, "ana", "a");
        let mut b = Comment::new(game_id, "bo", "b");
        a.parent_id = Some(b.id);
        b.parent_id = Some(a.id);

        let err = descendants(a.id, &[a.clone(), b]).unwrap_err();
        assert!(matches!(err, StorageError::CommentCycle { id } if id == a.id));
    }

    #[test]
    fn test_descendants_walks_the_whole_subtree() {
        let game_id = Uuid::new_v4();
        let root = Comment::new(game_id, "ana", "root");
        let child = Comment::reply_to(&root, "bo", "child", None);
        let grandchild = Comment::reply_to(&child, "cy", "grandchild", None);
        let other = Comment::new(game_id, "di", "other");

        let mut found = descendants(root.id, &[root.clone(), child.clone(), grandchild.clone(), other])
            .unwrap();
        found.sort();
        let mut expected = vec![child.id, grandchild.id];
        expected.sort();
        assert_eq!(found, expected);
    }

    #[tokio::test]
    async fn test_reply_requires_existing_parent() {
        let f = fixture().await;
        let orphan = Comment {
            parent_id: Some(Uuid::new_v4()),
            ..Comment::new(f.game.id, "ana", "hello?")
        };
        assert!(f.repo.add(orphan).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_delete_unknown_comment_is_not_found() {
        let f = fixture().await;
        assert!(f.repo.delete(Uuid::new_v4()).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_failed_tree_update_leaves_comments_intact() {
        let f = fixture().await;
        let root = Comment::new(f.game.id, "ana", "first");
        let reply = quoted_reply(&root, "bo");
        f.repo.add(root.clone()).await.unwrap();
        f.repo.add(reply.clone()).await.unwrap();
        f.canonical.set_fail_on_write(true).await;

        assert!(f.repo.delete(root.id).await.is_err());

        f.canonical.set_fail_on_write(false).await;
        assert_eq!(f.repo.get_by_id(reply.id).await.unwrap().unwrap(), reply);
    }
}
