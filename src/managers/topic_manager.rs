//! Topic Manager for bookmarkd.
//!
//! Implements `TopicManagerTrait`, operations on the topic tree backed by
//! SQLite via `rusqlite`. The tree is rooted at the single topic with a NULL
//! parent; the root can be renamed but never deleted or reparented.

use rusqlite::{params, Connection};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

use crate::database::migrations::ROOT_TOPIC_NAME;
use crate::types::errors::TopicError;
use crate::types::topic::{NodeBookmark, Topic, TopicNode};

/// Leading path components stripped during import path resolution.
///
/// Browser exports wrap everything in a root container folder ("Favorites",
/// "Bookmarks Bar", ...) that maps onto our root topic rather than becoming
/// a topic of its own. Only the head of a path is matched, so a user folder
/// deeper down that happens to carry one of these names is preserved.
const ROOT_CONTAINER_LABELS: [&str; 4] =
    ["favorites", "bookmarks", "bookmarks bar", "bookmarks menu"];

/// Trait defining topic tree operations.
pub trait TopicManagerTrait {
    fn root(&mut self) -> Result<Topic, TopicError>;
    fn get(&self, id: &str) -> Result<Topic, TopicError>;
    fn list_children(&self, parent_id: &str) -> Result<Vec<Topic>, TopicError>;
    fn create(&mut self, name: &str, parent_id: &str) -> Result<String, TopicError>;
    fn rename(&mut self, id: &str, name: &str) -> Result<(), TopicError>;
    fn reparent(&mut self, id: &str, new_parent_id: &str) -> Result<(), TopicError>;
    /// Deletes the topic and its whole subtree, bookmarks included, in one
    /// transaction.
    fn delete(&mut self, id: &str) -> Result<(), TopicError>;
    /// All topic ids in the subtree rooted at `id`, including `id` itself,
    /// parents before children.
    fn subtree_ids(&self, id: &str) -> Result<Vec<String>, TopicError>;
    /// Resolves a folder path below the root, creating missing components.
    /// Returns the leaf topic id and how many topics were created.
    fn ensure_path(&mut self, path: &[String]) -> Result<(String, usize), TopicError>;
    /// Full tree snapshot, children and bookmarks ordered case-insensitively.
    fn tree(&self) -> Result<TopicNode, TopicError>;
}

/// Topic manager backed by a SQLite connection.
pub struct TopicManager<'a> {
    conn: &'a Connection,
}

impl<'a> TopicManager<'a> {
    /// Creates a new `TopicManager` using the provided database connection.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Returns the current UNIX timestamp in seconds.
    fn now() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64
    }

    /// Reads a single `Topic` row into a struct.
    fn row_to_topic(row: &rusqlite::Row) -> rusqlite::Result<Topic> {
        Ok(Topic {
            id: row.get(0)?,
            name: row.get(1)?,
            parent_id: row.get(2)?,
            created_at: row.get(3)?,
        })
    }

    /// Finds an existing child of `parent_id` with exactly the given name.
    fn find_child(&self, parent_id: &str, name: &str) -> Result<Option<String>, TopicError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id FROM topics WHERE parent_id = ?1 AND name = ?2 \
                 ORDER BY created_at, id LIMIT 1",
            )
            .map_err(|e| TopicError::DatabaseError(e.to_string()))?;
        let mut rows = stmt
            .query(params![parent_id, name])
            .map_err(|e| TopicError::DatabaseError(e.to_string()))?;
        match rows
            .next()
            .map_err(|e| TopicError::DatabaseError(e.to_string()))?
        {
            Some(row) => Ok(Some(
                row.get(0)
                    .map_err(|e| TopicError::DatabaseError(e.to_string()))?,
            )),
            None => Ok(None),
        }
    }

    /// Inserts a topic row and returns its id.
    fn insert(&self, name: &str, parent_id: &str) -> Result<String, TopicError> {
        let id = Uuid::new_v4().to_string();
        self.conn
            .execute(
                "INSERT INTO topics (id, name, parent_id, created_at) VALUES (?1, ?2, ?3, ?4)",
                params![id, name, parent_id, Self::now()],
            )
            .map_err(|e| TopicError::DatabaseError(e.to_string()))?;
        Ok(id)
    }

    /// Builds one node of the tree snapshot, depth-first.
    fn build_node(&self, id: &str, name: &str) -> Result<TopicNode, TopicError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, title, url FROM bookmarks WHERE topic_id = ?1 \
                 ORDER BY LOWER(title), id",
            )
            .map_err(|e| TopicError::DatabaseError(e.to_string()))?;
        let rows = stmt
            .query_map(params![id], |row| {
                Ok(NodeBookmark {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    url: row.get(2)?,
                })
            })
            .map_err(|e| TopicError::DatabaseError(e.to_string()))?;
        let mut bookmarks = Vec::new();
        for row in rows {
            bookmarks.push(row.map_err(|e| TopicError::DatabaseError(e.to_string()))?);
        }

        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, name FROM topics WHERE parent_id = ?1 ORDER BY LOWER(name), id",
            )
            .map_err(|e| TopicError::DatabaseError(e.to_string()))?;
        let rows = stmt
            .query_map(params![id], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })
            .map_err(|e| TopicError::DatabaseError(e.to_string()))?;
        let mut child_rows = Vec::new();
        for row in rows {
            child_rows.push(row.map_err(|e| TopicError::DatabaseError(e.to_string()))?);
        }

        let mut children = Vec::new();
        for (child_id, child_name) in child_rows {
            children.push(self.build_node(&child_id, &child_name)?);
        }

        Ok(TopicNode {
            id: id.to_string(),
            name: name.to_string(),
            bookmarks,
            children,
        })
    }
}

impl<'a> TopicManagerTrait for TopicManager<'a> {
    /// Returns the root topic, seeding one if the store predates the seed.
    fn root(&mut self) -> Result<Topic, TopicError> {
        let found = self
            .conn
            .query_row(
                "SELECT id, name, parent_id, created_at FROM topics \
                 WHERE parent_id IS NULL ORDER BY created_at, id LIMIT 1",
                [],
                Self::row_to_topic,
            )
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(TopicError::DatabaseError(other.to_string())),
            })?;
        if let Some(topic) = found {
            return Ok(topic);
        }

        let id = Uuid::new_v4().to_string();
        self.conn
            .execute(
                "INSERT INTO topics (id, name, parent_id, created_at) VALUES (?1, ?2, NULL, ?3)",
                params![id, ROOT_TOPIC_NAME, Self::now()],
            )
            .map_err(|e| TopicError::DatabaseError(e.to_string()))?;
        self.get(&id)
    }

    /// Fetches a topic by ID.
    fn get(&self, id: &str) -> Result<Topic, TopicError> {
        self.conn
            .query_row(
                "SELECT id, name, parent_id, created_at FROM topics WHERE id = ?1",
                params![id],
                Self::row_to_topic,
            )
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Err(TopicError::NotFound(id.to_string())),
                other => Err(TopicError::DatabaseError(other.to_string())),
            })
    }

    /// Lists the direct children of a topic, ordered case-insensitively by name.
    fn list_children(&self, parent_id: &str) -> Result<Vec<Topic>, TopicError> {
        self.get(parent_id)?;
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, name, parent_id, created_at FROM topics \
                 WHERE parent_id = ?1 ORDER BY LOWER(name), id",
            )
            .map_err(|e| TopicError::DatabaseError(e.to_string()))?;
        let rows = stmt
            .query_map(params![parent_id], Self::row_to_topic)
            .map_err(|e| TopicError::DatabaseError(e.to_string()))?;
        let mut results = Vec::new();
        for row in rows {
            results.push(row.map_err(|e| TopicError::DatabaseError(e.to_string()))?);
        }
        Ok(results)
    }

    /// Creates a new topic under the given parent. Returns the generated ID.
    fn create(&mut self, name: &str, parent_id: &str) -> Result<String, TopicError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TopicError::EmptyName);
        }
        self.get(parent_id)?;
        self.insert(name, parent_id)
    }

    /// Renames a topic. Allowed on the root.
    fn rename(&mut self, id: &str, name: &str) -> Result<(), TopicError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TopicError::EmptyName);
        }
        let affected = self
            .conn
            .execute(
                "UPDATE topics SET name = ?1 WHERE id = ?2",
                params![name, id],
            )
            .map_err(|e| TopicError::DatabaseError(e.to_string()))?;
        if affected == 0 {
            return Err(TopicError::NotFound(id.to_string()));
        }
        Ok(())
    }

    /// Moves a topic under a new parent.
    ///
    /// Rejects the root and any target inside the moved topic's own subtree.
    fn reparent(&mut self, id: &str, new_parent_id: &str) -> Result<(), TopicError> {
        let topic = self.get(id)?;
        if topic.parent_id.is_none() {
            return Err(TopicError::RootProtected);
        }
        self.get(new_parent_id)?;

        let subtree = self.subtree_ids(id)?;
        if subtree.iter().any(|sid| sid == new_parent_id) {
            return Err(TopicError::CycleDetected(id.to_string()));
        }

        self.conn
            .execute(
                "UPDATE topics SET parent_id = ?1 WHERE id = ?2",
                params![new_parent_id, id],
            )
            .map_err(|e| TopicError::DatabaseError(e.to_string()))?;
        Ok(())
    }

    fn delete(&mut self, id: &str) -> Result<(), TopicError> {
        let topic = self.get(id)?;
        if topic.parent_id.is_none() {
            return Err(TopicError::RootProtected);
        }

        let subtree = self.subtree_ids(id)?;
        let tx = self
            .conn
            .unchecked_transaction()
            .map_err(|e| TopicError::DatabaseError(e.to_string()))?;
        // Children before parents, so foreign keys stay satisfied row by row
        for topic_id in subtree.iter().rev() {
            tx.execute(
                "DELETE FROM bookmarks WHERE topic_id = ?1",
                params![topic_id],
            )
            .map_err(|e| TopicError::DatabaseError(e.to_string()))?;
            tx.execute("DELETE FROM topics WHERE id = ?1", params![topic_id])
                .map_err(|e| TopicError::DatabaseError(e.to_string()))?;
        }
        tx.commit()
            .map_err(|e| TopicError::DatabaseError(e.to_string()))
    }

    fn subtree_ids(&self, id: &str) -> Result<Vec<String>, TopicError> {
        self.get(id)?;
        let mut ids = vec![id.to_string()];
        let mut cursor = 0;
        while cursor < ids.len() {
            let parent = ids[cursor].clone();
            let mut stmt = self
                .conn
                .prepare("SELECT id FROM topics WHERE parent_id = ?1 ORDER BY created_at, id")
                .map_err(|e| TopicError::DatabaseError(e.to_string()))?;
            let rows = stmt
                .query_map(params![parent], |row| row.get::<_, String>(0))
                .map_err(|e| TopicError::DatabaseError(e.to_string()))?;
            for row in rows {
                ids.push(row.map_err(|e| TopicError::DatabaseError(e.to_string()))?);
            }
            cursor += 1;
        }
        Ok(ids)
    }

    fn ensure_path(&mut self, path: &[String]) -> Result<(String, usize), TopicError> {
        let root = self.root()?;

        let mut components: Vec<&str> =
            path.iter().map(|c| c.trim()).filter(|c| !c.is_empty()).collect();
        while let Some(first) = components.first() {
            if ROOT_CONTAINER_LABELS.contains(&first.to_lowercase().as_str()) {
                components.remove(0);
            } else {
                break;
            }
        }

        let mut current = root.id;
        let mut created = 0;
        for component in components {
            match self.find_child(&current, component)? {
                Some(existing) => current = existing,
                None => {
                    current = self.insert(component, &current)?;
                    created += 1;
                }
            }
        }
        Ok((current, created))
    }

    fn tree(&self) -> Result<TopicNode, TopicError> {
        let root = self
            .conn
            .query_row(
                "SELECT id, name FROM topics WHERE parent_id IS NULL \
                 ORDER BY created_at, id LIMIT 1",
                [],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
            )
            .map_err(|e| TopicError::DatabaseError(e.to_string()))?;
        self.build_node(&root.0, &root.1)
    }
}
