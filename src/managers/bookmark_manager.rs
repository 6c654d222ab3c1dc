//! Bookmark Manager for bookmarkd.
//!
//! Implements `BookmarkManagerTrait`: CRUD, move, bulk, search, and
//! duplicate-review operations for bookmarks, backed by SQLite via
//! `rusqlite`. Subtree scoping reuses the topic manager's traversal.

use rusqlite::{params, Connection, ToSql};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

use crate::managers::topic_manager::{TopicManager, TopicManagerTrait};
use crate::types::bookmark::{Bookmark, DuplicateGroup};
use crate::types::errors::{BookmarkError, TopicError};

/// Trait defining bookmark management operations.
pub trait BookmarkManagerTrait {
    /// Adds a bookmark. An empty title falls back to the url. Returns the
    /// generated bookmark ID.
    fn add(&mut self, title: &str, url: &str, topic_id: &str) -> Result<String, BookmarkError>;
    fn get(&self, id: &str) -> Result<Bookmark, BookmarkError>;
    fn update(
        &mut self,
        id: &str,
        title: Option<&str>,
        url: Option<&str>,
        notes: Option<&str>,
    ) -> Result<(), BookmarkError>;
    fn delete(&mut self, id: &str) -> Result<(), BookmarkError>;
    fn move_to(&mut self, id: &str, topic_id: &str) -> Result<(), BookmarkError>;
    /// All-or-nothing: any unknown id aborts the whole batch.
    fn bulk_delete(&mut self, ids: &[String]) -> Result<(), BookmarkError>;
    /// All-or-nothing: any unknown id aborts the whole batch.
    fn bulk_move(&mut self, ids: &[String], topic_id: &str) -> Result<(), BookmarkError>;
    fn list(&self, topic_id: &str, include_subtree: bool) -> Result<Vec<Bookmark>, BookmarkError>;
    fn search(
        &self,
        query: &str,
        scope_topic_id: Option<&str>,
        include_subtree: bool,
        domain: Option<&str>,
    ) -> Result<Vec<Bookmark>, BookmarkError>;
    /// Duplicate probe used by the importer.
    fn exists_in_topic(&self, topic_id: &str, url: &str) -> Result<bool, BookmarkError>;
    /// URLs stored more than once, with their bookmarks.
    fn duplicates(&self) -> Result<Vec<DuplicateGroup>, BookmarkError>;
}

/// Bookmark manager backed by a SQLite connection.
pub struct BookmarkManager<'a> {
    conn: &'a Connection,
}

impl<'a> BookmarkManager<'a> {
    /// Creates a new `BookmarkManager` using the provided database connection.
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

    /// Checks whether a topic with the given ID exists.
    fn topic_exists(&self, topic_id: &str) -> Result<bool, BookmarkError> {
        let count: i64 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM topics WHERE id = ?1",
                params![topic_id],
                |row| row.get(0),
            )
            .map_err(|e| BookmarkError::DatabaseError(e.to_string()))?;
        Ok(count > 0)
    }

    /// Topic ids to scope a listing to: the topic alone, or its subtree.
    fn scope_ids(&self, topic_id: &str, include_subtree: bool) -> Result<Vec<String>, BookmarkError> {
        if !include_subtree {
            if !self.topic_exists(topic_id)? {
                return Err(BookmarkError::TopicNotFound(topic_id.to_string()));
            }
            return Ok(vec![topic_id.to_string()]);
        }
        TopicManager::new(self.conn)
            .subtree_ids(topic_id)
            .map_err(|e| match e {
                TopicError::NotFound(id) => BookmarkError::TopicNotFound(id),
                other => BookmarkError::DatabaseError(other.to_string()),
            })
    }

    /// Reads a single `Bookmark` row into a struct.
    fn row_to_bookmark(row: &rusqlite::Row) -> rusqlite::Result<Bookmark> {
        Ok(Bookmark {
            id: row.get(0)?,
            title: row.get(1)?,
            url: row.get(2)?,
            notes: row.get(3)?,
            topic_id: row.get(4)?,
            created_at: row.get(5)?,
        })
    }

    /// Runs a SELECT returning bookmark rows and collects them.
    fn collect_bookmarks(
        &self,
        sql: &str,
        args: &[&dyn ToSql],
    ) -> Result<Vec<Bookmark>, BookmarkError> {
        let mut stmt = self
            .conn
            .prepare(sql)
            .map_err(|e| BookmarkError::DatabaseError(e.to_string()))?;
        let rows = stmt
            .query_map(args, Self::row_to_bookmark)
            .map_err(|e| BookmarkError::DatabaseError(e.to_string()))?;
        let mut results = Vec::new();
        for row in rows {
            results.push(row.map_err(|e| BookmarkError::DatabaseError(e.to_string()))?);
        }
        Ok(results)
    }

    /// Extracts the host portion of a URL, lowercased. Empty if the URL has
    /// no scheme-delimited authority.
    fn host_of(url: &str) -> String {
        let rest = match url.find("://") {
            Some(idx) => &url[idx + 3..],
            None => return String::new(),
        };
        let end = rest
            .find(|c| c == '/' || c == '?' || c == '#')
            .unwrap_or(rest.len());
        let authority = &rest[..end];
        let host = match authority.rfind('@') {
            Some(idx) => &authority[idx + 1..],
            None => authority,
        };
        let host = match host.find(':') {
            Some(idx) => &host[..idx],
            None => host,
        };
        host.to_lowercase()
    }
}

impl<'a> BookmarkManagerTrait for BookmarkManager<'a> {
    fn add(&mut self, title: &str, url: &str, topic_id: &str) -> Result<String, BookmarkError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(BookmarkError::EmptyUrl);
        }
        if !self.topic_exists(topic_id)? {
            return Err(BookmarkError::TopicNotFound(topic_id.to_string()));
        }

        let title = title.trim();
        let title = if title.is_empty() { url } else { title };
        let id = Uuid::new_v4().to_string();

        self.conn
            .execute(
                "INSERT INTO bookmarks (id, title, url, notes, topic_id, created_at) \
                 VALUES (?1, ?2, ?3, NULL, ?4, ?5)",
                params![id, title, url, topic_id, Self::now()],
            )
            .map_err(|e| BookmarkError::DatabaseError(e.to_string()))?;

        Ok(id)
    }

    /// Fetches a bookmark by ID.
    fn get(&self, id: &str) -> Result<Bookmark, BookmarkError> {
        self.conn
            .query_row(
                "SELECT id, title, url, notes, topic_id, created_at FROM bookmarks WHERE id = ?1",
                params![id],
                Self::row_to_bookmark,
            )
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => {
                    Err(BookmarkError::NotFound(id.to_string()))
                }
                other => Err(BookmarkError::DatabaseError(other.to_string())),
            })
    }

    /// Updates the title, url and/or notes of an existing bookmark.
    ///
    /// An updated empty title falls back to the (possibly updated) url; an
    /// empty notes value clears the notes.
    fn update(
        &mut self,
        id: &str,
        title: Option<&str>,
        url: Option<&str>,
        notes: Option<&str>,
    ) -> Result<(), BookmarkError> {
        let current = self.get(id)?;

        let new_url = match url {
            Some(u) => {
                let u = u.trim();
                if u.is_empty() {
                    return Err(BookmarkError::EmptyUrl);
                }
                u.to_string()
            }
            None => current.url,
        };
        let new_title = match title {
            Some(t) => {
                let t = t.trim();
                if t.is_empty() {
                    new_url.clone()
                } else {
                    t.to_string()
                }
            }
            None => current.title,
        };
        let new_notes = match notes {
            Some(n) => {
                let n = n.trim();
                if n.is_empty() {
                    None
                } else {
                    Some(n.to_string())
                }
            }
            None => current.notes,
        };

        self.conn
            .execute(
                "UPDATE bookmarks SET title = ?1, url = ?2, notes = ?3 WHERE id = ?4",
                params![new_title, new_url, new_notes, id],
            )
            .map_err(|e| BookmarkError::DatabaseError(e.to_string()))?;
        Ok(())
    }

    /// Deletes a bookmark by ID.
    fn delete(&mut self, id: &str) -> Result<(), BookmarkError> {
        let affected = self
            .conn
            .execute("DELETE FROM bookmarks WHERE id = ?1", params![id])
            .map_err(|e| BookmarkError::DatabaseError(e.to_string()))?;
        if affected == 0 {
            return Err(BookmarkError::NotFound(id.to_string()));
        }
        Ok(())
    }

    /// Moves a bookmark to a different topic.
    fn move_to(&mut self, id: &str, topic_id: &str) -> Result<(), BookmarkError> {
        if !self.topic_exists(topic_id)? {
            return Err(BookmarkError::TopicNotFound(topic_id.to_string()));
        }
        let affected = self
            .conn
            .execute(
                "UPDATE bookmarks SET topic_id = ?1 WHERE id = ?2",
                params![topic_id, id],
            )
            .map_err(|e| BookmarkError::DatabaseError(e.to_string()))?;
        if affected == 0 {
            return Err(BookmarkError::NotFound(id.to_string()));
        }
        Ok(())
    }

    fn bulk_delete(&mut self, ids: &[String]) -> Result<(), BookmarkError> {
        let tx = self
            .conn
            .unchecked_transaction()
            .map_err(|e| BookmarkError::DatabaseError(e.to_string()))?;
        for id in ids {
            let affected = tx
                .execute("DELETE FROM bookmarks WHERE id = ?1", params![id])
                .map_err(|e| BookmarkError::DatabaseError(e.to_string()))?;
            if affected == 0 {
                // Dropping the transaction rolls everything back
                return Err(BookmarkError::NotFound(id.to_string()));
            }
        }
        tx.commit()
            .map_err(|e| BookmarkError::DatabaseError(e.to_string()))
    }

    fn bulk_move(&mut self, ids: &[String], topic_id: &str) -> Result<(), BookmarkError> {
        if !self.topic_exists(topic_id)? {
            return Err(BookmarkError::TopicNotFound(topic_id.to_string()));
        }
        let tx = self
            .conn
            .unchecked_transaction()
            .map_err(|e| BookmarkError::DatabaseError(e.to_string()))?;
        for id in ids {
            let affected = tx
                .execute(
                    "UPDATE bookmarks SET topic_id = ?1 WHERE id = ?2",
                    params![topic_id, id],
                )
                .map_err(|e| BookmarkError::DatabaseError(e.to_string()))?;
            if affected == 0 {
                return Err(BookmarkError::NotFound(id.to_string()));
            }
        }
        tx.commit()
            .map_err(|e| BookmarkError::DatabaseError(e.to_string()))
    }

    /// Lists the bookmarks of a topic, optionally including its subtree,
    /// ordered case-insensitively by title then id.
    fn list(&self, topic_id: &str, include_subtree: bool) -> Result<Vec<Bookmark>, BookmarkError> {
        let scope = self.scope_ids(topic_id, include_subtree)?;
        let placeholders = vec!["?"; scope.len()].join(", ");
        let sql = format!(
            "SELECT id, title, url, notes, topic_id, created_at FROM bookmarks \
             WHERE topic_id IN ({}) ORDER BY LOWER(title), id",
            placeholders
        );
        let args: Vec<&dyn ToSql> = scope.iter().map(|id| id as &dyn ToSql).collect();
        self.collect_bookmarks(&sql, &args)
    }

    /// Case-insensitive substring search over title and url.
    fn search(
        &self,
        query: &str,
        scope_topic_id: Option<&str>,
        include_subtree: bool,
        domain: Option<&str>,
    ) -> Result<Vec<Bookmark>, BookmarkError> {
        let pattern = format!("%{}%", query.to_lowercase());
        let mut args: Vec<&dyn ToSql> = vec![&pattern];

        let scope = match scope_topic_id {
            Some(topic_id) => Some(self.scope_ids(topic_id, include_subtree)?),
            None => None,
        };
        let sql = match &scope {
            Some(ids) => {
                let placeholders = vec!["?"; ids.len()].join(", ");
                for id in ids {
                    args.push(id as &dyn ToSql);
                }
                format!(
                    "SELECT id, title, url, notes, topic_id, created_at FROM bookmarks \
                     WHERE (LOWER(title) LIKE ?1 OR LOWER(url) LIKE ?1) \
                     AND topic_id IN ({}) ORDER BY LOWER(title), id",
                    placeholders
                )
            }
            None => String::from(
                "SELECT id, title, url, notes, topic_id, created_at FROM bookmarks \
                 WHERE LOWER(title) LIKE ?1 OR LOWER(url) LIKE ?1 \
                 ORDER BY LOWER(title), id",
            ),
        };

        let mut results = self.collect_bookmarks(&sql, &args)?;
        if let Some(domain) = domain {
            let needle = domain.to_lowercase();
            results.retain(|b| Self::host_of(&b.url).contains(&needle));
        }
        Ok(results)
    }

    fn exists_in_topic(&self, topic_id: &str, url: &str) -> Result<bool, BookmarkError> {
        let count: i64 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM bookmarks WHERE topic_id = ?1 AND url = ?2",
                params![topic_id, url],
                |row| row.get(0),
            )
            .map_err(|e| BookmarkError::DatabaseError(e.to_string()))?;
        Ok(count > 0)
    }

    fn duplicates(&self) -> Result<Vec<DuplicateGroup>, BookmarkError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT url FROM bookmarks GROUP BY url HAVING COUNT(*) > 1 ORDER BY url",
            )
            .map_err(|e| BookmarkError::DatabaseError(e.to_string()))?;
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| BookmarkError::DatabaseError(e.to_string()))?;
        let mut urls = Vec::new();
        for row in rows {
            urls.push(row.map_err(|e| BookmarkError::DatabaseError(e.to_string()))?);
        }

        let mut groups = Vec::new();
        for url in urls {
            let bookmarks = self.collect_bookmarks(
                "SELECT id, title, url, notes, topic_id, created_at FROM bookmarks \
                 WHERE url = ?1 ORDER BY created_at, id",
                &[&url as &dyn ToSql],
            )?;
            groups.push(DuplicateGroup { url, bookmarks });
        }
        Ok(groups)
    }
}
