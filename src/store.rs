use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;
use std::fmt;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Well-known collection names used across the catalog.
pub mod collections {
    pub const LANGUAGES: &str = "languages";
    pub const WIDGETS: &str = "widgets";
    pub const TRADEMARKS: &str = "trademarks";
    pub const COLORS: &str = "colors";
    pub const HOUSES: &str = "houses";
    pub const IMAGES: &str = "images";
}

/// Address of a document collection.
///
/// Two shapes exist in the catalog: root collections (`languages`, `widgets`)
/// and sub-collections scoped under one language document
/// (`languages/{id}/trademarks` etc.). Deleting a language does NOT touch its
/// sub-collections; orphaned sub-collection documents are an accepted
/// inconsistency of the product.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CollectionPath {
    Root(String),
    LanguageSub { language_id: String, name: String },
}

impl CollectionPath {
    pub fn root(name: &str) -> Self {
        Self::Root(name.to_string())
    }

    pub fn language_sub(language_id: &str, name: &str) -> Self {
        Self::LanguageSub {
            language_id: language_id.to_string(),
            name: name.to_string(),
        }
    }

    /// Storage key for this collection, e.g. `languages` or
    /// `languages/abc123/colors`.
    pub fn key(&self) -> String {
        match self {
            Self::Root(name) => name.clone(),
            Self::LanguageSub { language_id, name } => {
                format!("{}/{}/{}", collections::LANGUAGES, language_id, name)
            }
        }
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// A raw document as stored: its id plus the undecoded JSON body.
#[derive(Debug, Clone)]
pub struct Document {
    pub id: String,
    pub body: Value,
}

#[derive(Clone)]
pub struct DocStore {
    conn: Arc<Mutex<Connection>>,
}

impl DocStore {
    /// Open the store and create the documents table if needed.
    pub fn open(database_path: &str) -> Result<Self> {
        let conn = Connection::open(database_path)
            .context(format!("Failed to open store at {}", database_path))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS documents (
                collection TEXT NOT NULL,
                id TEXT NOT NULL,
                body TEXT NOT NULL,
                created_at TEXT NOT NULL,
                PRIMARY KEY (collection, id)
            )",
            [],
        )
        .context("Failed to create documents table")?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Add a document with a generated id. Returns the new id.
    pub fn add(&self, path: &CollectionPath, body: &Value) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        self.set(path, &id, body)?;
        Ok(id)
    }

    /// Write a document at a known id, overwriting any previous body.
    ///
    /// There is no version token: concurrent writers race and the last write
    /// wins at the document level.
    pub fn set(&self, path: &CollectionPath, id: &str, body: &Value) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let encoded = serde_json::to_string(body).context("Failed to encode document body")?;
        let now = Utc::now().to_rfc3339();

        conn.execute(
            "INSERT INTO documents (collection, id, body, created_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT (collection, id) DO UPDATE SET body = excluded.body",
            params![path.key(), id, encoded, now],
        )
        .context(format!("Failed to write document {}/{}", path, id))?;

        Ok(())
    }

    /// Fetch a single document by id, `None` when absent.
    pub fn get(&self, path: &CollectionPath, id: &str) -> Result<Option<Document>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt =
            conn.prepare("SELECT body FROM documents WHERE collection = ?1 AND id = ?2")?;

        let encoded: Option<String> = stmt
            .query_row(params![path.key(), id], |row| row.get(0))
            .optional()?;

        match encoded {
            Some(encoded) => {
                let body = serde_json::from_str(&encoded)
                    .context(format!("Malformed document body at {}/{}", path, id))?;
                Ok(Some(Document {
                    id: id.to_string(),
                    body,
                }))
            }
            None => Ok(None),
        }
    }

    /// List every document in a collection, oldest first.
    ///
    /// A row whose body is not valid JSON is skipped with a warning rather
    /// than poisoning the whole listing.
    pub fn list(&self, path: &CollectionPath) -> Result<Vec<Document>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, body FROM documents WHERE collection = ?1 ORDER BY created_at, id",
        )?;

        let rows = stmt
            .query_map(params![path.key()], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut documents = Vec::with_capacity(rows.len());
        for (id, encoded) in rows {
            match serde_json::from_str(&encoded) {
                Ok(body) => documents.push(Document { id, body }),
                Err(e) => {
                    tracing::warn!("Skipping malformed document {}/{}: {}", path, id, e);
                }
            }
        }

        Ok(documents)
    }

    /// Delete exactly one document by its full path. Returns whether a
    /// document was removed. Never cascades.
    pub fn delete(&self, path: &CollectionPath, id: &str) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let rows_affected = conn
            .execute(
                "DELETE FROM documents WHERE collection = ?1 AND id = ?2",
                params![path.key(), id],
            )
            .context(format!("Failed to delete document {}/{}", path, id))?;

        Ok(rows_affected > 0)
    }
}
