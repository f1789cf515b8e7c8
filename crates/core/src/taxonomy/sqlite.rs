//! SQLite-backed taxonomy store.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection, OptionalExtension, ToSql};
use tracing::{debug, info};

use super::{Category, PurgeStats, TaxonomyError, TaxonomyStore, Taxonomy, Term, TermType};

/// Current version of the taxonomy tables.
pub const TAXONOMY_SCHEMA_VERSION: u32 = 0;

/// Key of the taxonomy tables in `schema_versions`.
const SCHEMA_NAME: &str = "api_t411";

const CREATE_TABLES: &str = r#"
    CREATE TABLE IF NOT EXISTS categories (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL,
        parent_id INTEGER REFERENCES categories(id) ON DELETE CASCADE
    );

    CREATE INDEX IF NOT EXISTS idx_categories_name ON categories(name);
    CREATE INDEX IF NOT EXISTS idx_categories_parent ON categories(parent_id);

    CREATE TABLE IF NOT EXISTS term_types (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL,
        mode TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS terms (
        id INTEGER NOT NULL,
        name TEXT NOT NULL,
        type_id INTEGER NOT NULL REFERENCES term_types(id) ON DELETE CASCADE,
        PRIMARY KEY (type_id, id)
    );

    CREATE INDEX IF NOT EXISTS idx_terms_name ON terms(name);

    -- Many-to-many link between categories and term types
    CREATE TABLE IF NOT EXISTS category_term_types (
        category_id INTEGER NOT NULL REFERENCES categories(id) ON DELETE CASCADE,
        term_type_id INTEGER NOT NULL REFERENCES term_types(id) ON DELETE CASCADE,
        PRIMARY KEY (category_id, term_type_id)
    );

    CREATE INDEX IF NOT EXISTS idx_category_term_types_type ON category_term_types(term_type_id);
"#;

const DROP_TABLES: &str = r#"
    DROP TABLE IF EXISTS category_term_types;
    DROP TABLE IF EXISTS terms;
    DROP TABLE IF EXISTS term_types;
    DROP TABLE IF EXISTS categories;
"#;

/// SQLite-backed taxonomy store.
pub struct SqliteTaxonomyStore {
    conn: Mutex<Connection>,
}

impl SqliteTaxonomyStore {
    /// Open (or create) the store at `path`, migrating its tables to
    /// `schema_version`.
    pub fn new(path: &Path, schema_version: u32) -> Result<Self, TaxonomyError> {
        let conn = Connection::open(path)?;
        Self::initialize_schema(&conn, schema_version)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory(schema_version: u32) -> Result<Self, TaxonomyError> {
        let conn = Connection::open_in_memory()?;
        Self::initialize_schema(&conn, schema_version)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection, schema_version: u32) -> Result<(), TaxonomyError> {
        conn.execute_batch(
            "PRAGMA foreign_keys = ON;
             CREATE TABLE IF NOT EXISTS schema_versions (
                 name TEXT PRIMARY KEY,
                 version INTEGER NOT NULL
             );",
        )?;

        let stored: Option<u32> = conn
            .query_row(
                "SELECT version FROM schema_versions WHERE name = ?",
                params![SCHEMA_NAME],
                |row| row.get(0),
            )
            .optional()?;

        match stored {
            None => debug!("Creating T411 taxonomy tables"),
            Some(version) if version == schema_version => {}
            Some(version) => {
                // Cache tables only: rebuilt empty, next sync refills them.
                info!(
                    from = version,
                    to = schema_version,
                    "T411 taxonomy schema changed, resetting cache"
                );
                conn.execute_batch(DROP_TABLES)?;
            }
        }

        conn.execute_batch(CREATE_TABLES)?;
        conn.execute(
            "INSERT INTO schema_versions (name, version) VALUES (?, ?)
             ON CONFLICT(name) DO UPDATE SET version = excluded.version",
            params![SCHEMA_NAME, schema_version],
        )?;

        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, TaxonomyError> {
        self.conn
            .lock()
            .map_err(|_| TaxonomyError::Internal("taxonomy store lock poisoned".to_string()))
    }

    fn row_to_category(row: &rusqlite::Row) -> rusqlite::Result<Category> {
        Ok(Category {
            id: row.get(0)?,
            name: row.get(1)?,
            parent_id: row.get(2)?,
        })
    }

    fn query_categories(
        conn: &Connection,
        sql: &str,
        params: &[&dyn ToSql],
    ) -> Result<Vec<Category>, TaxonomyError> {
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(params, Self::row_to_category)?;

        let mut categories = Vec::new();
        for row in rows {
            categories.push(row?);
        }
        Ok(categories)
    }

    fn query_names(conn: &Connection, sql: &str) -> Result<Vec<String>, TaxonomyError> {
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map([], |row| row.get(0))?;

        let mut names = Vec::new();
        for row in rows {
            names.push(row?);
        }
        Ok(names)
    }

    /// Load the terms of a term type.
    fn load_terms(conn: &Connection, type_id: i64) -> Result<Vec<Term>, TaxonomyError> {
        let mut stmt =
            conn.prepare("SELECT id, name, type_id FROM terms WHERE type_id = ? ORDER BY id")?;

        let rows = stmt.query_map(params![type_id], |row| {
            Ok(Term {
                id: row.get(0)?,
                name: row.get(1)?,
                type_id: row.get(2)?,
            })
        })?;

        let mut terms = Vec::new();
        for row in rows {
            terms.push(row?);
        }
        Ok(terms)
    }
}

impl TaxonomyStore for SqliteTaxonomyStore {
    fn category_count(&self) -> Result<u64, TaxonomyError> {
        let conn = self.lock()?;
        let count: u64 = conn.query_row("SELECT COUNT(*) FROM categories", [], |row| row.get(0))?;
        Ok(count)
    }

    fn save_taxonomy(&self, taxonomy: &Taxonomy) -> Result<(), TaxonomyError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        tx.execute_batch(
            "DELETE FROM category_term_types;
             DELETE FROM terms;
             DELETE FROM term_types;
             DELETE FROM categories;",
        )?;

        // Parents are inserted before their children to satisfy parent_id.
        for category in taxonomy.forest().depth_first() {
            tx.execute(
                "INSERT INTO categories (id, name, parent_id) VALUES (?, ?, ?)",
                params![category.id, &category.name, category.parent_id],
            )?;
        }

        for term_type in taxonomy.term_types() {
            tx.execute(
                "INSERT INTO term_types (id, name, mode) VALUES (?, ?, ?)",
                params![term_type.id, &term_type.name, &term_type.mode],
            )?;

            for term in &term_type.terms {
                tx.execute(
                    "INSERT OR REPLACE INTO terms (id, name, type_id) VALUES (?, ?, ?)",
                    params![term.id, &term.name, term.type_id],
                )?;
            }
        }

        for association in taxonomy.associations() {
            tx.execute(
                "INSERT OR IGNORE INTO category_term_types (category_id, term_type_id)
                 VALUES (?, ?)",
                params![association.category_id, association.term_type_id],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    fn get_category(&self, id: i64) -> Result<Category, TaxonomyError> {
        let conn = self.lock()?;
        conn.query_row(
            "SELECT id, name, parent_id FROM categories WHERE id = ?",
            params![id],
            Self::row_to_category,
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => {
                TaxonomyError::NotFound(format!("category {}", id))
            }
            _ => TaxonomyError::Database(e.to_string()),
        })
    }

    fn categories_named(&self, name: &str) -> Result<Vec<Category>, TaxonomyError> {
        let conn = self.lock()?;
        Self::query_categories(
            &conn,
            "SELECT id, name, parent_id FROM categories WHERE name = ? ORDER BY id",
            &[&name as &dyn ToSql],
        )
    }

    fn category_id_by_name(&self, name: &str) -> Result<i64, TaxonomyError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT id FROM categories WHERE name = ? ORDER BY id")?;
        let rows = stmt.query_map(params![name], |row| row.get::<_, i64>(0))?;

        let mut ids = Vec::new();
        for row in rows {
            ids.push(row?);
        }

        match ids.as_slice() {
            [id] => Ok(*id),
            [] => Err(TaxonomyError::NotFound(format!("category named \"{}\"", name))),
            _ => Err(TaxonomyError::Ambiguous(format!(
                "{} categories named \"{}\"",
                ids.len(),
                name
            ))),
        }
    }

    fn all_categories(&self) -> Result<Vec<Category>, TaxonomyError> {
        let conn = self.lock()?;
        Self::query_categories(
            &conn,
            "SELECT id, name, parent_id FROM categories ORDER BY id",
            &[],
        )
    }

    fn root_categories(&self) -> Result<Vec<Category>, TaxonomyError> {
        let conn = self.lock()?;
        Self::query_categories(
            &conn,
            "SELECT id, name, parent_id FROM categories WHERE parent_id IS NULL ORDER BY id",
            &[],
        )
    }

    fn sub_categories(&self, parent_id: i64) -> Result<Vec<Category>, TaxonomyError> {
        let conn = self.lock()?;
        Self::query_categories(
            &conn,
            "SELECT id, name, parent_id FROM categories WHERE parent_id = ? ORDER BY id",
            &[&parent_id as &dyn ToSql],
        )
    }

    fn all_category_names(&self) -> Result<Vec<String>, TaxonomyError> {
        let conn = self.lock()?;
        Self::query_names(&conn, "SELECT name FROM categories ORDER BY id")
    }

    fn all_term_names(&self) -> Result<Vec<String>, TaxonomyError> {
        let conn = self.lock()?;
        Self::query_names(&conn, "SELECT name FROM terms ORDER BY type_id, id")
    }

    fn term_types_for_category(&self, category_id: i64) -> Result<Vec<TermType>, TaxonomyError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT tt.id, tt.name, tt.mode
             FROM term_types tt
             JOIN category_term_types ctt ON ctt.term_type_id = tt.id
             WHERE ctt.category_id = ?
             ORDER BY tt.id",
        )?;

        let rows = stmt.query_map(params![category_id], |row| {
            Ok(TermType {
                id: row.get(0)?,
                name: row.get(1)?,
                mode: row.get(2)?,
                terms: Vec::new(), // Loaded below
            })
        })?;

        let mut term_types = Vec::new();
        for row in rows {
            let mut term_type = row?;
            term_type.terms = Self::load_terms(&conn, term_type.id)?;
            term_types.push(term_type);
        }
        Ok(term_types)
    }

    fn find_terms(
        &self,
        category_id: i64,
        term_names: &[String],
    ) -> Result<Vec<Term>, TaxonomyError> {
        if term_names.is_empty() {
            return Ok(Vec::new());
        }

        let conn = self.lock()?;
        let placeholders = vec!["?"; term_names.len()].join(", ");
        let sql = format!(
            "SELECT t.id, t.name, t.type_id
             FROM terms t
             JOIN category_term_types ctt ON ctt.term_type_id = t.type_id
             WHERE ctt.category_id = ? AND t.name IN ({})
             ORDER BY t.type_id, t.id",
            placeholders
        );

        let mut values: Vec<&dyn ToSql> = Vec::with_capacity(term_names.len() + 1);
        values.push(&category_id);
        for name in term_names {
            values.push(name);
        }

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(values.as_slice(), |row| {
            Ok(Term {
                id: row.get(0)?,
                name: row.get(1)?,
                type_id: row.get(2)?,
            })
        })?;

        let mut terms = Vec::new();
        for row in rows {
            terms.push(row?);
        }
        Ok(terms)
    }

    fn purge(&self) -> Result<PurgeStats, TaxonomyError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        // Counted up front: cascaded child rows are not reported by DELETE.
        let categories: u64 = tx.query_row("SELECT COUNT(*) FROM categories", [], |row| row.get(0))?;
        let term_types: u64 = tx.query_row("SELECT COUNT(*) FROM term_types", [], |row| row.get(0))?;

        tx.execute_batch(
            "DELETE FROM categories;
             DELETE FROM term_types;",
        )?;
        tx.commit()?;

        Ok(PurgeStats {
            categories,
            term_types,
        })
    }
}
