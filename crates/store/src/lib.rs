#![deny(missing_docs)]
//! # courseflow-store
//!
//! libSQL-backed storage for course content. Owns the courses/lessons
//! catalog and the three authored-content tables, and drives the
//! compile-on-save pipeline from `courseflow-core`.
//!
//! Uses the `libsql` crate (C `SQLite` fork) — embedded local databases
//! with a stable async API.

pub mod error;
pub mod kind;
pub mod locator;
mod migrations;
pub mod service;

use libsql::Builder;

pub use error::StoreError;
pub use kind::ContentKind;
pub use locator::ContentUnit;
pub use service::{ContentService, EditableContent, Role};

/// Central database handle for course content.
///
/// Wraps a libSQL database and a single connection. The connection is
/// created once at open time so in-memory databases keep their state, and
/// is cheap to clone for concurrent use.
pub struct CourseDb {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: libsql::Connection,
}

impl CourseDb {
    /// Open a local database at the given path (`":memory:"` for tests).
    ///
    /// Runs migrations automatically on first open.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the database cannot be opened or migrations
    /// fail.
    pub async fn open_local(path: &str) -> Result<Self, StoreError> {
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;

        // Foreign keys are per-connection in SQLite.
        conn.execute("PRAGMA foreign_keys = ON", ())
            .await
            .map_err(|e| StoreError::Migration(format!("PRAGMA foreign_keys: {e}")))?;

        let course_db = Self { db, conn };
        course_db.run_migrations().await?;
        Ok(course_db)
    }

    /// Access the underlying libSQL connection for direct queries.
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }

    /// Generate a prefixed ID via libSQL. Returns e.g. `"lsc-a3f8b2c1"`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the query fails or returns no rows.
    pub async fn generate_id(&self, prefix: &str) -> Result<String, StoreError> {
        let mut rows = self
            .conn
            .query(
                &format!("SELECT '{prefix}-' || lower(hex(randomblob(4)))"),
                (),
            )
            .await?;
        let row = rows
            .next()
            .await?
            .ok_or_else(|| StoreError::Integrity("id generation returned no row".into()))?;
        Ok(row.get::<String>(0)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    async fn test_db() -> CourseDb {
        CourseDb::open_local(":memory:").await.unwrap()
    }

    #[tokio::test]
    async fn open_local_creates_schema() {
        let db = test_db().await;

        let tables = [
            "courses",
            "lessons",
            "lesson_content",
            "lesson_transcript",
            "course_details",
        ];
        for table in &tables {
            let mut rows = db
                .conn()
                .query(
                    "SELECT name FROM sqlite_master WHERE type='table' AND name=?1",
                    [*table],
                )
                .await
                .unwrap();
            let row = rows.next().await.unwrap();
            assert!(row.is_some(), "table '{table}' should exist");
        }
    }

    #[tokio::test]
    async fn idempotent_migrations() {
        let db = test_db().await;
        db.run_migrations().await.unwrap();
    }

    #[tokio::test]
    async fn generate_id_correct_format() {
        let db = test_db().await;
        let id = db.generate_id("lsc").await.unwrap();
        assert!(id.starts_with("lsc-"), "ID should start with 'lsc-': {id}");
        assert_eq!(
            id.len(),
            12,
            "ID should be 12 chars (3 prefix + 1 dash + 8 hex): {id}"
        );
        assert!(id[4..].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[tokio::test]
    async fn generate_id_uniqueness() {
        let db = test_db().await;
        let mut ids = HashSet::new();
        for _ in 0..100 {
            let id = db.generate_id("tst").await.unwrap();
            assert!(ids.insert(id.clone()), "Duplicate ID generated: {id}");
        }
    }

    #[tokio::test]
    async fn cascade_deletes_lesson_content() {
        let db = test_db().await;
        db.conn()
            .execute("INSERT INTO courses (id, title) VALUES ('crs-1', 'Rust 101')", ())
            .await
            .unwrap();
        db.conn()
            .execute(
                "INSERT INTO lessons (id, course_id, title) VALUES ('lsn-1', 'crs-1', 'Intro')",
                (),
            )
            .await
            .unwrap();
        db.conn()
            .execute(
                "INSERT INTO lesson_content (id, lesson_id, source) VALUES ('lsc-1', 'lsn-1', X'68690A')",
                (),
            )
            .await
            .unwrap();

        db.conn()
            .execute("DELETE FROM courses WHERE id = 'crs-1'", ())
            .await
            .unwrap();

        let mut rows = db
            .conn()
            .query("SELECT count(*) FROM lesson_content", ())
            .await
            .unwrap();
        let row = rows.next().await.unwrap().unwrap();
        assert_eq!(row.get::<i64>(0).unwrap(), 0);
    }
}
