//! Content row access across the three content tables.
//!
//! Bare content ids arrive without a kind (e.g. from a recompile queue), so
//! resolution probes the tables in [`ContentKind::PROBE_ORDER`]. Prefixed
//! ids make cross-table collisions practically impossible, but the
//! two-phase update still verifies uniqueness instead of assuming it.

use crate::CourseDb;
use crate::error::StoreError;
use crate::kind::ContentKind;

/// One row from a content table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentUnit {
    /// Prefixed row id, unique across all content tables.
    pub id: String,
    /// Which table the row lives in.
    pub kind: ContentKind,
    /// Id of the owning lesson or course.
    pub owner_id: String,
    /// Authored source bytes.
    pub source: Vec<u8>,
    /// Compiled payload bytes, absent until a compile has succeeded.
    pub compiled: Option<Vec<u8>>,
}

fn row_to_unit(kind: ContentKind, row: &libsql::Row) -> Result<ContentUnit, StoreError> {
    Ok(ContentUnit {
        id: row.get::<String>(0)?,
        kind,
        owner_id: row.get::<String>(1)?,
        source: row.get::<Vec<u8>>(2)?,
        compiled: get_opt_blob(row, 3)?,
    })
}

fn get_opt_blob(row: &libsql::Row, idx: i32) -> Result<Option<Vec<u8>>, StoreError> {
    match row.get_value(idx)? {
        libsql::Value::Null => Ok(None),
        libsql::Value::Blob(bytes) => Ok(Some(bytes)),
        other => Err(StoreError::Integrity(format!(
            "expected blob column, got {other:?}"
        ))),
    }
}

impl CourseDb {
    /// Fetch the content row of `kind` owned by `owner_id`, if any.
    pub async fn find_by_owner(
        &self,
        kind: ContentKind,
        owner_id: &str,
    ) -> Result<Option<ContentUnit>, StoreError> {
        let mut rows = self
            .conn()
            .query(
                &format!(
                    "SELECT id, {owner}, source, compiled FROM {table} WHERE {owner} = ?1",
                    owner = kind.owner_column(),
                    table = kind.table(),
                ),
                [owner_id],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row_to_unit(kind, &row)?)),
            None => Ok(None),
        }
    }

    /// Resolve a bare content id by probing the tables in
    /// [`ContentKind::PROBE_ORDER`].
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when no table has the id.
    pub async fn find_by_id(&self, id: &str) -> Result<ContentUnit, StoreError> {
        self.find_by_id_with_order(id, &ContentKind::PROBE_ORDER)
            .await
    }

    /// Resolve a bare content id probing tables in a caller-chosen order.
    ///
    /// The order only affects which table is tried first; ids are unique
    /// across all tables, so any order finds the same row.
    pub async fn find_by_id_with_order(
        &self,
        id: &str,
        order: &[ContentKind],
    ) -> Result<ContentUnit, StoreError> {
        for &kind in order {
            let mut rows = self
                .conn()
                .query(
                    &format!(
                        "SELECT id, {owner}, source, compiled FROM {table} WHERE id = ?1",
                        owner = kind.owner_column(),
                        table = kind.table(),
                    ),
                    [id],
                )
                .await?;
            if let Some(row) = rows.next().await? {
                return row_to_unit(kind, &row);
            }
        }
        Err(StoreError::NotFound)
    }

    /// Insert or replace the content row of `kind` for `owner_id`.
    ///
    /// Source and compiled bytes land in the same transaction; a failure
    /// leaves the previous row untouched.
    pub async fn upsert_unit(
        &self,
        kind: ContentKind,
        owner_id: &str,
        source: &[u8],
        compiled: &[u8],
    ) -> Result<ContentUnit, StoreError> {
        let existing = self.find_by_owner(kind, owner_id).await?;

        let tx = self.conn().transaction().await?;
        let id = match existing {
            Some(unit) => {
                tx.execute(
                    &format!(
                        "UPDATE {table} SET source = ?1, compiled = ?2, updated_at = datetime('now') WHERE id = ?3",
                        table = kind.table(),
                    ),
                    libsql::params![source.to_vec(), compiled.to_vec(), unit.id.as_str()],
                )
                .await?;
                unit.id
            }
            None => {
                let id = self.generate_id(kind.id_prefix()).await?;
                tx.execute(
                    &format!(
                        "INSERT INTO {table} (id, {owner}, source, compiled) VALUES (?1, ?2, ?3, ?4)",
                        table = kind.table(),
                        owner = kind.owner_column(),
                    ),
                    libsql::params![id.as_str(), owner_id, source.to_vec(), compiled.to_vec()],
                )
                .await?;
                id
            }
        };
        tx.commit().await?;

        Ok(ContentUnit {
            id,
            kind,
            owner_id: owner_id.to_string(),
            source: source.to_vec(),
            compiled: Some(compiled.to_vec()),
        })
    }

    /// Replace source and compiled bytes for a bare content id.
    ///
    /// Locates the table first, then writes both columns together.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when no table has the id.
    pub async fn update_unit_by_id(
        &self,
        id: &str,
        source: &[u8],
        compiled: &[u8],
    ) -> Result<ContentUnit, StoreError> {
        let unit = self.find_by_id(id).await?;
        let affected = self
            .conn()
            .execute(
                &format!(
                    "UPDATE {} SET source = ?1, compiled = ?2, updated_at = datetime('now') WHERE id = ?3",
                    unit.kind.table(),
                ),
                libsql::params![source.to_vec(), compiled.to_vec(), id],
            )
            .await?;
        if affected != 1 {
            return Err(StoreError::Integrity(format!(
                "source update for '{id}' changed {affected} rows"
            )));
        }
        Ok(ContentUnit {
            source: source.to_vec(),
            compiled: Some(compiled.to_vec()),
            ..unit
        })
    }

    /// Write a fresh compiled payload for a bare content id.
    ///
    /// Two phases: first locate the row across all tables and require
    /// exactly one match, then update it. Zero or multiple matches are an
    /// integrity violation rather than a not-found, because the id was
    /// previously handed out by this store.
    pub async fn update_compiled_by_id(
        &self,
        id: &str,
        compiled: &[u8],
    ) -> Result<ContentKind, StoreError> {
        let mut matches = Vec::new();
        for kind in ContentKind::PROBE_ORDER {
            let mut rows = self
                .conn()
                .query(
                    &format!("SELECT 1 FROM {} WHERE id = ?1", kind.table()),
                    [id],
                )
                .await?;
            if rows.next().await?.is_some() {
                matches.push(kind);
            }
        }

        let kind = match matches.as_slice() {
            [kind] => *kind,
            [] => {
                return Err(StoreError::Integrity(format!(
                    "content id '{id}' matched no row"
                )));
            }
            many => {
                return Err(StoreError::Integrity(format!(
                    "content id '{id}' matched {} tables",
                    many.len()
                )));
            }
        };

        let affected = self
            .conn()
            .execute(
                &format!(
                    "UPDATE {} SET compiled = ?1, updated_at = datetime('now') WHERE id = ?2",
                    kind.table(),
                ),
                libsql::params![compiled.to_vec(), id],
            )
            .await?;
        if affected != 1 {
            return Err(StoreError::Integrity(format!(
                "compiled update for '{id}' changed {affected} rows"
            )));
        }
        Ok(kind)
    }

    /// Delete a content row by bare id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when no table has the id.
    pub async fn delete_unit_by_id(&self, id: &str) -> Result<ContentKind, StoreError> {
        for kind in ContentKind::PROBE_ORDER {
            let affected = self
                .conn()
                .execute(
                    &format!("DELETE FROM {} WHERE id = ?1", kind.table()),
                    [id],
                )
                .await?;
            if affected > 0 {
                return Ok(kind);
            }
        }
        Err(StoreError::NotFound)
    }
}
