//! The content service: catalog management plus the compile-on-save
//! pipeline.
//!
//! Authoring operations are gated on [`Role::Author`]; delivery operations
//! are open to any role. Saves compile before touching the database, so a
//! markup error persists nothing.

use courseflow_core::{coming_soon_payload, compile, to_storage_bytes, to_transport_text};

use crate::CourseDb;
use crate::error::StoreError;
use crate::kind::ContentKind;
use crate::locator::ContentUnit;

/// Who is performing an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Can create, edit, and delete content.
    Author,
    /// Can only read delivered content.
    Viewer,
}

/// Decoded content handed to the authoring UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditableContent {
    /// Prefixed content row id.
    pub id: String,
    /// Which table the row lives in.
    pub kind: ContentKind,
    /// Id of the owning lesson or course.
    pub owner_id: String,
    /// Authored source as transport text.
    pub source: String,
}

/// High-level operations over a [`CourseDb`].
pub struct ContentService {
    db: CourseDb,
}

impl ContentService {
    /// Wrap an opened database.
    pub fn new(db: CourseDb) -> Self {
        Self { db }
    }

    /// Access the underlying database handle.
    pub fn db(&self) -> &CourseDb {
        &self.db
    }

    fn require_author(role: Role) -> Result<(), StoreError> {
        match role {
            Role::Author => Ok(()),
            Role::Viewer => Err(StoreError::Unauthorized),
        }
    }

    /// Create a course, returning its id.
    pub async fn create_course(&self, role: Role, title: &str) -> Result<String, StoreError> {
        Self::require_author(role)?;
        let id = self.db.generate_id("crs").await?;
        self.db
            .conn()
            .execute(
                "INSERT INTO courses (id, title) VALUES (?1, ?2)",
                libsql::params![id.as_str(), title],
            )
            .await?;
        Ok(id)
    }

    /// Create a lesson under a course, returning its id.
    pub async fn create_lesson(
        &self,
        role: Role,
        course_id: &str,
        title: &str,
        position: i64,
    ) -> Result<String, StoreError> {
        Self::require_author(role)?;
        let id = self.db.generate_id("lsn").await?;
        self.db
            .conn()
            .execute(
                "INSERT INTO lessons (id, course_id, title, position) VALUES (?1, ?2, ?3, ?4)",
                libsql::params![id.as_str(), course_id, title, position],
            )
            .await?;
        Ok(id)
    }

    /// Delete a course; lessons and content cascade.
    pub async fn delete_course(&self, role: Role, course_id: &str) -> Result<(), StoreError> {
        Self::require_author(role)?;
        let affected = self
            .db
            .conn()
            .execute("DELETE FROM courses WHERE id = ?1", [course_id])
            .await?;
        if affected == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    /// Compile and persist authored content for an owner.
    ///
    /// Compilation runs first; on failure nothing is written and the
    /// previous row (if any) survives. On success, source and compiled
    /// payload persist together.
    pub async fn save_unit(
        &self,
        role: Role,
        kind: ContentKind,
        owner_id: &str,
        source: &str,
    ) -> Result<ContentUnit, StoreError> {
        Self::require_author(role)?;

        let compiled = compile(source)?;
        log::debug!(
            "compiled {kind} for {owner_id}: {} directives",
            compiled.directive_count
        );

        let source_bytes = to_storage_bytes(source);
        let compiled_bytes = to_storage_bytes(&compiled.payload);
        self.db
            .upsert_unit(kind, owner_id, &source_bytes, &compiled_bytes)
            .await
    }

    /// Compile and persist authored content for an existing row by bare id.
    ///
    /// The authoring RPC sends the id back once a row exists; this skips
    /// the owner lookup and updates that exact row regardless of kind.
    pub async fn save_unit_by_id(
        &self,
        role: Role,
        id: &str,
        source: &str,
    ) -> Result<ContentUnit, StoreError> {
        Self::require_author(role)?;
        let compiled = compile(source)?;
        self.db
            .update_unit_by_id(
                id,
                &to_storage_bytes(source),
                &to_storage_bytes(&compiled.payload),
            )
            .await
    }

    /// Fetch authored content for editing, decoded to transport text.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when the owner has no content of
    /// this kind yet.
    pub async fn unit_for_edit(
        &self,
        role: Role,
        kind: ContentKind,
        owner_id: &str,
    ) -> Result<EditableContent, StoreError> {
        Self::require_author(role)?;
        let unit = self
            .db
            .find_by_owner(kind, owner_id)
            .await?
            .ok_or(StoreError::NotFound)?;
        let source = to_transport_text(&unit.source)?;
        Ok(EditableContent {
            id: unit.id,
            kind: unit.kind,
            owner_id: unit.owner_id,
            source,
        })
    }

    /// Fetch the compiled payload for delivery to any role.
    ///
    /// A missing row, or a row whose compile has not caught up yet, serves
    /// the placeholder payload rather than an error.
    pub async fn compiled_for_owner(
        &self,
        kind: ContentKind,
        owner_id: &str,
    ) -> Result<String, StoreError> {
        let unit = self.db.find_by_owner(kind, owner_id).await?;
        match unit.and_then(|u| u.compiled) {
            Some(bytes) => Ok(to_transport_text(&bytes)?),
            None => Ok(coming_soon_payload().to_string()),
        }
    }

    /// Recompile a content row from its stored source by bare id.
    pub async fn recompile(&self, role: Role, id: &str) -> Result<(), StoreError> {
        Self::require_author(role)?;
        let unit = self.db.find_by_id(id).await?;
        let source = to_transport_text(&unit.source)?;
        let compiled = compile(&source)?;
        self.db
            .update_compiled_by_id(id, &to_storage_bytes(&compiled.payload))
            .await?;
        Ok(())
    }

    /// Delete a content row by bare id.
    pub async fn delete_unit(&self, role: Role, id: &str) -> Result<(), StoreError> {
        Self::require_author(role)?;
        self.db.delete_unit_by_id(id).await?;
        Ok(())
    }
}
