//! Atelier Store - Record Store Trait and In-Memory Implementation
//!
//! Defines the storage abstraction the command interpreter writes through.
//! Production backends implement [`RecordStore`] elsewhere; this crate ships
//! the trait and an in-memory implementation for development and tests.

use async_trait::async_trait;
use atelier_core::{
    AtelierResult, ClientRef, Lead, Meeting, Project, ProjectRef, ProjectStatus, Task, TimeEntry,
};
use uuid::Uuid;

pub mod memory;

pub use memory::InMemoryStore;

/// Async record store for the studio's domain entities.
///
/// Every operation is scoped to an organization. Implementations must not
/// return or mutate rows belonging to any other organization, whatever ids
/// the caller passes.
#[async_trait]
pub trait RecordStore: Send + Sync {
    // ========================================================================
    // REFERENCE READS
    // ========================================================================

    /// List an organization's projects with status `Active`, newest first,
    /// at most `limit` rows.
    async fn project_list_active(
        &self,
        organization_id: Uuid,
        limit: usize,
    ) -> AtelierResult<Vec<ProjectRef>>;

    /// List an organization's active clients, newest first, at most `limit`
    /// rows.
    async fn client_list_active(
        &self,
        organization_id: Uuid,
        limit: usize,
    ) -> AtelierResult<Vec<ClientRef>>;

    // ========================================================================
    // COMMAND WRITES
    // ========================================================================

    /// Insert a new task.
    async fn task_insert(&self, task: &Task) -> AtelierResult<()>;

    /// Insert a new lead.
    async fn lead_insert(&self, lead: &Lead) -> AtelierResult<()>;

    /// Insert a new time entry.
    async fn time_entry_insert(&self, entry: &TimeEntry) -> AtelierResult<()>;

    /// Insert a new meeting.
    async fn meeting_insert(&self, meeting: &Meeting) -> AtelierResult<()>;

    /// Move a project to a new lifecycle status and return the updated row.
    ///
    /// The update is filtered by `organization_id`; a project id belonging to
    /// another organization reports `StoreError::NotFound` and leaves the row
    /// untouched.
    async fn project_update_status(
        &self,
        organization_id: Uuid,
        project_id: Uuid,
        status: ProjectStatus,
    ) -> AtelierResult<Project>;

    // ========================================================================
    // HEALTH
    // ========================================================================

    /// Cheap liveness probe for readiness checks.
    async fn ping(&self) -> AtelierResult<()>;
}
