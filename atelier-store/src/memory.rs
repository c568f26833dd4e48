//! In-memory record store for development and tests.
//!
//! Backed by concurrent maps keyed by record id. Mutations are counted so
//! tests can assert exactly how many writes a command produced.

use crate::RecordStore;
use async_trait::async_trait;
use atelier_core::{
    AtelierResult, Client, ClientRef, Lead, Meeting, Project, ProjectRef, ProjectStatus,
    RecordKind, StoreError, Task, TimeEntry,
};
use chrono::Utc;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use uuid::Uuid;

/// In-memory [`RecordStore`] implementation.
#[derive(Default)]
pub struct InMemoryStore {
    tasks: DashMap<Uuid, Task>,
    leads: DashMap<Uuid, Lead>,
    time_entries: DashMap<Uuid, TimeEntry>,
    meetings: DashMap<Uuid, Meeting>,
    projects: DashMap<Uuid, Project>,
    clients: DashMap<Uuid, Client>,
    write_count: AtomicUsize,
    fail_writes: AtomicBool,
    fail_reads: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a project directly, bypassing write counting.
    pub fn seed_project(&self, organization_id: Uuid, name: &str, status: ProjectStatus) -> Project {
        let now = Utc::now();
        let project = Project {
            project_id: atelier_core::new_entity_id(),
            organization_id,
            name: name.to_string(),
            status,
            created_at: now,
            updated_at: now,
        };
        self.projects.insert(project.project_id, project.clone());
        project
    }

    /// Seed a client directly, bypassing write counting.
    pub fn seed_client(&self, organization_id: Uuid, name: &str, active: bool) -> Client {
        let client = Client {
            client_id: atelier_core::new_entity_id(),
            organization_id,
            name: name.to_string(),
            active,
            created_at: Utc::now(),
        };
        self.clients.insert(client.client_id, client.clone());
        client
    }

    /// Make every subsequent write fail with `StoreError::Unavailable`.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent read fail with `StoreError::Unavailable`.
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Number of successful mutations since construction.
    pub fn write_count(&self) -> usize {
        self.write_count.load(Ordering::SeqCst)
    }

    /// All stored tasks, unordered.
    pub fn tasks(&self) -> Vec<Task> {
        self.tasks.iter().map(|entry| entry.value().clone()).collect()
    }

    /// All stored leads, unordered.
    pub fn leads(&self) -> Vec<Lead> {
        self.leads.iter().map(|entry| entry.value().clone()).collect()
    }

    /// All stored time entries, unordered.
    pub fn time_entries(&self) -> Vec<TimeEntry> {
        self.time_entries
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// All stored meetings, unordered.
    pub fn meetings(&self) -> Vec<Meeting> {
        self.meetings.iter().map(|entry| entry.value().clone()).collect()
    }

    /// Fetch one project by id, any organization. Test helper.
    pub fn project(&self, project_id: Uuid) -> Option<Project> {
        self.projects.get(&project_id).map(|entry| entry.value().clone())
    }

    fn check_write(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable {
                reason: "writes disabled".to_string(),
            });
        }
        Ok(())
    }

    fn check_read(&self) -> Result<(), StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable {
                reason: "reads disabled".to_string(),
            });
        }
        Ok(())
    }

    fn record_write(&self) {
        self.write_count.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl RecordStore for InMemoryStore {
    async fn project_list_active(
        &self,
        organization_id: Uuid,
        limit: usize,
    ) -> AtelierResult<Vec<ProjectRef>> {
        self.check_read()?;
        let mut rows: Vec<Project> = self
            .projects
            .iter()
            .map(|entry| entry.value().clone())
            .filter(|p| p.organization_id == organization_id && p.status == ProjectStatus::Active)
            .collect();
        // UUIDv7 ids sort by creation time; newest first.
        rows.sort_by(|a, b| b.project_id.cmp(&a.project_id));
        Ok(rows
            .into_iter()
            .take(limit)
            .map(|p| ProjectRef {
                id: p.project_id,
                name: p.name,
            })
            .collect())
    }

    async fn client_list_active(
        &self,
        organization_id: Uuid,
        limit: usize,
    ) -> AtelierResult<Vec<ClientRef>> {
        self.check_read()?;
        let mut rows: Vec<Client> = self
            .clients
            .iter()
            .map(|entry| entry.value().clone())
            .filter(|c| c.organization_id == organization_id && c.active)
            .collect();
        rows.sort_by(|a, b| b.client_id.cmp(&a.client_id));
        Ok(rows
            .into_iter()
            .take(limit)
            .map(|c| ClientRef {
                id: c.client_id,
                name: c.name,
            })
            .collect())
    }

    async fn task_insert(&self, task: &Task) -> AtelierResult<()> {
        self.check_write()?;
        self.tasks.insert(task.task_id, task.clone());
        self.record_write();
        Ok(())
    }

    async fn lead_insert(&self, lead: &Lead) -> AtelierResult<()> {
        self.check_write()?;
        self.leads.insert(lead.lead_id, lead.clone());
        self.record_write();
        Ok(())
    }

    async fn time_entry_insert(&self, entry: &TimeEntry) -> AtelierResult<()> {
        self.check_write()?;
        self.time_entries.insert(entry.entry_id, entry.clone());
        self.record_write();
        Ok(())
    }

    async fn meeting_insert(&self, meeting: &Meeting) -> AtelierResult<()> {
        self.check_write()?;
        self.meetings.insert(meeting.meeting_id, meeting.clone());
        self.record_write();
        Ok(())
    }

    async fn project_update_status(
        &self,
        organization_id: Uuid,
        project_id: Uuid,
        status: ProjectStatus,
    ) -> AtelierResult<Project> {
        self.check_write()?;
        let mut entry = self
            .projects
            .get_mut(&project_id)
            .filter(|entry| entry.value().organization_id == organization_id)
            .ok_or(StoreError::NotFound {
                kind: RecordKind::Project,
                id: project_id,
            })?;
        entry.value_mut().status = status;
        entry.value_mut().updated_at = Utc::now();
        let updated = entry.value().clone();
        drop(entry);
        self.record_write();
        Ok(updated)
    }

    async fn ping(&self) -> AtelierResult<()> {
        self.check_read()?;
        Ok(())
    }
}

impl std::fmt::Debug for InMemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryStore")
            .field("tasks", &self.tasks.len())
            .field("leads", &self.leads.len())
            .field("time_entries", &self.time_entries.len())
            .field("meetings", &self.meetings.len())
            .field("projects", &self.projects.len())
            .field("clients", &self.clients.len())
            .field("write_count", &self.write_count())
            .finish()
    }
}

// ============================================================================
// TESTS
// ============================================================================


// ============================================================================
// PROPERTY-BASED TESTS
// ============================================================================
