//! Reference context loading.
//!
//! Before classification we snapshot the organization's active projects and
//! clients so the oracle can resolve names like "the rebrand project" to
//! real ids. Both reads run concurrently and each one fails open: a slice
//! that cannot be loaded becomes an empty list, never a failed request.

use atelier_core::{ReferenceContext, MAX_CONTEXT_ENTRIES};
use atelier_store::RecordStore;
use tracing::warn;
use uuid::Uuid;

/// Load the bounded reference context for an organization.
pub async fn load(store: &dyn RecordStore, organization_id: Uuid) -> ReferenceContext {
    let (projects, clients) = tokio::join!(
        store.project_list_active(organization_id, MAX_CONTEXT_ENTRIES),
        store.client_list_active(organization_id, MAX_CONTEXT_ENTRIES),
    );

    let projects = match projects {
        Ok(projects) => projects,
        Err(error) => {
            warn!(%organization_id, %error, "project context load failed, continuing without projects");
            Vec::new()
        }
    };

    let clients = match clients {
        Ok(clients) => clients,
        Err(error) => {
            warn!(%organization_id, %error, "client context load failed, continuing without clients");
            Vec::new()
        }
    };

    ReferenceContext { projects, clients }
}
