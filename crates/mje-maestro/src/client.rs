//! Maestro client capability trait

use crate::error::MaestroError;
use async_trait::async_trait;
use mje_model::{Composition, ExternalSource, Group, Project, Role};

/// Idempotent write access to the Maestro resource hierarchy.
///
/// Lookups return `Ok(None)` for "does not exist yet"; creates either
/// succeed, return the existing record, or surface
/// [`MaestroError::Conflict`] for the engine to absorb. No method updates
/// an existing record.
#[async_trait]
pub trait MaestroClient: Send + Sync {
    /// Look a group up by its name.
    async fn find_group_by_name(&self, name: &str) -> Result<Option<Group>, MaestroError>;

    /// Create a group; returns the record with its assigned id.
    async fn create_group(&self, group: &Group) -> Result<Group, MaestroError>;

    /// Look a project up by its name.
    async fn find_project_by_name(&self, name: &str) -> Result<Option<Project>, MaestroError>;

    /// Create a project; returns the existing record on a name collision.
    async fn create_project(&self, project: &Project) -> Result<Project, MaestroError>;

    /// Associate a project with a group; a no-op when the group's own
    /// project list already carries it. Updates `group.projects`.
    async fn add_project_to_group(
        &self,
        project: &Project,
        group: &mut Group,
    ) -> Result<(), MaestroError>;

    /// Create a composition under a project (two-phase: shell first, then
    /// the task values).
    async fn add_composition(
        &self,
        project: &Project,
        composition: &Composition,
    ) -> Result<(), MaestroError>;

    /// Resolve a task type id by its registered name.
    async fn find_task_id_by_name(&self, name: &str) -> Result<Option<u64>, MaestroError>;

    /// Resolve a pre-registered external source by type and name.
    async fn find_source(
        &self,
        source_type: &str,
        name: &str,
    ) -> Result<Option<ExternalSource>, MaestroError>;

    /// Create roles in one batch; per-role "already exists" responses are
    /// swallowed and logged, never propagated.
    async fn create_roles(&self, roles: &[Role]) -> Result<(), MaestroError>;
}
