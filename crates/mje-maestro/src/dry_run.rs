//! Dry-run Maestro client
//!
//! Same contract as the real client, no network: ids are synthesized,
//! created entities are remembered in memory so find-or-create stays
//! idempotent within the run, and every would-be mutation is logged.
//! Doubles as the recording fake for engine tests.

use crate::client::MaestroClient;
use crate::error::MaestroError;
use async_trait::async_trait;
use mje_model::{Composition, ExternalSource, Group, Project, Role};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::info;

/// In-memory stand-in for the Maestro server.
#[derive(Debug, Default)]
pub struct DryRunMaestroClient {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    next_id: u64,
    groups: HashMap<String, Group>,
    projects: HashMap<String, Project>,
    /// `(project name, composition)` in creation order.
    compositions: Vec<(String, Composition)>,
    /// Role batches in submission order.
    roles: Vec<Role>,
    /// Synthesized task-type ids by name.
    task_ids: HashMap<String, u64>,
    /// Synthesized source ids by `(type, name)`.
    sources: HashMap<(String, String), u64>,
    /// `(group id, project id)` associations.
    associations: Vec<(u64, u64)>,
}

impl Inner {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

impl DryRunMaestroClient {
    /// Create an empty stand-in.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of the groups created so far.
    #[must_use]
    pub fn group_names(&self) -> Vec<String> {
        let inner = self.inner.lock().expect("dry-run state poisoned");
        let mut names: Vec<_> = inner.groups.keys().cloned().collect();
        names.sort();
        names
    }

    /// Names of the projects created so far.
    #[must_use]
    pub fn project_names(&self) -> Vec<String> {
        let inner = self.inner.lock().expect("dry-run state poisoned");
        let mut names: Vec<_> = inner.projects.keys().cloned().collect();
        names.sort();
        names
    }

    /// `(project name, composition)` pairs in creation order.
    #[must_use]
    pub fn compositions(&self) -> Vec<(String, Composition)> {
        self.inner
            .lock()
            .expect("dry-run state poisoned")
            .compositions
            .clone()
    }

    /// Roles submitted so far, in order.
    #[must_use]
    pub fn roles(&self) -> Vec<Role> {
        self.inner.lock().expect("dry-run state poisoned").roles.clone()
    }

    /// `(group id, project id)` associations recorded so far.
    #[must_use]
    pub fn associations(&self) -> Vec<(u64, u64)> {
        self.inner
            .lock()
            .expect("dry-run state poisoned")
            .associations
            .clone()
    }
}

#[async_trait]
impl MaestroClient for DryRunMaestroClient {
    async fn find_group_by_name(&self, name: &str) -> Result<Option<Group>, MaestroError> {
        Ok(self
            .inner
            .lock()
            .expect("dry-run state poisoned")
            .groups
            .get(name)
            .cloned())
    }

    async fn create_group(&self, group: &Group) -> Result<Group, MaestroError> {
        let mut inner = self.inner.lock().expect("dry-run state poisoned");
        if let Some(existing) = inner.groups.get(&group.name) {
            return Ok(existing.clone());
        }
        let mut created = group.clone();
        created.id = Some(inner.next_id());
        inner.groups.insert(created.name.clone(), created.clone());
        info!(group = %created.name, id = created.id, "dry-run: would create group");
        Ok(created)
    }

    async fn find_project_by_name(&self, name: &str) -> Result<Option<Project>, MaestroError> {
        Ok(self
            .inner
            .lock()
            .expect("dry-run state poisoned")
            .projects
            .get(name)
            .cloned())
    }

    async fn create_project(&self, project: &Project) -> Result<Project, MaestroError> {
        let mut inner = self.inner.lock().expect("dry-run state poisoned");
        if let Some(existing) = inner.projects.get(&project.name) {
            return Ok(existing.clone());
        }
        let mut created = project.clone();
        created.id = Some(inner.next_id());
        inner.projects.insert(created.name.clone(), created.clone());
        info!(project = %created.name, id = created.id, "dry-run: would create project");
        Ok(created)
    }

    async fn add_project_to_group(
        &self,
        project: &Project,
        group: &mut Group,
    ) -> Result<(), MaestroError> {
        if group.contains_project(project) {
            return Ok(());
        }
        let group_id = group
            .id
            .ok_or_else(|| MaestroError::MissingId(format!("group '{}'", group.name)))?;
        let project_id = project
            .id
            .ok_or_else(|| MaestroError::MissingId(format!("project '{}'", project.name)))?;
        let mut inner = self.inner.lock().expect("dry-run state poisoned");
        inner.associations.push((group_id, project_id));
        if let Some(stored) = inner.groups.get_mut(&group.name) {
            stored.projects.push(project.clone());
        }
        group.projects.push(project.clone());
        info!(project = %project.name, group = %group.name, "dry-run: would associate");
        Ok(())
    }

    async fn add_composition(
        &self,
        project: &Project,
        composition: &Composition,
    ) -> Result<(), MaestroError> {
        let mut inner = self.inner.lock().expect("dry-run state poisoned");
        let exists = inner
            .compositions
            .iter()
            .any(|(p, c)| p == &project.name && c.name == composition.name);
        if exists {
            return Err(MaestroError::Conflict(format!(
                "composition '{}'",
                composition.name
            )));
        }
        inner
            .compositions
            .push((project.name.clone(), composition.clone()));
        info!(
            composition = %composition.name,
            project = %project.name,
            tasks = composition.values.len(),
            "dry-run: would create composition"
        );
        Ok(())
    }

    async fn find_task_id_by_name(&self, name: &str) -> Result<Option<u64>, MaestroError> {
        let mut inner = self.inner.lock().expect("dry-run state poisoned");
        if let Some(&id) = inner.task_ids.get(name) {
            return Ok(Some(id));
        }
        let id = inner.next_id();
        inner.task_ids.insert(name.to_string(), id);
        Ok(Some(id))
    }

    async fn find_source(
        &self,
        source_type: &str,
        name: &str,
    ) -> Result<Option<ExternalSource>, MaestroError> {
        let mut inner = self.inner.lock().expect("dry-run state poisoned");
        let key = (source_type.to_string(), name.to_string());
        let id = match inner.sources.get(&key) {
            Some(&id) => id,
            None => {
                let id = inner.next_id();
                inner.sources.insert(key, id);
                id
            }
        };
        Ok(Some(ExternalSource {
            id,
            name: name.to_string(),
        }))
    }

    async fn create_roles(&self, roles: &[Role]) -> Result<(), MaestroError> {
        let mut inner = self.inner.lock().expect("dry-run state poisoned");
        for role in roles {
            if inner.roles.iter().any(|r| r.name == role.name) {
                info!(role = %role.name, "dry-run: role already exists, skipping");
                continue;
            }
            info!(role = %role.name, "dry-run: would create role");
            inner.roles.push(role.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_group_is_idempotent() {
        let client = DryRunMaestroClient::new();
        let first = client
            .create_group(&Group::new("Group View", "A group."))
            .await
            .unwrap();
        let second = client
            .create_group(&Group::new("Group View", "A group."))
            .await
            .unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(client.group_names(), vec!["Group View"]);
    }

    #[tokio::test]
    async fn duplicate_composition_reports_conflict() {
        let client = DryRunMaestroClient::new();
        let project = client
            .create_project(&Project::new("Project View", "d"))
            .await
            .unwrap();
        let composition = Composition::new("Test Job", "");
        client.add_composition(&project, &composition).await.unwrap();
        let err = client
            .add_composition(&project, &composition)
            .await
            .unwrap_err();
        assert!(err.is_conflict());
        assert_eq!(client.compositions().len(), 1);
    }

    #[tokio::test]
    async fn task_ids_are_memoized() {
        let client = DryRunMaestroClient::new();
        let a = client.find_task_id_by_name("jenkins plugin").await.unwrap();
        let b = client.find_task_id_by_name("jenkins plugin").await.unwrap();
        assert_eq!(a, b);
        assert!(a.is_some());
    }

    #[tokio::test]
    async fn association_updates_group_record() {
        let client = DryRunMaestroClient::new();
        let mut group = client.create_group(&Group::new("G", "")).await.unwrap();
        let project = client.create_project(&Project::new("P", "")).await.unwrap();
        client.add_project_to_group(&project, &mut group).await.unwrap();
        client.add_project_to_group(&project, &mut group).await.unwrap();
        assert_eq!(client.associations().len(), 1);
        assert_eq!(group.projects.len(), 1);
    }
}
