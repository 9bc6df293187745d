//! Destination records as accepted by the Maestro REST API
//!
//! Groups, projects, compositions and roles. Field names follow the wire
//! format (camelCase where Maestro expects it); ids are assigned by the
//! destination on creation and absent until then.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Maestro group, the top of the destination hierarchy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Group {
    /// Assigned by Maestro on creation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    /// Group name, the identity key.
    pub name: String,
    /// Group description.
    #[serde(default)]
    pub description: String,
    /// Projects already associated with this group.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub projects: Vec<Project>,
}

impl Group {
    /// Create an unsaved group.
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            description: description.into(),
            projects: Vec::new(),
        }
    }

    /// Whether the given project is already associated with this group.
    #[must_use]
    pub fn contains_project(&self, project: &Project) -> bool {
        match project.id {
            Some(id) => self.projects.iter().any(|p| p.id == Some(id)),
            None => false,
        }
    }
}

/// Maestro project, owned by at most one group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// Assigned by Maestro on creation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    /// Project name, the identity key.
    pub name: String,
    /// Sanitized description (HTML-stripped, at most 255 code points).
    #[serde(default)]
    pub description: String,
}

impl Project {
    /// Create an unsaved project.
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            description: description.into(),
        }
    }
}

/// Maestro composition: one pipeline definition under a project.
///
/// The skeleton constants (`failTypeId`, `agentPoolId`, ...) match what the
/// Maestro composition editor itself submits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Composition {
    /// Composition name, taken from the job name.
    pub name: String,
    /// Job description, may be empty.
    #[serde(default)]
    pub description: String,
    /// Always empty on export.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Exported compositions start enabled.
    pub enabled: bool,
    /// No schedule on export.
    #[serde(default)]
    pub schedule: String,
    pub fail_type_id: u32,
    pub on_error_id: u32,
    #[serde(default)]
    pub agent_facts: serde_json::Map<String, serde_json::Value>,
    pub agent_pool_id: u32,
    pub fail_on_cancel: bool,
    /// Pipeline tasks keyed by synthetic task-instance id, in position order.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub values: IndexMap<String, TaskValue>,
}

impl Composition {
    /// Create the fixed composition skeleton with no tasks.
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            tags: Vec::new(),
            enabled: true,
            schedule: String::new(),
            fail_type_id: 1,
            on_error_id: 0,
            agent_facts: serde_json::Map::new(),
            agent_pool_id: 1,
            fail_on_cancel: false,
            values: IndexMap::new(),
        }
    }

    /// The composition body without its task values, as submitted in the
    /// first phase of the two-phase create.
    #[must_use]
    pub fn without_values(&self) -> Self {
        let mut shell = self.clone();
        shell.values = IndexMap::new();
        shell
    }
}

/// One task inside a composition's `values` map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TaskValue {
    /// Secondary analysis task (position 2).
    Sonar(SonarTask),
    /// Primary build task (position 1).
    Jenkins(JenkinsTask),
}

impl TaskValue {
    /// Ordinal position of this task within the composition.
    #[inline]
    #[must_use]
    pub fn position(&self) -> u32 {
        match self {
            Self::Jenkins(t) => t.position,
            Self::Sonar(t) => t.position,
        }
    }
}

/// Parameters for the primary Jenkins build task.
///
/// Either `source` references a pre-registered Jenkins connection in the
/// destination (and the inline connection fields stay empty), or `source`
/// is `"-1"` and the inline fields carry the connection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JenkinsTask {
    pub host: String,
    pub port: u16,
    /// Name of the Jenkins job to trigger.
    pub job: String,
    pub username: String,
    pub password: String,
    pub scm_url: String,
    pub use_ssl: bool,
    pub web_path: String,
    pub override_existing: bool,
    /// Unused on export, present for schema compatibility.
    pub parameters: Vec<serde_json::Value>,
    /// Unused on export, present for schema compatibility.
    pub label_axes: Vec<serde_json::Value>,
    /// Unused on export, present for schema compatibility.
    pub steps: Vec<serde_json::Value>,
    pub position: u32,
    /// External source id as a string, `"-1"` when connecting inline.
    pub source: String,
}

/// Parameters for the secondary Sonar analysis task.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SonarTask {
    pub url: String,
    pub username: String,
    pub password: String,
    /// `{groupId}:{artifactId}` from the job's maven coordinates.
    #[serde(rename = "projectKey")]
    pub project_key: String,
    pub position: u32,
    /// External source id as a string, `"-1"` when connecting inline.
    pub source: String,
}

/// Access-control role derived from a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    /// Templated role name.
    pub name: String,
    /// Permissions granted on destination resources.
    pub resource_permissions: Vec<ResourcePermission>,
}

/// One `(resource, permission)` grant inside a role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourcePermission {
    /// Destination resource id (the group id here).
    pub resource: u64,
    /// Permission name.
    pub permission: String,
}

/// A pre-registered connection profile in the destination, looked up by
/// type and name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalSource {
    pub id: u64,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn composition_skeleton_constants() {
        let c = Composition::new("Test Job", "");
        assert!(c.enabled);
        assert!(c.tags.is_empty());
        assert_eq!(c.schedule, "");
        assert_eq!(c.fail_type_id, 1);
        assert_eq!(c.on_error_id, 0);
        assert_eq!(c.agent_pool_id, 1);
        assert!(!c.fail_on_cancel);
        assert!(c.values.is_empty());
    }

    #[test]
    fn composition_serializes_camel_case() {
        let c = Composition::new("Test Job", "desc");
        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(json["failTypeId"], 1);
        assert_eq!(json["onErrorId"], 0);
        assert_eq!(json["agentPoolId"], 1);
        assert_eq!(json["failOnCancel"], false);
        // No tasks yet, so the values key is omitted like the original
        // two-phase create payload.
        assert!(json.get("values").is_none());
    }

    #[test]
    fn without_values_strips_tasks_only() {
        let mut c = Composition::new("Test Job", "");
        c.values.insert(
            "task_27_1".to_string(),
            TaskValue::Jenkins(JenkinsTask {
                job: "Test Job".to_string(),
                position: 1,
                source: "-1".to_string(),
                ..JenkinsTask::default()
            }),
        );
        let shell = c.without_values();
        assert!(shell.values.is_empty());
        assert_eq!(shell.name, c.name);
        assert_eq!(c.values.len(), 1);
    }

    #[test]
    fn group_contains_project_by_id() {
        let mut group = Group::new("Group View", "A group.");
        let mut project = Project::new("Project View", "d");
        assert!(!group.contains_project(&project));
        project.id = Some(7);
        group.projects.push(project.clone());
        assert!(group.contains_project(&project));
    }

    #[test]
    fn role_serializes_resource_permissions_key() {
        let role = Role {
            name: "groupview-users".to_string(),
            resource_permissions: vec![ResourcePermission {
                resource: 3,
                permission: "view-build-project-group".to_string(),
            }],
        };
        let json = serde_json::to_value(&role).unwrap();
        assert!(json.get("resourcePermissions").is_some());
    }

    #[test]
    fn task_value_round_trips_untagged() {
        let task = TaskValue::Sonar(SonarTask {
            url: "http://sonar:9000".to_string(),
            project_key: "com.example:app".to_string(),
            position: 2,
            source: "-1".to_string(),
            ..SonarTask::default()
        });
        let json = serde_json::to_string(&task).unwrap();
        assert!(json.contains("projectKey"));
        let back: TaskValue = serde_json::from_str(&json).unwrap();
        assert_eq!(back, task);
    }
}
