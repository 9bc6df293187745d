//! Source records as returned by the Jenkins JSON API
//!
//! Only the fields the exporter consumes are modeled; everything else in
//! the Jenkins payloads is dropped at deserialization and never passed
//! through to the destination.

use serde::{Deserialize, Serialize};

/// One entry of the top-level view list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewSummary {
    /// View name, unique among siblings.
    pub name: String,
}

/// Reference to a job from within a view document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRef {
    /// Job name, globally unique within the Jenkins server.
    pub name: String,
}

/// Detailed view document.
///
/// A view with populated `jobs` and empty `views` is a leaf view; the
/// reverse is a branch view. Both populated at once is accepted input but
/// the engine only follows nesting one level deep.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct View {
    /// View name.
    pub name: String,
    /// Free-form description, may contain HTML.
    #[serde(default)]
    pub description: Option<String>,
    /// Nested sub-views.
    #[serde(default)]
    pub views: Vec<ViewSummary>,
    /// Jobs directly under this view.
    #[serde(default)]
    pub jobs: Vec<JobRef>,
}

impl View {
    /// Whether this view carries jobs directly.
    #[inline]
    #[must_use]
    pub fn has_jobs(&self) -> bool {
        !self.jobs.is_empty()
    }

    /// Whether this view carries nested sub-views.
    #[inline]
    #[must_use]
    pub fn has_subviews(&self) -> bool {
        !self.views.is_empty()
    }
}

/// Detailed job document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    /// Job name.
    pub name: String,
    /// Free-form description, may contain HTML.
    #[serde(default)]
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_drops_unknown_fields() {
        let json = r#"{
            "name": "Group View",
            "description": "A group.",
            "url": "http://jenkins/view/Group%20View/",
            "property": [],
            "views": [{"name": "Project View", "url": "ignored"}],
            "jobs": []
        }"#;
        let view: View = serde_json::from_str(json).unwrap();
        assert_eq!(view.name, "Group View");
        assert_eq!(view.views.len(), 1);
        assert_eq!(view.views[0].name, "Project View");
        assert!(view.has_subviews());
        assert!(!view.has_jobs());
    }

    #[test]
    fn view_defaults_for_absent_lists() {
        let view: View = serde_json::from_str(r#"{"name": "Empty"}"#).unwrap();
        assert!(view.description.is_none());
        assert!(view.views.is_empty());
        assert!(view.jobs.is_empty());
    }

    #[test]
    fn job_deserializes() {
        let job: Job =
            serde_json::from_str(r#"{"name": "Test Job", "description": "d", "buildable": true}"#)
                .unwrap();
        assert_eq!(job.name, "Test Job");
        assert_eq!(job.description.as_deref(), Some("d"));
    }
}
