//! Jenkins client capability trait

use crate::error::JenkinsError;
use async_trait::async_trait;
use mje_model::{Job, JobConfig, View, ViewSummary};

/// Read access to the Jenkins view/job hierarchy plus the one write the
/// exporter performs (replacing a job's `config.xml`).
///
/// The engine only talks to Jenkins through this trait, so tests drive it
/// with an in-memory implementation.
#[async_trait]
pub trait JenkinsClient: Send + Sync {
    /// List the top-level views, including the server's implicit "All"
    /// view (callers filter it).
    async fn list_views(&self) -> Result<Vec<ViewSummary>, JenkinsError>;

    /// Fetch a view's details; `parent` addresses a sub-view nested under
    /// a top-level view.
    async fn get_view(&self, name: &str, parent: Option<&str>) -> Result<View, JenkinsError>;

    /// List every job name known to the server, regardless of view
    /// membership.
    async fn list_all_job_names(&self) -> Result<Vec<String>, JenkinsError>;

    /// Fetch a job's details.
    async fn get_job(&self, name: &str) -> Result<Job, JenkinsError>;

    /// Fetch a job's `config.xml`.
    async fn get_job_config(&self, name: &str) -> Result<JobConfig, JenkinsError>;

    /// Replace a job's `config.xml`.
    async fn replace_job_config(&self, name: &str, config: &JobConfig)
        -> Result<(), JenkinsError>;
}
