//! Data model for the Jenkins → Maestro exporter
//!
//! Provides the typed entities on both sides of the synchronization:
//! - Source records as returned by the Jenkins JSON API (views, jobs)
//! - The job `config.xml` document model (inspection and mutation)
//! - Destination records as accepted by the Maestro REST API
//!   (groups, projects, compositions, roles)
//! - The pure mapping functions translating source records into
//!   destination records
//!
//! Nothing in this crate performs I/O; clients and the engine live in
//! sibling crates.

pub mod error;
pub mod jobconfig;
pub mod mapper;

mod destination;
mod source;

pub use destination::{
    Composition, ExternalSource, Group, JenkinsTask, Project, ResourcePermission, Role, SonarTask,
    TaskValue,
};
pub use error::{ConfigXmlError, MapError};
pub use jobconfig::JobConfig;
pub use mapper::{
    composition_from_job, group_from_view, is_analysis_job, project_from_view,
    sanitize_description, JenkinsConnection, SonarConnection, TaskContext,
};
pub use source::{Job, JobRef, View, ViewSummary};
