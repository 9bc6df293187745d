//! Synchronization engine
//!
//! Orchestrates one export run:
//! 1. Inventory: all job names plus the top-level views (minus "All")
//! 2. Hierarchical walk: views → groups, (sub-)views → projects,
//!    jobs → compositions, with find-or-create semantics throughout
//! 3. Orphan reconciliation: jobs reachable from no view land under a
//!    fixed fallback project
//!
//! Every exported job also gets its Jenkins configuration augmented with
//! the Maestro notification callback, and every group gets its two access
//! roles re-asserted.

pub mod config;
pub mod error;
pub mod exporter;
pub mod notification;
pub mod roles;

pub use config::{
    ExporterConfig, JenkinsSettings, MaestroSettings, NotificationSettings, RoleSettings,
    SonarSettings,
};
pub use error::ExportError;
pub use exporter::{ExportReport, Exporter};
