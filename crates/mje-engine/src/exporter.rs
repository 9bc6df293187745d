//! The export traversal
//!
//! Single-threaded, strictly sequential: every Jenkins and Maestro call
//! blocks the traversal. Destination writes are find-or-create, so an
//! interrupted run is simply re-run from the start.

use crate::config::ExporterConfig;
use crate::error::ExportError;
use crate::notification;
use crate::roles::roles_for_group;
use mje_jenkins::JenkinsClient;
use mje_maestro::MaestroClient;
use mje_model::{
    composition_from_job, group_from_view, project_from_view, Group, Project, TaskContext, View,
};
use std::collections::HashSet;
use tracing::{debug, error, info, warn};

/// The server's implicit view holding every job; never exported.
const ALL_VIEW: &str = "All";

/// Fallback project for jobs reachable from no view.
const ORPHAN_PROJECT: &str = "Other Jenkins Jobs";

/// Source type keys for external source lookups.
const JENKINS_SOURCE_TYPE: &str = "jenkins";
const SONAR_SOURCE_TYPE: &str = "sonar";

/// Counters for one export run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportReport {
    /// Top-level views exported as groups.
    pub groups: usize,
    /// Projects upserted (view projects plus the orphan fallback).
    pub projects: usize,
    /// Jobs exported as compositions, orphans included.
    pub compositions: usize,
    /// Jobs that belonged to no view.
    pub orphans: usize,
}

/// One-directional Jenkins → Maestro synchronization.
pub struct Exporter<J, M> {
    jenkins: J,
    maestro: M,
    config: ExporterConfig,
    dry_run: bool,
}

impl<J: JenkinsClient, M: MaestroClient> Exporter<J, M> {
    /// Create an exporter over the two clients.
    pub fn new(jenkins: J, maestro: M, config: ExporterConfig, dry_run: bool) -> Self {
        Self {
            jenkins,
            maestro,
            config,
            dry_run,
        }
    }

    /// The destination client, for inspecting recorded dry-run state.
    #[inline]
    #[must_use]
    pub fn maestro(&self) -> &M {
        &self.maestro
    }

    /// The source client.
    #[inline]
    #[must_use]
    pub fn jenkins(&self) -> &J {
        &self.jenkins
    }

    /// Run one full export pass.
    pub async fn export(&self) -> Result<ExportReport, ExportError> {
        let ctx = self.resolve_task_context().await?;
        let mut report = ExportReport::default();
        let mut exported: HashSet<String> = HashSet::new();

        // Phase 1: inventory.
        let all_jobs = self.jenkins.list_all_job_names().await?;
        let views = self.jenkins.list_views().await?;
        info!(views = views.len(), jobs = all_jobs.len(), "starting export");

        // Phase 2: hierarchical walk.
        for summary in views.iter().filter(|v| v.name != ALL_VIEW) {
            let view = self.jenkins.get_view(&summary.name, None).await?;
            self.export_view(&view, &ctx, &mut exported, &mut report)
                .await?;
            report.groups += 1;
        }

        // Phase 3: orphan reconciliation.
        let orphans: Vec<&String> = all_jobs.iter().filter(|j| !exported.contains(*j)).collect();
        if !orphans.is_empty() {
            info!(count = orphans.len(), "reconciling orphan jobs");
            let project = self
                .upsert_project(Project::new(ORPHAN_PROJECT, ORPHAN_PROJECT))
                .await?;
            report.projects += 1;
            for job_name in orphans {
                self.export_job(job_name, &project, &ctx, &mut exported)
                    .await?;
                report.compositions += 1;
                report.orphans += 1;
            }
        }

        info!(
            groups = report.groups,
            projects = report.projects,
            compositions = report.compositions,
            orphans = report.orphans,
            "export finished"
        );
        Ok(report)
    }

    /// Export one top-level view: group, roles, then the project branch
    /// and/or the sub-view branch.
    async fn export_view(
        &self,
        view: &View,
        ctx: &TaskContext,
        exported: &mut HashSet<String>,
        report: &mut ExportReport,
    ) -> Result<(), ExportError> {
        let mut group = self.upsert_group(view).await?;
        self.provision_roles(&group).await?;

        if view.has_jobs() {
            let project = self.upsert_project(project_from_view(view)).await?;
            report.projects += 1;
            self.maestro.add_project_to_group(&project, &mut group).await?;
            for job in &view.jobs {
                self.export_job(&job.name, &project, ctx, exported).await?;
                report.compositions += 1;
            }
        }

        if view.has_subviews() {
            if view.has_jobs() {
                warn!(
                    view = %view.name,
                    "view has both jobs and sub-views; nesting is not supported beyond one level"
                );
            }
            for sub in &view.views {
                let subview = self.jenkins.get_view(&sub.name, Some(&view.name)).await?;
                if subview.has_subviews() {
                    warn!(
                        view = %subview.name,
                        parent = %view.name,
                        "nesting is not supported beyond one level; deeper views are ignored"
                    );
                }
                let project = self.upsert_project(project_from_view(&subview)).await?;
                report.projects += 1;
                self.maestro.add_project_to_group(&project, &mut group).await?;
                for job in &subview.jobs {
                    self.export_job(&job.name, &project, ctx, exported).await?;
                    report.compositions += 1;
                }
            }
        }
        Ok(())
    }

    /// Export one job: composition plus notification augmentation.
    async fn export_job(
        &self,
        job_name: &str,
        project: &Project,
        ctx: &TaskContext,
        exported: &mut HashSet<String>,
    ) -> Result<(), ExportError> {
        let job = self.jenkins.get_job(job_name).await?;
        let mut job_config = self.jenkins.get_job_config(job_name).await?;

        let composition = match composition_from_job(&job, &job_config, ctx) {
            Ok(composition) => composition,
            Err(e) => {
                error!(job = job_name, error = %e, "aborting: job cannot be mapped");
                return Err(e.into());
            }
        };
        match self.maestro.add_composition(project, &composition).await {
            Ok(()) => {
                info!(composition = %composition.name, project = %project.name, "exported composition");
            }
            Err(e) if e.is_conflict() => {
                info!(composition = %composition.name, "composition already exists, skipping");
            }
            Err(e) => return Err(e.into()),
        }

        notification::augment_job(
            &self.jenkins,
            &self.config,
            job_name,
            &mut job_config,
            self.dry_run,
        )
        .await?;

        exported.insert(job_name.to_string());
        Ok(())
    }

    /// Find-or-create the group mapped from a view.
    async fn upsert_group(&self, view: &View) -> Result<Group, ExportError> {
        let mapped = group_from_view(view);
        if let Some(existing) = self.maestro.find_group_by_name(&mapped.name).await? {
            debug!(group = %existing.name, "group already exists");
            return Ok(existing);
        }
        let created = self.maestro.create_group(&mapped).await?;
        info!(group = %created.name, id = created.id, "created group");
        Ok(created)
    }

    /// Find-or-create a project.
    async fn upsert_project(&self, mapped: Project) -> Result<Project, ExportError> {
        if let Some(existing) = self.maestro.find_project_by_name(&mapped.name).await? {
            debug!(project = %existing.name, "project already exists");
            return Ok(existing);
        }
        let created = self.maestro.create_project(&mapped).await?;
        info!(project = %created.name, id = created.id, "created project");
        Ok(created)
    }

    /// Re-assert the group's developer and user roles.
    async fn provision_roles(&self, group: &Group) -> Result<(), ExportError> {
        let roles = roles_for_group(group, &self.config.roles)?;
        self.maestro.create_roles(&roles).await?;
        debug!(group = %group.name, "roles asserted");
        Ok(())
    }

    /// Resolve task type ids and external sources once per run.
    async fn resolve_task_context(&self) -> Result<TaskContext, ExportError> {
        let jenkins_task_id = self
            .maestro
            .find_task_id_by_name(&self.config.maestro.jenkins_task)
            .await?
            .ok_or_else(|| {
                ExportError::Config(format!(
                    "task type '{}' is not registered in maestro",
                    self.config.maestro.jenkins_task
                ))
            })?;
        let sonar_task_id = self
            .maestro
            .find_task_id_by_name(&self.config.maestro.sonar_task)
            .await?;

        let jenkins_source = match &self.config.maestro.jenkins_source {
            Some(name) => self
                .maestro
                .find_source(JENKINS_SOURCE_TYPE, name)
                .await?
                .map(|s| s.id),
            None => None,
        };
        let sonar_source = match &self.config.maestro.sonar_source {
            Some(name) => self
                .maestro
                .find_source(SONAR_SOURCE_TYPE, name)
                .await?
                .map(|s| s.id),
            None => None,
        };

        Ok(TaskContext {
            jenkins_task_id,
            sonar_task_id,
            jenkins_source,
            sonar_source,
            jenkins: self.config.jenkins.connection(),
            sonar: self.config.sonar.as_ref().map(|s| s.connection()),
        })
    }
}
