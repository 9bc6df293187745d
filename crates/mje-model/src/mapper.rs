//! Pure entity mapping
//!
//! Translates Jenkins records into Maestro records:
//! - `group_from_view` / `project_from_view`: two-field projections
//! - `composition_from_job`: composition skeleton plus one or two tasks
//! - `is_analysis_job`: the predicate gating the secondary Sonar task
//!
//! Deterministic and I/O-free; everything the task construction needs from
//! the outside world arrives pre-resolved in a [`TaskContext`].

use crate::destination::{Composition, Group, JenkinsTask, Project, SonarTask, TaskValue};
use crate::error::MapError;
use crate::jobconfig::JobConfig;
use crate::source::{Job, View};
use once_cell::sync::Lazy;
use regex::Regex;

/// Maximum length of a destination description, in code points.
const MAX_DESCRIPTION_LEN: usize = 255;

static HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));

/// Inline Jenkins connection parameters, used when no external Jenkins
/// source is registered in the destination.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JenkinsConnection {
    pub host: String,
    pub port: u16,
    pub web_path: String,
    pub username: String,
    pub password: String,
    pub use_ssl: bool,
}

/// Inline Sonar connection parameters, used when no external Sonar source
/// is registered in the destination.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SonarConnection {
    pub url: String,
    pub username: String,
    pub password: String,
}

/// Everything task construction needs, resolved once per run by the engine.
#[derive(Debug, Clone, Default)]
pub struct TaskContext {
    /// Destination task-type id for the Jenkins task.
    pub jenkins_task_id: u64,
    /// Destination task-type id for the Sonar task, when registered.
    pub sonar_task_id: Option<u64>,
    /// Resolved external Jenkins source id, preferred over inline
    /// connection parameters.
    pub jenkins_source: Option<u64>,
    /// Resolved external Sonar source id, preferred over inline
    /// connection parameters.
    pub sonar_source: Option<u64>,
    /// Inline Jenkins connection.
    pub jenkins: JenkinsConnection,
    /// Inline Sonar connection, if configured.
    pub sonar: Option<SonarConnection>,
}

/// Project a view onto a Maestro group: name and description, nothing else.
#[must_use]
pub fn group_from_view(view: &View) -> Group {
    Group::new(&view.name, view.description.clone().unwrap_or_default())
}

/// Project a view onto a Maestro project: name and sanitized description.
#[must_use]
pub fn project_from_view(view: &View) -> Project {
    Project::new(
        &view.name,
        sanitize_description(view.description.as_deref(), &view.name),
    )
}

/// Whether the job's configuration marks it as Sonar-analyzed.
///
/// Requires all three of: the Sonar publisher element, a root-module group
/// id and a root-module artifact id. Anything less and the job is treated
/// as a plain build job.
#[must_use]
pub fn is_analysis_job(config: &JobConfig) -> bool {
    config.has_sonar_publisher() && config.maven_coordinates().is_some()
}

/// Build the composition for a job: fixed skeleton, primary Jenkins task,
/// and a secondary Sonar task when [`is_analysis_job`] holds.
pub fn composition_from_job(
    job: &Job,
    config: &JobConfig,
    ctx: &TaskContext,
) -> Result<Composition, MapError> {
    let mut composition = Composition::new(&job.name, job.description.clone().unwrap_or_default());

    let primary_key = format!("task_{}_1", ctx.jenkins_task_id);
    composition
        .values
        .insert(primary_key, TaskValue::Jenkins(jenkins_task(job, ctx)));

    if is_analysis_job(config) {
        let sonar_task_id = ctx
            .sonar_task_id
            .ok_or_else(|| MapError::MissingSonarTaskType(job.name.clone()))?;
        let secondary_key = format!("task_{sonar_task_id}_2");
        composition
            .values
            .insert(secondary_key, TaskValue::Sonar(sonar_task(job, config, ctx)?));
    }

    Ok(composition)
}

fn jenkins_task(job: &Job, ctx: &TaskContext) -> JenkinsTask {
    match ctx.jenkins_source {
        Some(source) => JenkinsTask {
            job: job.name.clone(),
            position: 1,
            source: source.to_string(),
            ..JenkinsTask::default()
        },
        None => JenkinsTask {
            host: ctx.jenkins.host.clone(),
            port: ctx.jenkins.port,
            job: job.name.clone(),
            username: ctx.jenkins.username.clone(),
            password: ctx.jenkins.password.clone(),
            scm_url: String::new(),
            use_ssl: ctx.jenkins.use_ssl,
            web_path: ctx.jenkins.web_path.clone(),
            override_existing: false,
            parameters: Vec::new(),
            label_axes: Vec::new(),
            steps: Vec::new(),
            position: 1,
            source: "-1".to_string(),
        },
    }
}

fn sonar_task(job: &Job, config: &JobConfig, ctx: &TaskContext) -> Result<SonarTask, MapError> {
    let (group_id, artifact_id) = config
        .maven_coordinates()
        .ok_or_else(|| MapError::MissingMavenCoordinates(job.name.clone()))?;
    let project_key = format!("{group_id}:{artifact_id}");

    if let Some(source) = ctx.sonar_source {
        return Ok(SonarTask {
            project_key,
            position: 2,
            source: source.to_string(),
            ..SonarTask::default()
        });
    }

    let sonar = ctx
        .sonar
        .as_ref()
        .filter(|s| !s.url.is_empty())
        .ok_or_else(|| MapError::MissingSonarEndpoint(job.name.clone()))?;
    Ok(SonarTask {
        url: sonar.url.clone(),
        username: sonar.username.clone(),
        password: sonar.password.clone(),
        project_key,
        position: 2,
        source: "-1".to_string(),
    })
}

/// Strip HTML, collapse surrounding whitespace and cap at 255 code points;
/// fall back to `fallback` when nothing is left.
#[must_use]
pub fn sanitize_description(raw: Option<&str>, fallback: &str) -> String {
    let stripped = match raw {
        Some(text) => HTML_TAG.replace_all(text, "").trim().to_string(),
        None => String::new(),
    };
    let base = if stripped.is_empty() {
        fallback.to_string()
    } else {
        stripped
    };
    base.chars().take(MAX_DESCRIPTION_LEN).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{JobRef, ViewSummary};
    use pretty_assertions::assert_eq;

    const SONAR_CONFIG: &str = r#"<maven2-moduleset>
  <rootModule>
    <groupId>com.example</groupId>
    <artifactId>app</artifactId>
  </rootModule>
  <publishers>
    <hudson.plugins.sonar.SonarPublisher/>
  </publishers>
</maven2-moduleset>"#;

    const PLAIN_CONFIG: &str = "<project><publishers/></project>";

    fn view() -> View {
        View {
            name: "Group View".to_string(),
            description: Some("A group.".to_string()),
            views: vec![ViewSummary {
                name: "Project View".to_string(),
            }],
            jobs: vec![JobRef {
                name: "Test Job".to_string(),
            }],
        }
    }

    fn inline_ctx() -> TaskContext {
        TaskContext {
            jenkins_task_id: 27,
            sonar_task_id: Some(31),
            jenkins: JenkinsConnection {
                host: "localhost".to_string(),
                port: 8080,
                web_path: "/".to_string(),
                username: "username".to_string(),
                password: "password".to_string(),
                use_ssl: false,
            },
            sonar: Some(SonarConnection {
                url: "http://sonar:9000".to_string(),
                username: "sonar".to_string(),
                password: "sonar".to_string(),
            }),
            ..TaskContext::default()
        }
    }

    #[test]
    fn group_projection_keeps_exactly_name_and_description() {
        let group = group_from_view(&view());
        assert_eq!(group.name, "Group View");
        assert_eq!(group.description, "A group.");
        assert_eq!(group.id, None);
        assert!(group.projects.is_empty());
    }

    #[test]
    fn project_projection_sanitizes_description() {
        let mut v = view();
        v.description = Some("<b>Bold</b> description".to_string());
        let project = project_from_view(&v);
        assert_eq!(project.description, "Bold description");
    }

    #[test]
    fn project_description_defaults_to_name() {
        let mut v = view();
        v.description = None;
        let project = project_from_view(&v);
        assert_eq!(project.description, "Group View");
    }

    #[test]
    fn analysis_predicate_needs_all_three_markers() {
        assert!(is_analysis_job(&JobConfig::parse(SONAR_CONFIG).unwrap()));
        assert!(!is_analysis_job(&JobConfig::parse(PLAIN_CONFIG).unwrap()));
        // Publisher without coordinates is not an analysis job.
        let no_coords = "<project><publishers><hudson.plugins.sonar.SonarPublisher/></publishers></project>";
        assert!(!is_analysis_job(&JobConfig::parse(no_coords).unwrap()));
        // Coordinates without publisher is not an analysis job either.
        let no_publisher = "<project><rootModule><groupId>g</groupId><artifactId>a</artifactId></rootModule></project>";
        assert!(!is_analysis_job(&JobConfig::parse(no_publisher).unwrap()));
    }

    #[test]
    fn plain_job_maps_to_single_primary_task() {
        let job = Job {
            name: "Test Job".to_string(),
            description: Some("Project View Description".to_string()),
        };
        let config = JobConfig::parse(PLAIN_CONFIG).unwrap();
        let composition = composition_from_job(&job, &config, &inline_ctx()).unwrap();

        assert_eq!(composition.name, "Test Job");
        assert_eq!(composition.values.len(), 1);
        let (key, task) = composition.values.first().unwrap();
        assert_eq!(key, "task_27_1");
        match task {
            TaskValue::Jenkins(t) => {
                assert_eq!(t.host, "localhost");
                assert_eq!(t.port, 8080);
                assert_eq!(t.job, "Test Job");
                assert_eq!(t.position, 1);
                assert_eq!(t.source, "-1");
            }
            TaskValue::Sonar(_) => panic!("expected a jenkins task"),
        }
    }

    #[test]
    fn analysis_job_maps_to_two_tasks_in_order() {
        let job = Job {
            name: "Maven Job".to_string(),
            description: None,
        };
        let config = JobConfig::parse(SONAR_CONFIG).unwrap();
        let composition = composition_from_job(&job, &config, &inline_ctx()).unwrap();

        assert_eq!(composition.values.len(), 2);
        let keys: Vec<_> = composition.values.keys().cloned().collect();
        assert_eq!(keys, vec!["task_27_1", "task_31_2"]);
        let positions: Vec<_> = composition.values.values().map(TaskValue::position).collect();
        assert_eq!(positions, vec![1, 2]);
        match &composition.values["task_31_2"] {
            TaskValue::Sonar(t) => {
                assert_eq!(t.project_key, "com.example:app");
                assert_eq!(t.url, "http://sonar:9000");
                assert_eq!(t.source, "-1");
            }
            TaskValue::Jenkins(_) => panic!("expected a sonar task"),
        }
    }

    #[test]
    fn source_reference_replaces_inline_parameters() {
        let job = Job {
            name: "Maven Job".to_string(),
            description: None,
        };
        let config = JobConfig::parse(SONAR_CONFIG).unwrap();
        let ctx = TaskContext {
            jenkins_source: Some(5),
            sonar_source: Some(9),
            ..inline_ctx()
        };
        let composition = composition_from_job(&job, &config, &ctx).unwrap();
        match &composition.values["task_27_1"] {
            TaskValue::Jenkins(t) => {
                assert_eq!(t.source, "5");
                assert!(t.host.is_empty());
            }
            TaskValue::Sonar(_) => panic!("expected a jenkins task"),
        }
        match &composition.values["task_31_2"] {
            TaskValue::Sonar(t) => {
                assert_eq!(t.source, "9");
                assert!(t.url.is_empty());
            }
            TaskValue::Jenkins(_) => panic!("expected a sonar task"),
        }
    }

    #[test]
    fn missing_sonar_endpoint_is_fatal() {
        let job = Job {
            name: "Maven Job".to_string(),
            description: None,
        };
        let config = JobConfig::parse(SONAR_CONFIG).unwrap();
        let ctx = TaskContext {
            sonar: None,
            ..inline_ctx()
        };
        let err = composition_from_job(&job, &config, &ctx).unwrap_err();
        assert!(matches!(err, MapError::MissingSonarEndpoint(_)));
    }

    #[test]
    fn missing_sonar_task_type_is_fatal() {
        let job = Job {
            name: "Maven Job".to_string(),
            description: None,
        };
        let config = JobConfig::parse(SONAR_CONFIG).unwrap();
        let ctx = TaskContext {
            sonar_task_id: None,
            ..inline_ctx()
        };
        let err = composition_from_job(&job, &config, &ctx).unwrap_err();
        assert!(matches!(err, MapError::MissingSonarTaskType(_)));
    }

    #[test]
    fn sanitize_strips_tags_and_truncates() {
        assert_eq!(
            sanitize_description(Some("<p>Hello <b>world</b></p>"), "x"),
            "Hello world"
        );
        assert_eq!(sanitize_description(None, "Fallback"), "Fallback");
        assert_eq!(sanitize_description(Some("  <br/>  "), "Fallback"), "Fallback");
        let long = "a".repeat(300);
        assert_eq!(sanitize_description(Some(&long), "x").chars().count(), 255);
    }
}
