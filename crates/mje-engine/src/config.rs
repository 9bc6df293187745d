//! Export run configuration
//!
//! Deserialized from the TOML config file by the binary. Validation that
//! depends on what the source actually contains (e.g. the Sonar endpoint)
//! happens at mapping time, not load time.

use mje_model::{JenkinsConnection, SonarConnection};
use serde::Deserialize;

/// Full configuration for one export run.
#[derive(Debug, Clone, Deserialize)]
pub struct ExporterConfig {
    /// Jenkins connection.
    pub jenkins: JenkinsSettings,
    /// Maestro connection and lookup names.
    pub maestro: MaestroSettings,
    /// Inline Sonar connection, used when no Sonar source is registered.
    #[serde(default)]
    pub sonar: Option<SonarSettings>,
    /// Notification plugin settings.
    #[serde(default)]
    pub notification: NotificationSettings,
    /// Role name templates.
    #[serde(default)]
    pub roles: RoleSettings,
}

/// Jenkins connection parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct JenkinsSettings {
    pub host: String,
    #[serde(default = "default_jenkins_port")]
    pub port: u16,
    #[serde(default = "default_web_path")]
    pub path: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub ssl: bool,
}

impl JenkinsSettings {
    /// The connection record the client and the mapper share.
    #[must_use]
    pub fn connection(&self) -> JenkinsConnection {
        JenkinsConnection {
            host: self.host.clone(),
            port: self.port,
            web_path: self.path.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            use_ssl: self.ssl,
        }
    }
}

/// Maestro connection parameters and per-run lookup names.
#[derive(Debug, Clone, Deserialize)]
pub struct MaestroSettings {
    pub base_url: String,
    #[serde(default = "default_api_path")]
    pub api_path: String,
    pub username: String,
    pub password: String,
    /// Name of a registered Jenkins source, preferred over inline
    /// connection parameters in the primary task.
    #[serde(default)]
    pub jenkins_source: Option<String>,
    /// Name of a registered Sonar source, preferred over the `[sonar]`
    /// section in the secondary task.
    #[serde(default)]
    pub sonar_source: Option<String>,
    /// Registered name of the Jenkins task type.
    #[serde(default = "default_jenkins_task")]
    pub jenkins_task: String,
    /// Registered name of the Sonar task type.
    #[serde(default = "default_sonar_task")]
    pub sonar_task: String,
}

/// Inline Sonar connection.
#[derive(Debug, Clone, Deserialize)]
pub struct SonarSettings {
    pub url: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl SonarSettings {
    /// The connection record the mapper consumes.
    #[must_use]
    pub fn connection(&self) -> SonarConnection {
        SonarConnection {
            url: self.url.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
        }
    }
}

/// Notification plugin settings.
#[derive(Debug, Clone, Deserialize)]
pub struct NotificationSettings {
    /// Version attribute stamped on the injected property element.
    #[serde(default = "default_plugin_version")]
    pub plugin_version: String,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            plugin_version: default_plugin_version(),
        }
    }
}

/// Role name templates; `{group}` expands to the normalized group name.
#[derive(Debug, Clone, Deserialize)]
pub struct RoleSettings {
    #[serde(default = "default_developer_template")]
    pub developer_template: String,
    #[serde(default = "default_user_template")]
    pub user_template: String,
}

impl Default for RoleSettings {
    fn default() -> Self {
        Self {
            developer_template: default_developer_template(),
            user_template: default_user_template(),
        }
    }
}

fn default_jenkins_port() -> u16 {
    8080
}

fn default_web_path() -> String {
    "/".to_string()
}

fn default_api_path() -> String {
    "/api/v1".to_string()
}

fn default_jenkins_task() -> String {
    "jenkins plugin".to_string()
}

fn default_sonar_task() -> String {
    "sonar plugin".to_string()
}

fn default_plugin_version() -> String {
    "1.5".to_string()
}

fn default_developer_template() -> String {
    "{group}-developers".to_string()
}

fn default_user_template() -> String {
    "{group}-users".to_string()
}
