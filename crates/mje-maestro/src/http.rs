//! Reqwest-backed Maestro client
//!
//! Session-cookie authentication against the Spring security endpoint,
//! then JSON resource calls under the API path. The session is obtained
//! lazily on first need and reused for the rest of the run.

use crate::client::MaestroClient;
use crate::error::MaestroError;
use async_trait::async_trait;
use mje_model::{Composition, ExternalSource, Group, Project, Role};
use reqwest::{header, Client, RequestBuilder, StatusCode, Url};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Connection parameters for the Maestro server.
#[derive(Debug, Clone, Default)]
pub struct MaestroConnection {
    /// Server base URL, e.g. `http://maestro:8888`.
    pub base_url: String,
    /// API path under the base, e.g. `/api/v1`.
    pub api_path: String,
    pub username: String,
    pub password: String,
}

/// Maestro client over HTTP(S) with cookie-session authentication.
#[derive(Debug)]
pub struct HttpMaestroClient {
    base_url: Url,
    api_url: Url,
    username: String,
    password: String,
    http: Client,
    /// Lazily-established session flag; the cookie itself lives in the
    /// client's cookie jar.
    session: Mutex<bool>,
}

#[derive(Debug, Deserialize)]
struct TaskEntry {
    id: u64,
    name: String,
}

#[derive(Debug, Deserialize)]
struct SourceEntry {
    id: u64,
    name: String,
    #[serde(default, rename = "type")]
    kind: String,
}

impl HttpMaestroClient {
    /// Build a client from connection parameters.
    pub fn new(conn: &MaestroConnection) -> Result<Self, MaestroError> {
        let base_url = Url::parse(conn.base_url.trim_end_matches('/'))
            .map_err(|e| MaestroError::BadUrl(e.to_string()))?;
        let api_raw = format!(
            "{}/{}/",
            conn.base_url.trim_end_matches('/'),
            conn.api_path.trim_matches('/')
        );
        let api_url = Url::parse(&api_raw).map_err(|e| MaestroError::BadUrl(e.to_string()))?;
        let http = Client::builder()
            .cookie_store(true)
            .build()
            .map_err(MaestroError::Http)?;
        Ok(Self {
            base_url,
            api_url,
            username: conn.username.clone(),
            password: conn.password.clone(),
            http,
            session: Mutex::new(false),
        })
    }

    /// Authenticate once per run; the cookie jar keeps the session.
    async fn ensure_session(&self) -> Result<(), MaestroError> {
        let mut logged_in = self.session.lock().await;
        if *logged_in {
            return Ok(());
        }
        let url = self
            .base_url
            .join("j_spring_security_check")
            .map_err(|e| MaestroError::BadUrl(e.to_string()))?;
        debug!(%url, "maestro login");
        let response = self
            .http
            .post(url)
            .form(&[
                ("j_username", self.username.as_str()),
                ("j_password", self.password.as_str()),
            ])
            .send()
            .await?;
        let status = response.status();
        if !(status.is_success() || status.is_redirection()) {
            return Err(MaestroError::Login { status });
        }
        *logged_in = true;
        Ok(())
    }

    /// URL under the API path, with every segment percent-encoded.
    fn resource(&self, segments: &[&str]) -> Result<Url, MaestroError> {
        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .map_err(|()| MaestroError::BadUrl("api url cannot have segments".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: Url,
    ) -> Result<Option<T>, MaestroError> {
        self.ensure_session().await?;
        let response = self.http.get(url.clone()).send().await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => Ok(Some(response.json().await?)),
            status => Err(MaestroError::Status {
                status,
                url: url.to_string(),
            }),
        }
    }

    fn json_post<T: serde::Serialize>(&self, url: Url, body: &T) -> RequestBuilder {
        self.http
            .post(url)
            .header(header::CONTENT_TYPE, "application/json")
            .json(body)
    }
}

#[async_trait]
impl MaestroClient for HttpMaestroClient {
    async fn find_group_by_name(&self, name: &str) -> Result<Option<Group>, MaestroError> {
        let url = self.resource(&["groups", name])?;
        let group: Option<Group> = self.get_json(url).await?;
        Ok(group.filter(|g| g.name == name))
    }

    async fn create_group(&self, group: &Group) -> Result<Group, MaestroError> {
        self.ensure_session().await?;
        let url = self.resource(&["groups"])?;
        let response = self.json_post(url.clone(), group).send().await?;
        match response.status() {
            StatusCode::CONFLICT => {
                // Created concurrently; the find path is equivalent.
                self.find_group_by_name(&group.name)
                    .await?
                    .ok_or_else(|| MaestroError::Conflict(format!("group '{}'", group.name)))
            }
            status if status.is_success() => Ok(response.json().await?),
            status => Err(MaestroError::Status {
                status,
                url: url.to_string(),
            }),
        }
    }

    async fn find_project_by_name(&self, name: &str) -> Result<Option<Project>, MaestroError> {
        let url = self.resource(&["projects", name])?;
        let project: Option<Project> = self.get_json(url).await?;
        Ok(project.filter(|p| p.name == name))
    }

    async fn create_project(&self, project: &Project) -> Result<Project, MaestroError> {
        self.ensure_session().await?;
        let url = self.resource(&["projects"])?;
        let response = self.json_post(url.clone(), project).send().await?;
        match response.status() {
            StatusCode::CONFLICT => self
                .find_project_by_name(&project.name)
                .await?
                .ok_or_else(|| MaestroError::Conflict(format!("project '{}'", project.name))),
            status if status.is_success() => Ok(response.json().await?),
            status => Err(MaestroError::Status {
                status,
                url: url.to_string(),
            }),
        }
    }

    async fn add_project_to_group(
        &self,
        project: &Project,
        group: &mut Group,
    ) -> Result<(), MaestroError> {
        if group.contains_project(project) {
            debug!(project = %project.name, group = %group.name, "already associated");
            return Ok(());
        }
        let group_id = group
            .id
            .ok_or_else(|| MaestroError::MissingId(format!("group '{}'", group.name)))?;
        let project_id = project
            .id
            .ok_or_else(|| MaestroError::MissingId(format!("project '{}'", project.name)))?;
        self.ensure_session().await?;
        let url = self.resource(&[
            "groups",
            &group_id.to_string(),
            "projects",
            &project_id.to_string(),
        ])?;
        let response = self.http.post(url.clone()).body("").send().await?;
        let status = response.status();
        if !(status.is_success() || status == StatusCode::CONFLICT) {
            return Err(MaestroError::Status {
                status,
                url: url.to_string(),
            });
        }
        group.projects.push(project.clone());
        Ok(())
    }

    async fn add_composition(
        &self,
        project: &Project,
        composition: &Composition,
    ) -> Result<(), MaestroError> {
        let project_id = project
            .id
            .ok_or_else(|| MaestroError::MissingId(format!("project '{}'", project.name)))?;
        self.ensure_session().await?;

        // Phase one: the composition shell, values withheld (the server
        // rejects task values embedded in the create payload).
        let mut url = self.resource(&["projects", &project_id.to_string(), "compositions"])?;
        url.set_query(Some("templateId=-1"));
        let response = self
            .json_post(url.clone(), &composition.without_values())
            .send()
            .await?;
        let status = response.status();
        if status == StatusCode::CONFLICT {
            return Err(MaestroError::Conflict(format!(
                "composition '{}'",
                composition.name
            )));
        }
        if !status.is_success() {
            return Err(MaestroError::Status {
                status,
                url: url.to_string(),
            });
        }
        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| MaestroError::MissingLocation(composition.name.clone()))?;

        // Phase two: save the tasks against the created composition.
        let save_url = self
            .base_url
            .join(&format!("{}/tasks/save", location.trim_end_matches('/')))
            .map_err(|e| MaestroError::BadUrl(e.to_string()))?;
        let response = self.json_post(save_url.clone(), composition).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(MaestroError::Status {
                status,
                url: save_url.to_string(),
            });
        }
        Ok(())
    }

    async fn find_task_id_by_name(&self, name: &str) -> Result<Option<u64>, MaestroError> {
        let url = self.resource(&["tasks"])?;
        let tasks: Option<Vec<TaskEntry>> = self.get_json(url).await?;
        Ok(tasks
            .unwrap_or_default()
            .into_iter()
            .find(|t| t.name == name)
            .map(|t| t.id))
    }

    async fn find_source(
        &self,
        source_type: &str,
        name: &str,
    ) -> Result<Option<ExternalSource>, MaestroError> {
        let url = self.resource(&["sources"])?;
        let sources: Option<Vec<SourceEntry>> = self.get_json(url).await?;
        Ok(sources
            .unwrap_or_default()
            .into_iter()
            .find(|s| s.kind.eq_ignore_ascii_case(source_type) && s.name == name)
            .map(|s| ExternalSource {
                id: s.id,
                name: s.name,
            }))
    }

    async fn create_roles(&self, roles: &[Role]) -> Result<(), MaestroError> {
        self.ensure_session().await?;
        let url = self.resource(&["roles"])?;
        let response = self.json_post(url.clone(), &roles).send().await?;
        let status = response.status();
        if status == StatusCode::CONFLICT {
            info!("roles already exist, skipping");
            return Ok(());
        }
        if !status.is_success() {
            return Err(MaestroError::Status {
                status,
                url: url.to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> HttpMaestroClient {
        HttpMaestroClient::new(&MaestroConnection {
            base_url: "http://localhost:8888".to_string(),
            api_path: "/api/v1".to_string(),
            username: "admin".to_string(),
            password: "admin1".to_string(),
        })
        .unwrap()
    }

    #[test]
    fn resource_urls_under_api_path() {
        let c = client();
        let url = c.resource(&["groups", "Group View"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8888/api/v1/groups/Group%20View");
    }

    #[test]
    fn association_url_shape() {
        let c = client();
        let url = c.resource(&["groups", "3", "projects", "7"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8888/api/v1/groups/3/projects/7");
    }

    #[test]
    fn source_entries_deserialize_with_type_key() {
        let json = r#"[{"id": 4, "name": "Build Jenkins", "type": "jenkins"}]"#;
        let sources: Vec<SourceEntry> = serde_json::from_str(json).unwrap();
        assert_eq!(sources[0].id, 4);
        assert_eq!(sources[0].kind, "jenkins");
    }
}
