//! Reqwest-backed Jenkins client
//!
//! Talks to the Jenkins JSON API (`.../api/json`) for views and jobs and
//! to the raw `config.xml` endpoints for job configuration.

use crate::client::JenkinsClient;
use crate::error::JenkinsError;
use async_trait::async_trait;
use mje_model::{Job, JobConfig, JenkinsConnection, View, ViewSummary};
use reqwest::{Client, RequestBuilder, Url};
use serde::Deserialize;
use tracing::debug;

/// Jenkins client over HTTP(S) with basic authentication.
#[derive(Debug, Clone)]
pub struct HttpJenkinsClient {
    base_url: Url,
    username: String,
    password: String,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct ViewsResponse {
    #[serde(default)]
    views: Vec<ViewSummary>,
}

#[derive(Debug, Deserialize)]
struct JobsResponse {
    #[serde(default)]
    jobs: Vec<NamedEntry>,
}

#[derive(Debug, Deserialize)]
struct NamedEntry {
    name: String,
}

impl HttpJenkinsClient {
    /// Build a client from connection parameters.
    pub fn new(conn: &JenkinsConnection) -> Result<Self, JenkinsError> {
        let scheme = if conn.use_ssl { "https" } else { "http" };
        let path = conn.web_path.trim_matches('/');
        let raw = if path.is_empty() {
            format!("{scheme}://{}:{}/", conn.host, conn.port)
        } else {
            format!("{scheme}://{}:{}/{path}/", conn.host, conn.port)
        };
        let base_url = Url::parse(&raw).map_err(|e| JenkinsError::BadUrl(e.to_string()))?;
        Ok(Self {
            base_url,
            username: conn.username.clone(),
            password: conn.password.clone(),
            http: Client::new(),
        })
    }

    /// URL under the base, with every segment percent-encoded.
    fn url(&self, segments: &[&str]) -> Result<Url, JenkinsError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| JenkinsError::BadUrl("base url cannot have segments".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authed(&self, builder: RequestBuilder) -> RequestBuilder {
        if self.username.is_empty() {
            builder
        } else {
            builder.basic_auth(&self.username, Some(&self.password))
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: Url) -> Result<T, JenkinsError> {
        debug!(%url, "jenkins GET");
        let response = self.authed(self.http.get(url.clone())).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(JenkinsError::Status {
                status,
                url: url.to_string(),
            });
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl JenkinsClient for HttpJenkinsClient {
    async fn list_views(&self) -> Result<Vec<ViewSummary>, JenkinsError> {
        let mut url = self.url(&["api", "json"])?;
        url.set_query(Some("tree=views[name]"));
        let response: ViewsResponse = self.get_json(url).await?;
        Ok(response.views)
    }

    async fn get_view(&self, name: &str, parent: Option<&str>) -> Result<View, JenkinsError> {
        let url = match parent {
            Some(parent) => self.url(&["view", parent, "view", name, "api", "json"])?,
            None => self.url(&["view", name, "api", "json"])?,
        };
        self.get_json(url).await
    }

    async fn list_all_job_names(&self) -> Result<Vec<String>, JenkinsError> {
        let mut url = self.url(&["api", "json"])?;
        url.set_query(Some("tree=jobs[name]"));
        let response: JobsResponse = self.get_json(url).await?;
        Ok(response.jobs.into_iter().map(|j| j.name).collect())
    }

    async fn get_job(&self, name: &str) -> Result<Job, JenkinsError> {
        let url = self.url(&["job", name, "api", "json"])?;
        self.get_json(url).await
    }

    async fn get_job_config(&self, name: &str) -> Result<JobConfig, JenkinsError> {
        let url = self.url(&["job", name, "config.xml"])?;
        debug!(%url, "jenkins GET config.xml");
        let response = self.authed(self.http.get(url.clone())).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(JenkinsError::Status {
                status,
                url: url.to_string(),
            });
        }
        let xml = response.text().await?;
        JobConfig::parse(&xml).map_err(|source| JenkinsError::BadConfig {
            job: name.to_string(),
            source,
        })
    }

    async fn replace_job_config(
        &self,
        name: &str,
        config: &JobConfig,
    ) -> Result<(), JenkinsError> {
        let url = self.url(&["job", name, "config.xml"])?;
        debug!(%url, "jenkins POST config.xml");
        let response = self
            .authed(self.http.post(url.clone()))
            .header(reqwest::header::CONTENT_TYPE, "application/xml")
            .body(config.as_xml().to_string())
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(JenkinsError::Status {
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

    fn client() -> HttpJenkinsClient {
        HttpJenkinsClient::new(&JenkinsConnection {
            host: "localhost".to_string(),
            port: 8080,
            web_path: "/".to_string(),
            username: "username".to_string(),
            password: "password".to_string(),
            use_ssl: false,
        })
        .unwrap()
    }

    #[test]
    fn base_url_from_connection() {
        let c = client();
        assert_eq!(c.base_url.as_str(), "http://localhost:8080/");
    }

    #[test]
    fn base_url_with_web_path_and_ssl() {
        let c = HttpJenkinsClient::new(&JenkinsConnection {
            host: "ci.example.com".to_string(),
            port: 443,
            web_path: "/jenkins".to_string(),
            use_ssl: true,
            ..JenkinsConnection::default()
        })
        .unwrap();
        let url = c.url(&["api", "json"]).unwrap();
        assert_eq!(url.as_str(), "https://ci.example.com/jenkins/api/json");
    }

    #[test]
    fn view_segments_are_percent_encoded() {
        let c = client();
        let url = c
            .url(&["view", "Group View", "view", "Project View", "api", "json"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/view/Group%20View/view/Project%20View/api/json"
        );
    }

    #[test]
    fn config_xml_url_shape() {
        let c = client();
        let url = c.url(&["job", "Test Job", "config.xml"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/job/Test%20Job/config.xml");
    }
}
