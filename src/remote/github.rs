use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use url::Url;

use super::{CreateRepositoryOptions, Identity, RemoteError, RemoteService, RepositoryMetadata};
use crate::config::Config;
use crate::log_debug;

const GITHUB_ACCEPT: &str = "application/vnd.github+json";
const GITHUB_API_VERSION: &str = "2022-11-28";

/// GitHub REST API client
#[derive(Clone, Debug)]
pub struct GitHubClient {
    http: Client,
    api_url: String,
    git_host: String,
    user_agent: String,
}

#[derive(Deserialize)]
struct RepoResponse {
    name: String,
    owner: Identity,
    default_branch: Option<String>,
}

/// Body of `POST /user/repos`
#[derive(Serialize)]
struct CreateRepoRequest<'a> {
    name: &'a str,
    #[serde(flatten)]
    options: &'a CreateRepositoryOptions,
}

#[derive(Deserialize)]
struct ErrorResponse {
    message: Option<String>,
}

impl GitHubClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: Client::new(),
            api_url: config.api_url.clone(),
            git_host: config.git_host.clone(),
            user_agent: config.user_agent.clone(),
        }
    }

    /// HTTPS clone URL for a repository on the configured host
    pub fn clone_url(&self, owner: &str, name: &str) -> String {
        format!("https://{}/{}/{}.git", self.git_host, owner, name)
    }

    fn endpoint(&self, path: &str) -> Result<Url, RemoteError> {
        Ok(Url::parse(&format!("{}/{}", self.api_url, path))?)
    }

    fn headers(&self, token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_ACCEPT));
        headers.insert(
            "x-github-api-version",
            HeaderValue::from_static(GITHUB_API_VERSION),
        );
        if let Ok(value) = HeaderValue::from_str(&self.user_agent) {
            headers.insert(USER_AGENT, value);
        }
        if let Ok(mut value) = HeaderValue::from_str(&format!("Bearer {token}")) {
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }
        headers
    }

    /// Turn a non-success response into a `RemoteError`
    async fn check(response: Response) -> Result<Response, RemoteError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::NOT_FOUND {
            return Err(RemoteError::NotFound);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&body)
            .ok()
            .and_then(|e| e.message)
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("Unexpected response")
                    .to_string()
            });

        Err(RemoteError::Api {
            status: status.as_u16(),
            message,
        })
    }

    fn metadata_from(&self, repo: RepoResponse) -> RepositoryMetadata {
        RepositoryMetadata {
            clone_url: self.clone_url(&repo.owner.login, &repo.name),
            default_branch: repo.default_branch.unwrap_or_else(|| "main".to_string()),
            owner: repo.owner.login,
            name: repo.name,
        }
    }
}

#[async_trait]
impl RemoteService for GitHubClient {
    async fn authenticate(&self, token: &str) -> Result<Identity, RemoteError> {
        let url = self.endpoint("user")?;
        log_debug!("GET {}", url);

        let response = self.http.get(url).headers(self.headers(token)).send().await?;
        let identity: Identity = Self::check(response).await?.json().await?;

        log_debug!("Authenticated as: {}", identity.login);
        Ok(identity)
    }

    async fn get_repository(
        &self,
        token: &str,
        owner: &str,
        name: &str,
    ) -> Result<RepositoryMetadata, RemoteError> {
        let url = self.endpoint(&format!("repos/{owner}/{name}"))?;
        log_debug!("GET {}", url);

        let response = self.http.get(url).headers(self.headers(token)).send().await?;
        let repo: RepoResponse = Self::check(response).await?.json().await?;

        Ok(self.metadata_from(repo))
    }

    async fn create_repository(
        &self,
        token: &str,
        name: &str,
        options: &CreateRepositoryOptions,
    ) -> Result<RepositoryMetadata, RemoteError> {
        let url = self.endpoint("user/repos")?;
        log_debug!("POST {} (name={})", url, name);

        let body = CreateRepoRequest { name, options };
        let response = self
            .http
            .post(url)
            .headers(self.headers(token))
            .json(&body)
            .send()
            .await?;
        let repo: RepoResponse = Self::check(response).await?.json().await?;

        log_debug!("Repository created: {}/{}", repo.owner.login, repo.name);
        Ok(self.metadata_from(repo))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clone_url_uses_configured_host() {
        let client = GitHubClient::new(&Config::default().with_git_host("git.example.com"));
        assert_eq!(
            client.clone_url("octocat", "hello-world"),
            "https://git.example.com/octocat/hello-world.git"
        );
    }

    #[test]
    fn test_create_request_body_shape() {
        let options = CreateRepositoryOptions::default();
        let body = serde_json::to_value(CreateRepoRequest {
            name: "hello",
            options: &options,
        })
        .expect("serializable");
        assert_eq!(
            body,
            serde_json::json!({ "name": "hello", "auto_init": true, "private": false })
        );
    }

    #[test]
    fn test_authorization_header_is_sensitive() {
        let client = GitHubClient::new(&Config::default());
        let headers = client.headers("secret-token");
        let auth = headers.get(AUTHORIZATION).expect("authorization header");
        assert!(auth.is_sensitive());
        assert_eq!(auth.to_str().expect("ascii"), "Bearer secret-token");
        assert_eq!(
            headers.get(ACCEPT).and_then(|v| v.to_str().ok()),
            Some(GITHUB_ACCEPT)
        );
    }
}
