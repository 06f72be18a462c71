use std::path::Path;

use async_trait::async_trait;

use crate::auth::Token;
use crate::client::{CircleCiClient, RequestSpec};
use crate::error::Result;
use crate::types::{Artifact, Job, Page, Pipeline, Workflow};

/// The CircleCI reads and downloads the artifact locator needs.
#[async_trait]
pub trait ArtifactApi: Send + Sync {
    /// One page of the project's pipelines, newest first.
    async fn pipelines(&self, page_token: Option<&str>) -> Result<Page<Pipeline>>;

    async fn workflows(&self, pipeline_id: &str) -> Result<Vec<Workflow>>;

    async fn jobs(&self, workflow_id: &str) -> Result<Vec<Job>>;

    async fn artifacts(&self, job_number: u64) -> Result<Vec<Artifact>>;

    /// Write the artifact at `url` to `destination`, returning the byte count.
    async fn download(&self, url: &str, destination: &Path) -> Result<u64>;
}

/// [`ArtifactApi`] backed by the v2 REST API of one project.
pub struct CircleCiArtifactApi<'a> {
    client: &'a CircleCiClient,
    token: Token,
    project_slug: String,
}

impl<'a> CircleCiArtifactApi<'a> {
    pub fn new(client: &'a CircleCiClient, token: Token, project_slug: impl Into<String>) -> Self {
        Self {
            client,
            token,
            project_slug: project_slug.into(),
        }
    }

    async fn items<T>(&self, path: String) -> Result<Vec<T>>
    where
        T: serde::de::DeserializeOwned,
    {
        let page: Page<T> = self
            .client
            .fetch(&RequestSpec::get(path, self.token.clone()))
            .await?;
        Ok(page.items)
    }
}

#[async_trait]
impl ArtifactApi for CircleCiArtifactApi<'_> {
    async fn pipelines(&self, page_token: Option<&str>) -> Result<Page<Pipeline>> {
        let mut request = RequestSpec::get(
            format!("project/{}/pipeline", self.project_slug),
            self.token.clone(),
        );
        if let Some(page_token) = page_token {
            request = request.query("page-token", page_token);
        }
        self.client.fetch(&request).await
    }

    async fn workflows(&self, pipeline_id: &str) -> Result<Vec<Workflow>> {
        self.items(format!("pipeline/{pipeline_id}/workflow")).await
    }

    async fn jobs(&self, workflow_id: &str) -> Result<Vec<Job>> {
        self.items(format!("workflow/{workflow_id}/job")).await
    }

    async fn artifacts(&self, job_number: u64) -> Result<Vec<Artifact>> {
        self.items(format!("project/{}/{job_number}/artifacts", self.project_slug))
            .await
    }

    async fn download(&self, url: &str, destination: &Path) -> Result<u64> {
        self.client
            .download(url, Some(&self.token), destination)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;
    use mockito::Matcher;

    fn client_for(server: &mockito::ServerGuard) -> CircleCiClient {
        let config = ApiConfig {
            base_url: server.url(),
            ..ApiConfig::default()
        };
        CircleCiClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_pipelines_passes_page_token() {
        let mut server = mockito::Server::new_async().await;
        let client = client_for(&server);

        let mock = server
            .mock("GET", "/project/gh/acme/app/pipeline")
            .match_query(Matcher::UrlEncoded("page-token".into(), "next-1".into()))
            .match_header("Circle-Token", "tok")
            .with_status(200)
            .with_body(
                r#"{"items":[{"id":"p1","number":5,"state":"created","vcs":{"branch":"main"}}],"next_page_token":null}"#,
            )
            .create_async()
            .await;

        let api = CircleCiArtifactApi::new(&client, Token::from("tok"), "gh/acme/app");
        let page = api.pipelines(Some("next-1")).await.unwrap();

        mock.assert_async().await;
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].branch(), Some("main"));
        assert!(page.next_page_token.is_none());
    }

    #[tokio::test]
    async fn test_artifacts_lists_items_for_job_number() {
        let mut server = mockito::Server::new_async().await;
        let client = client_for(&server);

        let mock = server
            .mock("GET", "/project/gh/acme/app/118/artifacts")
            .with_status(200)
            .with_body(
                r#"{"items":[{"path":"results.json","url":"https://example.com/results.json","node_index":0}],"next_page_token":null}"#,
            )
            .create_async()
            .await;

        let api = CircleCiArtifactApi::new(&client, Token::from("tok"), "gh/acme/app");
        let artifacts = api.artifacts(118).await.unwrap();

        mock.assert_async().await;
        assert_eq!(artifacts.len(), 1);
        assert_eq!(artifacts[0].path, "results.json");
    }
}
