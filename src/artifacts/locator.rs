use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use super::api::ArtifactApi;
use crate::error::{CircleCiError, Result};
use crate::links::basename;
use crate::types::{Pipeline, Workflow};

/// Upper bound on pipeline pages searched for a matching workflow.
pub const MAX_PIPELINE_PAGES: usize = 10;

/// What to look for and where to put it.
#[derive(Debug, Clone)]
pub struct LocateRequest {
    pub branch: String,
    pub workflow_name: String,
    /// Keep only the job with exactly this name
    pub job_name: Option<String>,
    /// Allowed file extensions without the dot; `None` or empty keeps everything
    pub file_extensions: Option<Vec<String>>,
    pub destination_dir: PathBuf,
    /// Only accept a workflow whose status is `success`
    pub require_success: bool,
}

impl LocateRequest {
    fn accepts(&self, workflow: &Workflow) -> bool {
        workflow.name == self.workflow_name
            && (!self.require_success || workflow.status == "success")
    }

    fn keeps(&self, artifact_path: &str) -> bool {
        match &self.file_extensions {
            Some(allowed) if !allowed.is_empty() => extension_matches(artifact_path, allowed),
            _ => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadedArtifact {
    pub job_name: String,
    pub artifact_path: String,
    pub url: String,
    pub download_path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobArtifacts {
    pub job_name: String,
    pub job_number: u64,
    pub artifacts: Vec<DownloadedArtifact>,
}

/// Result of a workflow artifact download.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadSummary {
    pub workflow_id: String,
    pub workflow_name: String,
    pub pipeline_number: u64,
    pub pipeline_id: String,
    pub branch: String,
    pub total_artifacts: usize,
    /// Jobs that produced at least one downloaded artifact
    pub downloaded_artifacts: Vec<JobArtifacts>,
    pub destination_dir: String,
}

#[derive(Debug, Clone)]
pub struct WorkflowMatch {
    pub pipeline: Pipeline,
    pub workflow: Workflow,
}

/// Search recent pipelines for the first one on the requested branch that
/// ran the requested workflow.
///
/// Pipelines are visited in API order, following `next_page_token` for at
/// most [`MAX_PIPELINE_PAGES`] pages. The first accepted workflow ends the
/// search.
pub async fn find_workflow<A>(api: &A, request: &LocateRequest) -> Result<WorkflowMatch>
where
    A: ArtifactApi + ?Sized,
{
    let mut page_token: Option<String> = None;
    let mut branch_seen = false;

    for page_number in 1..=MAX_PIPELINE_PAGES {
        let page = api.pipelines(page_token.as_deref()).await?;
        debug!(
            "Pipeline page {page_number}: {} pipelines",
            page.items.len()
        );

        for pipeline in page.items {
            if pipeline.branch() != Some(request.branch.as_str()) {
                continue;
            }
            branch_seen = true;

            let workflows = api.workflows(&pipeline.id).await?;
            if let Some(workflow) = workflows.into_iter().find(|wf| request.accepts(wf)) {
                info!(
                    "Found workflow '{}' ({}) in pipeline #{}",
                    workflow.name, workflow.status, pipeline.number
                );
                return Ok(WorkflowMatch { pipeline, workflow });
            }
        }

        match page.next_page_token {
            Some(token) => page_token = Some(token),
            None => break,
        }
    }

    if !branch_seen {
        return Err(CircleCiError::NotFound(format!(
            "No pipelines found for branch '{}'",
            request.branch
        )));
    }

    let qualifier = if request.require_success {
        "successful "
    } else {
        ""
    };
    Err(CircleCiError::NotFound(format!(
        "No {qualifier}workflow named '{}' found on branch '{}'",
        request.workflow_name, request.branch
    )))
}

/// Locate the workflow, then download the artifacts of its jobs into
/// `{destination_dir}/{job_name}/{file name}`.
///
/// A failed artifact download is logged and skipped; every other error
/// aborts the run.
pub async fn download_workflow_artifacts<A>(
    api: &A,
    request: &LocateRequest,
) -> Result<DownloadSummary>
where
    A: ArtifactApi + ?Sized,
{
    let WorkflowMatch { pipeline, workflow } = find_workflow(api, request).await?;

    let mut jobs = api.jobs(&workflow.id).await?;
    if let Some(job_name) = &request.job_name {
        jobs.retain(|job| &job.name == job_name);
        if jobs.is_empty() {
            return Err(CircleCiError::NotFound(format!(
                "No job named '{job_name}' in workflow '{}'",
                workflow.name
            )));
        }
    }
    info!("Workflow '{}' has {} jobs", workflow.name, jobs.len());

    fs::create_dir_all(&request.destination_dir)?;

    let mut downloaded_artifacts = Vec::new();
    let mut total_artifacts = 0;

    for job in &jobs {
        let Some(job_number) = job.job_number else {
            debug!("Skipping job '{}': it has not run", job.name);
            continue;
        };

        let selected: Vec<_> = api
            .artifacts(job_number)
            .await?
            .into_iter()
            .filter(|artifact| request.keeps(&artifact.path))
            .collect();
        if selected.is_empty() {
            debug!("Job '{}' has no matching artifacts", job.name);
            continue;
        }

        let job_dir = request.destination_dir.join(&job.name);
        let mut artifacts = Vec::with_capacity(selected.len());

        for artifact in selected {
            let destination = job_dir.join(basename(&artifact.path));
            match api.download(&artifact.url, &destination).await {
                Ok(bytes) => {
                    info!("Downloaded {} ({bytes} bytes)", destination.display());
                    artifacts.push(DownloadedArtifact {
                        job_name: job.name.clone(),
                        artifact_path: artifact.path,
                        url: artifact.url,
                        download_path: destination.display().to_string(),
                    });
                }
                Err(e) => warn!("Failed to download artifact {}: {e}", artifact.path),
            }
        }

        if !artifacts.is_empty() {
            total_artifacts += artifacts.len();
            downloaded_artifacts.push(JobArtifacts {
                job_name: job.name.clone(),
                job_number,
                artifacts,
            });
        }
    }

    info!(
        "Downloaded {total_artifacts} artifacts to {}",
        request.destination_dir.display()
    );

    Ok(DownloadSummary {
        workflow_id: workflow.id,
        workflow_name: workflow.name,
        pipeline_number: pipeline.number,
        pipeline_id: pipeline.id,
        branch: request.branch.clone(),
        total_artifacts,
        downloaded_artifacts,
        destination_dir: request.destination_dir.display().to_string(),
    })
}

/// Case-insensitive comparison of the path's final extension.
fn extension_matches(path: &str, allowed: &[String]) -> bool {
    Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            allowed
                .iter()
                .any(|wanted| wanted.trim_start_matches('.').eq_ignore_ascii_case(ext))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Artifact, Job, Page, PipelineVcs};
    use async_trait::async_trait;
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;
    use tempfile::TempDir;

    #[derive(Default)]
    struct FakeApi {
        pages: Vec<Page<Pipeline>>,
        workflows: HashMap<String, Vec<Workflow>>,
        jobs: HashMap<String, Vec<Job>>,
        artifacts: HashMap<u64, Vec<Artifact>>,
        failing_urls: HashSet<String>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeApi {
        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ArtifactApi for FakeApi {
        async fn pipelines(&self, page_token: Option<&str>) -> Result<Page<Pipeline>> {
            self.record(format!("pipelines {}", page_token.unwrap_or("-")));
            let index = page_token
                .and_then(|token| token.strip_prefix("page-"))
                .map_or(0, |n| n.parse::<usize>().unwrap());
            Ok(self.pages.get(index).cloned().unwrap_or(Page {
                items: vec![],
                next_page_token: None,
            }))
        }

        async fn workflows(&self, pipeline_id: &str) -> Result<Vec<Workflow>> {
            self.record(format!("workflows {pipeline_id}"));
            Ok(self.workflows.get(pipeline_id).cloned().unwrap_or_default())
        }

        async fn jobs(&self, workflow_id: &str) -> Result<Vec<Job>> {
            self.record(format!("jobs {workflow_id}"));
            Ok(self.jobs.get(workflow_id).cloned().unwrap_or_default())
        }

        async fn artifacts(&self, job_number: u64) -> Result<Vec<Artifact>> {
            self.record(format!("artifacts {job_number}"));
            Ok(self.artifacts.get(&job_number).cloned().unwrap_or_default())
        }

        async fn download(&self, url: &str, destination: &Path) -> Result<u64> {
            self.record(format!("download {url}"));
            if self.failing_urls.contains(url) {
                return Err(CircleCiError::Api {
                    status: 500,
                    body: "boom".to_string(),
                });
            }
            fs::create_dir_all(destination.parent().unwrap())?;
            fs::write(destination, url)?;
            Ok(url.len() as u64)
        }
    }

    fn pipeline(id: &str, number: u64, branch: &str) -> Pipeline {
        Pipeline {
            id: id.to_string(),
            number,
            state: "created".to_string(),
            created_at: None,
            vcs: Some(PipelineVcs {
                branch: Some(branch.to_string()),
                revision: None,
            }),
        }
    }

    fn workflow(id: &str, name: &str, status: &str) -> Workflow {
        Workflow {
            id: id.to_string(),
            name: name.to_string(),
            status: status.to_string(),
            pipeline_id: None,
        }
    }

    fn job(name: &str, number: Option<u64>) -> Job {
        Job {
            name: name.to_string(),
            job_number: number,
            status: "success".to_string(),
            id: None,
        }
    }

    fn artifact(path: &str) -> Artifact {
        Artifact {
            path: path.to_string(),
            url: format!("https://artifacts.example.com/{path}"),
            node_index: Some(0),
        }
    }

    fn page(items: Vec<Pipeline>, next: Option<&str>) -> Page<Pipeline> {
        Page {
            items,
            next_page_token: next.map(str::to_string),
        }
    }

    fn request(dest: &Path) -> LocateRequest {
        LocateRequest {
            branch: "main".to_string(),
            workflow_name: "test".to_string(),
            job_name: None,
            file_extensions: None,
            destination_dir: dest.to_path_buf(),
            require_success: true,
        }
    }

    #[tokio::test]
    async fn test_first_matching_pipeline_wins_without_paging() {
        let mut api = FakeApi {
            pages: vec![page(
                vec![
                    pipeline("p1", 10, "main"),
                    pipeline("p2", 9, "main"),
                    pipeline("p3", 8, "main"),
                ],
                Some("page-1"),
            )],
            ..FakeApi::default()
        };
        api.workflows
            .insert("p1".into(), vec![workflow("w1", "build", "success")]);
        api.workflows
            .insert("p2".into(), vec![workflow("w2", "test", "success")]);
        api.workflows
            .insert("p3".into(), vec![workflow("w3", "test", "success")]);

        let temp_dir = TempDir::new().unwrap();
        let found = find_workflow(&api, &request(temp_dir.path())).await.unwrap();

        assert_eq!(found.pipeline.id, "p2");
        assert_eq!(found.workflow.id, "w2");
        assert_eq!(
            api.calls(),
            vec!["pipelines -", "workflows p1", "workflows p2"]
        );
    }

    #[tokio::test]
    async fn test_follows_page_token_and_requires_success() {
        let mut api = FakeApi {
            pages: vec![
                page(
                    vec![pipeline("p1", 3, "main"), pipeline("other", 2, "dev")],
                    Some("page-1"),
                ),
                page(vec![pipeline("p0", 1, "main")], None),
            ],
            ..FakeApi::default()
        };
        api.workflows
            .insert("p1".into(), vec![workflow("w1", "test", "failed")]);
        api.workflows
            .insert("p0".into(), vec![workflow("w0", "test", "success")]);

        let temp_dir = TempDir::new().unwrap();
        let found = find_workflow(&api, &request(temp_dir.path())).await.unwrap();

        assert_eq!(found.workflow.id, "w0");
        assert_eq!(
            api.calls(),
            vec!["pipelines -", "workflows p1", "pipelines page-1", "workflows p0"]
        );
    }

    #[tokio::test]
    async fn test_any_status_accepted_when_success_not_required() {
        let mut api = FakeApi {
            pages: vec![page(vec![pipeline("p1", 3, "main")], None)],
            ..FakeApi::default()
        };
        api.workflows
            .insert("p1".into(), vec![workflow("w1", "test", "failed")]);

        let temp_dir = TempDir::new().unwrap();
        let mut req = request(temp_dir.path());
        req.require_success = false;

        let found = find_workflow(&api, &req).await.unwrap();
        assert_eq!(found.workflow.status, "failed");
    }

    #[tokio::test]
    async fn test_no_pipeline_on_branch() {
        let api = FakeApi {
            pages: vec![page(vec![pipeline("p1", 1, "dev")], None)],
            ..FakeApi::default()
        };

        let temp_dir = TempDir::new().unwrap();
        let err = find_workflow(&api, &request(temp_dir.path()))
            .await
            .unwrap_err();

        assert!(matches!(err, CircleCiError::NotFound(_)));
        assert_eq!(err.to_string(), "No pipelines found for branch 'main'");
    }

    #[tokio::test]
    async fn test_search_stops_after_page_bound() {
        let pages = (0..15)
            .map(|i| {
                page(
                    vec![pipeline(&format!("p{i}"), i, "main")],
                    Some(format!("page-{}", i + 1).as_str()),
                )
            })
            .collect();
        let api = FakeApi {
            pages,
            ..FakeApi::default()
        };

        let temp_dir = TempDir::new().unwrap();
        let err = find_workflow(&api, &request(temp_dir.path()))
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "No successful workflow named 'test' found on branch 'main'"
        );
        let page_calls = api
            .calls()
            .iter()
            .filter(|call| call.starts_with("pipelines"))
            .count();
        assert_eq!(page_calls, MAX_PIPELINE_PAGES);
    }

    fn scenario_api() -> FakeApi {
        let mut api = FakeApi {
            pages: vec![page(vec![pipeline("p1", 42, "main")], None)],
            ..FakeApi::default()
        };
        api.workflows
            .insert("p1".into(), vec![workflow("w1", "test", "success")]);
        api.jobs.insert(
            "w1".into(),
            vec![job("A", Some(101)), job("B", Some(102)), job("hold", None)],
        );
        api.artifacts.insert(
            101,
            vec![artifact("results.json"), artifact("notes.txt")],
        );
        api
    }

    #[tokio::test]
    async fn test_downloads_filtered_artifacts_grouped_by_job() {
        let api = scenario_api();
        let temp_dir = TempDir::new().unwrap();
        let dest = temp_dir.path().join("artifacts");
        let mut req = request(&dest);
        req.file_extensions = Some(vec!["json".to_string()]);

        let summary = download_workflow_artifacts(&api, &req).await.unwrap();

        assert_eq!(summary.total_artifacts, 1);
        assert_eq!(summary.pipeline_number, 42);
        assert_eq!(summary.workflow_id, "w1");
        assert_eq!(summary.branch, "main");
        assert_eq!(summary.downloaded_artifacts.len(), 1);
        let group = &summary.downloaded_artifacts[0];
        assert_eq!(group.job_name, "A");
        assert_eq!(group.job_number, 101);
        assert_eq!(group.artifacts.len(), 1);
        assert_eq!(group.artifacts[0].artifact_path, "results.json");
        assert_eq!(
            group.artifacts[0].download_path,
            dest.join("A").join("results.json").display().to_string()
        );

        assert!(dest.join("A").join("results.json").exists());
        assert!(!dest.join("A").join("notes.txt").exists());
        assert!(!dest.join("B").exists());
        assert!(!api.calls().contains(&"download https://artifacts.example.com/notes.txt".to_string()));
    }

    #[tokio::test]
    async fn test_jobs_without_number_are_skipped() {
        let api = scenario_api();
        let temp_dir = TempDir::new().unwrap();

        download_workflow_artifacts(&api, &request(temp_dir.path()))
            .await
            .unwrap();

        let artifact_calls: Vec<String> = api
            .calls()
            .into_iter()
            .filter(|call| call.starts_with("artifacts"))
            .collect();
        assert_eq!(artifact_calls, vec!["artifacts 101", "artifacts 102"]);
    }

    #[tokio::test]
    async fn test_failed_download_is_skipped() {
        let mut api = scenario_api();
        api.failing_urls
            .insert("https://artifacts.example.com/results.json".to_string());
        let temp_dir = TempDir::new().unwrap();

        let summary = download_workflow_artifacts(&api, &request(temp_dir.path()))
            .await
            .unwrap();

        assert_eq!(summary.total_artifacts, 1);
        assert_eq!(
            summary.downloaded_artifacts[0].artifacts[0].artifact_path,
            "notes.txt"
        );
    }

    #[tokio::test]
    async fn test_job_name_filter() {
        let api = scenario_api();
        let temp_dir = TempDir::new().unwrap();

        let mut req = request(temp_dir.path());
        req.job_name = Some("B".to_string());
        let summary = download_workflow_artifacts(&api, &req).await.unwrap();
        assert_eq!(summary.total_artifacts, 0);
        assert!(summary.downloaded_artifacts.is_empty());
        assert!(!api.calls().contains(&"artifacts 101".to_string()));

        req.job_name = Some("a".to_string());
        let err = download_workflow_artifacts(&api, &req).await.unwrap_err();
        assert!(matches!(err, CircleCiError::NotFound(_)));
    }

    #[test]
    fn test_extension_filter_matches_final_extension_only() {
        let allowed = vec!["json".to_string()];
        assert!(extension_matches("results.json", &allowed));
        assert!(extension_matches("reports/RESULTS.JSON", &allowed));
        assert!(!extension_matches("report.json.bak", &allowed));
        assert!(!extension_matches("json", &allowed));
        assert!(!extension_matches("notes.txt", &allowed));
        assert!(extension_matches("coverage.xml", &[".XML".to_string()]));
    }
}
