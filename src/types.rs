use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One page of a CircleCI v2 list endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    /// Opaque token for the next page, `None` on the last page
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// A single triggered run of a project's configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pipeline {
    pub id: String,
    pub number: u64,
    /// Pipeline state as reported by the API (e.g. "created", "success")
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub vcs: Option<PipelineVcs>,
}

impl Pipeline {
    pub fn branch(&self) -> Option<&str> {
        self.vcs.as_ref().and_then(|vcs| vcs.branch.as_deref())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineVcs {
    #[serde(default)]
    pub branch: Option<String>,
    #[serde(default)]
    pub revision: Option<String>,
}

/// A named group of jobs within one pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workflow {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub pipeline_id: Option<String>,
}

/// A job within a workflow. `job_number` is absent until the job has run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub name: String,
    #[serde(default)]
    pub job_number: Option<u64>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub id: Option<String>,
}

/// A file produced by a job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    /// Path relative to the job's artifact root
    pub path: String,
    /// Download URL
    pub url: String,
    #[serde(default)]
    pub node_index: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pipeline_page_deserializes_with_branch() {
        let page: Page<Pipeline> = serde_json::from_value(json!({
            "items": [
                {
                    "id": "5034460f-c7c4-4c43-9457-de07e2029e7b",
                    "number": 42,
                    "state": "created",
                    "created_at": "2024-05-01T10:00:00Z",
                    "vcs": { "branch": "main", "revision": "abc123" }
                },
                { "id": "p2", "number": 41 }
            ],
            "next_page_token": "tok"
        }))
        .unwrap();

        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].branch(), Some("main"));
        assert!(page.items[0].created_at.is_some());
        assert_eq!(page.items[1].branch(), None);
        assert_eq!(page.next_page_token.as_deref(), Some("tok"));
    }

    #[test]
    fn test_job_without_number() {
        let job: Job = serde_json::from_value(json!({
            "name": "hold",
            "status": "on_hold",
            "type": "approval"
        }))
        .unwrap();

        assert_eq!(job.job_number, None);
    }

    #[test]
    fn test_page_without_items() {
        let page: Page<Artifact> = serde_json::from_value(json!({})).unwrap();
        assert!(page.items.is_empty());
        assert!(page.next_page_token.is_none());
    }
}
