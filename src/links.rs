/// Builds the CircleCI web app URL for a pipeline.
///
/// # Arguments
///
/// * `project_slug` - Project slug (e.g., "gh/org/repo" or "github/org/repo")
/// * `number` - Pipeline number
///
/// # Returns
///
/// Clickable URL (e.g., <https://app.circleci.com/pipelines/gh/org/repo/42>)
pub fn pipeline_url(project_slug: &str, number: u64) -> String {
    format!(
        "https://app.circleci.com/pipelines/{}/{number}",
        project_slug.trim_matches('/')
    )
}

/// Builds the CircleCI web app URL for a workflow within a pipeline.
pub fn workflow_url(project_slug: &str, pipeline_number: u64, workflow_id: &str) -> String {
    format!(
        "{}/workflows/{workflow_id}",
        pipeline_url(project_slug, pipeline_number)
    )
}

/// Last path segment of an artifact path or URL.
pub fn basename(path: &str) -> &str {
    let trimmed = path.split(['?', '#']).next().unwrap_or(path);
    trimmed
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_url() {
        assert_eq!(
            pipeline_url("gh/org/repo", 1234),
            "https://app.circleci.com/pipelines/gh/org/repo/1234"
        );
    }

    #[test]
    fn test_workflow_url() {
        assert_eq!(
            workflow_url("github/org/repo", 7, "wf-1"),
            "https://app.circleci.com/pipelines/github/org/repo/7/workflows/wf-1"
        );
    }

    #[test]
    fn test_basename_of_artifact_path() {
        assert_eq!(basename("test-results/junit/results.xml"), "results.xml");
        assert_eq!(basename("results.json"), "results.json");
    }

    #[test]
    fn test_basename_of_url_ignores_query() {
        assert_eq!(
            basename("https://output.circle-artifacts.com/0/tmp/app.apk?sig=abc"),
            "app.apk"
        );
    }
}
