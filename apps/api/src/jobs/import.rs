//! Job-post import: fetch the posting page, reduce it to text, and let the
//! AI capability pull out the fields.

use tracing::{debug, info};
use url::Url;

use crate::ai::AiCapability;
use crate::errors::AppError;
use crate::models::{JobInfo, JobPostDraft, NewJob};

/// Page text sent to the model is cut to this many characters.
pub const MAX_PAGE_CHARS: usize = 30_000;

/// Validates that the input is an absolute http(s) URL.
pub fn parse_job_url(raw: &str) -> Result<Url, AppError> {
    let url = Url::parse(raw.trim())
        .map_err(|e| AppError::Validation(format!("Invalid job URL {raw:?}: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(AppError::Validation(format!(
            "Job URL must be http or https, got {scheme}"
        ))),
    }
}

/// Downloads the posting page as HTML.
pub async fn download(client: &reqwest::Client, url: &Url) -> Result<String, AppError> {
    let response = client
        .get(url.as_str())
        .send()
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Network error fetching {url}: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(AppError::Validation(format!(
            "Job page {url} returned status {status}"
        )));
    }

    response
        .text()
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Network error reading {url}: {e}")))
}

/// Markdown rendering of the page, truncated on a char boundary.
pub fn page_text(html: &str) -> String {
    let markdown = html2md::parse_html(html);
    let trimmed = markdown.trim();
    match trimmed.char_indices().nth(MAX_PAGE_CHARS) {
        Some((cut, _)) => trimmed[..cut].to_string(),
        None => trimmed.to_string(),
    }
}

/// Turns a model draft into a job, rejecting drafts without title or company.
pub fn draft_into_job(draft: JobPostDraft, url: &Url) -> Result<JobInfo, AppError> {
    let new_job = NewJob {
        title: draft.title,
        company: draft.company,
        description: draft.description,
        job_url: Some(url.to_string()),
        company_url: draft.company_url,
    };
    if let Some(field) = new_job.missing_field().filter(|f| *f != "description") {
        return Err(AppError::Validation(format!(
            "Could not find the job {field} on {url}; add the job manually"
        )));
    }
    Ok(new_job.into())
}

/// Extracts a job from an already-downloaded page.
pub async fn job_from_page(
    ai: &dyn AiCapability,
    url: &Url,
    html: &str,
) -> Result<JobInfo, AppError> {
    let text = page_text(html);
    if text.is_empty() {
        return Err(AppError::Validation(format!("Job page {url} has no readable text")));
    }
    debug!("Job page {url} reduced to {} chars", text.chars().count());

    let draft = ai.extract_job_post(url.as_str(), &text).await?;
    let job = draft_into_job(draft, url)?;
    info!("Imported job {} ({} at {}) from {url}", job.id, job.title, job.company);
    Ok(job)
}

pub async fn import_job(
    ai: &dyn AiCapability,
    client: &reqwest::Client,
    raw_url: &str,
) -> Result<JobInfo, AppError> {
    let url = parse_job_url(raw_url)?;
    let html = download(client, &url).await?;
    job_from_page(ai, &url, &html).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::mock::{MockAi, OP_JOB_POST};

    const POSTING: &str = "<html><body><h1>Rust Engineer</h1><p>Acme is hiring.</p></body></html>";

    #[test]
    fn test_parse_job_url_requires_http() {
        assert!(parse_job_url("https://acme.example/jobs/1").is_ok());
        assert!(matches!(
            parse_job_url("ftp://acme.example/jobs/1"),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            parse_job_url("not a url"),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_page_text_is_truncated_on_char_boundary() {
        let html = format!("<p>{}</p>", "é".repeat(MAX_PAGE_CHARS + 50));
        let text = page_text(&html);
        assert_eq!(text.chars().count(), MAX_PAGE_CHARS);
    }

    #[test]
    fn test_draft_without_company_is_rejected() {
        let url = parse_job_url("https://acme.example/jobs/1").unwrap();
        let draft = JobPostDraft {
            title: "Rust Engineer".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            draft_into_job(draft, &url),
            Err(AppError::Validation(msg)) if msg.contains("company")
        ));
    }

    #[tokio::test]
    async fn test_job_from_page_keeps_source_url() {
        let ai = MockAi::new();
        let url = parse_job_url("https://acme.example/jobs/1").unwrap();

        let job = job_from_page(&ai, &url, POSTING).await.unwrap();

        assert_eq!(job.title, "Rust Engineer");
        assert_eq!(job.company, "Acme");
        assert_eq!(job.job_url.as_deref(), Some("https://acme.example/jobs/1"));
        assert_eq!(job.company_url.as_deref(), Some("https://acme.example"));
        assert!(job.outputs.is_empty());
        assert_eq!(ai.calls(), vec![OP_JOB_POST]);
    }
}
