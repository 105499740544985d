//! Gemini `generateContent` client. One request per operation: no retries,
//! no backoff. Failures go straight back to the caller.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use super::prompts::{
    COMPANY_RESEARCH_PROMPT, COVER_LETTER_PROMPT, FALLBACK_RECRUITER_MESSAGE,
    INTERVIEW_QUESTIONS_PROMPT, JOB_POST_EXTRACTION_PROMPT, RECRUITER_MESSAGE_PROMPT,
    RESUME_ANALYSIS_PROMPT, RESUME_EXTRACTION_PROMPT,
};
use super::{schema, AiCapability, AiError, GenerationContext};
use crate::models::{
    CompanyResearch, InterviewQuestion, JobInfo, JobPostDraft, ResumeAnalysis, UserProfile,
};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const REQUEST_TIMEOUT_SECS: u64 = 120;

/// Finish reasons that mean the answer was withheld rather than empty.
const BLOCKING_FINISH_REASONS: &[&str] = &[
    "SAFETY",
    "RECITATION",
    "BLOCKLIST",
    "PROHIBITED_CONTENT",
    "SPII",
];

// ────────────────────────────────────────────────────────────────────────────
// Wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    Inline {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub prompt_feedback: Option<PromptFeedback>,
    pub usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<CandidateContent>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
pub struct ResponsePart {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    pub block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    pub prompt_token_count: Option<u32>,
    pub candidates_token_count: Option<u32>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate, if it has any.
    pub fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let text: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        (!text.trim().is_empty()).then_some(text)
    }

    /// Why the answer was withheld: a blocked prompt, or a candidate that
    /// stopped for a content filter before producing any text.
    pub fn blocked_reason(&self) -> Option<String> {
        if let Some(reason) = self
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.clone())
        {
            return Some(reason);
        }
        if self.text().is_some() {
            return None;
        }
        self.candidates
            .first()?
            .finish_reason
            .clone()
            .filter(|reason| BLOCKING_FINISH_REASONS.contains(&reason.as_str()))
    }
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Client
// ────────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: Option<String>,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: Option<String>, model: impl Into<String>) -> Result<Self, AiError> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()?,
            api_key,
            model: model.into(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Sends one `generateContent` request and returns the response text.
    async fn generate(&self, parts: Vec<Part>, schema: Option<Value>) -> Result<String, AiError> {
        let api_key = self.api_key.as_deref().ok_or(AiError::MissingApiKey)?;

        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts,
            }],
            generation_config: schema.map(|response_schema| GenerationConfig {
                response_mime_type: "application/json",
                response_schema,
            }),
        };

        let url = format!("{GEMINI_API_BASE}/models/{}:generateContent", self.model);
        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GeminiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            warn!("Gemini API returned {status}: {message}");
            return Err(AiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateContentResponse = response.json().await?;

        if let Some(usage) = &parsed.usage_metadata {
            debug!(
                "Gemini call succeeded: prompt_tokens={:?}, output_tokens={:?}",
                usage.prompt_token_count, usage.candidates_token_count
            );
        }

        if let Some(reason) = parsed.blocked_reason() {
            return Err(AiError::Blocked(reason));
        }

        parsed.text().ok_or(AiError::EmptyResponse)
    }

    async fn generate_text(&self, prompt: String) -> Result<String, AiError> {
        self.generate(vec![Part::Text { text: prompt }], None).await
    }

    /// Requests schema-constrained JSON. `Ok(None)` means an answer arrived
    /// but did not match `T`.
    async fn generate_json<T: DeserializeOwned>(
        &self,
        operation: &str,
        prompt: String,
        schema: Value,
    ) -> Result<Option<T>, AiError> {
        let text = match self.generate(vec![Part::Text { text: prompt }], Some(schema)).await {
            Ok(text) => text,
            Err(AiError::EmptyResponse) => {
                warn!("{operation}: empty response, using fallback");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        Ok(parse_or_fallback(operation, &text))
    }
}

/// Parses model output as `T`, tolerating code fences. `None` tells the caller
/// to use its fallback.
fn parse_or_fallback<T: DeserializeOwned>(operation: &str, text: &str) -> Option<T> {
    match serde_json::from_str::<T>(strip_json_fences(text)) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("{operation}: unreadable JSON, using fallback: {e}");
            None
        }
    }
}

#[async_trait]
impl AiCapability for GeminiClient {
    async fn extract_resume_text(
        &self,
        file_name: &str,
        mime_type: &str,
        bytes: &[u8],
    ) -> Result<String, AiError> {
        let parts = vec![
            Part::Text {
                text: fill_template(RESUME_EXTRACTION_PROMPT, &[("file_name", file_name)]),
            },
            Part::Inline {
                inline_data: InlineData {
                    mime_type: mime_type.to_string(),
                    data: BASE64.encode(bytes),
                },
            },
        ];
        let text = self.generate(parts, None).await?;
        Ok(text.trim().to_string())
    }

    async fn research_company(&self, job: &JobInfo) -> Result<CompanyResearch, AiError> {
        let research = self
            .generate_json(
                "research_company",
                build_research_prompt(job),
                schema::company_research(),
            )
            .await?;
        Ok(research.unwrap_or_else(CompanyResearch::empty))
    }

    async fn analyze_resume(
        &self,
        resume_text: &str,
        job: &JobInfo,
    ) -> Result<ResumeAnalysis, AiError> {
        let analysis = self
            .generate_json(
                "analyze_resume",
                build_analysis_prompt(resume_text, job),
                schema::resume_analysis(),
            )
            .await?;
        Ok(analysis.unwrap_or_else(ResumeAnalysis::zero))
    }

    async fn generate_cover_letter(&self, ctx: &GenerationContext) -> Result<String, AiError> {
        let letter = self.generate_text(build_cover_letter_prompt(ctx)).await?;
        Ok(letter.trim().to_string())
    }

    async fn generate_recruiter_message(
        &self,
        ctx: &GenerationContext,
    ) -> Result<String, AiError> {
        match self.generate_text(build_recruiter_prompt(ctx)).await {
            Ok(message) => Ok(message.trim().to_string()),
            Err(AiError::EmptyResponse) => {
                warn!("generate_recruiter_message: empty response, using fallback");
                Ok(fallback_recruiter_message(&ctx.job))
            }
            Err(e) => Err(e),
        }
    }

    async fn generate_interview_questions(
        &self,
        ctx: &GenerationContext,
    ) -> Result<Vec<InterviewQuestion>, AiError> {
        let questions: Option<Vec<InterviewQuestion>> = self
            .generate_json(
                "generate_interview_questions",
                build_interview_prompt(ctx),
                schema::interview_questions(),
            )
            .await?;
        Ok(questions.unwrap_or_default())
    }

    async fn extract_job_post(&self, url: &str, page_text: &str) -> Result<JobPostDraft, AiError> {
        let prompt = fill_template(
            JOB_POST_EXTRACTION_PROMPT,
            &[("url", url), ("page_text", page_text)],
        );
        let draft = self
            .generate_json("extract_job_post", prompt, schema::job_post())
            .await?;
        Ok(draft.unwrap_or_default())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Prompt builders
// ────────────────────────────────────────────────────────────────────────────

/// Replaces each `{key}` in one pass. Text inside substituted values is
/// never expanded again, and unknown placeholders are left as they are.
fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let value = after.find('}').and_then(|close| {
            let key = &after[..close];
            values
                .iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| (*value, close))
        });
        match value {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

fn build_research_prompt(job: &JobInfo) -> String {
    fill_template(
        COMPANY_RESEARCH_PROMPT,
        &[
            ("company", job.company.as_str()),
            ("company_url", job.company_url.as_deref().unwrap_or("unknown")),
            ("title", job.title.as_str()),
            ("description", job.description.as_str()),
        ],
    )
}

fn build_analysis_prompt(resume_text: &str, job: &JobInfo) -> String {
    fill_template(
        RESUME_ANALYSIS_PROMPT,
        &[
            ("title", job.title.as_str()),
            ("company", job.company.as_str()),
            ("description", job.description.as_str()),
            ("resume_text", resume_text),
        ],
    )
}

fn build_cover_letter_prompt(ctx: &GenerationContext) -> String {
    let research = describe_research(ctx.research.as_ref());
    let analysis = describe_analysis(ctx.analysis.as_ref());
    let links = describe_links(&ctx.profile);
    fill_template(
        COVER_LETTER_PROMPT,
        &[
            ("title", ctx.job.title.as_str()),
            ("company", ctx.job.company.as_str()),
            ("research", research.as_str()),
            ("analysis", analysis.as_str()),
            ("links", links.as_str()),
            ("description", ctx.job.description.as_str()),
            ("resume_text", ctx.resume_text.as_str()),
        ],
    )
}

fn build_recruiter_prompt(ctx: &GenerationContext) -> String {
    let links = describe_links(&ctx.profile);
    fill_template(
        RECRUITER_MESSAGE_PROMPT,
        &[
            ("company", ctx.job.company.as_str()),
            ("title", ctx.job.title.as_str()),
            ("links", links.as_str()),
            ("description", ctx.job.description.as_str()),
            ("resume_text", ctx.resume_text.as_str()),
        ],
    )
}

fn build_interview_prompt(ctx: &GenerationContext) -> String {
    let research = describe_research(ctx.research.as_ref());
    fill_template(
        INTERVIEW_QUESTIONS_PROMPT,
        &[
            ("title", ctx.job.title.as_str()),
            ("company", ctx.job.company.as_str()),
            ("research", research.as_str()),
            ("description", ctx.job.description.as_str()),
            ("resume_text", ctx.resume_text.as_str()),
        ],
    )
}

pub fn fallback_recruiter_message(job: &JobInfo) -> String {
    fill_template(
        FALLBACK_RECRUITER_MESSAGE,
        &[("title", job.title.as_str()), ("company", job.company.as_str())],
    )
}

fn describe_research(research: Option<&CompanyResearch>) -> String {
    match research {
        Some(r) if !r.summary.is_empty() => {
            let mut out = r.summary.clone();
            if !r.values.is_empty() {
                out.push_str(&format!("\nValues: {}", r.values.join(", ")));
            }
            if !r.recent_news.is_empty() {
                out.push_str(&format!("\nRecent news: {}", r.recent_news.join("; ")));
            }
            out
        }
        _ => "Not available.".to_string(),
    }
}

fn describe_analysis(analysis: Option<&ResumeAnalysis>) -> String {
    match analysis {
        Some(a) => format!(
            "Match score: {}/100\nMatching skills: {}\nStrengths: {}",
            a.match_score,
            a.matching_skills.join(", "),
            a.strengths.join("; ")
        ),
        None => "Not available.".to_string(),
    }
}

fn describe_links(profile: &UserProfile) -> String {
    let links: Vec<String> = [
        ("Portfolio", profile.portfolio_url.as_deref()),
        ("LinkedIn", profile.linkedin_url.as_deref()),
    ]
    .into_iter()
    .filter_map(|(label, url)| url.map(|u| format!("{label}: {u}")))
    .collect();
    if links.is_empty() {
        "None provided.".to_string()
    } else {
        links.join("\n")
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from model output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(rest) = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
    else {
        return text;
    };
    let rest = rest.trim_start();
    rest.strip_suffix("```").map(str::trim).unwrap_or(rest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewJob;

    fn job() -> JobInfo {
        NewJob {
            title: "Platform Engineer".to_string(),
            company: "Acme".to_string(),
            description: "Run our Rust services".to_string(),
            job_url: None,
            company_url: None,
        }
        .into()
    }

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "{\"key\": \"value\"}";
        assert_eq!(strip_json_fences(input), input);
    }

    #[test]
    fn test_request_serializes_in_gemini_shape() {
        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![
                    Part::Text {
                        text: "hi".to_string(),
                    },
                    Part::Inline {
                        inline_data: InlineData {
                            mime_type: "application/pdf".to_string(),
                            data: "AAAA".to_string(),
                        },
                    },
                ],
            }],
            generation_config: Some(GenerationConfig {
                response_mime_type: "application/json",
                response_schema: schema::job_post(),
            }),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hi");
        assert_eq!(
            json["contents"][0]["parts"][1]["inlineData"]["mimeType"],
            "application/pdf"
        );
        assert_eq!(json["generationConfig"]["responseMimeType"], "application/json");
    }

    #[test]
    fn test_response_text_joins_parts() {
        let resp: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates": [{"content": {"parts": [{"text": "Dear "}, {"text": "Acme"}]}, "finishReason": "STOP"}]}"#,
        )
        .unwrap();
        assert_eq!(resp.text().as_deref(), Some("Dear Acme"));
    }

    #[test]
    fn test_response_without_candidates_has_no_text() {
        let resp: GenerateContentResponse =
            serde_json::from_str(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#).unwrap();
        assert!(resp.text().is_none());
        assert_eq!(resp.blocked_reason().as_deref(), Some("SAFETY"));
    }

    #[test]
    fn test_prompts_fill_every_placeholder() {
        let ctx = GenerationContext {
            resume_text: "Ten years of Rust".to_string(),
            job: job(),
            profile: UserProfile {
                portfolio_url: Some("https://me.dev".to_string()),
                ..Default::default()
            },
            research: None,
            analysis: None,
        };
        for prompt in [
            build_research_prompt(&ctx.job),
            build_analysis_prompt(&ctx.resume_text, &ctx.job),
            build_cover_letter_prompt(&ctx),
            build_recruiter_prompt(&ctx),
            build_interview_prompt(&ctx),
        ] {
            assert!(!prompt.contains("{title}"));
            assert!(!prompt.contains("{resume_text}"));
            assert!(!prompt.contains("{company}"));
        }
        assert!(build_cover_letter_prompt(&ctx).contains("Portfolio: https://me.dev"));
    }

    #[test]
    fn test_prompt_values_are_not_expanded_again() {
        let mut j = job();
        j.title = "Engineer {description}".to_string();
        j.description = "Uses {company} and {title} literally".to_string();
        let prompt = build_research_prompt(&j);
        assert!(prompt.contains("Engineer {description}"));
        assert!(prompt.contains("Uses {company} and {title} literally"));
    }

    #[test]
    fn test_fill_template_keeps_unknown_and_unclosed_braces() {
        assert_eq!(
            fill_template("{a} {b} {a", &[("a", "1")]),
            "1 {b} {a"
        );
        assert_eq!(fill_template("JSON: {\"k\": 1}", &[]), "JSON: {\"k\": 1}");
    }

    #[test]
    fn test_unreadable_answers_fall_back() {
        let research = parse_or_fallback::<CompanyResearch>("research", "Sorry, I can't help")
            .unwrap_or_else(CompanyResearch::empty);
        assert_eq!(research, CompanyResearch::empty());

        let analysis = parse_or_fallback::<ResumeAnalysis>("analysis", r#"["not", "an object"]"#)
            .unwrap_or_else(ResumeAnalysis::zero);
        assert_eq!(analysis.match_score, 0);

        let questions: Vec<InterviewQuestion> =
            parse_or_fallback("questions", r#"{"questions": []}"#).unwrap_or_default();
        assert!(questions.is_empty());

        let draft: JobPostDraft =
            parse_or_fallback("job_post", "```json\n{\"title\": \n```").unwrap_or_default();
        assert_eq!(draft, JobPostDraft::default());
    }

    #[test]
    fn test_fenced_answers_parse() {
        let analysis: ResumeAnalysis = parse_or_fallback(
            "analysis",
            "```json\n{\"matchScore\": 87.5, \"strengths\": [\"Rust\"]}\n```",
        )
        .unwrap();
        assert_eq!(analysis.match_score, 88);
        assert_eq!(analysis.strengths, vec!["Rust".to_string()]);

        let questions: Vec<InterviewQuestion> = parse_or_fallback(
            "questions",
            "```\n[{\"question\": \"Why Rust?\"}]\n```",
        )
        .unwrap();
        assert_eq!(questions[0].question, "Why Rust?");
    }

    #[test]
    fn test_filtered_candidate_is_blocked() {
        let resp: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates": [{"finishReason": "SAFETY"}]}"#,
        )
        .unwrap();
        assert_eq!(resp.blocked_reason().as_deref(), Some("SAFETY"));

        let resp: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates": [{"content": {"parts": []}, "finishReason": "RECITATION"}]}"#,
        )
        .unwrap();
        assert_eq!(resp.blocked_reason().as_deref(), Some("RECITATION"));
    }

    #[test]
    fn test_normal_or_truncated_candidates_are_not_blocked() {
        let resp: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates": [{"content": {"parts": [{"text": "Hi"}]}, "finishReason": "SAFETY"}]}"#,
        )
        .unwrap();
        assert!(resp.blocked_reason().is_none());

        let resp: GenerateContentResponse =
            serde_json::from_str(r#"{"candidates": [{"finishReason": "MAX_TOKENS"}]}"#).unwrap();
        assert!(resp.blocked_reason().is_none());
    }

    #[test]
    fn test_fallback_message_names_the_role() {
        let msg = fallback_recruiter_message(&job());
        assert!(msg.contains("Platform Engineer"));
        assert!(msg.contains("Acme"));
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_before_network() {
        let client = GeminiClient::new(None, "gemini-2.5-flash").unwrap();
        let err = client.research_company(&job()).await.unwrap_err();
        assert!(matches!(err, AiError::MissingApiKey));
    }
}
