//! Typed results of the AI operations, stored verbatim in `JobOutputs`.

use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyResearch {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub industry: String,
    #[serde(default)]
    pub values: Vec<String>,
    #[serde(default)]
    pub recent_news: Vec<String>,
    #[serde(default)]
    pub culture_notes: Vec<String>,
}

impl CompanyResearch {
    /// Fallback used when the model's answer cannot be read.
    pub fn empty() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeAnalysis {
    /// 0 to 100
    #[serde(default, deserialize_with = "deserialize_score")]
    pub match_score: u8,
    #[serde(default)]
    pub matching_skills: Vec<String>,
    #[serde(default)]
    pub missing_skills: Vec<String>,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

impl ResumeAnalysis {
    /// Zero-score fallback used when the model's answer cannot be read.
    pub fn zero() -> Self {
        Self::default()
    }
}

/// Models occasionally answer `87.5` or `120`; round and clamp into 0 to 100.
fn deserialize_score<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = f64::deserialize(deserializer)?;
    if raw.is_nan() {
        return Ok(0);
    }
    Ok(raw.round().clamp(0.0, 100.0) as u8)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewQuestion {
    pub question: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub suggested_answer: String,
}

/// Job fields extracted from a job-post page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPostDraft {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub company_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_is_rounded_and_clamped() {
        let a: ResumeAnalysis = serde_json::from_str(r#"{"matchScore": 87.6}"#).unwrap();
        assert_eq!(a.match_score, 88);
        let a: ResumeAnalysis = serde_json::from_str(r#"{"matchScore": 140}"#).unwrap();
        assert_eq!(a.match_score, 100);
        let a: ResumeAnalysis = serde_json::from_str(r#"{"matchScore": -3}"#).unwrap();
        assert_eq!(a.match_score, 0);
    }

    #[test]
    fn test_partial_research_fills_defaults() {
        let r: CompanyResearch = serde_json::from_str(r#"{"summary": "Acme builds rockets"}"#).unwrap();
        assert_eq!(r.summary, "Acme builds rockets");
        assert!(r.values.is_empty());
    }

    #[test]
    fn test_interview_question_requires_question_text() {
        let result: Result<InterviewQuestion, _> = serde_json::from_str(r#"{"category": "behavioral"}"#);
        assert!(result.is_err());
    }
}
