//! Structured-output schemas sent with JSON-returning requests, in the
//! OpenAPI subset the Gemini API accepts.

use serde_json::{json, Value};

fn string_list() -> Value {
    json!({ "type": "ARRAY", "items": { "type": "STRING" } })
}

pub fn company_research() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "summary": { "type": "STRING" },
            "industry": { "type": "STRING" },
            "values": string_list(),
            "recentNews": string_list(),
            "cultureNotes": string_list()
        },
        "required": ["summary"]
    })
}

pub fn resume_analysis() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "matchScore": { "type": "INTEGER" },
            "matchingSkills": string_list(),
            "missingSkills": string_list(),
            "strengths": string_list(),
            "recommendations": string_list()
        },
        "required": ["matchScore", "matchingSkills", "missingSkills"]
    })
}

pub fn interview_questions() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "question": { "type": "STRING" },
                "category": { "type": "STRING" },
                "suggestedAnswer": { "type": "STRING" }
            },
            "required": ["question", "category"]
        }
    })
}

pub fn job_post() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "title": { "type": "STRING" },
            "company": { "type": "STRING" },
            "description": { "type": "STRING" },
            "companyUrl": { "type": "STRING", "nullable": true }
        },
        "required": ["title", "company", "description"]
    })
}
