// Prompt templates for every AI operation.
// Placeholders in `{braces}` are filled with `str::replace` before sending.

pub const RESUME_EXTRACTION_PROMPT: &str = "Extract all text from the attached resume \
    ({file_name}). Preserve section headings, bullet points and dates. \
    Return plain text only, with no commentary and no markdown formatting.";

pub const COMPANY_RESEARCH_PROMPT: &str = r#"You are a career researcher preparing a candidate for an application.

Research the company "{company}" using the job posting below and what is publicly known about it.
Company website: {company_url}

Return JSON with:
- summary: two or three sentences on what the company does
- industry: the company's primary industry
- values: stated or evident company values
- recentNews: notable recent developments, if known
- cultureNotes: observations about culture and ways of working

If you know nothing reliable about the company, keep the lists empty rather than guessing.

JOB POSTING ({title}):
{description}"#;

pub const RESUME_ANALYSIS_PROMPT: &str = r#"You are an experienced technical recruiter. Compare the resume with the job posting.

Return JSON with:
- matchScore: integer 0-100, how well the resume fits the role
- matchingSkills: skills and experience from the resume the role asks for
- missingSkills: requirements of the role the resume does not show
- strengths: the candidate's strongest selling points for this role
- recommendations: concrete ways to tailor the application

Only use facts present in the resume.

JOB POSTING: {title} at {company}
{description}

RESUME:
{resume_text}"#;

pub const COVER_LETTER_PROMPT: &str = r#"Write a cover letter for the role of {title} at {company}.

Ground every claim in the resume; never invent experience. Keep it under 400 words,
in a confident, warm, professional tone. Open with a specific hook about the company,
connect two or three of the candidate's strengths to the role, and close with a call to action.
Return only the letter text.

COMPANY RESEARCH:
{research}

FIT ANALYSIS:
{analysis}

CANDIDATE LINKS:
{links}

JOB POSTING:
{description}

RESUME:
{resume_text}"#;

pub const RECRUITER_MESSAGE_PROMPT: &str = r#"Write a short LinkedIn message from the candidate to a recruiter at {company}
about the {title} role. At most 300 characters. Friendly, specific, no buzzwords,
ending with a request for a quick chat. Return only the message text.

CANDIDATE LINKS:
{links}

JOB POSTING:
{description}

RESUME:
{resume_text}"#;

pub const INTERVIEW_QUESTIONS_PROMPT: &str = r#"Prepare the candidate for an interview for {title} at {company}.

Return a JSON array of 8 to 10 likely interview questions. Mix behavioral, technical
and company-specific questions. For each give:
- question
- category: one of "behavioral", "technical", "company", "role"
- suggestedAnswer: an answer outline drawn from the candidate's actual resume

COMPANY RESEARCH:
{research}

JOB POSTING:
{description}

RESUME:
{resume_text}"#;

pub const JOB_POST_EXTRACTION_PROMPT: &str = r#"The text below was scraped from a job posting page at {url}.

Extract the posting. Return JSON with:
- title: the job title
- company: the hiring company's name
- description: the full job description, responsibilities and requirements, cleaned of page navigation
- companyUrl: the company's own website if it appears on the page, otherwise null

Use empty strings for anything that is not on the page.

PAGE TEXT:
{page_text}"#;

/// Fallback used when the recruiter-message answer cannot be used.
pub const FALLBACK_RECRUITER_MESSAGE: &str = "Hi! I came across the {title} role at {company} \
    and I'd love to learn more. My background lines up well with what the team is looking for. \
    Would you be open to a quick chat?";
