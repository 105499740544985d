pub mod job;
pub mod outputs;
pub mod resume;

pub use job::{JobInfo, JobOutputs, NewJob};
pub use outputs::{CompanyResearch, InterviewQuestion, JobPostDraft, ResumeAnalysis};
pub use resume::{ProfileUpdate, SavedResume, UserProfile};

/// Fresh identifier for a resume or job record.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
