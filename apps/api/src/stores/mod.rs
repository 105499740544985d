//! Owned in-memory state for the persisted domains. Persistence is explicit:
//! callers hand the store contents to the matching storage adapter.

pub mod jobs;
pub mod resumes;

pub use jobs::JobStore;
pub use resumes::ResumeStore;
