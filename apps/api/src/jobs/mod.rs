//! Tracked job applications: manual entry, URL import, and switching the
//! active job.

pub mod handlers;
pub mod import;
