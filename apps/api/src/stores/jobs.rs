use crate::models::{JobInfo, JobOutputs};

/// The tracked job applications, newest first.
#[derive(Debug, Clone, Default)]
pub struct JobStore {
    jobs: Vec<JobInfo>,
}

impl JobStore {
    pub fn new(jobs: Vec<JobInfo>) -> Self {
        Self { jobs }
    }

    pub fn jobs(&self) -> &[JobInfo] {
        &self.jobs
    }

    pub fn get(&self, id: &str) -> Option<&JobInfo> {
        self.jobs.iter().find(|j| j.id == id)
    }

    pub fn add(&mut self, job: JobInfo) {
        self.jobs.insert(0, job);
    }

    /// Removes the job together with its outputs.
    pub fn remove(&mut self, id: &str) -> Option<JobInfo> {
        let index = self.jobs.iter().position(|j| j.id == id)?;
        Some(self.jobs.remove(index))
    }

    /// Overlays a partial outputs bag onto a job. Returns false if the job is gone.
    pub fn merge_outputs(&mut self, id: &str, partial: JobOutputs) -> bool {
        match self.jobs.iter_mut().find(|j| j.id == id) {
            Some(job) => {
                job.outputs.merge(partial);
                true
            }
            None => false,
        }
    }
}
