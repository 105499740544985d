use tracing::info;

use crate::models::{ProfileUpdate, SavedResume, UserProfile};
use crate::storage::ResumeSlice;

/// Resumes plus the user profile. Holds at most one resume.
#[derive(Debug, Clone, Default)]
pub struct ResumeStore {
    resumes: Vec<SavedResume>,
    profile: UserProfile,
}

impl ResumeStore {
    pub fn from_slice(slice: ResumeSlice) -> Self {
        Self {
            resumes: slice.resumes,
            profile: slice.profile,
        }
    }

    pub fn resumes(&self) -> &[SavedResume] {
        &self.resumes
    }

    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    pub fn active(&self) -> Option<&SavedResume> {
        let id = self.profile.active_resume_id.as_deref()?;
        self.resumes.iter().find(|r| r.id == id)
    }

    /// Replaces any existing resume and makes the new one active.
    pub fn add(&mut self, resume: SavedResume) {
        for replaced in self.resumes.drain(..) {
            info!("Replacing resume {} ({})", replaced.id, replaced.file_name);
        }
        self.profile.active_resume_id = Some(resume.id.clone());
        self.resumes.push(resume);
    }

    /// Returns whether a resume was removed.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.resumes.len();
        self.resumes.retain(|r| r.id != id);
        if self.profile.active_resume_id.as_deref() == Some(id) {
            self.profile.active_resume_id = None;
        }
        self.resumes.len() != before
    }

    pub fn update_profile(&mut self, update: ProfileUpdate) {
        self.profile.apply(update);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_resume_replaces_first() {
        let mut store = ResumeStore::default();
        store.add(SavedResume::new("a.pdf", "first", None));
        let second = SavedResume::new("b.pdf", "second", None);
        let second_id = second.id.clone();
        store.add(second);

        assert_eq!(store.resumes().len(), 1);
        assert_eq!(store.active().map(|r| r.id.as_str()), Some(second_id.as_str()));
    }

    #[test]
    fn test_remove_clears_active_pointer() {
        let mut store = ResumeStore::default();
        let resume = SavedResume::new("a.pdf", "first", None);
        let id = resume.id.clone();
        store.add(resume);

        assert!(store.remove(&id));
        assert!(store.active().is_none());
        assert!(store.profile().active_resume_id.is_none());
        assert!(!store.remove(&id));
    }
}
