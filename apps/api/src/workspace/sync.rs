//! Snapshot/hydrate between the workspace and a job's stored outputs.
//!
//! `snapshot` and `hydrate` are pure projections. `switch_active_job` applies
//! them around a job switch; persisting the result is left to the caller.

use tracing::debug;

use super::{FeatureState, Workspace, WorkspaceStatus};
use crate::models::{JobInfo, JobOutputs, SavedResume};
use crate::stores::JobStore;

/// Projects the workspace onto a partial outputs bag. Empty fields are `None`.
pub fn snapshot(workspace: &Workspace) -> JobOutputs {
    JobOutputs {
        research: workspace.research.clone(),
        analysis: workspace.analysis.clone(),
        cover_letter: non_empty(&workspace.cover_letter.content),
        linkedin_message: non_empty(&workspace.recruiter_message.content),
        interview_questions: (!workspace.interview_prep.content.is_empty())
            .then(|| workspace.interview_prep.content.clone()),
    }
}

/// Rebuilds a complete workspace from a job's outputs and the active resume.
/// Every field is set, so nothing from the previously active job leaks through.
pub fn hydrate(job: Option<&JobInfo>, resume: Option<&SavedResume>) -> Workspace {
    let resume_text = resume.map(|r| r.text.clone()).unwrap_or_default();

    let Some(job) = job else {
        return Workspace {
            resume_text,
            ..Workspace::default()
        };
    };

    let outputs = &job.outputs;
    let status = if !outputs.is_empty() {
        WorkspaceStatus::Completed
    } else {
        WorkspaceStatus::Idle
    };

    Workspace {
        status,
        resume_text,
        research: outputs.research.clone(),
        analysis: outputs.analysis.clone(),
        cover_letter: FeatureState::with_content(outputs.cover_letter.clone().unwrap_or_default()),
        recruiter_message: FeatureState::with_content(
            outputs.linkedin_message.clone().unwrap_or_default(),
        ),
        interview_prep: FeatureState::with_content(
            outputs.interview_questions.clone().unwrap_or_default(),
        ),
        error: None,
    }
}

/// Snapshots the workspace into `outgoing` (if it still exists), then
/// replaces the workspace with a hydration of `incoming`.
///
/// Returns true if the outgoing job's outputs were updated and need saving.
pub fn switch_active_job(
    jobs: &mut JobStore,
    workspace: &mut Workspace,
    outgoing: Option<&str>,
    incoming: Option<&str>,
    resume: Option<&SavedResume>,
) -> bool {
    let mut dirty = false;
    if let Some(outgoing) = outgoing {
        let partial = snapshot(workspace);
        if !partial.is_empty() {
            dirty = jobs.merge_outputs(outgoing, partial);
        }
    }

    let job = incoming.and_then(|id| jobs.get(id));
    if incoming.is_some() && job.is_none() {
        debug!("Job {:?} not found, hydrating workspace defaults", incoming);
    }
    *workspace = hydrate(job, resume);
    dirty
}

/// Writes freshly generated outputs into a workspace showing the same job.
pub fn apply_outputs(workspace: &mut Workspace, outputs: &JobOutputs) {
    if let Some(research) = &outputs.research {
        workspace.set_research(research.clone());
    }
    if let Some(analysis) = &outputs.analysis {
        workspace.set_analysis(analysis.clone());
    }
    if let Some(letter) = &outputs.cover_letter {
        workspace.set_cover_letter(letter.clone());
    }
    if let Some(message) = &outputs.linkedin_message {
        workspace.set_recruiter_message(message.clone());
    }
    if let Some(questions) = &outputs.interview_questions {
        workspace.set_interview_prep(questions.clone());
    }
}

fn non_empty(text: &str) -> Option<String> {
    (!text.is_empty()).then(|| text.to_string())
}
