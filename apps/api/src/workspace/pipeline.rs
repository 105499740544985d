//! Generation runs for the active job.
//!
//! Each run captures its inputs under the session lock, releases the lock for
//! the AI calls, and re-locks to store the results on the job it started for.

use tokio::try_join;
use tracing::{info, warn};

use crate::ai::{AiError, GenerationContext};
use crate::errors::{classify_ai_error, AppError};
use crate::models::{InterviewQuestion, JobOutputs};
use crate::state::AppState;
use crate::workspace::{Feature, WorkspaceStatus};

fn failure_sentence(err: &AiError) -> &'static str {
    classify_ai_error(err).user_message()
}

/// Research and analysis in parallel, then the cover letter.
///
/// If either parallel call fails the whole step fails and the workspace shows
/// the classified error.
pub async fn run_generation(state: &AppState) -> Result<(), AppError> {
    let ctx = {
        let mut session = state.session.lock().await;
        if session.workspace().is_busy() {
            return Err(AppError::Conflict(
                "A generation is already running".to_string(),
            ));
        }
        let ctx = session.generation_context()?;
        session.begin_pipeline(&ctx.job.id);
        ctx
    };
    let job_id = ctx.job.id.clone();
    info!("Generating application materials for job {job_id}");

    let research = async {
        let research = state.ai.research_company(&ctx.job).await?;
        state.session.lock().await.advance_status(
            &job_id,
            WorkspaceStatus::Researching,
            WorkspaceStatus::Analyzing,
        );
        Ok::<_, AiError>(research)
    };
    let analysis = state.ai.analyze_resume(&ctx.resume_text, &ctx.job);

    let (research, analysis) = match try_join!(research, analysis) {
        Ok(pair) => pair,
        Err(err) => return Err(fail(state, &job_id, err).await),
    };

    let letter_ctx = GenerationContext {
        research: Some(research.clone()),
        analysis: Some(analysis.clone()),
        ..ctx
    };
    let found = state.session.lock().await.apply_outputs(
        &job_id,
        JobOutputs {
            research: Some(research),
            analysis: Some(analysis),
            ..Default::default()
        },
        Some(WorkspaceStatus::Generating),
    );
    if !found {
        warn!("Job {job_id} was deleted during generation, skipping cover letter");
        return Ok(());
    }

    let cover_letter = match state.ai.generate_cover_letter(&letter_ctx).await {
        Ok(letter) => letter,
        Err(err) => return Err(fail(state, &job_id, err).await),
    };

    state.session.lock().await.apply_outputs(
        &job_id,
        JobOutputs {
            cover_letter: Some(cover_letter),
            ..Default::default()
        },
        Some(WorkspaceStatus::Completed),
    );
    info!("Generation completed for job {job_id}");
    Ok(())
}

async fn fail(state: &AppState, job_id: &str, err: AiError) -> AppError {
    warn!("Generation failed for job {job_id}: {err}");
    state
        .session
        .lock()
        .await
        .fail_pipeline(job_id, failure_sentence(&err));
    AppError::Ai(err)
}

enum FeatureOutput {
    Text(String),
    Questions(Vec<InterviewQuestion>),
}

/// Generates one on-demand feature for the active job.
pub async fn run_feature(state: &AppState, feature: Feature) -> Result<(), AppError> {
    let ctx = {
        let mut session = state.session.lock().await;
        if session.workspace().is_generating(feature) {
            return Err(AppError::Conflict(format!(
                "{feature:?} is already being generated"
            )));
        }
        let ctx = session.generation_context()?;
        session.begin_feature(&ctx.job.id, feature);
        ctx
    };
    let job_id = ctx.job.id.as_str();

    let result = match feature {
        Feature::CoverLetter => state
            .ai
            .generate_cover_letter(&ctx)
            .await
            .map(FeatureOutput::Text),
        Feature::RecruiterMessage => state
            .ai
            .generate_recruiter_message(&ctx)
            .await
            .map(FeatureOutput::Text),
        Feature::InterviewPrep => state
            .ai
            .generate_interview_questions(&ctx)
            .await
            .map(FeatureOutput::Questions),
    };

    let mut session = state.session.lock().await;
    match result {
        Ok(output) => {
            let outputs = match (feature, output) {
                (Feature::CoverLetter, FeatureOutput::Text(text)) => JobOutputs {
                    cover_letter: Some(text),
                    ..Default::default()
                },
                (_, FeatureOutput::Text(text)) => JobOutputs {
                    linkedin_message: Some(text),
                    ..Default::default()
                },
                (_, FeatureOutput::Questions(questions)) => JobOutputs {
                    interview_questions: Some(questions),
                    ..Default::default()
                },
            };
            session.apply_outputs(job_id, outputs, None);
            Ok(())
        }
        Err(err) => {
            warn!("{feature:?} generation failed for job {job_id}: {err}");
            session.fail_feature(job_id, feature, failure_sentence(&err));
            Err(AppError::Ai(err))
        }
    }
}
