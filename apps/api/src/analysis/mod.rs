//! Résumé analysis: button → prompt dispatch, request assembly, and the chat loop.
//!
//! All model calls go through the `Generator` trait. Nothing here talks HTTP.

pub mod chat;
pub mod handlers;
pub mod prompts;

use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::document::{pdf_to_image_parts, ImagePart, PageRasterizer};
use crate::errors::AppError;
use crate::llm_client::{Generator, Part};
use crate::session::Session;
use prompts::{ATS_MATCH_PROMPT, HR_EVALUATION_PROMPT, RESPONSE_HEADING, UPLOAD_REQUIRED_MESSAGE};

// ────────────────────────────────────────────────────────────────────────────
// Actions and the prompt table
// ────────────────────────────────────────────────────────────────────────────

/// The three analysis buttons on the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// "Analyse my Resume"
    Analyze,
    /// "Skill Gap Analysis"
    SkillGap,
    /// "Interview Preparation Insights"
    InterviewPrep,
}

impl Action {
    pub fn label(self) -> &'static str {
        match self {
            Action::Analyze => "Analyse my Resume",
            Action::SkillGap => "Skill Gap Analysis",
            Action::InterviewPrep => "Interview Preparation Insights",
        }
    }
}

/// Which button → prompt mapping is in force.
///
/// The two UI revisions this service replaces disagree on the mapping for
/// "Analyse my Resume". Both are kept selectable until product confirms one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PromptMapping {
    /// Analyze → ATS, SkillGap → HR, InterviewPrep → ATS.
    #[default]
    Primary,
    /// Analyze → HR, SkillGap → HR, InterviewPrep → ATS.
    Alternate,
}

#[derive(Debug, Error)]
#[error("unknown prompt mapping '{0}' (expected 'primary' or 'alternate')")]
pub struct UnknownPromptMapping(String);

impl FromStr for PromptMapping {
    type Err = UnknownPromptMapping;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "primary" => Ok(PromptMapping::Primary),
            "alternate" => Ok(PromptMapping::Alternate),
            _ => Err(UnknownPromptMapping(s.to_string())),
        }
    }
}

/// Explicit button → prompt table. Lookup is pure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptTable {
    pub analyze: &'static str,
    pub skill_gap: &'static str,
    pub interview_prep: &'static str,
}

impl PromptTable {
    pub fn for_mapping(mapping: PromptMapping) -> Self {
        match mapping {
            PromptMapping::Primary => Self {
                analyze: ATS_MATCH_PROMPT,
                skill_gap: HR_EVALUATION_PROMPT,
                interview_prep: ATS_MATCH_PROMPT,
            },
            PromptMapping::Alternate => Self {
                analyze: HR_EVALUATION_PROMPT,
                skill_gap: HR_EVALUATION_PROMPT,
                interview_prep: ATS_MATCH_PROMPT,
            },
        }
    }

    pub fn prompt_for(&self, action: Action) -> &'static str {
        match action {
            Action::Analyze => self.analyze,
            Action::SkillGap => self.skill_gap,
            Action::InterviewPrep => self.interview_prep,
        }
    }
}

impl Default for PromptTable {
    fn default() -> Self {
        Self::for_mapping(PromptMapping::Primary)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Request assembly
// ────────────────────────────────────────────────────────────────────────────

/// Builds `[text, image, prompt]`. A missing image keeps its slot as an empty
/// text part, so the list is always three long.
pub fn assemble_parts(input_text: &str, image: Option<&ImagePart>, prompt: &str) -> Vec<Part> {
    let image_slot = match image {
        Some(image) => Part::image(image.clone()),
        None => Part::text(""),
    };
    vec![Part::text(input_text), image_slot, Part::text(prompt)]
}

// ────────────────────────────────────────────────────────────────────────────
// Action dispatch
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ActionOutcome {
    Response { heading: String, text: String },
    UploadRequired { text: String },
}

impl ActionOutcome {
    pub fn text(&self) -> &str {
        match self {
            ActionOutcome::Response { text, .. } | ActionOutcome::UploadRequired { text } => text,
        }
    }
}

/// Runs one analysis button press against the session's current upload.
///
/// Without an upload this returns the fixed message and never calls the model.
/// With one, page 1 is rendered afresh and sent with the job description and
/// the prompt the table assigns to `action`.
pub async fn run_action(
    session: &Session,
    action: Action,
    job_description: &str,
    generator: &dyn Generator,
    rasterizer: Arc<dyn PageRasterizer>,
    prompts: &PromptTable,
) -> Result<ActionOutcome, AppError> {
    let Some(document) = &session.document else {
        return Ok(ActionOutcome::UploadRequired {
            text: UPLOAD_REQUIRED_MESSAGE.to_string(),
        });
    };

    info!(
        "Session {}: '{}' on {} ({} bytes)",
        session.id,
        action.label(),
        document.file_name,
        document.size()
    );

    let images = pdf_to_image_parts(Some(document.bytes.clone()), rasterizer).await?;
    let parts = assemble_parts(job_description, images.first(), prompts.prompt_for(action));
    let text = generator.generate(&[], &parts).await?;

    Ok(ActionOutcome::Response {
        heading: RESPONSE_HEADING.to_string(),
        text,
    })
}
