//! Per-phase projection consumed by whatever surface displays the workflow.

use std::fmt;

use crate::{
    file_selection::SelectedImage,
    preview::{render_preview, PreviewView},
    workflow::WorkflowPhase,
};

pub const LOADING_TEXT: &str = "Analyzing...";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusLine {
    Loading,
    Result(String),
    Error(String),
}

impl fmt::Display for StatusLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loading => f.write_str(LOADING_TEXT),
            Self::Result(label) => write!(f, "Result: {label}"),
            Self::Error(message) => f.write_str(message),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowView {
    pub preview: Option<PreviewView>,
    pub submit_enabled: bool,
    pub status: Option<StatusLine>,
}

impl WorkflowView {
    pub fn project(phase: &WorkflowPhase, image: Option<&SelectedImage>) -> Self {
        let status = match phase {
            WorkflowPhase::Idle | WorkflowPhase::ReadyToSubmit => None,
            WorkflowPhase::Submitting => Some(StatusLine::Loading),
            WorkflowPhase::Succeeded(result) => Some(StatusLine::Result(result.label.clone())),
            WorkflowPhase::Failed(message) => Some(StatusLine::Error(message.clone())),
        };

        Self {
            preview: render_preview(image),
            submit_enabled: !matches!(phase, WorkflowPhase::Submitting),
            status,
        }
    }

    pub fn status_text(&self) -> Option<String> {
        self.status.as_ref().map(ToString::to_string)
    }
}
