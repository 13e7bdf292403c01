use serde::{Deserialize, Serialize};

use crate::document::SelectedDocument;

/// Phases of the backend's question-answering pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    DocumentSelection,
    PageSelection,
    AnswerGeneration,
}

impl Phase {
    /// Map a wire step name to a known phase
    pub fn from_step(step: &str) -> Option<Self> {
        match step {
            "document_selection" => Some(Phase::DocumentSelection),
            "page_selection" | "page_detection" => Some(Phase::PageSelection),
            "answer_generation" => Some(Phase::AnswerGeneration),
            _ => None,
        }
    }
}

/// Seconds spent in each phase
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimingBreakdown {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_selection: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_detection: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer_generation: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_time: Option<f64>,
}

/// Dollar cost of each phase
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_selection: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_detection: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer_generation: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_cost: Option<f64>,
}

/// One record of the chat response stream, discriminated by `type`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// A phase has started
    Status {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        step: Option<String>,
        #[serde(default)]
        message: String,
        #[serde(default)]
        step_number: u32,
        #[serde(default)]
        total_steps: u32,
    },

    /// A phase has finished; carries phase-specific results
    StepComplete {
        step: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        cost: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        time_taken: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        selected_documents: Option<Vec<SelectedDocument>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        relevant_pages_count: Option<u32>,
    },

    /// Answer text fragment
    Content {
        content: String,
    },

    /// Terminal success
    Complete {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timing_breakdown: Option<TimingBreakdown>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        cost_breakdown: Option<CostBreakdown>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        model: Option<String>,
        /// Running total for the whole session, sent by stateful backends
        #[serde(default, skip_serializing_if = "Option::is_none")]
        session_cost: Option<f64>,
    },

    /// Terminal failure reported by the far end
    Error {
        #[serde(alias = "message")]
        error: String,
    },

    /// Any `type` this client does not know about
    #[serde(other)]
    Unknown,
}

impl StreamEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            StreamEvent::Status { .. } => "status",
            StreamEvent::StepComplete { .. } => "step_complete",
            StreamEvent::Content { .. } => "content",
            StreamEvent::Complete { .. } => "complete",
            StreamEvent::Error { .. } => "error",
            StreamEvent::Unknown => "unknown",
        }
    }
}
