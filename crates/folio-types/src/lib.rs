pub mod chat;
pub mod document;
pub mod events;

pub use chat::{ChatContext, ChatMessage, ChatRequest, Role};
pub use document::{DocumentData, DocumentPage, DocumentSet, SelectedDocument, UploadResponse};
pub use events::{CostBreakdown, Phase, StreamEvent, TimingBreakdown};
