use serde::{Deserialize, Serialize};

/// Text extracted from a single page of an uploaded document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentPage {
    pub page_number: u32,
    pub text: String,
}

/// Document descriptor returned by the upload endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentData {
    pub id: u64,
    pub filename: String,
    #[serde(default)]
    pub pages: Vec<DocumentPage>,
    pub total_pages: u32,
}

/// Reference to a document chosen during the selection phase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedDocument {
    pub id: u64,
    pub filename: String,
}

/// Successful upload response body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub documents: Vec<DocumentData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// The caller-owned collection of documents known to a chat.
///
/// Upload results keep the identities the server handed out for the batch;
/// renumbering into this collection happens here, after the whole upload
/// has succeeded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentSet {
    documents: Vec<DocumentData>,
}

impl DocumentSet {
    pub fn new(documents: Vec<DocumentData>) -> Self {
        Self { documents }
    }

    pub fn documents(&self) -> &[DocumentData] {
        &self.documents
    }

    pub fn into_documents(self) -> Vec<DocumentData> {
        self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn filenames(&self) -> impl Iterator<Item = &str> {
        self.documents.iter().map(|d| d.filename.as_str())
    }

    /// Highest id currently in use, 0 when empty
    pub fn max_id(&self) -> u64 {
        self.documents.iter().map(|d| d.id).max().unwrap_or(0)
    }

    /// Append newly uploaded documents, assigning ids `max_id + i + 1` in order.
    ///
    /// Returns the ids that were assigned.
    pub fn append_with_fresh_ids(&mut self, new_documents: Vec<DocumentData>) -> Vec<u64> {
        let base = self.max_id();
        let mut assigned = Vec::with_capacity(new_documents.len());

        for (index, mut doc) in new_documents.into_iter().enumerate() {
            doc.id = base + index as u64 + 1;
            assigned.push(doc.id);
            self.documents.push(doc);
        }

        assigned
    }

    /// Remove a document by id, returning it if present
    pub fn remove(&mut self, id: u64) -> Option<DocumentData> {
        let pos = self.documents.iter().position(|d| d.id == id)?;
        Some(self.documents.remove(pos))
    }
}
