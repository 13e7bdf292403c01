// Everything the client remembers between runs

use std::sync::Arc;

use folio_persist::{KeyValueStore, PersistentState};
use folio_stream::SessionCost;
use folio_types::{ChatMessage, DocumentSet};

pub const DOCUMENTS_KEY: &str = "documents";
pub const DESCRIPTION_KEY: &str = "description";
pub const CHAT_HISTORY_KEY: &str = "chat_history";
pub const SESSION_COST_KEY: &str = "session_cost";

pub type Store = Arc<dyn KeyValueStore>;

pub struct ClientState {
    pub documents: PersistentState<DocumentSet, Store>,
    pub description: PersistentState<String, Store>,
    pub chat_history: PersistentState<Vec<ChatMessage>, Store>,
    pub session_cost: PersistentState<SessionCost, Store>,
}

impl ClientState {
    pub async fn open(store: Store) -> Self {
        Self {
            documents: PersistentState::load(
                Arc::clone(&store),
                DOCUMENTS_KEY,
                DocumentSet::default(),
            )
            .await,
            description: PersistentState::load(Arc::clone(&store), DESCRIPTION_KEY, String::new())
                .await,
            chat_history: PersistentState::load(Arc::clone(&store), CHAT_HISTORY_KEY, Vec::new())
                .await,
            session_cost: PersistentState::load(store, SESSION_COST_KEY, SessionCost::default())
                .await,
        }
    }

    /// A description is mandatory for the first upload only
    pub fn needs_description(&self) -> bool {
        self.documents.get().is_empty() && self.description.get().trim().is_empty()
    }

    pub async fn reset(&mut self) {
        self.documents.reset(DocumentSet::default()).await;
        self.description.reset(String::new()).await;
        self.chat_history.reset(Vec::new()).await;
        self.session_cost.reset(SessionCost::default()).await;
    }
}
