use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use folio_stream::{consume, ChatStreamClient, ChatStreamer, ProgressAccumulator, StreamState};
use folio_types::{ChatMessage, ChatRequest};
use folio_upload::{HttpUploadTransport, UploadFile, UploadOrchestrator, UploadRequest};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::render::{progress_line, AnswerRenderer};
use crate::state::ClientState;

pub async fn upload(
    config: &Config,
    state: &mut ClientState,
    paths: Vec<PathBuf>,
    description: Option<String>,
) -> Result<()> {
    let mut files = Vec::with_capacity(paths.len());
    for path in &paths {
        let file = UploadFile::from_path(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        files.push(file);
    }

    let description = description.unwrap_or_else(|| state.description.get().clone());

    let mut limits = config.upload.clone();
    if state.needs_description() {
        limits = limits.require_description(true);
    }

    let transport = HttpUploadTransport::new(config.server.upload_url())?;
    debug!("Uploading {} file(s) to {}", paths.len(), transport.endpoint());
    let orchestrator = UploadOrchestrator::new(transport).with_limits(limits);

    let request = UploadRequest::new(files, description.clone())
        .with_existing(state.documents.get().filenames().map(str::to_string));

    if orchestrator.needs_batching(&request.files) {
        let batches = orchestrator.estimate_batches(&request.files)?;
        println!("Large upload, sending in {} batches", batches);
    }

    let outcome = orchestrator
        .upload_with_progress(&request, |progress| println!("{}", progress_line(&progress)))
        .await?;

    let mut ids = Vec::new();
    state
        .documents
        .update(|set| ids = set.append_with_fresh_ids(outcome.documents))
        .await;
    if !description.trim().is_empty() {
        state.description.set(description).await;
    }

    info!(files = outcome.total_files, batches = outcome.batch_count, "Upload complete");
    println!(
        "Uploaded {} file(s), {} document(s) stored",
        ids.len(),
        state.documents.get().len()
    );
    Ok(())
}

pub async fn ask(
    config: &Config,
    state: &mut ClientState,
    question: String,
    model: Option<String>,
    session_id: Option<String>,
) -> Result<()> {
    let model = model.unwrap_or_else(|| config.chat.model.clone());

    let request = match session_id {
        Some(session_id) => ChatRequest::for_session(session_id, question.clone(), model.clone()),
        None => {
            if state.documents.get().is_empty() {
                bail!("No documents uploaded yet. Run `folio upload` first.");
            }
            ChatRequest::inline(
                state.documents.get().documents().to_vec(),
                state.description.get().clone(),
                question.clone(),
                model.clone(),
            )
        }
    }
    .with_history(state.chat_history.get().clone());

    let client = ChatStreamClient::new(&config.server.base_url)?;
    let events = client.ask(&request).await.context("Chat request failed")?;

    let mut accumulator = ProgressAccumulator::with_total_steps(model, config.chat.total_steps);
    let mut renderer = AnswerRenderer::new(std::io::stdout(), std::io::stderr());

    let outcome = consume(events, &mut accumulator, |snapshot| {
        if let Err(e) = renderer.render(snapshot) {
            warn!("Failed to render answer: {}", e);
        }
    })
    .await;

    if let Some(update) = outcome.cost {
        state.session_cost.update(|cost| cost.apply(update)).await;
    }
    renderer.finish(&outcome.snapshot, state.session_cost.get().total)?;

    let answer = outcome.snapshot.content.clone();
    state
        .chat_history
        .update(|history| {
            history.push(ChatMessage::user(question));
            history.push(ChatMessage::assistant(answer));
        })
        .await;

    if outcome.snapshot.state == StreamState::Failed {
        bail!(
            "{}",
            outcome.snapshot.error.as_deref().unwrap_or("Answer failed")
        );
    }
    Ok(())
}

pub fn documents(state: &ClientState) {
    let documents = state.documents.get();
    if documents.is_empty() {
        println!("No documents uploaded.");
    } else {
        let description = state.description.get();
        if !description.is_empty() {
            println!("{}\n", description);
        }
        for doc in documents.documents() {
            println!("{:>4}  {}  ({} pages)", doc.id, doc.filename, doc.total_pages);
        }
    }

    println!(
        "\n{} document(s), {} message(s) in history, session cost ${:.4}",
        documents.len(),
        state.chat_history.get().len(),
        state.session_cost.get().total
    );
}

/// Forget one document; the description goes with the last one
pub async fn remove(state: &mut ClientState, id: u64) -> Result<()> {
    let Some(doc) = state.documents.get().documents().iter().find(|d| d.id == id) else {
        bail!("No document with id {}", id);
    };
    let filename = doc.filename.clone();

    state
        .documents
        .update(|set| {
            set.remove(id);
        })
        .await;
    if state.documents.get().is_empty() {
        state.description.set(String::new()).await;
    }

    println!("Removed {} ({} document(s) left)", filename, state.documents.get().len());
    Ok(())
}

pub async fn describe(state: &mut ClientState, description: String) -> Result<()> {
    if description.trim().is_empty() {
        bail!("Please provide a description of your documents");
    }

    state.description.set(description).await;
    println!("Description updated.");
    Ok(())
}

pub async fn reset(state: &mut ClientState) {
    state.reset().await;
    println!("Cleared stored documents, history and session cost.");
}
