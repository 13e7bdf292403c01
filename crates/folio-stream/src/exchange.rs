// Drives one question/answer exchange from event stream to sealed snapshot

use std::sync::Arc;

use futures::StreamExt;
use tracing::error;

use crate::accumulator::{CostUpdate, Fold, ProgressAccumulator, ProgressSnapshot, StreamState};
use crate::client::EventStream;

#[derive(Debug, Clone)]
pub struct ExchangeOutcome {
    pub snapshot: Arc<ProgressSnapshot>,
    /// Present only when the exchange completed and reported a cost
    pub cost: Option<CostUpdate>,
}

impl ExchangeOutcome {
    pub fn succeeded(&self) -> bool {
        self.snapshot.state == StreamState::Succeeded
    }
}

/// Fold every event into `accumulator` until the exchange is sealed.
///
/// `on_update` sees each new snapshot. A transport failure seals the
/// exchange as failed; so does a body that ends without `complete` or
/// `error`.
pub async fn consume<F>(
    mut events: EventStream,
    accumulator: &mut ProgressAccumulator,
    mut on_update: F,
) -> ExchangeOutcome
where
    F: FnMut(&ProgressSnapshot),
{
    let mut cost = None;

    while let Some(item) = events.next().await {
        let fold = match item {
            Ok(event) => accumulator.fold(event),
            Err(e) => {
                error!("Answer stream failed: {}", e);
                accumulator.fail(e.to_string())
            }
        };

        if let Fold::Completed(update) = fold {
            cost = update;
        }
        if fold.changed() {
            on_update(&accumulator.snapshot());
        }
        if accumulator.is_sealed() {
            break;
        }
    }

    if accumulator.finish().changed() {
        on_update(&accumulator.snapshot());
    }

    ExchangeOutcome {
        snapshot: accumulator.snapshot(),
        cost,
    }
}
