use folio_stream::{
    consume, decode_event_stream, CostUpdate, ProgressAccumulator, SessionCost, StreamError,
    StreamEvent, StreamState, GENERIC_FAILURE_MESSAGE,
};
use futures::{stream, StreamExt};

const FULL_EXCHANGE: &str = concat!(
    "data: {\"type\":\"status\",\"step\":\"document_selection\",\"message\":\"Finding relevant documents...\",\"step_number\":1,\"total_steps\":3}\n\n",
    "data: {\"type\":\"step_complete\",\"step\":\"document_selection\",\"cost\":0.001,\"time_taken\":1.5,\"selected_documents\":[{\"id\":2,\"filename\":\"b.pdf\"}]}\n\n",
    "data: {\"type\":\"status\",\"step\":\"page_selection\",\"message\":\"Finding relevant pages...\",\"step_number\":2,\"total_steps\":3}\n\n",
    "data: {\"type\":\"step_complete\",\"step\":\"page_selection\",\"cost\":0.002,\"time_taken\":0.8,\"relevant_pages_count\":4}\n\n",
    "data: {\"type\":\"status\",\"step\":\"answer_generation\",\"message\":\"Generating comprehensive answer...\",\"step_number\":3,\"total_steps\":3}\n\n",
    "data: {\"type\":\"content\",\"content\":\"Hello\"}\n\n",
    "data: {\"type\":\"content\",\"content\":\" world\"}\n\n",
    "data: {\"type\":\"complete\",\"timing_breakdown\":{\"total_time\":3.1},\"cost_breakdown\":{\"total_cost\":0.01}}\n\n",
);

type Chunk = Result<Vec<u8>, String>;

fn fragments(body: &str, size: usize) -> Vec<Chunk> {
    body.as_bytes().chunks(size).map(|c| Ok(c.to_vec())).collect()
}

#[tokio::test]
async fn test_fragmentation_does_not_change_events() {
    let whole_body = fragments(FULL_EXCHANGE, FULL_EXCHANGE.len());
    let whole: Vec<_> = decode_event_stream(stream::iter(whole_body)).collect().await;

    for size in [1, 2, 7, 64] {
        let split: Vec<_> = decode_event_stream(stream::iter(fragments(FULL_EXCHANGE, size)))
            .collect()
            .await;

        assert_eq!(split.len(), whole.len(), "fragment size {}", size);
        for (a, b) in split.iter().zip(whole.iter()) {
            assert_eq!(a.as_ref().unwrap(), b.as_ref().unwrap());
        }
    }
    assert_eq!(whole.len(), 8);
}

#[tokio::test]
async fn test_transport_error_is_yielded_once() {
    let chunks: Vec<Chunk> = vec![
        Ok(b"data: {\"type\":\"content\",\"content\":\"Hel\"}\n".to_vec()),
        Err("connection reset".to_string()),
        Ok(b"data: {\"type\":\"content\",\"content\":\"never\"}\n".to_vec()),
    ];

    let items: Vec<_> = decode_event_stream(stream::iter(chunks)).collect().await;

    assert_eq!(items.len(), 2);
    assert!(matches!(items[0], Ok(StreamEvent::Content { .. })));
    match &items[1] {
        Err(StreamError::Transport(message)) => assert!(message.contains("connection reset")),
        other => panic!("Expected transport error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_consume_full_exchange() {
    let events = decode_event_stream(stream::iter(fragments(FULL_EXCHANGE, 5)));
    let mut acc = ProgressAccumulator::new("gpt-5-mini");
    let mut seen = Vec::new();

    let outcome = consume(events, &mut acc, |snapshot| seen.push(snapshot.version)).await;

    assert!(outcome.succeeded());
    assert_eq!(outcome.snapshot.content, "Hello world");
    assert_eq!(outcome.snapshot.metadata.selected_documents[0].id, 2);
    assert_eq!(outcome.snapshot.metadata.relevant_pages_count, 4);
    assert_eq!(outcome.snapshot.metadata.model.as_deref(), Some("gpt-5-mini"));
    assert_eq!(outcome.cost, Some(CostUpdate::Add(0.01)));

    // One update per applied event, versions strictly increasing
    assert_eq!(seen, (1..=8).collect::<Vec<u64>>());

    let mut session = SessionCost { total: 0.05 };
    session.apply(outcome.cost.unwrap());
    assert!((session.total - 0.06).abs() < 1e-9);
}

#[tokio::test]
async fn test_malformed_line_between_good_ones() {
    let body = concat!(
        "data: {\"type\":\"content\",\"content\":\"A\"}\n",
        "data: {\"type\":\"content\",\n",
        "data: {\"type\":\"content\",\"content\":\"B\"}\n",
    );
    let events = decode_event_stream(stream::iter(fragments(body, 4)));
    let mut acc = ProgressAccumulator::new("m");

    let outcome = consume(events, &mut acc, |_| {}).await;

    // No terminal event, so the exchange is sealed as failed at the end
    assert_eq!(outcome.snapshot.state, StreamState::Failed);
    assert_eq!(outcome.snapshot.version, 3);
    assert!(outcome.cost.is_none());
}

#[tokio::test]
async fn test_consume_stops_at_error_event() {
    let body = concat!(
        "data: {\"type\":\"content\",\"content\":\"partial\"}\n\n",
        "data: {\"type\":\"error\",\"error\":\"Model overloaded\"}\n\n",
        "data: {\"type\":\"content\",\"content\":\"ignored\"}\n\n",
    );
    let events = decode_event_stream(stream::iter(fragments(body, body.len())));
    let mut acc = ProgressAccumulator::new("m");

    let outcome = consume(events, &mut acc, |_| {}).await;

    assert!(!outcome.succeeded());
    assert_eq!(outcome.snapshot.content, GENERIC_FAILURE_MESSAGE);
    assert_eq!(outcome.snapshot.error.as_deref(), Some("Model overloaded"));
}

#[tokio::test]
async fn test_consume_transport_failure() {
    let chunks: Vec<Chunk> = vec![
        Ok(b"data: {\"type\":\"content\",\"content\":\"Hel\"}\n".to_vec()),
        Err("connection reset".to_string()),
    ];
    let mut acc = ProgressAccumulator::new("m");
    let mut updates = 0;

    let events = decode_event_stream(stream::iter(chunks));
    let outcome = consume(events, &mut acc, |_| updates += 1).await;

    assert_eq!(outcome.snapshot.state, StreamState::Failed);
    assert!(outcome.snapshot.error.as_deref().unwrap().contains("connection reset"));
    assert_eq!(updates, 2);
}
