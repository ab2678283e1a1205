use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::response::sse::{Event, Sse};
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::{BroadcastStream, IntervalStream, WatchStream};
use tokio_stream::StreamExt;

use crate::state::AppState;

// GET /events — SSE feed for the staff dashboard.
// Ends when the server starts shutting down so graceful shutdown can finish.
pub async fn events_stream(
    State(state): State<Arc<AppState>>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>> {
    let rx = state.events_tx.subscribe();

    let live_stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(event) => {
            let data = serde_json::to_string(&event).unwrap_or_default();
            Some(Some(Ok::<_, Infallible>(
                Event::default().data(data).event(event.name()),
            )))
        }
        Err(BroadcastStreamRecvError::Lagged(skipped)) => {
            tracing::warn!(skipped, "events subscriber lagged");
            None
        }
    });

    let keepalive_stream = IntervalStream::new(tokio::time::interval(Duration::from_secs(30)))
        .map(|_| Some(Ok::<_, Infallible>(Event::default().comment("keepalive"))));

    let stop_stream = WatchStream::new(state.shutdown_tx.subscribe())
        .filter(|stopping| *stopping)
        .map(|_| None::<Result<Event, Infallible>>);

    let merged = live_stream
        .merge(keepalive_stream)
        .merge(stop_stream)
        .map_while(|item| item);

    Sse::new(merged)
}
