//! SSE event stream
//!
//! Forwards `StudioEvent`s to connected browsers. A client may scope
//! the stream to one session with `?session_id=`. A lagging client
//! that misses events receives a `Lagged` marker and is expected to
//! re-fetch state.

use crate::AppState;
use axum::{
    extract::{Query, State},
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::Stream;
use serde::Deserialize;
use std::convert::Infallible;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info};

#[derive(Debug, Deserialize)]
pub struct EventStreamQuery {
    #[serde(default)]
    pub session_id: Option<String>,
}

/// GET /api/events
pub async fn event_stream(
    State(state): State<AppState>,
    Query(query): Query<EventStreamQuery>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    info!(session_id = ?query.session_id, "New SSE client connected");
    let mut rx = state.event_bus.subscribe();
    let wanted = query.session_id;

    let stream = async_stream::stream! {
        yield Ok(Event::default().event("ConnectionStatus").data("connected"));

        loop {
            match rx.recv().await {
                Ok(event) => {
                    if let Some(session_id) = &wanted {
                        if event.session_id() != session_id {
                            continue;
                        }
                    }
                    match serde_json::to_string(&event) {
                        Ok(payload) => {
                            yield Ok(Event::default().event("StudioEvent").data(payload));
                        }
                        Err(e) => {
                            debug!(error = %e, "Failed to serialize event for SSE");
                        }
                    }
                }
                Err(RecvError::Lagged(missed)) => {
                    debug!(missed, "SSE client lagged; signalling refetch");
                    yield Ok(Event::default().event("Lagged").data(missed.to_string()));
                }
                Err(RecvError::Closed) => break,
            }
        }
    };

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("heartbeat"),
    )
}
