use axum::{
    extract::{Extension, State},
    response::sse::{Event, KeepAlive, Sse},
};
use futures::Stream;
use serde::Serialize;
use std::convert::Infallible;
use std::time::Duration;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;

use crate::api::AppState;
use crate::auth::AuthUser;
use crate::domain::Board;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum BoardEvent {
    BoardUpdated {
        #[serde(skip)]
        board_key: String,
        action: String,
        board: Board,
    },
}

impl BoardEvent {
    pub fn board_key(&self) -> &str {
        match self {
            BoardEvent::BoardUpdated { board_key, .. } => board_key,
        }
    }
}

/// Streams change events for the caller's own board only.
pub async fn board_events(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let board_key = auth_user.user_id;
    let stream = BroadcastStream::new(state.events.subscribe());

    let event_stream = stream.filter_map(move |result| {
        let event = result.ok()?;
        if event.board_key() != board_key {
            return None;
        }
        let payload = serde_json::to_string(&event).ok()?;
        Some(Ok(Event::default().event("board").data(payload)))
    });

    Sse::new(event_stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}
