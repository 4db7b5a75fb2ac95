//! Live bookable-slot stream over WebSocket.
//!
//! Connection lifecycle:
//! 1. Client opens `GET /ws/slots?counsellor_id=..&date=YYYY-MM-DD`
//! 2. Server resolves the pair and pushes a `Slots` message for every
//!    publication (full list, never a delta)
//! 3. Client may send `{"type":"Retarget","counsellor_id":..,"date":..}`
//!    at any time; pushes for the previous pair stop immediately, including
//!    ones already queued for a slow client
//! 4. Closing the socket tears the resolution down

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use chrono::NaiveDate;
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::api::error::ApiError;
use crate::api::types::{parse_optional_date, ApiContext};
use crate::core_state::CoreState;
use crate::scheduling::SlotSnapshot;

/// Outgoing buffer between the resolver loop and the socket writer.
const OUTGOING_CAPACITY: usize = 32;

#[derive(Deserialize)]
pub struct SlotStreamQuery {
    #[serde(default)]
    counsellor_id: String,
    date: Option<String>,
}

/// Client → server messages.
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub enum WsIncoming {
    Retarget {
        #[serde(default)]
        counsellor_id: String,
        #[serde(default)]
        date: Option<String>,
    },
}

/// Server → client messages.
#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum WsOutgoing {
    Slots(SlotSnapshot),
    Error { message: String },
}

/// An outgoing message stamped with the target generation it was produced for.
struct Queued {
    generation: u64,
    msg: WsOutgoing,
}

impl Queued {
    /// `Slots` from an earlier target are stale once a retarget happened;
    /// everything else is always delivered.
    fn is_current(&self, generation: u64) -> bool {
        match self.msg {
            WsOutgoing::Slots(_) => self.generation == generation,
            WsOutgoing::Error { .. } => true,
        }
    }
}

/// `GET /ws/slots`: upgrade after validating the initial target.
pub async fn ws_upgrade(
    ws: WebSocketUpgrade,
    State(ctx): State<ApiContext>,
    Query(query): Query<SlotStreamQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let date = parse_optional_date(query.date.as_deref())?;
    let counsellor_id = query.counsellor_id;

    tracing::info!(%counsellor_id, ?date, "Slot stream upgrade accepted");
    let core = ctx.core.clone();
    Ok(ws.on_upgrade(move |socket| handle_ws(socket, core, counsellor_id, date)))
}

async fn handle_ws(
    socket: WebSocket,
    core: Arc<CoreState>,
    counsellor_id: String,
    date: Option<NaiveDate>,
) {
    let (ws_sink, mut ws_stream) = socket.split();
    let (tx, mut rx) = mpsc::channel::<Queued>(OUTGOING_CAPACITY);
    // Bumped on every retarget; the writer skips snapshots queued before it.
    let generation = Arc::new(AtomicU64::new(0));

    let current = generation.clone();
    let sender_handle = tokio::spawn(async move {
        let mut sink = ws_sink;
        while let Some(queued) = rx.recv().await {
            if !queued.is_current(current.load(Ordering::SeqCst)) {
                continue;
            }
            let json = match serde_json::to_string(&queued.msg) {
                Ok(j) => j,
                Err(_) => continue,
            };
            if sink.send(Message::Text(json)).await.is_err() {
                break;
            }
        }
        let _ = sink.close().await;
    });

    let mut watch = core.resolver().resolve(&counsellor_id, date);
    // False once the current target has published everything it will.
    let mut live = true;

    loop {
        tokio::select! {
            msg = ws_stream.next() => {
                match msg {
                    Some(Ok(Message::Text(ref text))) => {
                        match serde_json::from_str::<WsIncoming>(text) {
                            Ok(WsIncoming::Retarget { counsellor_id, date }) => {
                                match parse_optional_date(date.as_deref()) {
                                    Ok(date) => {
                                        tracing::debug!(%counsellor_id, ?date, "Slot stream retarget");
                                        generation.fetch_add(1, Ordering::SeqCst);
                                        watch.retarget(&counsellor_id, date);
                                        live = true;
                                    }
                                    Err(e) => {
                                        let queued = Queued {
                                            generation: generation.load(Ordering::SeqCst),
                                            msg: WsOutgoing::Error { message: e.to_string() },
                                        };
                                        let _ = tx.send(queued).await;
                                    }
                                }
                            }
                            Err(e) => {
                                tracing::debug!(error = %e, "Ignoring malformed slot stream message");
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(_)) => break,
                    _ => {}
                }
            }
            snapshot = watch.next(), if live => {
                match snapshot {
                    Some(snapshot) => {
                        let queued = Queued {
                            generation: generation.load(Ordering::SeqCst),
                            msg: WsOutgoing::Slots(snapshot),
                        };
                        if tx.send(queued).await.is_err() {
                            break;
                        }
                    }
                    None => live = false,
                }
            }
        }
    }

    drop(watch);
    drop(tx);
    let _ = sender_handle.await;

    tracing::info!("Slot stream disconnected");
}
