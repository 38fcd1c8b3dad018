use crate::interface_adapters::protocol::{ClientMessage, ServerMessage};
use crate::interface_adapters::state::{
    AppState, ConnectionDirectory, DirectFrame, FrameKind, RoomFeed, RoomFrame,
};
use crate::use_cases::GameEvent;

use axum::{
    Error,
    extract::{
        State,
        ws::{CloseFrame, Message, Utf8Bytes, WebSocket, WebSocketUpgrade, close_code},
    },
    response::IntoResponse,
};
use futures::SinkExt;
use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::{broadcast, mpsc};
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

#[derive(Debug)]
enum NetError {
    // Categorizes connection lifecycle failures so callers can decide policy.
    #[allow(dead_code)]
    Ws(axum::Error),
    #[allow(dead_code)]
    Serialization(serde_json::Error),
    InputClosed,
    DirectQueueClosed,
}

impl From<axum::Error> for NetError {
    fn from(e: axum::Error) -> Self {
        NetError::Ws(e)
    }
}

const LOG_THROTTLE: Duration = Duration::from_secs(2);

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| {
        // Connection ids are opaque to clients and also key the player in its room.
        let conn_id = Uuid::new_v4().to_string();
        let span = info_span!("conn", conn_id = %conn_id);
        handle_socket(socket, state, conn_id).instrument(span)
    })
}

async fn handle_socket(mut socket: WebSocket, state: Arc<AppState>, conn_id: String) {
    // Registered before the identity goes out, so a join can never outrun its queue.
    let direct_rx = state
        .connections
        .register(&conn_id, state.connection_queue_capacity)
        .await;

    let identity = ServerMessage::Identity {
        conn_id: conn_id.clone(),
    };
    let bytes_out = match send_message(&mut socket, &identity).await {
        Ok(bytes) => bytes as u64,
        Err(e) => {
            warn!(error = ?e, "failed to send identity");
            state.connections.unregister(&conn_id).await;
            return;
        }
    };
    info!("client connected");

    let now = Instant::now() - LOG_THROTTLE;
    let mut ctx = ConnCtx {
        conn_id,
        input_tx: state.input_tx.clone(),
        connections: state.connections.clone(),
        direct_rx,
        room_feed: None,

        msgs_in: 0,
        msgs_out: 1,
        bytes_in: 0,
        bytes_out,

        invalid_json: 0,
        frames_lagged: 0,

        last_input_full_log: now,
        last_frame_lag_log: now,
        last_invalid_input_log: now,

        close_frame: None,
    };

    if let Err(e) = run_client_loop(&mut socket, &mut ctx).await {
        warn!(error = ?e, "client loop exited with error");
    }
}

async fn send_message(socket: &mut WebSocket, msg: &ServerMessage) -> Result<usize, NetError> {
    let txt = serde_json::to_string(msg).map_err(NetError::Serialization)?;
    let bytes = txt.len();
    socket
        .send(Message::Text(txt.into()))
        .await
        .map_err(NetError::Ws)?;
    Ok(bytes)
}

struct ConnCtx {
    pub conn_id: String,
    pub input_tx: mpsc::Sender<GameEvent>,
    pub connections: Arc<ConnectionDirectory>,
    pub direct_rx: mpsc::Receiver<DirectFrame>,
    // Room whose broadcasts this connection forwards; set by its init frame.
    pub room_feed: Option<RoomFeed>,

    pub msgs_in: u64,
    pub msgs_out: u64,
    pub bytes_in: u64,
    pub bytes_out: u64,

    pub invalid_json: u64,
    pub frames_lagged: u64,

    pub last_input_full_log: Instant,
    pub last_frame_lag_log: Instant,
    pub last_invalid_input_log: Instant,

    pub close_frame: Option<CloseFrame>,
}

enum LoopControl {
    Continue,
    Disconnect,
}

fn should_log(last: &mut Instant) -> bool {
    if last.elapsed() >= LOG_THROTTLE {
        *last = Instant::now();
        true
    } else {
        false
    }
}

/// Builds the engine intent for a decoded client message.
///
/// Intents that name a room other than the one this connection plays in are
/// dropped; the engine decides everything else.
fn intent_for(
    conn_id: &str,
    current_room: Option<&str>,
    msg: ClientMessage,
) -> Option<GameEvent> {
    if !matches!(msg, ClientMessage::Join(_)) {
        if let (Some(named), Some(current)) = (msg.room_code(), current_room) {
            if named.trim() != current {
                return None;
            }
        }
    }

    let conn_id = conn_id.to_string();
    Some(match msg {
        ClientMessage::Join(p) => GameEvent::Join {
            conn_id,
            class_tag: p.class_tag,
            room_code: p.room_code,
        },
        ClientMessage::Move(p) => GameEvent::Move {
            conn_id,
            angle: p.angle,
        },
        ClientMessage::Shoot(p) => GameEvent::Shoot {
            conn_id,
            vx: p.vx,
            vy: p.vy,
        },
        ClientMessage::UseAbility(p) => GameEvent::UseAbility {
            conn_id,
            class_tag: p.class_tag,
        },
    })
}

async fn forward_intent(
    input_tx: &mpsc::Sender<GameEvent>,
    event: GameEvent,
    last_input_full_log: &mut Instant,
) -> Result<LoopControl, NetError> {
    // Joins must not be lost; per-tick intents are dropped under backpressure.
    if matches!(event, GameEvent::Join { .. }) {
        input_tx
            .send(event)
            .await
            .map_err(|_| NetError::InputClosed)?;
        return Ok(LoopControl::Continue);
    }

    match input_tx.try_send(event) {
        Ok(()) => Ok(LoopControl::Continue),
        Err(mpsc::error::TrySendError::Full(_evt)) => {
            if should_log(last_input_full_log) {
                warn!("input channel full; dropping intent");
            }
            Ok(LoopControl::Continue)
        }
        Err(mpsc::error::TrySendError::Closed(_evt)) => Err(NetError::InputClosed),
    }
}

async fn run_client_loop(socket: &mut WebSocket, ctx: &mut ConnCtx) -> Result<(), NetError> {
    // Split borrows so `tokio::select!` can hold them concurrently.
    let ConnCtx {
        conn_id,
        input_tx,
        connections,
        direct_rx,
        room_feed,
        msgs_in,
        msgs_out,
        bytes_in,
        bytes_out,
        invalid_json,
        frames_lagged,
        last_input_full_log,
        last_frame_lag_log,
        last_invalid_input_log,
        close_frame,
    } = ctx;

    let mut fatal: Option<NetError> = None;

    loop {
        let disconnect: bool = tokio::select! {
            incoming = socket.recv() => {
                match handle_incoming_ws(
                    incoming,
                    conn_id,
                    room_feed.as_ref().map(|feed| &*feed.room_code),
                    input_tx,
                    msgs_in,
                    bytes_in,
                    invalid_json,
                    last_input_full_log,
                    last_invalid_input_log,
                    close_frame,
                ).await {
                    Ok(LoopControl::Continue) => false,
                    Ok(LoopControl::Disconnect) => true,
                    Err(e) => {
                        fatal = Some(e);
                        true
                    }
                }
            }

            direct = direct_rx.recv() => {
                match direct {
                    Some(DirectFrame { bytes, feed }) => {
                        if feed.is_some() {
                            // A new init; any earlier room is left behind.
                            *room_feed = feed;
                        }
                        match forward_frame(bytes, socket, msgs_out, bytes_out).await {
                            LoopControl::Continue => false,
                            LoopControl::Disconnect => true,
                        }
                    }
                    None => {
                        fatal = Some(NetError::DirectQueueClosed);
                        true
                    }
                }
            }

            frame = next_room_frame(room_feed) => {
                match frame {
                    Ok(RoomFrame { kind, bytes }) => {
                        if kind == FrameKind::GameOver {
                            // The room is finished; stop following it.
                            *room_feed = None;
                        }
                        match forward_frame(bytes, socket, msgs_out, bytes_out).await {
                            LoopControl::Continue => false,
                            LoopControl::Disconnect => true,
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        // Snapshots are complete, so the next one resyncs the client.
                        *frames_lagged += n;
                        if should_log(last_frame_lag_log) {
                            warn!(missed = n, "room updates lagged; waiting for next snapshot");
                        }
                        false
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        *room_feed = None;
                        false
                    }
                }
            }
        };

        if disconnect {
            if let Some(frame) = close_frame.take() {
                let _ = socket.send(Message::Close(Some(frame))).await;
            }
            if let Err(err) = socket.close().await.map_err(NetError::Ws) {
                debug!(error = ?err, "socket close error");
            }
            break;
        }
    }

    if let Err(e) = disconnect_cleanup(
        conn_id,
        input_tx,
        connections,
        *msgs_in,
        *msgs_out,
        *bytes_in,
        *bytes_out,
        *invalid_json,
        *frames_lagged,
    )
    .await
    {
        warn!(error = ?e, "error during disconnect cleanup");
        if fatal.is_none() {
            fatal = Some(e);
        }
    }

    match fatal {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Next frame of the followed room; pends forever while not in a room.
async fn next_room_frame(
    room_feed: &mut Option<RoomFeed>,
) -> Result<RoomFrame, broadcast::error::RecvError> {
    match room_feed {
        Some(feed) => feed.frames.recv().await,
        None => std::future::pending().await,
    }
}

#[allow(clippy::too_many_arguments)]
async fn handle_incoming_ws(
    incoming: Option<Result<Message, Error>>,
    conn_id: &str,
    current_room: Option<&str>,
    input_tx: &mpsc::Sender<GameEvent>,
    msgs_in: &mut u64,
    bytes_in: &mut u64,
    invalid_json: &mut u64,
    last_input_full_log: &mut Instant,
    last_invalid_input_log: &mut Instant,
    close_frame: &mut Option<CloseFrame>,
) -> Result<LoopControl, NetError> {
    match incoming {
        Some(Ok(msg)) => match msg {
            Message::Text(text) => {
                *msgs_in += 1;
                *bytes_in += text.len() as u64;

                match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(msg) => match intent_for(conn_id, current_room, msg) {
                        Some(event) => forward_intent(input_tx, event, last_input_full_log).await,
                        None => {
                            if should_log(last_invalid_input_log) {
                                debug!("intent for another room dropped");
                            }
                            Ok(LoopControl::Continue)
                        }
                    },
                    Err(parse_err) => {
                        // Malformed intents have no effect; the connection stays open.
                        *invalid_json += 1;
                        if should_log(last_invalid_input_log) {
                            warn!(
                                bytes = text.len(),
                                error = %parse_err,
                                "failed to parse client message"
                            );
                        }
                        Ok(LoopControl::Continue)
                    }
                }
            }
            Message::Binary(_) => {
                *close_frame = Some(CloseFrame {
                    code: close_code::UNSUPPORTED,
                    reason: "binary messages not supported".into(),
                });
                Ok(LoopControl::Disconnect)
            }
            Message::Ping(_) | Message::Pong(_) => Ok(LoopControl::Continue),
            Message::Close(_) => Ok(LoopControl::Disconnect),
        },
        Some(Err(e)) => {
            warn!(error = %e, "websocket recv error");
            Ok(LoopControl::Disconnect)
        }
        None => {
            info!("websocket closed");
            Ok(LoopControl::Disconnect)
        }
    }
}

async fn forward_frame(
    bytes: Utf8Bytes,
    socket: &mut WebSocket,
    msgs_out: &mut u64,
    bytes_out: &mut u64,
) -> LoopControl {
    let bytes_len = bytes.len();
    match socket.send(Message::Text(bytes)).await.map_err(NetError::Ws) {
        Ok(()) => {
            *msgs_out += 1;
            *bytes_out += bytes_len as u64;
            LoopControl::Continue
        }
        Err(err) => {
            warn!(error = ?err, "failed to send room update");
            LoopControl::Disconnect
        }
    }
}

#[allow(clippy::too_many_arguments)]
async fn disconnect_cleanup(
    conn_id: &str,
    input_tx: &mpsc::Sender<GameEvent>,
    connections: &ConnectionDirectory,
    msgs_in: u64,
    msgs_out: u64,
    bytes_in: u64,
    bytes_out: u64,
    invalid_json: u64,
    frames_lagged: u64,
) -> Result<(), NetError> {
    debug!(
        msgs_in,
        msgs_out, bytes_in, bytes_out, invalid_json, frames_lagged, "connection stats"
    );

    connections.unregister(conn_id).await;

    // Leave is queued behind this connection's earlier intents.
    input_tx
        .send(GameEvent::Leave {
            conn_id: conn_id.to_string(),
        })
        .await
        .map_err(|_| NetError::InputClosed)?;

    info!("client disconnected");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interface_adapters::protocol::{JoinPayload, MovePayload, ShootPayload};

    fn shoot(room_code: Option<&str>) -> ClientMessage {
        ClientMessage::Shoot(ShootPayload {
            vx: 1.0,
            vy: 2.0,
            room_code: room_code.map(str::to_string),
        })
    }

    #[test]
    fn intents_carry_the_connection_id() {
        let event = intent_for(
            "c1",
            None,
            ClientMessage::Move(MovePayload {
                angle: 0.5,
                room_code: None,
            }),
        );
        assert!(matches!(
            event,
            Some(GameEvent::Move { ref conn_id, angle }) if conn_id == "c1" && angle == 0.5
        ));
    }

    #[test]
    fn intents_naming_another_room_are_dropped() {
        assert!(intent_for("c1", Some("ABCD"), shoot(Some("WXYZ"))).is_none());
        assert!(intent_for("c1", Some("ABCD"), shoot(Some(" ABCD "))).is_some());
        assert!(intent_for("c1", Some("ABCD"), shoot(None)).is_some());
        // Before the init arrives there is nothing to compare against.
        assert!(intent_for("c1", None, shoot(Some("WXYZ"))).is_some());
    }

    #[test]
    fn join_is_never_filtered_by_current_room() {
        let join = ClientMessage::Join(JoinPayload {
            class_tag: "Tank".to_string(),
            room_code: "WXYZ".to_string(),
        });
        assert!(matches!(
            intent_for("c1", Some("ABCD"), join),
            Some(GameEvent::Join { ref room_code, .. }) if room_code == "WXYZ"
        ));
    }

    #[tokio::test]
    async fn room_frames_wait_until_a_feed_is_set() {
        let mut room_feed: Option<RoomFeed> = None;
        let idle = tokio::time::timeout(
            Duration::from_millis(20),
            next_room_frame(&mut room_feed),
        )
        .await;
        assert!(idle.is_err(), "no room means no frames");

        let (tx, frames) = broadcast::channel(4);
        room_feed = Some(RoomFeed {
            room_code: Arc::from("ABCD"),
            frames,
        });
        tx.send(RoomFrame {
            kind: FrameKind::StateUpdate,
            bytes: Utf8Bytes::from_static("{}"),
        })
        .unwrap();
        let frame = next_room_frame(&mut room_feed).await.unwrap();
        assert_eq!(frame.kind, FrameKind::StateUpdate);
    }
}
