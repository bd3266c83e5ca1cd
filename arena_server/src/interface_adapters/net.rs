use crate::domain::{Command, PlayerId};
use crate::interface_adapters::protocol::{ClientMessage, ServerMessage, WorldUpdateDto};
use crate::interface_adapters::state::AppState;
use crate::use_cases::{GameEvent, WorldUpdate};

use axum::{
    extract::{
        State,
        ws::{CloseFrame, Message, Utf8Bytes, WebSocket, WebSocketUpgrade, close_code},
    },
    response::IntoResponse,
};
use futures::SinkExt;
use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::{Duration, Instant},
};
use tokio::sync::{broadcast, mpsc, watch};
use tokio::time::timeout;
use tracing::{Instrument, debug, error, info, info_span, warn};

#[derive(Debug)]
enum NetError {
    // Categorizes connection lifecycle failures so callers can decide policy.
    #[allow(dead_code)]
    Ws(axum::Error),
    #[allow(dead_code)]
    Serialization(serde_json::Error),
    InputClosed,
    WorldUpdatesClosed,
    JoinRequired,
    JoinTimeout,
    ClosedBeforeJoin,
}

const LOG_THROTTLE: Duration = Duration::from_secs(2);
const MAX_INVALID_JSON: u32 = 10;
const MAX_USERNAME_CHARS: usize = 24;
const DEFAULT_USERNAME: &str = "pilot";
const JOIN_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(5);

/// Process-unique, monotonically increasing player id.
fn next_player_id() -> PlayerId {
    static NEXT: AtomicU64 = AtomicU64::new(1);
    NEXT.fetch_add(1, Ordering::Relaxed)
}

pub async fn world_update_serializer(
    mut world_rx: broadcast::Receiver<WorldUpdate>,
    world_bytes_tx: broadcast::Sender<Utf8Bytes>,
    world_latest_tx: watch::Sender<Utf8Bytes>,
) {
    // Serialize each world update once and broadcast the shared bytes.
    loop {
        match world_rx.recv().await {
            Ok(update) => {
                let msg = ServerMessage::WorldUpdate(WorldUpdateDto::from(update));
                let txt = match serde_json::to_string(&msg) {
                    Ok(txt) => txt,
                    Err(e) => {
                        error!(error = ?e, "failed to serialize world update");
                        continue;
                    }
                };

                let bytes = Utf8Bytes::from(txt);
                // Store the latest bytes for lag recovery.
                let _ = world_latest_tx.send(bytes.clone());
                let _ = world_bytes_tx.send(bytes);
            }
            Err(broadcast::error::RecvError::Lagged(n)) => {
                warn!(
                    missed = n,
                    "world serializer lagged; skipping to latest update"
                );
            }
            Err(broadcast::error::RecvError::Closed) => {
                warn!("world updates channel closed; serializer exiting");
                break;
            }
        }
    }
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

struct ConnCtx {
    player_id: PlayerId,
    input_tx: mpsc::Sender<GameEvent>,
    world_bytes_rx: broadcast::Receiver<Utf8Bytes>,
    world_latest_rx: watch::Receiver<Utf8Bytes>,

    invalid_json: u32,
    // Throttles client-caused warnings to one per LOG_THROTTLE.
    last_warn: Instant,

    close_frame: Option<CloseFrame>,
}

enum LoopControl {
    Continue,
    Disconnect,
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let player_id = next_player_id();
    serve_connection(socket, state, player_id)
        .instrument(info_span!("conn", player_id))
        .await
}

async fn serve_connection(mut socket: WebSocket, state: Arc<AppState>, player_id: PlayerId) {
    let mut ctx = match bootstrap_connection(&mut socket, &state, player_id).await {
        Ok(ctx) => ctx,
        Err(NetError::ClosedBeforeJoin) => {
            info!("client disconnected before join handshake");
            return;
        }
        // The handshake already sent a close frame for these.
        Err(e @ (NetError::JoinRequired | NetError::JoinTimeout)) => {
            info!(error = ?e, "join handshake rejected");
            return;
        }
        Err(e) => {
            error!(error = ?e, "failed to bootstrap connection");
            let _ =
                send_close_with_reason(&mut socket, close_code::ERROR, "bootstrap failed").await;
            return;
        }
    };

    if let Err(e) = run_client_loop(&mut socket, &mut ctx).await {
        warn!(error = ?e, "client loop exited with error");
    }

    // The ship goes with the connection.
    if ctx
        .input_tx
        .send(GameEvent::Leave { player_id })
        .await
        .is_err()
    {
        warn!(player_id, "world loop gone; leave not delivered");
    }
    info!(player_id, "client disconnected");
}

async fn bootstrap_connection(
    socket: &mut WebSocket,
    state: &AppState,
    player_id: PlayerId,
) -> Result<ConnCtx, NetError> {
    // Subscribe before any await so no update is missed.
    let world_bytes_rx = state.world_bytes_tx.subscribe();
    let world_latest_rx = state.world_latest_tx.subscribe();

    let username = match timeout(JOIN_HANDSHAKE_TIMEOUT, read_join_handshake(socket)).await {
        Ok(result) => result?,
        Err(_) => {
            let _ = send_close_with_reason(socket, close_code::POLICY, "join timeout").await;
            return Err(NetError::JoinTimeout);
        }
    };

    // Tell the client "This is who you are".
    let identity = ServerMessage::Identity {
        player_id: player_id.to_string(),
    };
    send_message(socket, &identity).await?;

    state
        .input_tx
        .send(GameEvent::Join {
            player_id,
            username: username.clone(),
        })
        .await
        .map_err(|_| NetError::InputClosed)?;
    info!(player_id, %username, "client joined");

    // Backdated so the first warning is logged.
    let now = Instant::now()
        .checked_sub(LOG_THROTTLE)
        .unwrap_or_else(Instant::now);
    Ok(ConnCtx {
        player_id,
        input_tx: state.input_tx.clone(),
        world_bytes_rx,
        world_latest_rx,
        invalid_json: 0,
        last_warn: now,
        close_frame: None,
    })
}

async fn read_join_handshake(socket: &mut WebSocket) -> Result<String, NetError> {
    loop {
        let Some(incoming) = socket.recv().await else {
            return Err(NetError::ClosedBeforeJoin);
        };

        match incoming.map_err(NetError::Ws)? {
            Message::Text(text) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(ClientMessage::Join(payload)) => return Ok(sanitize_username(&payload.username)),
                Ok(ClientMessage::Input(_)) | Err(_) => {
                    let _ =
                        send_close_with_reason(socket, close_code::POLICY, "join required").await;
                    return Err(NetError::JoinRequired);
                }
            },
            Message::Binary(_) => {
                let _ = send_close_with_reason(
                    socket,
                    close_code::UNSUPPORTED,
                    "binary messages not supported",
                )
                .await;
                return Err(NetError::JoinRequired);
            }
            Message::Ping(_) | Message::Pong(_) => {}
            Message::Close(_) => return Err(NetError::ClosedBeforeJoin),
        }
    }
}

fn sanitize_username(raw: &str) -> String {
    let name: String = raw
        .trim()
        .chars()
        .filter(|c| !c.is_control())
        .take(MAX_USERNAME_CHARS)
        .collect();
    if name.is_empty() {
        DEFAULT_USERNAME.to_string()
    } else {
        name
    }
}

fn should_log(last: &mut Instant) -> bool {
    if last.elapsed() >= LOG_THROTTLE {
        *last = Instant::now();
        true
    } else {
        false
    }
}

async fn send_message(socket: &mut WebSocket, msg: &ServerMessage) -> Result<(), NetError> {
    let txt = serde_json::to_string(msg).map_err(NetError::Serialization)?;
    socket
        .send(Message::Text(txt.into()))
        .await
        .map_err(NetError::Ws)
}

async fn send_close_with_reason(
    socket: &mut WebSocket,
    code: u16,
    reason: &'static str,
) -> Result<(), NetError> {
    socket
        .send(Message::Close(Some(CloseFrame {
            code,
            reason: reason.into(),
        })))
        .await
        .map_err(NetError::Ws)?;
    socket.close().await.map_err(NetError::Ws)
}

async fn run_client_loop(socket: &mut WebSocket, ctx: &mut ConnCtx) -> Result<(), NetError> {
    let mut fatal: Option<NetError> = None;

    loop {
        let disconnect: bool = tokio::select! {
            incoming = socket.recv() => {
                match handle_incoming(incoming, ctx) {
                    Ok(LoopControl::Continue) => false,
                    Ok(LoopControl::Disconnect) => true,
                    Err(e) => {
                        fatal = Some(e);
                        true
                    }
                }
            }

            world_msg = ctx.world_bytes_rx.recv() => {
                match world_msg {
                    Ok(bytes) => forward_world_bytes(bytes, socket).await,
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        // Skip the backlog; the newest snapshot supersedes it.
                        debug!(missed = n, "client lagged; resyncing from latest snapshot");
                        let latest = ctx.world_latest_rx.borrow().clone();
                        !latest.is_empty() && forward_world_bytes(latest, socket).await
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        fatal = Some(NetError::WorldUpdatesClosed);
                        true
                    }
                }
            }
        };

        if disconnect {
            if let Some(frame) = ctx.close_frame.take() {
                let _ = socket.send(Message::Close(Some(frame))).await;
            }
            if let Err(err) = socket.close().await.map_err(NetError::Ws) {
                debug!(error = ?err, "socket close error");
            }
            break;
        }
    }

    match fatal {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

fn handle_incoming(
    incoming: Option<Result<Message, axum::Error>>,
    ctx: &mut ConnCtx,
) -> Result<LoopControl, NetError> {
    let player_id = ctx.player_id;
    let msg = match incoming {
        Some(Ok(msg)) => msg,
        Some(Err(e)) => {
            warn!(player_id, error = %e, "websocket recv error");
            return Ok(LoopControl::Disconnect);
        }
        None => {
            info!(player_id, "websocket closed");
            return Ok(LoopControl::Disconnect);
        }
    };

    match msg {
        Message::Text(text) => {
            match serde_json::from_str::<ClientMessage>(&text) {
                Ok(ClientMessage::Input(payload)) => forward_input(ctx, &payload.input),
                Ok(ClientMessage::Join(_)) => {
                    // Ignore repeated Join packets after bootstrap to keep the session stable.
                    if should_log(&mut ctx.last_warn) {
                        warn!(player_id, "duplicate join ignored");
                    }
                    Ok(LoopControl::Continue)
                }
                Err(parse_err) => {
                    ctx.invalid_json += 1;
                    if should_log(&mut ctx.last_warn) {
                        warn!(
                            player_id,
                            bytes = text.len(),
                            error = %parse_err,
                            "failed to parse client message"
                        );
                    }
                    if ctx.invalid_json > MAX_INVALID_JSON {
                        ctx.close_frame = Some(CloseFrame {
                            code: close_code::POLICY,
                            reason: "too many invalid messages".into(),
                        });
                        return Ok(LoopControl::Disconnect);
                    }
                    Ok(LoopControl::Continue)
                }
            }
        }
        Message::Binary(_) => {
            ctx.close_frame = Some(CloseFrame {
                code: close_code::UNSUPPORTED,
                reason: "binary messages not supported".into(),
            });
            Ok(LoopControl::Disconnect)
        }
        Message::Ping(_) | Message::Pong(_) => Ok(LoopControl::Continue),
        Message::Close(_) => Ok(LoopControl::Disconnect),
    }
}

fn forward_input(ctx: &mut ConnCtx, raw: &str) -> Result<LoopControl, NetError> {
    let player_id = ctx.player_id;
    let command = match raw.parse::<Command>() {
        Ok(command) => command,
        Err(fault) => {
            // Unknown commands are dropped, never fatal.
            debug!(player_id, input = raw, %fault, "dropping input");
            return Ok(LoopControl::Continue);
        }
    };

    match ctx.input_tx.try_send(GameEvent::Input { player_id, command }) {
        Ok(()) => Ok(LoopControl::Continue),
        Err(mpsc::error::TrySendError::Full(_)) => {
            if should_log(&mut ctx.last_warn) {
                warn!(player_id, "input channel full; dropping input");
            }
            Ok(LoopControl::Continue)
        }
        Err(mpsc::error::TrySendError::Closed(_)) => Err(NetError::InputClosed),
    }
}

// Returns true when the socket should be dropped.
async fn forward_world_bytes(world_msg: Utf8Bytes, socket: &mut WebSocket) -> bool {
    match socket.send(Message::Text(world_msg)).await {
        Ok(()) => false,
        Err(err) => {
            // Disconnect follows immediately.
            warn!(error = ?err, "failed to send world update");
            true
        }
    }
}
