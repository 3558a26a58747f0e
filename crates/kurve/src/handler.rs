//! Per-connection handler: WebSocket upgrade, frame pump, and dispatch.
//!
//! Each accepted socket gets its own task running [`handle_connection`]:
//!
//! 1. Upgrade to WebSocket and split the stream.
//! 2. Attach to the lobby — the connection starts receiving lobby-wide
//!    broadcasts through its outbound channel.
//! 3. Pump task: drain the outbound channel into the socket. The lobby
//!    and (after handoff) the match driver both write to this channel;
//!    whoever holds the sender owns the connection's event stream.
//! 4. Inbound loop: decode [`ClientFrame`]s, dispatch to the lobby,
//!    answer callbacks.
//! 5. On socket close: report a disconnect, which the lobby treats as
//!    an implicit leave.

use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

use kurve_match::ConnectionSender;
use kurve_protocol::{ClientEvent, ClientFrame, Codec, ConnectionId, ServerFrame};

use crate::KurveError;
use crate::server::ServerState;

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C: Codec + Clone>(
    stream: TcpStream,
    connection: ConnectionId,
    state: Arc<ServerState<C>>,
) -> Result<(), KurveError> {
    let ws = tokio_tungstenite::accept_async(stream).await?;
    let (mut sink, mut source) = ws.split();

    let (out_tx, mut out_rx) = mpsc::unbounded_channel::<ServerFrame>();

    state.lobby.attach(connection, out_tx.clone()).await?;
    tracing::debug!(%connection, "websocket session started");

    // Outbound pump. Ends when every sender clone is gone or the
    // socket rejects a write.
    let codec = state.codec.clone();
    let pump = tokio::spawn(async move {
        while let Some(frame) = out_rx.recv().await {
            let bytes = match codec.encode(&frame) {
                Ok(bytes) => bytes,
                Err(error) => {
                    tracing::warn!(%error, "dropping unencodable frame");
                    continue;
                }
            };
            if sink.send(Message::Binary(bytes.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(msg) = source.next().await {
        let data = match msg {
            Ok(Message::Binary(data)) => data.to_vec(),
            Ok(Message::Text(text)) => text.as_bytes().to_vec(),
            Ok(Message::Close(_)) => break,
            Ok(_) => continue, // ping/pong/frame
            Err(error) => {
                tracing::debug!(%connection, %error, "recv error");
                break;
            }
        };

        let frame: ClientFrame = match state.codec.decode(&data) {
            Ok(frame) => frame,
            Err(error) => {
                // Malformed input from one client must not kill its
                // session, and is not worth log noise above debug.
                tracing::debug!(%connection, %error, "ignoring undecodable frame");
                continue;
            }
        };

        dispatch(&state, connection, frame, &out_tx).await?;
    }

    tracing::debug!(%connection, "websocket session ended");
    state.lobby.disconnect(connection).await?;

    drop(out_tx);
    pump.abort();
    Ok(())
}

/// Routes one decoded frame to the lobby and answers its callback.
async fn dispatch<C: Codec>(
    state: &Arc<ServerState<C>>,
    connection: ConnectionId,
    frame: ClientFrame,
    out: &ConnectionSender,
) -> Result<(), KurveError> {
    let callback = frame.callback;

    let ack = match frame.event {
        // Fire-and-forget operations: the protocol defines no callback.
        ClientEvent::Fetch => {
            state.lobby.fetch(connection).await?;
            None
        }
        ClientEvent::Leave => {
            state.lobby.leave(connection).await?;
            None
        }

        ClientEvent::Create { name } => Some(state.lobby.create(connection, name).await?),
        ClientEvent::Join { room } => Some(state.lobby.join(connection, room).await?),
        ClientEvent::Talk { player, content } => {
            Some(state.lobby.talk(connection, player, content).await?)
        }
        ClientEvent::AddPlayer { name } => Some(state.lobby.add_player(connection, name).await?),
        ClientEvent::Ready { player } => Some(state.lobby.ready(connection, player).await?),
        ClientEvent::Color { player, color } => {
            Some(state.lobby.color(connection, player, color).await?)
        }
    };

    if let (Some(callback), Some(result)) = (callback, ack) {
        let _ = out.send(ServerFrame::Callback { callback, result });
    }

    Ok(())
}
