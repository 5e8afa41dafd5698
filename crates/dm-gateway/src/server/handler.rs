//! WebSocket handler
//!
//! Authenticates the upgrade request, then runs one reader and one writer
//! task per connection.

use crate::connection::{Connection, Outbound};
use crate::handlers::{LifecycleManager, MessageDispatcher};
use crate::protocol::{CloseCode, GatewayMessage};
use crate::server::GatewayState;
use axum::{
    extract::{
        ws::{CloseFrame, Message, WebSocket},
        Query, State, WebSocketUpgrade,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use dm_common::{AppError, ErrorResponse};
use dm_core::User;
use dm_service::IdentityService;
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::mpsc;

/// How long the writer gets to flush a close frame after the reader stops
const CLOSE_FLUSH_TIMEOUT: Duration = Duration::from_secs(2);

/// Query parameters of the upgrade request
#[derive(Debug, Default, Deserialize)]
pub struct ConnectParams {
    /// Identity token for clients that cannot set headers
    pub access_token: Option<String>,
    /// Peer whose conversation is replayed on connect
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

impl ConnectParams {
    /// Peer to replay; a blank `userId` means none
    pub fn peer(&self) -> Option<&str> {
        self.user_id
            .as_deref()
            .map(str::trim)
            .filter(|peer| !peer.is_empty())
    }
}

/// WebSocket gateway handler
///
/// Identity is resolved before the upgrade; failure answers with a JSON
/// error body and touches no state.
pub async fn gateway_handler(
    State(state): State<GatewayState>,
    Query(params): Query<ConnectParams>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    ws: WebSocketUpgrade,
) -> Response {
    let credential = params
        .access_token
        .clone()
        .or_else(|| bearer.map(|TypedHeader(Authorization(bearer))| bearer.token().to_string()));

    let Some(credential) = credential else {
        tracing::debug!("Upgrade without credential");
        return reject(&AppError::MissingAuth);
    };

    let user = match IdentityService::new(state.service_context())
        .resolve(&credential)
        .await
    {
        Ok(user) => user,
        Err(e) => {
            tracing::warn!(error = %e, "Rejected connection");
            return reject(&AppError::from(e));
        }
    };

    let peer = params.peer().map(str::to_owned);
    ws.on_upgrade(move |socket| handle_socket(state, socket, user, peer))
}

fn reject(err: &AppError) -> Response {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(ErrorResponse::from(err))).into_response()
}

/// Handle an upgraded WebSocket connection
async fn handle_socket(state: GatewayState, socket: WebSocket, user: User, peer: Option<String>) {
    let (tx, rx) = mpsc::channel::<Outbound>(state.config().gateway.outbound_buffer.max(1));
    let connection = state.connection_manager().add_connection(user, tx);

    tracing::info!(
        connection_id = %connection.id(),
        username = %connection.username(),
        "WebSocket connection established"
    );

    let (ws_sink, mut ws_stream) = socket.split();
    let mut send_task = tokio::spawn(write_outbound(ws_sink, rx, connection.id().to_string()));

    LifecycleManager::on_connect(&state, &connection, peer.as_deref()).await;

    let state_recv = state.clone();
    let connection_recv = connection.clone();

    // Frames of one connection are handled sequentially in this task
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = ws_stream.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    if let Err(close_code) =
                        handle_text_message(&state_recv, &connection_recv, &text).await
                    {
                        return Some(close_code);
                    }
                }
                Ok(Message::Binary(_)) => {
                    tracing::debug!(
                        connection_id = %connection_recv.id(),
                        "Binary messages not supported"
                    );
                    return Some(CloseCode::DecodeError);
                }
                Ok(Message::Ping(_) | Message::Pong(_)) => {
                    // Pong is handled automatically by axum
                    tracing::trace!(connection_id = %connection_recv.id(), "Ping/pong");
                }
                Ok(Message::Close(_)) => {
                    tracing::info!(connection_id = %connection_recv.id(), "Client closed connection");
                    return None;
                }
                Err(e) => {
                    tracing::warn!(
                        connection_id = %connection_recv.id(),
                        error = %e,
                        "WebSocket error"
                    );
                    return None;
                }
            }
        }
        None
    });

    let mut send_finished = false;
    tokio::select! {
        result = &mut recv_task => {
            if let Ok(Some(close_code)) = result {
                tracing::debug!(
                    connection_id = %connection.id(),
                    close_code = %close_code,
                    "Closing connection"
                );
                if connection.close(close_code).is_err() {
                    tracing::debug!(connection_id = %connection.id(), "Close frame not queued");
                }
            }
        }
        _ = &mut send_task => {
            send_finished = true;
            recv_task.abort();
            tracing::debug!(connection_id = %connection.id(), "Send task ended");
        }
    }

    cleanup_connection(&state, &connection).await;

    // Dropping the last sender lets the writer drain its queue and finish
    drop(connection);
    if !send_finished && tokio::time::timeout(CLOSE_FLUSH_TIMEOUT, send_task).await.is_err() {
        tracing::debug!("Writer did not finish in time");
    }
}

/// Drain the outbound queue into the socket
async fn write_outbound(
    mut ws_sink: SplitSink<WebSocket, Message>,
    mut rx: mpsc::Receiver<Outbound>,
    connection_id: String,
) {
    while let Some(item) = rx.recv().await {
        match item {
            Outbound::Message(msg) => {
                let json = match msg.to_json() {
                    Ok(json) => json,
                    Err(e) => {
                        tracing::error!(connection_id = %connection_id, error = %e, "Failed to encode frame");
                        continue;
                    }
                };
                tracing::trace!(connection_id = %connection_id, message = %msg, "Sending frame");
                if ws_sink.send(Message::Text(json)).await.is_err() {
                    tracing::warn!(
                        connection_id = %connection_id,
                        "Failed to send message to WebSocket"
                    );
                    return;
                }
            }
            Outbound::Close(code) => {
                let (code, reason) = GatewayMessage::close_frame(code);
                let frame = CloseFrame {
                    code,
                    reason: reason.into(),
                };
                if ws_sink.send(Message::Close(Some(frame))).await.is_err() {
                    tracing::debug!(connection_id = %connection_id, "Close frame not delivered");
                }
                return;
            }
        }
    }

    // Close the WebSocket when channel is closed
    if ws_sink.close().await.is_err() {
        tracing::trace!(connection_id = %connection_id, "Socket already closed");
    }
}

/// Handle a text message from the client
///
/// `Err` carries the code the connection must close with.
async fn handle_text_message(
    state: &GatewayState,
    connection: &Connection,
    text: &str,
) -> Result<(), CloseCode> {
    let message = GatewayMessage::from_json(text).map_err(|e| {
        tracing::debug!(
            connection_id = %connection.id(),
            error = %e,
            "Failed to parse message"
        );
        e.close_code()
    })?;

    tracing::trace!(
        connection_id = %connection.id(),
        op = %message.op,
        "Received message"
    );

    match MessageDispatcher::dispatch(state, connection, message).await {
        Ok(Some(close_code)) => Err(close_code),
        Ok(None) => Ok(()),
        Err(e) => match e.to_close_code() {
            Some(close_code) => {
                tracing::warn!(
                    connection_id = %connection.id(),
                    error = %e,
                    "Handler error"
                );
                Err(close_code)
            }
            None => {
                tracing::debug!(
                    connection_id = %connection.id(),
                    error = %e,
                    "Operation failed"
                );
                state
                    .dispatcher()
                    .send_to_connection(connection, &e.to_error_event());
                Ok(())
            }
        },
    }
}

/// Clean up a connection on disconnect
async fn cleanup_connection(state: &GatewayState, connection: &Connection) {
    tracing::info!(
        connection_id = %connection.id(),
        username = %connection.username(),
        "Cleaning up connection"
    );

    state.connection_manager().remove_connection(connection.id());
    LifecycleManager::on_disconnect(state, connection).await;
}
