//! Test helpers for integration tests
//!
//! `TestGateway` runs the real router on an ephemeral port over in-memory
//! repositories; `TestClient` speaks the frame protocol over
//! `tokio-tungstenite`.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail, Result};
use dm_common::{AppConfig, JwtService};
use dm_core::{Snowflake, SnowflakeGenerator, User};
use dm_db::{MemoryMessageRepository, MemoryUserRepository};
use dm_gateway::{create_app, run_server, GatewayState, GATEWAY_PATH};
use dm_service::ServiceContext;
use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::{header, HeaderValue};
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::fixtures::{known_users, TEST_JWT_SECRET};

/// How long a client waits for any single frame
const FRAME_TIMEOUT: Duration = Duration::from_secs(5);

/// Gateway instance that manages lifecycle
pub struct TestGateway {
    pub addr: SocketAddr,
    pub state: GatewayState,
    pub messages: Arc<MemoryMessageRepository>,
    jwt: Arc<JwtService>,
    _handle: JoinHandle<()>,
}

impl TestGateway {
    /// Start a gateway knowing the fixture users
    pub async fn start() -> Result<Self> {
        let users = Arc::new(MemoryUserRepository::with_users(known_users()));
        let messages = Arc::new(MemoryMessageRepository::new());
        let jwt = Arc::new(JwtService::new(TEST_JWT_SECRET, 3600));

        let ctx = ServiceContext::new(
            users,
            messages.clone(),
            jwt.clone(),
            Arc::new(SnowflakeGenerator::new(7)),
            10,
        );
        let state = GatewayState::new(ctx, AppConfig::new(0, "postgres://unused", TEST_JWT_SECRET));

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let app = create_app(state.clone());

        let handle = tokio::spawn(async move {
            run_server(app, listener).await.ok();
        });

        Ok(Self {
            addr,
            state,
            messages,
            jwt,
            _handle: handle,
        })
    }

    /// Mint a token for `user` with the gateway's secret
    pub fn token_for(&self, user: &User) -> String {
        self.jwt
            .generate_access_token(user.id, &user.username)
            .unwrap_or_default()
    }

    pub fn ws_url(&self, token: &str, peer: Option<Snowflake>) -> String {
        let mut url = format!("ws://{}{}?access_token={}", self.addr, GATEWAY_PATH, token);
        if let Some(peer) = peer {
            url.push_str(&format!("&userId={peer}"));
        }
        url
    }

    /// Connect as `user` and wait for the first online snapshot
    pub async fn connect(&self, user: &User) -> Result<TestClient> {
        self.connect_with_peer(user, None).await
    }

    pub async fn connect_with_peer(&self, user: &User, peer: Option<Snowflake>) -> Result<TestClient> {
        let url = self.ws_url(&self.token_for(user), peer);
        TestClient::open(&url).await
    }

    /// Connect with the token in an `Authorization: Bearer` header
    pub async fn connect_with_header(&self, user: &User) -> Result<TestClient> {
        let mut request = format!("ws://{}{}", self.addr, GATEWAY_PATH).into_client_request()?;
        let value = HeaderValue::from_str(&format!("Bearer {}", self.token_for(user)))?;
        request.headers_mut().insert(header::AUTHORIZATION, value);

        let (stream, _) = connect_async(request).await?;
        Ok(TestClient { stream })
    }

    /// Attempt an upgrade and return the HTTP status it was refused with
    pub async fn rejected_status(&self, url: &str) -> Result<u16> {
        match connect_async(url).await {
            Ok(_) => bail!("upgrade unexpectedly succeeded"),
            Err(tungstenite::Error::Http(response)) => Ok(response.status().as_u16()),
            Err(e) => Err(e.into()),
        }
    }

    /// Minimal HTTP/1.1 GET; returns the status and body
    pub async fn http_get(&self, path: &str) -> Result<(u16, String)> {
        let mut stream = TcpStream::connect(self.addr).await?;
        let request = format!("GET {path} HTTP/1.1\r\nHost: {}\r\nConnection: close\r\n\r\n", self.addr);
        stream.write_all(request.as_bytes()).await?;

        let mut raw = String::new();
        stream.read_to_string(&mut raw).await?;

        let status = raw
            .split_whitespace()
            .nth(1)
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| anyhow!("no status line in {raw:?}"))?;
        let body = raw.split("\r\n\r\n").nth(1).unwrap_or_default().to_string();
        Ok((status, body))
    }

    /// Poll until `username` is (or is not) in the presence directory
    pub async fn wait_for_presence(&self, username: &str, online: bool) -> Result<()> {
        for _ in 0..100 {
            if self.state.presence().find_by_username(username).is_some() == online {
                return Ok(());
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        bail!("presence of {username} never became {online}")
    }
}

/// A received dispatch event
#[derive(Debug, Clone)]
pub struct Event {
    pub name: String,
    pub seq: u64,
    pub data: Value,
}

/// WebSocket client speaking the gateway protocol
pub struct TestClient {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl TestClient {
    pub async fn open(url: &str) -> Result<Self> {
        let (stream, _) = connect_async(url).await?;
        Ok(Self { stream })
    }

    pub async fn send_raw(&mut self, text: &str) -> Result<()> {
        self.stream.send(Message::Text(text.to_string())).await?;
        Ok(())
    }

    pub async fn send_op(&mut self, op: u8, d: Value) -> Result<()> {
        self.send_raw(&json!({ "op": op, "d": d }).to_string()).await
    }

    pub async fn request_history(&mut self, user_id: Snowflake, page: Option<i64>) -> Result<()> {
        let mut d = json!({ "userId": user_id.to_string() });
        if let Some(page) = page {
            d["pageNumber"] = json!(page);
        }
        self.send_op(1, d).await
    }

    pub async fn send_message(&mut self, receiver_id: Snowflake, content: &str) -> Result<()> {
        self.send_op(2, json!({ "receiverId": receiver_id.to_string(), "content": content }))
            .await
    }

    pub async fn notify_typing(&mut self, receiver_username: &str) -> Result<()> {
        self.send_op(3, json!({ "receiverUsername": receiver_username })).await
    }

    /// Next dispatch event, or an error on close/timeout
    pub async fn next_event(&mut self) -> Result<Event> {
        loop {
            let msg = tokio::time::timeout(FRAME_TIMEOUT, self.stream.next())
                .await
                .map_err(|_| anyhow!("timed out waiting for a frame"))?
                .ok_or_else(|| anyhow!("stream ended"))??;

            match msg {
                Message::Text(text) => {
                    let frame: Value = serde_json::from_str(&text)?;
                    return Ok(Event {
                        name: frame["t"].as_str().unwrap_or_default().to_string(),
                        seq: frame["s"].as_u64().unwrap_or_default(),
                        data: frame["d"].clone(),
                    });
                }
                Message::Close(frame) => bail!("connection closed: {frame:?}"),
                _ => {}
            }
        }
    }

    /// Skip events until one named `name` arrives and return it
    pub async fn expect_event(&mut self, name: &str) -> Result<Event> {
        loop {
            let event = self.next_event().await?;
            if event.name == name {
                return Ok(event);
            }
        }
    }

    /// Every event up to and including the next one named `name`
    pub async fn collect_until(&mut self, name: &str) -> Result<Vec<Event>> {
        let mut events = Vec::new();
        loop {
            let event = self.next_event().await?;
            let done = event.name == name;
            events.push(event);
            if done {
                return Ok(events);
            }
        }
    }

    /// Wait for the server to close the socket and return the close code
    pub async fn expect_close(&mut self) -> Result<Option<u16>> {
        loop {
            let next = tokio::time::timeout(FRAME_TIMEOUT, self.stream.next())
                .await
                .map_err(|_| anyhow!("timed out waiting for close"))?;

            match next {
                Some(Ok(Message::Close(frame))) => return Ok(frame.map(|f| u16::from(f.code))),
                Some(Ok(_)) => {}
                Some(Err(e)) => bail!("socket error before close: {e}"),
                None => return Ok(None),
            }
        }
    }

    pub async fn close(mut self) -> Result<()> {
        self.stream.close(None).await?;
        Ok(())
    }
}

/// Find the snapshot row for `username`
pub fn snapshot_entry<'a>(snapshot: &'a Value, username: &str) -> Option<&'a Value> {
    snapshot
        .as_array()?
        .iter()
        .find(|entry| entry["username"] == username)
}
