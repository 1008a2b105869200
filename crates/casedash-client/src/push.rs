//! Socket.IO push channel over websocket or HTTP long polling
//!
//! [`PushChannel`] knows where the server lives and which transports to try.
//! Each successful [`PushChannel::connect`] yields a [`PushConnection`] that
//! answers server heartbeats and surfaces named events until the server goes
//! away.

use crate::protocol::{
    DEFAULT_NAMESPACE, ENGINE_IO_VERSION, EnginePacket, Handshake, SocketPacket, decode_payload,
    encode_payload,
};
use casedash_core::config::{PushConfig, Transport};
use casedash_core::{Error, Result};
use futures::{SinkExt, StreamExt};
use reqwest::{Client, Url, header};
use serde_json::Value;
use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, info, warn};

/// How long to wait for the server's open packet and namespace acknowledgement
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(20);

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// A named Socket.IO event received from the server
#[derive(Debug, Clone, PartialEq)]
pub struct PushEvent {
    /// Event name
    pub name: String,
    /// Event arguments
    pub args: Vec<Value>,
}

/// Where and how to reach the push server
#[derive(Debug, Clone)]
pub struct PushChannel {
    base: Url,
    path: String,
    transports: Vec<Transport>,
    http: Client,
}

impl PushChannel {
    /// Create a channel for `base_url`
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `base_url` is not an http(s) URL.
    pub fn new(base_url: &str, config: &PushConfig) -> Result<Self> {
        Self::with_client(Client::new(), base_url, config)
    }

    /// Create a channel that shares an HTTP connection pool
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `base_url` is not an http(s) URL.
    pub fn with_client(http: Client, base_url: &str, config: &PushConfig) -> Result<Self> {
        let base = Url::parse(base_url)
            .map_err(|e| Error::configuration(format!("invalid base URL '{base_url}': {e}")))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(Error::configuration(format!(
                "push channel needs an http(s) base URL, got '{base_url}'"
            )));
        }

        Ok(Self {
            base,
            path: config.path.clone(),
            transports: config.transports.clone(),
            http,
        })
    }

    /// Transports tried by [`connect`](Self::connect), in order
    #[must_use]
    pub fn transports(&self) -> &[Transport] {
        &self.transports
    }

    /// Engine.IO endpoint for `transport`
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the websocket scheme cannot be set.
    pub fn endpoint(&self, transport: Transport, sid: Option<&str>) -> Result<Url> {
        let mut url = self.base.clone();
        url.set_path(&self.path);
        url.set_fragment(None);
        {
            let mut query = url.query_pairs_mut();
            query.clear();
            query.append_pair("EIO", ENGINE_IO_VERSION);
            query.append_pair("transport", transport.as_str());
            if let Some(sid) = sid {
                query.append_pair("sid", sid);
            }
        }

        if transport == Transport::WebSocket {
            let scheme = if url.scheme() == "https" { "wss" } else { "ws" };
            url.set_scheme(scheme).map_err(|()| {
                Error::configuration(format!("cannot derive a websocket URL from {}", self.base))
            })?;
        }

        Ok(url)
    }

    /// Connect using the first transport that succeeds
    ///
    /// # Errors
    ///
    /// Returns the last transport's error when every transport fails.
    pub async fn connect(&self) -> Result<PushConnection> {
        let mut last_error = None;

        for &transport in &self.transports {
            match self.connect_with(transport).await {
                Ok(connection) => return Ok(connection),
                Err(e) => {
                    warn!(%transport, error = %e, "Push transport failed");
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| Error::push_channel("no push transports configured")))
    }

    /// Connect using one specific transport
    ///
    /// # Errors
    ///
    /// Returns an error if the transport cannot be opened, the Engine.IO
    /// handshake fails or the server refuses the namespace.
    pub async fn connect_with(&self, transport: Transport) -> Result<PushConnection> {
        let url = self.endpoint(transport, None)?;
        debug!(%transport, %url, "Opening push transport");

        let link = match transport {
            Transport::WebSocket => {
                let (stream, _) = tokio::time::timeout(CONNECT_TIMEOUT, connect_async(url.as_str()))
                    .await
                    .map_err(|_| Error::push_channel("websocket connect timed out"))?
                    .map_err(|e| Error::push_channel(format!("websocket connect failed: {e}")))?;
                Link::WebSocket(Box::new(stream))
            }
            Transport::Polling => Link::Polling(PollingLink {
                http: self.http.clone(),
                url,
            }),
        };

        let connection = PushConnection::establish(link, transport).await?;
        info!(
            %transport,
            sid = %connection.sid(),
            "Push channel connected"
        );
        Ok(connection)
    }
}

/// An open Socket.IO session
#[derive(Debug)]
pub struct PushConnection {
    link: Link,
    transport: Transport,
    handshake: Handshake,
    pending: VecDeque<EnginePacket>,
}

impl PushConnection {
    async fn establish(mut link: Link, transport: Transport) -> Result<Self> {
        let mut pending = VecDeque::new();

        let handshake = loop {
            let packet = match pending.pop_front() {
                Some(packet) => packet,
                None => {
                    let packets = tokio::time::timeout(CONNECT_TIMEOUT, link.receive())
                        .await
                        .map_err(|_| Error::push_channel("timed out waiting for Engine.IO open"))??
                        .ok_or_else(|| Error::push_channel("closed before Engine.IO open"))?;
                    pending.extend(packets);
                    continue;
                }
            };
            match packet {
                EnginePacket::Open(handshake) => break handshake,
                EnginePacket::Noop => {}
                other => {
                    return Err(Error::push_channel(format!(
                        "expected Engine.IO open, got {other:?}"
                    )));
                }
            }
        };

        link.attach_session(&handshake.sid);

        let mut connection = Self {
            link,
            transport,
            handshake,
            pending,
        };
        connection
            .send(EnginePacket::Message(SocketPacket::connect_request(
                DEFAULT_NAMESPACE,
            )))
            .await?;

        tokio::time::timeout(CONNECT_TIMEOUT, connection.await_namespace())
            .await
            .map_err(|_| Error::push_channel("timed out waiting for namespace acknowledgement"))??;

        Ok(connection)
    }

    async fn await_namespace(&mut self) -> Result<()> {
        loop {
            match self.next_packet().await? {
                None | Some(EnginePacket::Close) => {
                    return Err(Error::push_channel("closed before namespace acknowledgement"));
                }
                Some(EnginePacket::Ping(data)) => self.send(EnginePacket::Pong(data)).await?,
                Some(EnginePacket::Message(data)) => match SocketPacket::decode(&data)? {
                    SocketPacket::Connect { .. } => return Ok(()),
                    SocketPacket::ConnectError { message, .. } => {
                        return Err(Error::push_channel(format!(
                            "server refused namespace: {message}"
                        )));
                    }
                    other => debug!(?other, "Ignoring packet before namespace acknowledgement"),
                },
                Some(_) => {}
            }
        }
    }

    /// Transport in use
    #[must_use]
    pub const fn transport(&self) -> Transport {
        self.transport
    }

    /// Engine.IO session id
    #[must_use]
    pub fn sid(&self) -> &str {
        &self.handshake.sid
    }

    /// Handshake parameters sent by the server
    #[must_use]
    pub const fn handshake(&self) -> &Handshake {
        &self.handshake
    }

    /// Wait for the next named event
    ///
    /// Heartbeats are answered along the way. Returns `Ok(None)` once the
    /// server closes the session.
    ///
    /// # Errors
    ///
    /// Returns an error when the transport fails or the server stays silent
    /// for longer than its ping interval plus ping timeout.
    pub async fn next_event(&mut self) -> Result<Option<PushEvent>> {
        loop {
            let Some(packet) = self.next_packet().await? else {
                return Ok(None);
            };

            match packet {
                EnginePacket::Ping(data) => self.send(EnginePacket::Pong(data)).await?,
                EnginePacket::Close => return Ok(None),
                EnginePacket::Message(data) => match SocketPacket::decode(&data) {
                    Ok(SocketPacket::Event { name, args, .. }) => {
                        return Ok(Some(PushEvent { name, args }));
                    }
                    Ok(SocketPacket::Disconnect { .. }) => return Ok(None),
                    Ok(other) => debug!(?other, "Ignoring Socket.IO packet"),
                    Err(e) => warn!(error = %e, "Ignoring malformed Socket.IO packet"),
                },
                EnginePacket::Open(_)
                | EnginePacket::Pong(_)
                | EnginePacket::Upgrade
                | EnginePacket::Noop => {}
            }
        }
    }

    /// Close the session, ignoring failures
    pub async fn close(mut self) {
        if let Err(e) = self.link.close().await {
            debug!(error = %e, "Push channel close failed");
        }
    }

    async fn next_packet(&mut self) -> Result<Option<EnginePacket>> {
        loop {
            if let Some(packet) = self.pending.pop_front() {
                return Ok(Some(packet));
            }

            let window = self.handshake.liveness_window();
            match tokio::time::timeout(window, self.link.receive()).await {
                Ok(Ok(Some(packets))) => self.pending.extend(packets),
                Ok(Ok(None)) => return Ok(None),
                Ok(Err(e)) => return Err(e),
                Err(_) => {
                    return Err(Error::push_channel(format!(
                        "no heartbeat from server within {}ms",
                        window.as_millis()
                    )));
                }
            }
        }
    }

    async fn send(&mut self, packet: EnginePacket) -> Result<()> {
        self.link.send(&packet).await
    }
}

enum Link {
    WebSocket(Box<WsStream>),
    Polling(PollingLink),
}

impl fmt::Debug for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WebSocket(_) => f.write_str("Link::WebSocket"),
            Self::Polling(link) => f.debug_tuple("Link::Polling").field(&link.url.as_str()).finish(),
        }
    }
}

impl Link {
    async fn receive(&mut self) -> Result<Option<Vec<EnginePacket>>> {
        match self {
            Self::WebSocket(stream) => loop {
                match stream.next().await {
                    Some(Ok(Message::Text(text))) => {
                        return EnginePacket::decode(&text).map(|packet| Some(vec![packet]));
                    }
                    Some(Ok(Message::Close(_))) | None => return Ok(None),
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        return Err(Error::push_channel(format!("websocket receive failed: {e}")));
                    }
                }
            },
            Self::Polling(link) => link.receive().await,
        }
    }

    async fn send(&mut self, packet: &EnginePacket) -> Result<()> {
        match self {
            Self::WebSocket(stream) => stream
                .send(Message::Text(packet.encode()))
                .await
                .map_err(|e| Error::push_channel(format!("websocket send failed: {e}"))),
            Self::Polling(link) => link.send(packet).await,
        }
    }

    fn attach_session(&mut self, sid: &str) {
        if let Self::Polling(link) = self {
            link.url.query_pairs_mut().append_pair("sid", sid);
        }
    }

    async fn close(&mut self) -> Result<()> {
        match self {
            Self::WebSocket(stream) => (**stream)
                .close(None)
                .await
                .map_err(|e| Error::push_channel(format!("websocket close failed: {e}"))),
            Self::Polling(link) => link.send(&EnginePacket::Close).await,
        }
    }
}

struct PollingLink {
    http: Client,
    url: Url,
}

impl PollingLink {
    async fn receive(&self) -> Result<Option<Vec<EnginePacket>>> {
        let response = self
            .http
            .get(self.url.clone())
            .send()
            .await
            .map_err(|e| Error::push_channel(format!("poll failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::push_channel(format!("poll returned {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::push_channel(format!("reading poll response failed: {e}")))?;

        decode_payload(&body).map(Some)
    }

    async fn send(&self, packet: &EnginePacket) -> Result<()> {
        let response = self
            .http
            .post(self.url.clone())
            .header(header::CONTENT_TYPE, "text/plain;charset=UTF-8")
            .body(encode_payload(std::slice::from_ref(packet)))
            .send()
            .await
            .map_err(|e| Error::push_channel(format!("poll send failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::push_channel(format!("poll send returned {status}")));
        }
        Ok(())
    }
}
