//! Shared fixtures for casedash-client integration tests

#![allow(dead_code, clippy::unwrap_used, clippy::missing_panics_doc)]

use casedash_client::api_client::{CASES_PATH, COUNTS_PATH};
use futures::{SinkExt, StreamExt};
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::sync::Once;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

static INIT_LOGGER: Once = Once::new();

/// Engine.IO open packet used by the test servers
pub const OPEN_PACKET: &str =
    r#"0{"sid":"test-sid","upgrades":[],"pingInterval":25000,"pingTimeout":20000,"maxPayload":1000000}"#;

/// Namespace acknowledgement used by the test servers
pub const CONNECT_ACK: &str = r#"40{"sid":"socket-1"}"#;

/// Reported by [`SocketIoServer::next_incoming`] when a client sends a close frame
pub const CLOSE_MARKER: &str = "<close>";

/// Initialize test logging once per binary
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("debug")
            .with_test_writer()
            .try_init();
    });
}

/// Two cases across two hospital groups
pub fn sample_cases() -> Value {
    json!([
        {"id": 1, "patient_name": "Ravi Kumar", "al_number": "AL-100", "policy_number": null,
         "hospital_group": "Apollo", "tpa_name": "Vidal Health",
         "parsed_time": "2024-03-01T10:00:00Z", "saved_time": "2024-03-01T10:00:45Z",
         "status": "Saved"},
        {"id": "c-2", "patient_name": "Meena Shah", "al_number": null, "policy_number": "POL-7",
         "hospital_group": "Fortis", "tpa_name": "Paramount",
         "parsed_time": "2024-03-01T11:00:00Z", "saved_time": null,
         "status": "Parsed"}
    ])
}

/// Mount the counts and cases endpoints on `server`
pub async fn mount_backend(server: &MockServer, parsed: u64, saved: u64, cases: Value) {
    Mock::given(method("GET"))
        .and(path(COUNTS_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"parsed": parsed, "saved": saved})),
        )
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(CASES_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(cases))
        .mount(server)
        .await;
}

/// Poll `condition` until it holds or five seconds pass
pub async fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .is_ok()
}

/// Minimal Socket.IO server speaking the websocket transport
pub struct SocketIoServer {
    addr: SocketAddr,
    outgoing: broadcast::Sender<String>,
    incoming: mpsc::UnboundedReceiver<String>,
    handle: JoinHandle<()>,
}

impl SocketIoServer {
    /// Start listening on an ephemeral port
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (outgoing, _) = broadcast::channel(16);
        let (incoming_tx, incoming) = mpsc::unbounded_channel();

        let sender = outgoing.clone();
        let handle = tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                tokio::spawn(serve(stream, sender.subscribe(), incoming_tx.clone()));
            }
        });

        Self {
            addr,
            outgoing,
            incoming,
            handle,
        }
    }

    /// HTTP base URL of the server
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Send a raw Engine.IO packet to every connected client
    pub fn emit(&self, packet: &str) {
        let _ = self.outgoing.send(packet.to_string());
    }

    /// Next packet sent by a client
    pub async fn next_incoming(&mut self) -> Option<String> {
        tokio::time::timeout(Duration::from_secs(5), self.incoming.recv())
            .await
            .ok()
            .flatten()
    }
}

impl Drop for SocketIoServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn serve(
    stream: TcpStream,
    mut outgoing: broadcast::Receiver<String>,
    incoming: mpsc::UnboundedSender<String>,
) {
    let Ok(mut ws) = accept_async(stream).await else {
        return;
    };
    if ws.send(Message::Text(OPEN_PACKET.to_string())).await.is_err() {
        return;
    }

    loop {
        tokio::select! {
            message = ws.next() => match message {
                Some(Ok(Message::Text(text))) => {
                    if text == "40" && ws.send(Message::Text(CONNECT_ACK.to_string())).await.is_err() {
                        return;
                    }
                    let _ = incoming.send(text);
                }
                Some(Ok(Message::Close(_))) => {
                    let _ = incoming.send(CLOSE_MARKER.to_string());
                    return;
                }
                Some(Ok(_)) => {}
                _ => return,
            },
            packet = outgoing.recv() => match packet {
                Ok(packet) => {
                    if ws.send(Message::Text(packet)).await.is_err() {
                        return;
                    }
                }
                Err(_) => return,
            },
        }
    }
}
