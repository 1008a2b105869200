//! Engine.IO v4 and Socket.IO v5 packet codec
//!
//! Engine.IO frames the transport: a single type digit followed by an
//! optional payload. Socket.IO packets travel inside Engine.IO `message`
//! packets. Long-polling bodies carry several Engine.IO packets joined by the
//! record separator.

use casedash_core::{Error, Result};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

/// Separator between packets in a long-polling payload
pub const RECORD_SEPARATOR: char = '\u{1e}';

/// Engine.IO protocol revision requested in the query string
pub const ENGINE_IO_VERSION: &str = "4";

/// Default Socket.IO namespace
pub const DEFAULT_NAMESPACE: &str = "/";

/// Parameters sent by the server in the Engine.IO `open` packet
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Handshake {
    /// Engine.IO session id
    pub sid: String,

    /// Transports the session may upgrade to
    #[serde(default)]
    pub upgrades: Vec<String>,

    /// Server ping interval in milliseconds
    pub ping_interval: u64,

    /// Grace period after a missed ping in milliseconds
    pub ping_timeout: u64,

    /// Largest payload the server accepts
    #[serde(default)]
    pub max_payload: Option<u64>,
}

impl Handshake {
    /// How long the connection may stay silent before it is considered dead
    #[must_use]
    pub const fn liveness_window(&self) -> Duration {
        Duration::from_millis(self.ping_interval.saturating_add(self.ping_timeout))
    }
}

/// Engine.IO packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnginePacket {
    /// Session opened
    Open(Handshake),
    /// Session closed
    Close,
    /// Heartbeat request
    Ping(String),
    /// Heartbeat answer
    Pong(String),
    /// Socket.IO payload
    Message(String),
    /// Transport upgrade confirmation
    Upgrade,
    /// Filler used while upgrading
    Noop,
}

impl EnginePacket {
    /// Decode one Engine.IO packet
    ///
    /// # Errors
    ///
    /// Returns a push channel error for an empty packet, an unknown type or a
    /// malformed handshake.
    pub fn decode(text: &str) -> Result<Self> {
        let mut chars = text.chars();
        let kind = chars
            .next()
            .ok_or_else(|| Error::push_channel("empty Engine.IO packet"))?;
        let data = chars.as_str();

        match kind {
            '0' => serde_json::from_str(data).map(Self::Open).map_err(|e| {
                Error::push_channel(format!("malformed Engine.IO handshake: {e}"))
            }),
            '1' => Ok(Self::Close),
            '2' => Ok(Self::Ping(data.to_string())),
            '3' => Ok(Self::Pong(data.to_string())),
            '4' => Ok(Self::Message(data.to_string())),
            '5' => Ok(Self::Upgrade),
            '6' => Ok(Self::Noop),
            other => Err(Error::push_channel(format!(
                "unknown Engine.IO packet type '{other}'"
            ))),
        }
    }

    /// Encode a client-to-server packet
    #[must_use]
    pub fn encode(&self) -> String {
        match self {
            Self::Open(_) => "0".to_string(),
            Self::Close => "1".to_string(),
            Self::Ping(data) => format!("2{data}"),
            Self::Pong(data) => format!("3{data}"),
            Self::Message(data) => format!("4{data}"),
            Self::Upgrade => "5".to_string(),
            Self::Noop => "6".to_string(),
        }
    }
}

/// Decode a long-polling response body
///
/// # Errors
///
/// Returns an error if any contained packet is malformed.
pub fn decode_payload(body: &str) -> Result<Vec<EnginePacket>> {
    body.split(RECORD_SEPARATOR)
        .filter(|packet| !packet.is_empty())
        .map(EnginePacket::decode)
        .collect()
}

/// Encode packets for a long-polling request body
#[must_use]
pub fn encode_payload(packets: &[EnginePacket]) -> String {
    packets
        .iter()
        .map(EnginePacket::encode)
        .collect::<Vec<_>>()
        .join(&RECORD_SEPARATOR.to_string())
}

/// Socket.IO packet
#[derive(Debug, Clone, PartialEq)]
pub enum SocketPacket {
    /// Namespace connection (request or acknowledgement)
    Connect {
        /// Namespace
        namespace: String,
        /// Server-assigned data, usually the socket id
        data: Option<Value>,
    },
    /// Namespace disconnection
    Disconnect {
        /// Namespace
        namespace: String,
    },
    /// Named event
    Event {
        /// Namespace
        namespace: String,
        /// Acknowledgement id requested by the sender
        id: Option<u64>,
        /// Event name
        name: String,
        /// Event arguments
        args: Vec<Value>,
    },
    /// Acknowledgement of an earlier event
    Ack {
        /// Namespace
        namespace: String,
        /// Acknowledged event id
        id: Option<u64>,
        /// Acknowledgement arguments
        args: Vec<Value>,
    },
    /// Namespace connection refused
    ConnectError {
        /// Namespace
        namespace: String,
        /// Reason given by the server
        message: String,
    },
    /// Binary event or ack; attachments are not supported
    Binary {
        /// Namespace
        namespace: String,
    },
}

impl SocketPacket {
    /// Decode a Socket.IO packet from an Engine.IO message payload
    ///
    /// # Errors
    ///
    /// Returns a push channel error for unknown packet types and malformed
    /// JSON data.
    pub fn decode(text: &str) -> Result<Self> {
        let mut chars = text.chars();
        let kind = chars
            .next()
            .ok_or_else(|| Error::push_channel("empty Socket.IO packet"))?;
        let mut rest = chars.as_str();

        if matches!(kind, '5' | '6') {
            // attachment count precedes the namespace: "51-/nsp,..."
            rest = rest.split_once('-').map_or(rest, |(_, tail)| tail);
        }

        let (namespace, rest) = split_namespace(rest);
        let digits = rest.len() - rest.trim_start_matches(|c: char| c.is_ascii_digit()).len();
        let (id, data) = rest.split_at(digits);
        let id = if id.is_empty() {
            None
        } else {
            Some(id.parse::<u64>().map_err(|e| {
                Error::push_channel(format!("invalid Socket.IO ack id '{id}': {e}"))
            })?)
        };
        let data = parse_data(data)?;

        match kind {
            '0' => Ok(Self::Connect { namespace, data }),
            '1' => Ok(Self::Disconnect { namespace }),
            '2' => {
                let mut args = into_array(data)?;
                if args.is_empty() {
                    return Err(Error::push_channel("Socket.IO event without a name"));
                }
                let name = match args.remove(0) {
                    Value::String(name) => name,
                    other => {
                        return Err(Error::push_channel(format!(
                            "Socket.IO event name is not a string: {other}"
                        )));
                    }
                };
                Ok(Self::Event {
                    namespace,
                    id,
                    name,
                    args,
                })
            }
            '3' => Ok(Self::Ack {
                namespace,
                id,
                args: into_array(data)?,
            }),
            '4' => {
                let message = match data {
                    Some(Value::Object(map)) => map
                        .get("message")
                        .and_then(Value::as_str)
                        .unwrap_or("connection refused")
                        .to_string(),
                    Some(Value::String(message)) => message,
                    _ => "connection refused".to_string(),
                };
                Ok(Self::ConnectError { namespace, message })
            }
            '5' | '6' => Ok(Self::Binary { namespace }),
            other => Err(Error::push_channel(format!(
                "unknown Socket.IO packet type '{other}'"
            ))),
        }
    }

    /// Namespace connection request for `namespace`
    #[must_use]
    pub fn connect_request(namespace: &str) -> String {
        if namespace == DEFAULT_NAMESPACE {
            "0".to_string()
        } else {
            format!("0{namespace},")
        }
    }
}

fn split_namespace(rest: &str) -> (String, &str) {
    if rest.starts_with('/') {
        match rest.split_once(',') {
            Some((namespace, tail)) => (namespace.to_string(), tail),
            None => (rest.to_string(), ""),
        }
    } else {
        (DEFAULT_NAMESPACE.to_string(), rest)
    }
}

fn parse_data(data: &str) -> Result<Option<Value>> {
    if data.is_empty() {
        return Ok(None);
    }
    serde_json::from_str(data)
        .map(Some)
        .map_err(|e| Error::push_channel(format!("malformed Socket.IO data: {e}")))
}

fn into_array(data: Option<Value>) -> Result<Vec<Value>> {
    match data {
        None => Ok(Vec::new()),
        Some(Value::Array(values)) => Ok(values),
        Some(other) => Err(Error::push_channel(format!(
            "expected a JSON array, got {other}"
        ))),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    #[test]
    fn test_decode_open() {
        let packet = EnginePacket::decode(
            r#"0{"sid":"lv_VI97HAXpY6yYWAAAC","upgrades":["websocket"],"pingInterval":25000,"pingTimeout":20000,"maxPayload":1000000}"#,
        )
        .unwrap();

        let handshake = match packet {
            EnginePacket::Open(handshake) => handshake,
            other => panic!("expected open packet, got {other:?}"),
        };
        assert_eq!(handshake.sid, "lv_VI97HAXpY6yYWAAAC");
        assert_eq!(handshake.upgrades, vec!["websocket"]);
        assert_eq!(handshake.liveness_window(), Duration::from_secs(45));
        assert_eq!(handshake.max_payload, Some(1_000_000));
    }

    #[rstest]
    #[case("1", EnginePacket::Close)]
    #[case("2", EnginePacket::Ping(String::new()))]
    #[case("2probe", EnginePacket::Ping("probe".to_string()))]
    #[case("3", EnginePacket::Pong(String::new()))]
    #[case("40", EnginePacket::Message("0".to_string()))]
    #[case("5", EnginePacket::Upgrade)]
    #[case("6", EnginePacket::Noop)]
    fn test_decode_simple_packets(#[case] text: &str, #[case] expected: EnginePacket) {
        assert_eq!(EnginePacket::decode(text).unwrap(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("9")]
    #[case("0{not json")]
    fn test_decode_rejects_bad_packets(#[case] text: &str) {
        assert!(EnginePacket::decode(text).is_err());
    }

    #[test]
    fn test_encode_client_packets() {
        assert_eq!(EnginePacket::Pong(String::new()).encode(), "3");
        assert_eq!(EnginePacket::Message("0".to_string()).encode(), "40");
        assert_eq!(EnginePacket::Close.encode(), "1");
    }

    #[test]
    fn test_payload_framing() {
        let packets = decode_payload("40{\"sid\":\"abc\"}\u{1e}2\u{1e}42[\"bot_update\"]").unwrap();

        assert_eq!(
            packets,
            vec![
                EnginePacket::Message("0{\"sid\":\"abc\"}".to_string()),
                EnginePacket::Ping(String::new()),
                EnginePacket::Message("2[\"bot_update\"]".to_string()),
            ]
        );
        assert_eq!(
            encode_payload(&[
                EnginePacket::Pong(String::new()),
                EnginePacket::Message("0".to_string())
            ]),
            "3\u{1e}40"
        );
        assert!(decode_payload("").unwrap().is_empty());
    }

    #[test]
    fn test_decode_event() {
        let packet = SocketPacket::decode(r#"2["bot_update",{"case_id":7}]"#).unwrap();

        assert_eq!(
            packet,
            SocketPacket::Event {
                namespace: "/".to_string(),
                id: None,
                name: "bot_update".to_string(),
                args: vec![json!({"case_id": 7})],
            }
        );
    }

    #[test]
    fn test_decode_event_with_namespace_and_ack_id() {
        let packet = SocketPacket::decode(r#"2/admin,13["bot_update"]"#).unwrap();

        assert_eq!(
            packet,
            SocketPacket::Event {
                namespace: "/admin".to_string(),
                id: Some(13),
                name: "bot_update".to_string(),
                args: Vec::new(),
            }
        );
    }

    #[test]
    fn test_decode_connect_ack() {
        let packet = SocketPacket::decode(r#"0{"sid":"wZX3oN0bSVIhsaknAAAI"}"#).unwrap();

        assert_eq!(
            packet,
            SocketPacket::Connect {
                namespace: "/".to_string(),
                data: Some(json!({"sid": "wZX3oN0bSVIhsaknAAAI"})),
            }
        );
    }

    #[rstest]
    #[case(r#"4{"message":"Not authorized"}"#, "Not authorized")]
    #[case(r#"4"Invalid namespace""#, "Invalid namespace")]
    #[case("4", "connection refused")]
    fn test_decode_connect_error(#[case] text: &str, #[case] message: &str) {
        assert_eq!(
            SocketPacket::decode(text).unwrap(),
            SocketPacket::ConnectError {
                namespace: "/".to_string(),
                message: message.to_string(),
            }
        );
    }

    #[test]
    fn test_decode_disconnect_and_binary() {
        assert_eq!(
            SocketPacket::decode("1/chat,").unwrap(),
            SocketPacket::Disconnect {
                namespace: "/chat".to_string()
            }
        );
        assert_eq!(
            SocketPacket::decode(r#"51-["upload",{"_placeholder":true,"num":0}]"#).unwrap(),
            SocketPacket::Binary {
                namespace: "/".to_string()
            }
        );
    }

    #[rstest]
    #[case("2[]")]
    #[case("2[42]")]
    #[case("2{\"a\":1}")]
    #[case("7")]
    fn test_decode_rejects_bad_events(#[case] text: &str) {
        assert!(SocketPacket::decode(text).is_err());
    }

    #[test]
    fn test_connect_request() {
        assert_eq!(SocketPacket::connect_request("/"), "0");
        assert_eq!(SocketPacket::connect_request("/admin"), "0/admin,");
    }
}
