use crate::{
    client::{Client, JoinReply},
    error::GameError,
    game::{Command, Connection, ConnectionId, Message},
    session::SessionManager,
};
use futures_util::{select, FutureExt, SinkExt, StreamExt, TryStreamExt};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time;
use tokio_tungstenite::tungstenite::protocol::WebSocketConfig;
use tokio_tungstenite::tungstenite::Message as WsMessage;

static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// How often the server pings each client.
const PING_PERIOD: Duration = Duration::from_secs(10);
/// How long a client may stay silent before it is dropped. Must exceed `PING_PERIOD`.
const PONG_WAIT: Duration = Duration::from_secs(15);
/// Largest frame or message accepted from a client, in bytes.
const MAX_MESSAGE_SIZE: usize = 1024;

/// Tracks when a client was last heard from.
#[derive(Clone, Copy, Debug)]
struct Liveness {
    last_seen: Instant,
}

impl Liveness {
    fn new(now: Instant) -> Self {
        Self { last_seen: now }
    }

    /// Records any frame from the client, pongs included.
    fn seen(&mut self, now: Instant) {
        self.last_seen = now;
    }

    fn expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.last_seen) > PONG_WAIT
    }
}

/// Traffic queued for delivery to one websocket.
#[derive(Debug)]
pub enum Outgoing {
    Text(String),
    Close,
}

/// The game's handle on a websocket; sending only queues the message.
pub struct WsConnection {
    id: ConnectionId,
    tx: mpsc::UnboundedSender<Outgoing>,
}

impl WsConnection {
    pub fn new(id: ConnectionId, tx: mpsc::UnboundedSender<Outgoing>) -> Self {
        Self { id, tx }
    }
}

impl Connection for WsConnection {
    fn id(&self) -> ConnectionId {
        self.id
    }

    fn send(&self, message: &Message) {
        match serde_json::to_string(message) {
            Ok(text) => {
                self.tx.send(Outgoing::Text(text)).ok();
            }
            Err(err) => log::error!("Could not serialize {:?}: {}", message, err),
        }
    }

    fn close(&self) {
        self.tx.send(Outgoing::Close).ok();
    }
}

/// A message sent by a client to the server, outside of any game.
#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum Request {
    Create,
    Join {
        game: String,
        name: String,
        authtoken: Option<String>,
    },
}

pub async fn accept_connection(stream: TcpStream, manager: Arc<SessionManager>) {
    log::info!("Accepted new connection");

    let config = WebSocketConfig {
        max_message_size: Some(MAX_MESSAGE_SIZE),
        max_frame_size: Some(MAX_MESSAGE_SIZE),
        ..Default::default()
    };
    let Ok(stream) = tokio_tungstenite::accept_async_with_config(stream, Some(config)).await else {
        log::error!("Error occured during websocket handshake");
        return;
    };
    let (mut write, read) = stream.split();
    let mut read = read.fuse();

    let (tx, mut rx) = mpsc::unbounded_channel();
    let id = NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed);
    let mut client = Client::new(manager, id, tx);

    let mut liveness = Liveness::new(Instant::now());
    let mut ping = time::interval_at(time::Instant::now() + PING_PERIOD, PING_PERIOD);

    loop {
        select! {
            msg = read.try_next() => {
                let Ok(Some(msg)) = msg else {
                    break;
                };
                liveness.seen(Instant::now());
                let text = match msg {
                    WsMessage::Text(text) => text,
                    WsMessage::Close(_) => break,
                    _ => continue,
                };
                if let Some(reply) = process_message(&text, &mut client) {
                    write.send(WsMessage::Text(reply.to_string())).await.ok();
                }
            },
            outgoing = rx.recv().fuse() => {
                match outgoing {
                    Some(Outgoing::Text(text)) => {
                        if write.send(WsMessage::Text(text)).await.is_err() {
                            log::error!("Could not send websockets message");
                            break;
                        }
                    }
                    Some(Outgoing::Close) | None => {
                        write.send(WsMessage::Close(None)).await.ok();
                        break;
                    }
                }
            },
            _ = ping.tick().fuse() => {
                if liveness.expired(Instant::now()) {
                    log::info!("Connection {} timed out", id);
                    break;
                }
                if write.send(WsMessage::Ping(Vec::new())).await.is_err() {
                    break;
                }
            }
        }
    }

    client.disconnect();
    log::info!("Connection {} closed", id);
}

/// Handles one text frame, returning the reply to send back, if any.
fn process_message(text: &str, client: &mut Client) -> Option<Value> {
    let Ok(msg) = serde_json::from_str::<Value>(text) else {
        log::warn!("Invalid JSON received: {}", text);
        return None;
    };

    if matches!(msg["type"].as_str(), Some("create" | "join")) {
        let Ok(request) = serde_json::from_value::<Request>(msg) else {
            log::warn!("Invalid request received: {}", text);
            return None;
        };
        return Some(process_request(request, client));
    }

    match serde_json::from_value::<Command>(msg) {
        Ok(command) => client.command(command),
        Err(_) => log::warn!("Invalid command received: {}", text),
    }
    None
}

fn process_request(req: Request, client: &mut Client) -> Value {
    match req {
        Request::Create => json!({
            "type": "created",
            "game": client.create_game()
        }),
        Request::Join { game, name, authtoken } => {
            let result = client.join(&game, &name, authtoken.as_deref());
            format_join_reply(result, &game, &name)
        }
    }
}

/// Formats the outcome of a join request to be sent over websockets.
fn format_join_reply(result: Result<JoinReply, GameError>, game: &str, name: &str) -> Value {
    match result {
        Ok(reply) => json!({
            "type": "joined",
            "success": true,
            "game": reply.game,
            "name": reply.name,
            "authtoken": reply.authtoken,
            "players": reply.players
        }),
        Err(err) => json!({
            "type": "joined",
            "success": false,
            "message": match err {
                GameError::GameNotFound | GameError::GameOver => "gamenotfound",
                GameError::GameFull => "full",
                GameError::NameTaken => "nameused",
                GameError::CannotJoinStartedGame => "gamestarted",
                GameError::InvalidName => "invalidname",
                _ => "error",
            },
            "game": game,
            "name": name
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn join_errors_use_protocol_codes() {
        let reply = format_join_reply(Err(GameError::NameTaken), "ABCD", "alice");
        assert_eq!(reply["success"], false);
        assert_eq!(reply["message"], "nameused");
        assert_eq!(reply["game"], "ABCD");
    }

    #[test]
    fn successful_join_carries_token() {
        let reply = JoinReply {
            game: "ABCD".into(),
            name: "alice".into(),
            authtoken: "secret".into(),
            players: BTreeMap::from([("alice".to_string(), true)]),
        };
        let reply = format_join_reply(Ok(reply), "ABCD", "alice");
        assert_eq!(reply["success"], true);
        assert_eq!(reply["authtoken"], "secret");
        assert_eq!(reply["players"]["alice"], true);
    }

    #[test]
    fn connection_queues_serialized_messages() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let connection = WsConnection::new(7, tx);
        connection.send(&Message::Join { name: "alice".into() });
        connection.close();

        let Ok(Outgoing::Text(text)) = rx.try_recv() else {
            panic!("expected a text frame");
        };
        assert_eq!(
            serde_json::from_str::<Value>(&text).unwrap(),
            json!({ "type": "join", "name": "alice" })
        );
        assert!(matches!(rx.try_recv(), Ok(Outgoing::Close)));
    }

    #[test]
    fn silent_clients_expire_after_the_pong_wait() {
        let start = Instant::now();
        let liveness = Liveness::new(start);
        assert!(!liveness.expired(start + PING_PERIOD));
        assert!(!liveness.expired(start + PONG_WAIT));
        assert!(liveness.expired(start + PONG_WAIT + Duration::from_millis(1)));
    }

    #[test]
    fn any_frame_keeps_a_client_alive() {
        let start = Instant::now();
        let mut liveness = Liveness::new(start);
        liveness.seen(start + PING_PERIOD);
        assert!(!liveness.expired(start + PONG_WAIT + Duration::from_secs(1)));
        assert!(liveness.expired(start + PING_PERIOD + PONG_WAIT + Duration::from_secs(1)));
    }

    #[test]
    fn missed_pong_is_noticed_by_the_next_ping() {
        // The second ping fires after the deadline for the first one has passed
        assert!(PING_PERIOD < PONG_WAIT);
        assert!(PING_PERIOD * 2 > PONG_WAIT);
    }
}
