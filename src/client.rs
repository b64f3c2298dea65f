use crate::{
    error::GameError,
    game::{Command, ConnectionId},
    session::{lock, SessionHandle, SessionManager},
    ws::{Outgoing, WsConnection},
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::mpsc;

/// A single game client, bound to at most one seat in one game.
pub struct Client {
    manager: Arc<SessionManager>,
    connection: ConnectionId,
    outgoing: mpsc::UnboundedSender<Outgoing>,
    seat: Option<Seat>,
}

struct Seat {
    session: SessionHandle,
    index: usize,
}

/// What a client learns on successfully joining a game.
#[derive(Clone, Serialize, Debug)]
pub struct JoinReply {
    pub game: String,
    pub name: String,
    pub authtoken: String,
    /// Whether each seated player is connected, by name.
    pub players: BTreeMap<String, bool>,
}

impl Client {
    /// Creates a new game client.
    pub fn new(
        manager: Arc<SessionManager>,
        connection: ConnectionId,
        outgoing: mpsc::UnboundedSender<Outgoing>,
    ) -> Self {
        Self {
            manager,
            connection,
            outgoing,
            seat: None,
        }
    }

    /// Creates a new game session, returning its ID.
    pub fn create_game(&self) -> String {
        let session = self.manager.create_game();
        let id = lock(&session).id().to_owned();
        id
    }

    /// Joins a game, or rejoins it if `auth_token` matches the one issued on the first join.
    pub fn join(&mut self, game_id: &str, name: &str, auth_token: Option<&str>) -> Result<JoinReply, GameError> {
        self.disconnect();
        let session = self.manager.find_game(game_id)?;
        let (index, reply) = {
            let mut game = lock(&session);
            let connection = WsConnection::new(self.connection, self.outgoing.clone());
            let index = game.join(name, auth_token, Box::new(connection))?;
            let player = game.player(index).ok_or(GameError::InvalidPlayerIndex)?;
            let reply = JoinReply {
                game: game.id().to_string(),
                name: player.name.clone(),
                authtoken: player.auth_token.clone(),
                players: game.connection_statuses(),
            };
            (index, reply)
        };
        self.seat = Some(Seat { session, index });
        Ok(reply)
    }

    /// Forwards a command to the game this client is playing in.
    pub fn command(&mut self, command: Command) {
        let Some(seat) = &self.seat else {
            log::debug!("Dropped {:?} from a client that has not joined a game", command);
            return;
        };
        let quit = command == Command::Quit;
        lock(&seat.session).receive(seat.index, command);
        if quit {
            self.seat = None;
        }
    }

    /// Detaches this client from its seat, if it has one.
    pub fn disconnect(&mut self) {
        if let Some(seat) = self.seat.take() {
            lock(&seat.session).disconnect(seat.index, self.connection);
        }
    }
}
