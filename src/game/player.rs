use super::connection::{Connection, ConnectionId};
use super::message::Message;
use super::party::Party;
use crate::error::GameError;
use rand::distributions::Alphanumeric;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

const AUTH_TOKEN_LEN: usize = 32;

/// A game player.
pub struct Player {
    pub name: String,
    /// Assigned once, when the game starts.
    pub role: Option<Role>,
    pub alive: bool,
    pub connected: bool,
    pub investigated: bool,
    pub auth_token: String,
    connection: Option<Box<dyn Connection>>,
}

#[derive(Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Debug, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Liberal,
    Fascist,
    Hitler,
}

impl Role {
    /// The party membership card of this role.
    pub fn party(&self) -> Party {
        match self {
            Role::Liberal => Party::Liberal,
            Role::Fascist | Role::Hitler => Party::Fascist,
        }
    }
}

impl Player {
    pub fn new(name: String, connection: Box<dyn Connection>) -> Self {
        Self {
            name,
            role: None,
            alive: true,
            connected: true,
            investigated: false,
            auth_token: generate_auth_token(),
            connection: Some(connection),
        }
    }

    pub fn party(&self) -> Option<Party> {
        self.role.map(|role| role.party())
    }

    pub fn is_hitler(&self) -> bool {
        self.role == Some(Role::Hitler)
    }

    /// Sends a message to this player, if they are connected.
    pub fn send(&self, message: &Message) {
        if let Some(connection) = &self.connection {
            connection.send(message);
        }
    }

    /// Installs a new connection, returning the one it replaces.
    pub fn connect(&mut self, connection: Box<dyn Connection>) -> Option<Box<dyn Connection>> {
        self.connected = true;
        self.connection.replace(connection)
    }

    /// Drops the player's connection if it is the given one; returns whether it was.
    pub fn disconnect(&mut self, id: ConnectionId) -> bool {
        if self.connection.as_ref().map(|c| c.id()) != Some(id) {
            return false;
        }
        self.connection = None;
        self.connected = false;
        true
    }

    /// Drops whatever connection the player has.
    pub fn drop_connection(&mut self) {
        self.connection = None;
        self.connected = false;
    }
}

/// Checks that a display name is 3 to 16 letters, digits, dashes or underscores.
pub fn valid_name(name: &str) -> bool {
    (3..=16).contains(&name.len())
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn generate_auth_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(AUTH_TOKEN_LEN)
        .map(char::from)
        .collect()
}

/// The recommended number of liberals for a game of the given size.
pub fn recommended_liberals(num_players: usize) -> Option<usize> {
    match num_players {
        5 => Some(3),
        6 | 7 => Some(4),
        8 | 9 => Some(5),
        10 => Some(6),
        _ => None,
    }
}

/// The recommended number of ordinary fascists (excluding Hitler) for a game of the given size.
pub fn recommended_fascists(num_players: usize) -> Option<usize> {
    recommended_liberals(num_players).map(|liberals| num_players - liberals - 1)
}

/// Deals roles one seat at a time.
///
/// Each seat receives a role kind chosen uniformly from the kinds that still have
/// cards left, so the final deal always contains exactly the recommended numbers.
pub struct RoleAssigner {
    remaining: [(Role, usize); 3],
}

impl RoleAssigner {
    pub fn new(num_players: usize) -> Result<Self, GameError> {
        let (Some(liberals), Some(fascists)) = (
            recommended_liberals(num_players),
            recommended_fascists(num_players),
        ) else {
            return Err(if num_players < 5 {
                GameError::TooFewPlayers
            } else {
                GameError::TooManyPlayers
            });
        };
        Ok(Self {
            remaining: [
                (Role::Liberal, liberals),
                (Role::Fascist, fascists),
                (Role::Hitler, 1),
            ],
        })
    }

    /// Deals the next role, or `None` once every role has been dealt.
    pub fn next(&mut self, rng: &mut impl Rng) -> Option<Role> {
        let available = self
            .remaining
            .iter()
            .enumerate()
            .filter(|(_, (_, count))| *count > 0)
            .map(|(i, _)| i)
            .collect::<Vec<_>>();
        let idx = *available.choose(rng)?;
        self.remaining[idx].1 -= 1;
        Some(self.remaining[idx].0)
    }
}

/// Assigns a role to each of the given seats, visiting the seats in a random order.
pub fn assign_roles(seats: &[usize], rng: &mut impl Rng) -> Result<Vec<(usize, Role)>, GameError> {
    let mut assigner = RoleAssigner::new(seats.len())?;
    let mut order = seats.to_vec();
    order.shuffle(rng);
    order
        .into_iter()
        .map(|seat| {
            let role = assigner.next(rng).ok_or(GameError::TooManyPlayers)?;
            Ok((seat, role))
        })
        .collect()
}
