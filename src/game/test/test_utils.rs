//! Helpers for driving a game through its public commands.

use crate::game::deck::{FASCIST_POLICIES, LIBERAL_POLICIES};
use crate::game::{Command, Connection, ConnectionId, Game, GameState, Message, Party, Registry, Role, MAX_PLAYERS};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};

pub const GAME_ID: &str = "TEST";

/// A connection that records every message sent to it.
#[derive(Clone)]
pub struct RecordingConnection {
    id: ConnectionId,
    inbox: Arc<Mutex<Vec<Message>>>,
    closed: Arc<AtomicBool>,
}

impl RecordingConnection {
    pub fn new(id: ConnectionId) -> Self {
        Self {
            id,
            inbox: Default::default(),
            closed: Default::default(),
        }
    }

    pub fn messages(&self) -> Vec<Message> {
        self.inbox.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.inbox.lock().unwrap().clear();
    }

    pub fn closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl Connection for RecordingConnection {
    fn id(&self) -> ConnectionId {
        self.id
    }

    fn send(&self, message: &Message) {
        self.inbox.lock().unwrap().push(message.clone());
    }

    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

#[derive(Default)]
pub struct RecordingRegistry {
    removed: Mutex<Vec<String>>,
}

impl RecordingRegistry {
    pub fn removed(&self) -> Vec<String> {
        self.removed.lock().unwrap().clone()
    }
}

impl Registry for RecordingRegistry {
    fn remove(&self, game_id: &str) {
        self.removed.lock().unwrap().push(game_id.to_string());
    }
}

/// A game together with the connections of everyone seated at it.
pub struct TestGame {
    pub game: Game,
    pub connections: Vec<RecordingConnection>,
    pub registry: Arc<RecordingRegistry>,
}

pub fn player_name(seat: usize) -> String {
    format!("Player{}", seat)
}

/// Creates a game that `num_players` players have joined.
pub fn lobby(num_players: usize, seed: u64) -> TestGame {
    let registry = Arc::new(RecordingRegistry::default());
    let weak: Weak<dyn Registry> = Arc::downgrade(&registry) as Weak<dyn Registry>;
    let mut game = Game::new(GAME_ID.to_string(), seed, weak);
    let connections = (0..num_players)
        .map(|seat| {
            let connection = RecordingConnection::new(seat as ConnectionId);
            let joined = game.join(&player_name(seat), None, Box::new(connection.clone()));
            assert_eq!(joined, Ok(seat));
            connection
        })
        .collect();
    TestGame {
        game,
        connections,
        registry,
    }
}

/// Creates a game of `num_players` players that has been started.
pub fn started(num_players: usize, seed: u64) -> TestGame {
    let mut t = lobby(num_players, seed);
    t.send(0, Command::Start);
    assert!(t.game.started());
    t
}

impl TestGame {
    pub fn send(&mut self, seat: usize, command: Command) {
        self.game.receive(seat, command);
    }

    pub fn messages(&self, seat: usize) -> Vec<Message> {
        self.connections[seat].messages()
    }

    pub fn received(&self, seat: usize, message: &Message) -> bool {
        self.messages(seat).contains(message)
    }

    pub fn everyone_received(&self, message: &Message) -> bool {
        (0..self.connections.len()).all(|seat| self.received(seat, message))
    }

    pub fn clear_messages(&self) {
        self.connections.iter().for_each(RecordingConnection::clear);
    }

    /// Overrides the dealt roles, in seat order.
    pub fn set_roles(&mut self, roles: &[Role]) {
        for (seat, role) in roles.iter().enumerate() {
            if let Some(player) = self.game.players[seat].as_mut() {
                player.role = Some(*role);
            }
        }
    }

    /// Hands the presidency to the given seat and clears everyone's inbox.
    pub fn make_president(&mut self, seat: usize) {
        self.game.presidential_turn = seat;
        self.game.start_nomination(seat);
        self.clear_messages();
    }

    pub fn president(&self) -> usize {
        match self.game.state {
            GameState::Nomination { president }
            | GameState::Election { president, .. }
            | GameState::LegislativeSession { president, .. }
            | GameState::ChoosePlayer { president, .. } => president,
            state => panic!("no president in {:?}", state),
        }
    }

    /// The first seat the current president may nominate.
    pub fn candidate(&self) -> usize {
        let eligible = self.game.eligible_chancellors(self.president());
        (0..MAX_PLAYERS)
            .find(|seat| eligible.includes(*seat))
            .expect("no eligible chancellor")
    }

    pub fn nominate(&mut self, chancellor: usize) {
        let president = self.president();
        self.send(president, Command::PickChancellor { name: player_name(chancellor) });
        assert!(matches!(self.game.state, GameState::Election { .. }));
    }

    /// Every living, connected player casts the same vote.
    pub fn vote_all(&mut self, vote: &str) {
        let voters = self
            .game
            .seated()
            .filter(|(_, p)| p.alive && p.connected)
            .map(|(i, _)| i)
            .collect::<Vec<_>>();
        for seat in voters {
            self.send(seat, Command::Vote { vote: vote.to_string() });
        }
    }

    /// Nominates the given chancellor and has everyone vote for the government.
    pub fn elect(&mut self, chancellor: usize) {
        self.nominate(chancellor);
        self.vote_all("ja");
    }

    /// Has the current government discard down to, and enact, a policy.
    pub fn legislate(&mut self, president_discard: usize, chancellor_discard: usize) {
        let GameState::LegislativeSession { president, chancellor, .. } = self.game.state else {
            panic!("not in a legislative session: {:?}", self.game.state);
        };
        self.send(president, Command::Discard { index: president_discard });
        self.send(chancellor, Command::Discard { index: chancellor_discard });
    }

    pub fn assert_cards_conserved(&self) {
        let deck = &self.game.deck;
        for (party, total) in [(Party::Liberal, LIBERAL_POLICIES), (Party::Fascist, FASCIST_POLICIES)] {
            assert_eq!(
                deck.undrawn(party) + deck.held(party) + deck.discarded(party) + deck.enacted(party),
                total,
                "{:?} policies went missing",
                party
            );
        }
    }
}
