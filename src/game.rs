use self::deck::Deck;
use self::executive_power::ExecutiveAction;
use self::government::Government;
use self::player::{assign_roles, valid_name, Player};
use self::votes::{Vote, Votes};
use crate::error::GameError;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Weak;
use std::time::{Instant, SystemTime};

pub use self::connection::{Connection, ConnectionId, Registry};
pub use self::message::{Command, Message};
pub use self::party::Party;
pub use self::player::Role;

mod board;
mod connection;
mod deck;
mod eligible;
mod executive_power;
mod government;
mod legislative;
mod message;
mod party;
mod player;
mod votes;

/// The number of seats at the table.
pub const MAX_PLAYERS: usize = 10;
/// The number of seated players needed to start a game.
pub const MIN_PLAYERS: usize = 5;

/// A game of Secret Hitler.
///
/// The game is not synchronised; callers serialise every mutating call, including
/// [Game::join], [Game::leave] and [Game::disconnect], behind a single lock.
pub struct Game {
    id: String,
    players: [Option<Player>; MAX_PLAYERS],
    deck: Deck,
    state: GameState,
    presidential_turn: usize,
    election_tracker: usize,
    last_government: Option<Government>,
    rng: rand_chacha::ChaCha8Rng,
    registry: Weak<dyn Registry>,
    created: SystemTime,
    last_ts: Instant,
}

/// Represents the current phase in the game loop.
#[derive(Clone, Copy, Debug)]
enum GameState {
    /// Players are joining; the game has not started.
    Lobby,
    /// The president must nominate a chancellor.
    Nomination { president: usize },
    /// Every player votes on the proposed government.
    Election {
        president: usize,
        chancellor: usize,
        votes: Votes,
    },
    LegislativeSession {
        president: usize,
        chancellor: usize,
        turn: LegislativeSessionTurn,
    },
    /// The president must choose the subject of an executive action.
    ChoosePlayer {
        action: ExecutiveAction,
        president: usize,
    },
    /// The game is over; `None` if it was aborted because of an error.
    GameOver(Option<WinCondition>),
}

#[derive(Clone, Copy, Debug)]
enum LegislativeSessionTurn {
    /// President must discard a card.
    President { cards: [Party; 3] },
    /// Chancellor must discard a card.
    Chancellor { cards: [Party; 2], veto: VetoStatus },
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum VetoStatus {
    CanVeto,
    Requested,
    Denied,
}

#[derive(Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Debug)]
#[serde(rename_all = "camelCase")]
pub enum WinCondition {
    /// The liberals completed their policy track.
    LiberalPolicyTrack,
    /// The fascists completed their policy track.
    FascistPolicyTrack,
    /// Hitler was elected chancellor
    HitlerChancellor,
    /// Hitler was executed
    HitlerExecuted,
}

impl WinCondition {
    pub fn winner(&self) -> Party {
        match self {
            WinCondition::LiberalPolicyTrack | WinCondition::HitlerExecuted => Party::Liberal,
            WinCondition::FascistPolicyTrack | WinCondition::HitlerChancellor => Party::Fascist,
        }
    }
}

impl Game {
    /// Creates a new, empty game of Secret Hitler.
    pub fn new(id: String, seed: u64, registry: Weak<dyn Registry>) -> Self {
        Game {
            id,
            players: Default::default(),
            deck: Deck::new(),
            state: GameState::Lobby,
            presidential_turn: 0,
            election_tracker: 0,
            last_government: None,
            rng: rand_chacha::ChaCha8Rng::seed_from_u64(seed),
            registry,
            created: SystemTime::now(),
            last_ts: Instant::now(),
        }
    }

    /// Gets the unique game ID.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// When the game was created.
    pub fn created(&self) -> SystemTime {
        self.created
    }

    /// When a player last interacted with the game.
    pub fn last_activity(&self) -> Instant {
        self.last_ts
    }

    /// Seats a new player, or reconnects an existing one whose auth token matches.
    pub fn join(
        &mut self,
        name: &str,
        auth_token: Option<&str>,
        connection: Box<dyn Connection>,
    ) -> Result<usize, GameError> {
        if self.ended() {
            return Err(GameError::GameOver);
        }
        if !valid_name(name) {
            return Err(GameError::InvalidName);
        }
        self.last_ts = Instant::now();

        if let Ok(seat) = self.find_player(name) {
            let token_matches = match (auth_token, &self.players[seat]) {
                (Some(token), Some(player)) => !token.is_empty() && player.auth_token == token,
                _ => false,
            };
            if !token_matches {
                return Err(GameError::NameTaken);
            }
            self.reconnect(seat, connection);
            return Ok(seat);
        }

        if self.started() {
            return Err(GameError::CannotJoinStartedGame);
        }
        let seat = self
            .players
            .iter()
            .position(Option::is_none)
            .ok_or(GameError::GameFull)?;

        log::info!("[{}] {} joined in seat {}", self.id, name, seat);
        self.broadcast(&Message::Join { name: name.to_string() });
        self.players[seat] = Some(Player::new(name.to_string(), connection));
        Ok(seat)
    }

    fn reconnect(&mut self, seat: usize, connection: Box<dyn Connection>) {
        let name = self.name_of(seat);
        log::info!("[{}] {} reconnected", self.id, name);
        self.broadcast_except(seat, &Message::Connected { name });
        if let Some(old) = self.players[seat].as_mut().and_then(|p| p.connect(connection)) {
            old.send(&Message::ConnectedOther);
            old.close();
        }
        self.resync(seat);
    }

    /// Sends a returning player everything they need to pick the game back up.
    fn resync(&self, seat: usize) {
        if !self.started() || self.ended() {
            return;
        }
        if let Some(start) = self.start_message(seat) {
            self.send_to(seat, &start);
        }
        self.send_table(seat);

        match self.state {
            GameState::Nomination { president } => self.send_to(
                seat,
                &Message::President {
                    name: self.name_of(president),
                    candidates: self.eligible_chancellors(president).names(self),
                },
            ),
            GameState::Election { president, chancellor, votes } => {
                self.send_to(
                    seat,
                    &Message::StartVote {
                        president: self.name_of(president),
                        chancellor: self.name_of(chancellor),
                    },
                );
                if votes.has_cast(seat) {
                    self.send_to(seat, &Message::Vote { vote: votes.get(seat) });
                }
            }
            GameState::LegislativeSession { president, chancellor, turn } => match turn {
                LegislativeSessionTurn::President { cards } if seat == president => {
                    self.send_to(seat, &Message::Cards { cards: cards.to_vec() })
                }
                LegislativeSessionTurn::Chancellor { cards, .. } if seat == chancellor => {
                    self.send_to(seat, &Message::Cards { cards: cards.to_vec() })
                }
                _ => {}
            },
            GameState::ChoosePlayer { action, president } => {
                let president = self.name_of(president);
                self.send_to(
                    seat,
                    &match action {
                        ExecutiveAction::InvestigatePlayer => Message::Investigate { president },
                        ExecutiveAction::SpecialElection => Message::PresidentSelect { president },
                        ExecutiveAction::Execution => Message::Execute { president },
                        ExecutiveAction::PolicyPeak => Message::Peek { president },
                    },
                );
            }
            GameState::Lobby | GameState::GameOver(_) => {}
        }
    }

    /// Removes a player from the game.
    ///
    /// Before the game starts their seat is freed. Afterwards the seat is kept but the
    /// player is eliminated, and any government they were part of is abandoned.
    pub fn leave(&mut self, name: &str) -> Result<(), GameError> {
        let seat = self.find_player(name)?;
        self.last_ts = Instant::now();
        log::info!("[{}] {} left", self.id, name);

        if !self.started() {
            self.players[seat] = None;
            self.broadcast(&Message::Quit { name: name.to_string() });
            return Ok(());
        }

        if let Some(player) = self.players[seat].as_mut() {
            player.alive = false;
            player.drop_connection();
        }
        self.broadcast(&Message::Quit { name: name.to_string() });
        if !self.ended() {
            self.abandon_turn(seat);
        }
        Ok(())
    }

    /// Moves play along after a player leaves mid-game.
    fn abandon_turn(&mut self, seat: usize) {
        if let GameState::Election { votes, .. } = &mut self.state {
            votes.vote(seat, Vote::Empty);
        }
        let involved = match self.state {
            GameState::Nomination { president } | GameState::ChoosePlayer { president, .. } => president == seat,
            GameState::Election { president, chancellor, .. }
            | GameState::LegislativeSession { president, chancellor, .. } => {
                president == seat || chancellor == seat
            }
            GameState::Lobby | GameState::GameOver(_) => false,
        };
        if involved {
            log::info!("[{}] Government abandoned", self.id);
            if !self.discard_hand() {
                return;
            }
            self.broadcast_table();
            self.next_president();
        } else {
            self.check_votes();
        }
    }

    /// Called by the transport when a connection drops.
    ///
    /// Does nothing if the player has since reconnected on another connection.
    pub fn disconnect(&mut self, seat: usize, connection: ConnectionId) {
        let Some(player) = self.players.get_mut(seat).and_then(Option::as_mut) else {
            return;
        };
        if !player.disconnect(connection) {
            return;
        }
        let name = player.name.clone();
        log::info!("[{}] {} disconnected", self.id, name);
        self.broadcast(&Message::Disconnected { name });
        if !self.ended() {
            self.check_votes();
        }
    }

    /// Processes a command sent by the player in the given seat.
    ///
    /// Commands that are malformed or not allowed right now are dropped.
    pub fn receive(&mut self, seat: usize, command: Command) {
        self.last_ts = Instant::now();
        if let Err(err) = self.handle(seat, &command) {
            log::debug!("[{}] Dropped {:?} from seat {}: {}", self.id, command, seat, err);
        }
    }

    fn handle(&mut self, seat: usize, command: &Command) -> Result<(), GameError> {
        if self.ended() {
            return Err(GameError::GameOver);
        }
        let player = self
            .players
            .get(seat)
            .and_then(Option::as_ref)
            .ok_or(GameError::InvalidPlayerIndex)?;
        let (alive, name) = (player.alive, player.name.clone());

        match command {
            Command::Start => self.start(),
            Command::Quit => self.leave(&name),
            Command::Chat { message } if alive => {
                self.broadcast(&Message::Chat { sender: name, message: message.clone() });
                Ok(())
            }
            Command::Vote { vote } if alive => self.cast_vote(seat, vote),
            Command::PickChancellor { name } if alive => self.pick_chancellor(seat, name),
            Command::Discard { index } if alive => self.discard_policy(seat, *index),
            Command::VetoRequest if alive => self.request_veto(seat),
            Command::VetoAccept if alive => self.accept_veto(seat),
            Command::VetoReject if alive => self.reject_veto(seat),
            Command::PresidentSelect { name } if alive => {
                self.choose_player(seat, ExecutiveAction::SpecialElection, name)
            }
            Command::Execute { name } if alive => self.choose_player(seat, ExecutiveAction::Execution, name),
            Command::Investigate { name } if alive => {
                self.choose_player(seat, ExecutiveAction::InvestigatePlayer, name)
            }
            _ => Err(GameError::InvalidAction),
        }
    }

    /// Deals the roles and starts the first round.
    fn start(&mut self) -> Result<(), GameError> {
        if self.started() {
            return Err(GameError::InvalidAction);
        }
        let seats = self.seated().map(|(i, _)| i).collect::<Vec<_>>();
        if seats.len() < MIN_PLAYERS {
            return Err(GameError::TooFewPlayers);
        }

        for (seat, role) in assign_roles(&seats, &mut self.rng)? {
            if let Some(player) = self.players[seat].as_mut() {
                player.role = Some(role);
            }
        }
        let first = *seats.choose(&mut self.rng).ok_or(GameError::TooFewPlayers)?;
        log::info!("[{}] Game started with {} players", self.id, seats.len());

        self.presidential_turn = first;
        for seat in seats {
            if let Some(start) = self.start_message(seat) {
                self.send_to(seat, &start);
            }
        }
        self.broadcast_table();
        self.start_nomination(first);
        Ok(())
    }

    /// Tells a player their role, and as much as they may know about everyone else's.
    ///
    /// Fascists know the whole fascist team. Hitler only knows it in games of six or fewer.
    fn start_message(&self, seat: usize) -> Option<Message> {
        let role = self.players[seat].as_ref()?.role?;
        let knows_team = match role {
            Role::Liberal => false,
            Role::Fascist => true,
            Role::Hitler => self.player_count() <= 6,
        };
        let players = self
            .seated()
            .map(|(i, p)| {
                let visible = i == seat || (knows_team && p.party() == Some(Party::Fascist));
                (p.name.clone(), p.role.filter(|_| visible))
            })
            .collect();
        Some(Message::Start { role, players })
    }

    /// Ends the game in victory for one side, revealing every role.
    fn end(&mut self, outcome: WinCondition) {
        log::info!("[{}] Game over: {:?}", self.id, outcome);
        self.state = GameState::GameOver(Some(outcome));
        let roles = self
            .seated()
            .filter_map(|(_, p)| Some((p.name.clone(), p.role?)))
            .collect();
        self.broadcast(&Message::End {
            winner: outcome.winner(),
            reason: outcome,
            roles,
        });
        self.deregister();
    }

    /// Ends the game because it can no longer continue.
    fn abort(&mut self, err: GameError) {
        log::error!("[{}] Game aborted: {}", self.id, err);
        self.state = GameState::GameOver(None);
        self.broadcast(&Message::Error { message: err.to_string() });
        self.deregister();
    }

    fn deregister(&self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.remove(&self.id);
        }
    }

    /// Returns true once roles have been dealt.
    pub fn started(&self) -> bool {
        !matches!(self.state, GameState::Lobby)
    }

    /// Returns true if the game is over.
    pub fn ended(&self) -> bool {
        matches!(self.state, GameState::GameOver(_))
    }

    /// The outcome of a finished game, if it ended in victory.
    #[cfg(test)]
    pub fn outcome(&self) -> Option<WinCondition> {
        match self.state {
            GameState::GameOver(outcome) => outcome,
            _ => None,
        }
    }

    /// Gets the number of seated players.
    pub fn player_count(&self) -> usize {
        self.seated().count()
    }

    /// Gets the number of players in the game that are alive.
    pub fn players_in_game(&self) -> usize {
        self.seated().filter(|(_, p)| p.alive).count()
    }

    /// Gets the number of players that are connected.
    pub fn connected_players(&self) -> usize {
        self.seated().filter(|(_, p)| p.connected).count()
    }

    /// Gets the player in the given seat.
    pub fn player(&self, seat: usize) -> Option<&Player> {
        self.players.get(seat).and_then(Option::as_ref)
    }

    /// Gets the player names in seat order.
    pub fn player_names(&self) -> Vec<String> {
        self.seated().map(|(_, p)| p.name.clone()).collect()
    }

    /// Gets whether each player is connected, by name.
    pub fn connection_statuses(&self) -> BTreeMap<String, bool> {
        self.seated().map(|(_, p)| (p.name.clone(), p.connected)).collect()
    }

    /// Finds the seat of the player with the given name.
    pub fn find_player(&self, name: &str) -> Result<usize, GameError> {
        self.seated()
            .find(|(_, p)| p.name == name)
            .map(|(i, _)| i)
            .ok_or(GameError::PlayerNotFound)
    }

    /// Iterates over the occupied seats.
    fn seated(&self) -> impl Iterator<Item = (usize, &Player)> {
        self.players
            .iter()
            .enumerate()
            .filter_map(|(i, p)| p.as_ref().map(|p| (i, p)))
    }

    fn name_of(&self, seat: usize) -> String {
        self.player(seat).map(|p| p.name.clone()).unwrap_or_default()
    }

    fn player_is_hitler(&self, seat: usize) -> bool {
        self.player(seat).is_some_and(Player::is_hitler)
    }

    /// Sends a message to every seated player.
    fn broadcast(&self, message: &Message) {
        for (_, player) in self.seated() {
            player.send(message);
        }
    }

    fn broadcast_except(&self, seat: usize, message: &Message) {
        for (_, player) in self.seated().filter(|(i, _)| *i != seat) {
            player.send(message);
        }
    }

    fn send_to(&self, seat: usize, message: &Message) {
        if let Some(player) = self.player(seat) {
            player.send(message);
        }
    }

    fn table_message(&self) -> Message {
        Message::Table {
            deck: self.deck.count(),
            discarded: self.deck.discard_count(),
            table_liberal: self.deck.enacted(Party::Liberal),
            table_fascist: self.deck.enacted(Party::Fascist),
            failed_governments: self.election_tracker,
        }
    }

    /// Broadcasts the current status of the table to everyone.
    fn broadcast_table(&self) {
        self.broadcast(&self.table_message());
    }

    fn send_table(&self, seat: usize) {
        self.send_to(seat, &self.table_message());
    }
}
