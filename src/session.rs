use crate::error::GameError;
use crate::game::{Game, Registry};
use chrono::{DateTime, Utc};
use dashmap::{mapref::entry::Entry, DashMap};
use rand::{Rng, RngCore};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::{Duration, Instant, SystemTime};

/// Manages all the games running on the server.
#[derive(Default)]
pub struct SessionManager {
    sessions: DashMap<String, SessionHandle>,
}

pub type SessionHandle = Arc<Mutex<Game>>;

/// A public summary of one game.
#[derive(Clone, Serialize, Debug)]
pub struct GameSummary {
    pub id: String,
    pub players: Vec<String>,
    pub started: bool,
    pub created: String,
}

/// Locks a game, recovering it if another thread panicked while holding the lock.
pub fn lock(session: &SessionHandle) -> MutexGuard<'_, Game> {
    session.lock().unwrap_or_else(PoisonError::into_inner)
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new game under a fresh random ID.
    pub fn create_game(self: &Arc<Self>) -> SessionHandle {
        loop {
            let id = Self::random_id();
            let entry = self.sessions.entry(id);
            if let Entry::Occupied(_) = entry {
                continue;
            }
            let registry: Weak<dyn Registry> = Arc::downgrade(self) as Weak<dyn Registry>;
            let seed = rand::thread_rng().next_u64();
            let game = Game::new(entry.key().clone(), seed, registry);
            let session = Arc::new(Mutex::new(game));
            log::info!("Created game {}", entry.key());
            entry.or_insert(session.clone());
            break session;
        }
    }

    pub fn find_game(&self, game_id: &str) -> Result<SessionHandle, GameError> {
        self.sessions
            .get(game_id)
            .map(|session| session.clone())
            .ok_or(GameError::GameNotFound)
    }

    pub fn num_games(&self) -> usize {
        self.sessions.len()
    }

    /// Summarises every running game.
    pub fn summaries(&self) -> Vec<GameSummary> {
        let handles = self
            .sessions
            .iter()
            .map(|entry| entry.value().clone())
            .collect::<Vec<_>>();
        handles
            .iter()
            .map(|session| {
                let game = lock(session);
                GameSummary {
                    id: game.id().to_string(),
                    players: game.player_names(),
                    started: game.started(),
                    created: iso8601(game.created()),
                }
            })
            .collect()
    }

    /// Removes games that nobody is connected to and that have been idle for longer than `timeout`.
    pub fn purge_games(&self, timeout: Duration) {
        let handles = self
            .sessions
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect::<Vec<_>>();

        let ids_to_delete = handles
            .into_iter()
            .filter(|(_, session)| {
                let game = lock(session);
                let elapsed = Instant::now().duration_since(game.last_activity());
                elapsed >= timeout && game.connected_players() == 0
            })
            .map(|(id, _)| id)
            .collect::<Vec<_>>();

        for game_id in ids_to_delete {
            log::info!("Purging idle game {}", game_id);
            self.sessions.remove(&game_id);
        }
    }

    fn random_id() -> String {
        let mut rng = rand::thread_rng();
        (0..4)
            .map(|_| match rng.gen_range('A'..='Z') {
                // Avoid U and V because the "hitler font" can't distinguish them
                'U' => 'A',
                'V' => 'B',
                other => other,
            })
            .collect()
    }
}

fn iso8601(st: SystemTime) -> String {
    let dt: DateTime<Utc> = st.into();
    dt.format("%+").to_string()
}

impl Registry for SessionManager {
    fn remove(&self, game_id: &str) {
        if self.sessions.remove(game_id).is_some() {
            log::info!("Removed game {}", game_id);
        }
    }
}
