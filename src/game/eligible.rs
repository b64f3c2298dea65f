use super::{Game, MAX_PLAYERS};

/// A set of seats that may be chosen for some purpose.
#[derive(Clone, Copy, Debug)]
pub struct EligiblePlayers {
    eligible: [bool; MAX_PLAYERS],
}

impl EligiblePlayers {
    pub fn includes(&self, seat: usize) -> bool {
        self.eligible.get(seat).copied().unwrap_or(false)
    }

    pub fn names(&self, game: &Game) -> Vec<String> {
        game.seated()
            .filter(|(i, _)| self.includes(*i))
            .map(|(_, p)| p.name.clone())
            .collect()
    }
}

pub struct EligiblePlayersBuilder<'a> {
    game: &'a Game,
    eligible: [bool; MAX_PLAYERS],
}

impl Game {
    /// Starts building a set of seats from every living player.
    pub fn eligible_players(&self) -> EligiblePlayersBuilder<'_> {
        EligiblePlayersBuilder {
            game: self,
            eligible: core::array::from_fn(|i| self.players[i].as_ref().map(|p| p.alive).unwrap_or(false)),
        }
    }
}

impl<'a> EligiblePlayersBuilder<'a> {
    pub fn exclude(mut self, seat: usize) -> Self {
        if let Some(eligible) = self.eligible.get_mut(seat) {
            *eligible = false;
        }
        self
    }

    pub fn not_investigated(mut self) -> Self {
        for (idx, player) in self.game.seated() {
            self.eligible[idx] &= !player.investigated;
        }
        self
    }

    pub fn make(self) -> EligiblePlayers {
        EligiblePlayers { eligible: self.eligible }
    }
}
