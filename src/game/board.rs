use super::{executive_power::ExecutiveAction, party::Party};

pub const MAX_LIBERAL_CARDS: usize = 5;
pub const MAX_FASCIST_CARDS: usize = 6;

/// The policies enacted onto the table.
#[derive(Clone, Copy, Default, Debug)]
pub struct Board {
    pub liberal_cards: usize,
    pub fascist_cards: usize,
}

impl Board {
    /// Creates a new, empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Places a policy on the table.
    pub fn play_card(&mut self, party: Party) {
        match party {
            Party::Liberal => self.liberal_cards += 1,
            Party::Fascist => self.fascist_cards += 1,
        }
    }

    /// The number of enacted policies of the given party.
    pub fn count(&self, party: Party) -> usize {
        match party {
            Party::Liberal => self.liberal_cards,
            Party::Fascist => self.fascist_cards,
        }
    }

    /// Gets the executive action unlocked by the last played fascist card, if there is any.
    ///
    /// Combinations missing from the table unlock nothing.
    pub fn get_executive_power(&self, num_players: usize) -> Option<ExecutiveAction> {
        use ExecutiveAction::*;
        match (num_players, self.fascist_cards) {
            (5..=6, 3) => Some(PolicyPeak),
            (7..=8, 2) => Some(InvestigatePlayer),
            (7..=8, 3) => Some(SpecialElection),
            (9..=10, 1..=2) => Some(InvestigatePlayer),
            (9..=10, 3) => Some(SpecialElection),
            (5..=10, 4..=5) => Some(Execution),
            _ => None,
        }
    }

    /// Checks whether either party has completed their policy track.
    pub fn check_tracks(&self) -> Option<Party> {
        if self.fascist_cards >= MAX_FASCIST_CARDS {
            return Some(Party::Fascist);
        }
        if self.liberal_cards >= MAX_LIBERAL_CARDS {
            return Some(Party::Liberal);
        }
        None
    }

    /// Whether a chancellor who is Hitler now wins the game for the fascists.
    pub fn hitler_zone(&self) -> bool {
        self.fascist_cards >= 3
    }
}
