use super::MAX_PLAYERS;
use serde::{Deserialize, Serialize};

/// A single player's ballot.
#[derive(Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Debug, Default)]
#[serde(rename_all = "lowercase")]
pub enum Vote {
    #[default]
    #[serde(rename = "")]
    Empty,
    Ja,
    Nein,
}

impl Vote {
    /// Parses a vote case-insensitively; anything but "ja" or "nein" is an empty vote.
    pub fn parse(vote: &str) -> Self {
        match vote.to_ascii_lowercase().as_str() {
            "ja" => Vote::Ja,
            "nein" => Vote::Nein,
            _ => Vote::Empty,
        }
    }
}

/// Tracks the vote of each seat.
#[derive(Clone, Copy, Debug, Default)]
pub struct Votes {
    votes: [Vote; MAX_PLAYERS],
}

impl Votes {
    /// Creates a new `Votes` with every ballot empty.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether the given seat has cast their vote.
    pub fn has_cast(&self, seat: usize) -> bool {
        self.votes[seat] != Vote::Empty
    }

    /// Records the vote of a seat; an empty vote withdraws an earlier one.
    pub fn vote(&mut self, seat: usize, vote: Vote) {
        self.votes[seat] = vote;
    }

    /// Gets the vote of a seat.
    pub fn get(&self, seat: usize) -> Vote {
        self.votes[seat]
    }

    /// Once every seat in `quorum` has voted, returns whether the vote passed.
    ///
    /// Ballots from seats outside the quorum still count. A tie fails.
    pub fn outcome(&self, quorum: impl IntoIterator<Item = usize>) -> Option<bool> {
        if quorum.into_iter().any(|seat| !self.has_cast(seat)) {
            return None;
        }
        let ja = self.votes.iter().filter(|v| **v == Vote::Ja).count();
        let nein = self.votes.iter().filter(|v| **v == Vote::Nein).count();
        (ja + nein > 0).then_some(ja > nein)
    }
}
