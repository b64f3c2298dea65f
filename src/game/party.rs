use serde::{Deserialize, Serialize};

/// The two political parties of the game, which double as the two kinds of policy card.
#[derive(Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Debug, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Party {
    Liberal,
    Fascist,
}

/// A pair of per-party card counts.
#[derive(Clone, Copy, Default, PartialEq, Eq, Debug)]
pub struct Counts {
    pub liberal: usize,
    pub fascist: usize,
}

impl Counts {
    pub fn new(liberal: usize, fascist: usize) -> Self {
        Self { liberal, fascist }
    }

    pub fn get(&self, party: Party) -> usize {
        match party {
            Party::Liberal => self.liberal,
            Party::Fascist => self.fascist,
        }
    }

    pub fn total(&self) -> usize {
        self.liberal + self.fascist
    }

    pub fn add(&mut self, party: Party) {
        match party {
            Party::Liberal => self.liberal += 1,
            Party::Fascist => self.fascist += 1,
        }
    }

    /// Removes one card of the given party, returning `false` if there was none.
    pub fn take(&mut self, party: Party) -> bool {
        let count = match party {
            Party::Liberal => &mut self.liberal,
            Party::Fascist => &mut self.fascist,
        };
        if *count == 0 {
            return false;
        }
        *count -= 1;
        true
    }

    /// Moves every card in `other` into `self`.
    pub fn absorb(&mut self, other: &mut Counts) {
        self.liberal += other.liberal;
        self.fascist += other.fascist;
        *other = Counts::default();
    }
}
