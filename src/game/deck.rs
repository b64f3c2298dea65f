use super::board::Board;
use super::party::{Counts, Party};
use crate::error::GameError;
use rand::Rng;
use std::collections::VecDeque;

pub const LIBERAL_POLICIES: usize = 6;
pub const FASCIST_POLICIES: usize = 11;

/// The policy card supply.
///
/// Cards are tracked as counts per party rather than as an ordered stack: every card
/// is either in the draw pile, held by a player, in the discard pile or on the table.
/// A draw picks either party with even odds while both remain in the draw pile.
#[derive(Clone, Debug)]
pub struct Deck {
    /// Undrawn cards whose order is not yet fixed
    draw_pile: Counts,
    /// Undrawn cards already revealed by a policy peek; these are dealt first
    top: VecDeque<Party>,
    /// Cards drawn but not yet discarded or enacted
    held: Counts,
    discard_pile: Counts,
    board: Board,
}

impl Default for Deck {
    fn default() -> Self {
        Self::new()
    }
}

impl Deck {
    /// Creates a full deck of 6 liberal and 11 fascist policies.
    pub fn new() -> Self {
        Self {
            draw_pile: Counts::new(LIBERAL_POLICIES, FASCIST_POLICIES),
            top: VecDeque::new(),
            held: Counts::default(),
            discard_pile: Counts::default(),
            board: Board::new(),
        }
    }

    /// Shuffles the discard pile back into the draw pile.
    fn shuffle(&mut self) {
        log::debug!(
            "Shuffling {} discarded policies into the deck",
            self.discard_pile.total()
        );
        self.draw_pile.absorb(&mut self.discard_pile);
    }

    /// Takes a random card out of the draw pile, shuffling in the discard pile first if
    /// the draw pile has run dry.
    fn take_random(&mut self, rng: &mut impl Rng) -> Party {
        if self.draw_pile.total() == 0 {
            self.shuffle();
        }
        let Counts { liberal, fascist } = self.draw_pile;
        debug_assert!(liberal + fascist > 0, "policy supply exhausted");
        let card = if fascist == 0 {
            Party::Liberal
        } else if liberal == 0 {
            Party::Fascist
        } else if rng.gen_bool(0.5) {
            Party::Liberal
        } else {
            Party::Fascist
        };
        self.draw_pile.take(card);
        card
    }

    /// Draws the top card from the deck into a player's hand.
    pub fn draw_one(&mut self, rng: &mut impl Rng) -> Party {
        let card = match self.top.pop_front() {
            Some(card) => card,
            None => self.take_random(rng),
        };
        self.held.add(card);
        debug_assert!(self.is_complete());
        card
    }

    /// Draws the top three cards from the deck; the deck may be reshuffled between any two of them.
    pub fn draw_three(&mut self, rng: &mut impl Rng) -> [Party; 3] {
        [self.draw_one(rng), self.draw_one(rng), self.draw_one(rng)]
    }

    /// Peeks at the top three cards. They stay in the deck and are the next three cards drawn.
    pub fn peek_three(&mut self, rng: &mut impl Rng) -> [Party; 3] {
        while self.top.len() < 3 {
            let card = self.take_random(rng);
            self.top.push_back(card);
        }
        [self.top[0], self.top[1], self.top[2]]
    }

    /// Moves a held card onto the discard pile.
    pub fn discard(&mut self, card: Party) -> Result<(), GameError> {
        if !self.held.take(card) {
            return Err(GameError::CardNotHeld);
        }
        self.discard_pile.add(card);
        Ok(())
    }

    /// Moves a held card onto the table.
    pub fn enact(&mut self, card: Party) -> Result<(), GameError> {
        if !self.held.take(card) {
            return Err(GameError::CardNotHeld);
        }
        self.board.play_card(card);
        Ok(())
    }

    /// Whether every card of both parties is accounted for.
    fn is_complete(&self) -> bool {
        [(Party::Liberal, LIBERAL_POLICIES), (Party::Fascist, FASCIST_POLICIES)]
            .into_iter()
            .all(|(party, total)| {
                self.undrawn(party) + self.held(party) + self.discarded(party) + self.enacted(party) == total
            })
    }

    /// The policies enacted so far.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// The number of enacted policies of the given party.
    pub fn enacted(&self, party: Party) -> usize {
        self.board.count(party)
    }

    /// The number of undrawn cards of the given party, including peeked cards.
    pub fn undrawn(&self, party: Party) -> usize {
        self.draw_pile.get(party) + self.top.iter().filter(|c| **c == party).count()
    }

    /// The number of drawn cards of the given party that have not been discarded or enacted.
    pub fn held(&self, party: Party) -> usize {
        self.held.get(party)
    }

    /// The number of discarded cards of the given party.
    pub fn discarded(&self, party: Party) -> usize {
        self.discard_pile.get(party)
    }

    /// The number of cards in the draw pile.
    pub fn count(&self) -> usize {
        self.draw_pile.total() + self.top.len()
    }

    /// The number of cards in the discard pile.
    pub fn discard_count(&self) -> usize {
        self.discard_pile.total()
    }

    /// Fixes the next cards to be drawn, taking them out of the draw pile.
    #[cfg(test)]
    pub fn stack_top(&mut self, cards: &[Party]) {
        for card in cards {
            if self.draw_pile.take(*card) {
                self.top.push_back(*card);
            }
        }
    }

    /// Moves cards straight from the draw pile onto the table, keeping the card totals intact.
    #[cfg(test)]
    pub fn stack_board(&mut self, party: Party, count: usize) {
        for _ in 0..count {
            if self.draw_pile.take(party) {
                self.board.play_card(party);
            }
        }
    }
}
