use super::eligible::EligiblePlayers;
use super::message::Message;
use super::votes::{Vote, Votes};
use super::{Game, GameState, MAX_PLAYERS};
use crate::error::GameError;
use std::collections::BTreeMap;

/// The fewest living players a game can continue with.
const MIN_PLAYERS_IN_GAME: usize = 4;

/// Elections after which a policy is enacted from the top of the deck.
const MAX_FAILED_GOVERNMENTS: usize = 3;

/// With exactly this many living players, term limits are lifted.
const TERM_LIMIT_FREE_PLAYERS: usize = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Government {
    pub president: usize,
    pub chancellor: usize,
}

impl Game {
    /// Moves the presidency to the next living player in seat order.
    pub(super) fn next_president(&mut self) {
        match self.advance_presidential_turn() {
            Ok(president) => self.start_nomination(president),
            Err(err) => self.abort(err),
        }
    }

    fn advance_presidential_turn(&mut self) -> Result<usize, GameError> {
        if self.players_in_game() < MIN_PLAYERS_IN_GAME {
            return Err(GameError::NotEnoughPlayers);
        }
        let president = (1..=MAX_PLAYERS)
            .map(|offset| (self.presidential_turn + offset) % MAX_PLAYERS)
            .find(|seat| self.players[*seat].as_ref().is_some_and(|p| p.alive))
            .ok_or(GameError::NotEnoughPlayers)?;
        self.presidential_turn = president;
        Ok(president)
    }

    /// Hands the presidency to the given player, who must now nominate a chancellor.
    pub(super) fn start_nomination(&mut self, president: usize) {
        let candidates = self.eligible_chancellors(president).names(self);
        self.state = GameState::Nomination { president };
        self.broadcast(&Message::President {
            name: self.name_of(president),
            candidates,
        });
    }

    /// Determines which players are eligible to be chancellor.
    pub(super) fn eligible_chancellors(&self, president: usize) -> EligiblePlayers {
        let mut result = self.eligible_players().exclude(president);
        if let Some(government) = self.last_government {
            if self.players_in_game() != TERM_LIMIT_FREE_PLAYERS {
                result = result.exclude(government.chancellor).exclude(government.president);
            }
        }
        result.make()
    }

    /// Called when the president nominates a chancellor.
    pub(super) fn pick_chancellor(&mut self, player: usize, name: &str) -> Result<(), GameError> {
        let GameState::Nomination { president } = self.state else {
            return Err(GameError::InvalidAction);
        };
        if player != president {
            return Err(GameError::InvalidAction);
        }
        let chancellor = self.find_player(name)?;
        if !self.eligible_chancellors(president).includes(chancellor) {
            return Err(GameError::InvalidPlayerChoice);
        }

        self.state = GameState::Election {
            president,
            chancellor,
            votes: Votes::new(),
        };
        self.broadcast(&Message::StartVote {
            president: self.name_of(president),
            chancellor: self.name_of(chancellor),
        });
        Ok(())
    }

    /// Called when a player casts their vote.
    pub(super) fn cast_vote(&mut self, player: usize, vote: &str) -> Result<(), GameError> {
        let GameState::Election { votes, .. } = &mut self.state else {
            return Err(GameError::InvalidAction);
        };
        let vote = Vote::parse(vote);
        votes.vote(player, vote);
        self.send_to(player, &Message::Vote { vote });
        self.check_votes();
        Ok(())
    }

    /// Tallies the votes if every living, connected player has voted.
    pub(super) fn check_votes(&mut self) {
        let GameState::Election { president, chancellor, votes } = self.state else {
            return;
        };
        let quorum = self
            .seated()
            .filter(|(_, p)| p.alive && p.connected)
            .map(|(i, _)| i)
            .collect::<Vec<_>>();
        let Some(passed) = votes.outcome(quorum) else {
            return;
        };

        let ballots = self
            .seated()
            .filter(|(i, _)| votes.has_cast(*i))
            .map(|(i, p)| (p.name.clone(), votes.get(i)))
            .collect::<BTreeMap<_, _>>();
        log::info!("[{}] Election {}", self.id, if passed { "passed" } else { "failed" });
        self.broadcast(&Message::VoteResult { passed, votes: ballots });

        if passed {
            self.start_legislative_session(Government { president, chancellor });
        } else {
            self.fail_government();
        }
    }

    /// Advances the election tracker, enacting the top policy once too many governments have failed.
    pub(super) fn fail_government(&mut self) {
        self.election_tracker += 1;
        if self.election_tracker >= MAX_FAILED_GOVERNMENTS {
            self.force_enact();
        } else {
            self.broadcast_table();
            self.next_president();
        }
    }

    /// Enacts the top policy of the deck, without a discard and without any executive action.
    fn force_enact(&mut self) {
        let card = self.deck.draw_one(&mut self.rng);
        log::info!("[{}] Three governments failed, enacting a {:?} policy", self.id, card);
        self.election_tracker = 0;
        self.last_government = None;
        self.broadcast(&Message::EnactForce { policy: card });
        self.enact(card, true);
    }
}
