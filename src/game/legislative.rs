use super::government::Government;
use super::message::Message;
use super::party::Party;
use super::{Game, GameState, LegislativeSessionTurn, VetoStatus, WinCondition};
use crate::error::GameError;

impl Game {
    /// Begins the legislative session of a newly elected government.
    pub(super) fn start_legislative_session(&mut self, government: Government) {
        let Government { president, chancellor } = government;

        // Hitler wins as soon as he is elected, before any policy is drawn
        if self.deck.board().hitler_zone() && self.player_is_hitler(chancellor) {
            self.end(WinCondition::HitlerChancellor);
            return;
        }

        self.election_tracker = 0;
        self.last_government = Some(government);
        self.broadcast(&Message::PresidentDiscard { name: self.name_of(president) });
        self.broadcast_table();

        let cards = self.deck.draw_three(&mut self.rng);
        self.state = GameState::LegislativeSession {
            president,
            chancellor,
            turn: LegislativeSessionTurn::President { cards },
        };
        self.send_to(president, &Message::Cards { cards: cards.to_vec() });
    }

    /// Called when a player discards a policy from their hand.
    pub(super) fn discard_policy(&mut self, player: usize, card_idx: usize) -> Result<(), GameError> {
        use LegislativeSessionTurn::*;

        let GameState::LegislativeSession { president, chancellor, turn } = &mut self.state else {
            return Err(GameError::InvalidAction);
        };
        let (president, chancellor) = (*president, *chancellor);

        match *turn {
            President { cards } if player == president => {
                let (discarded, cards) = match card_idx {
                    0 => (cards[0], [cards[1], cards[2]]),
                    1 => (cards[1], [cards[0], cards[2]]),
                    2 => (cards[2], [cards[0], cards[1]]),
                    _ => return Err(GameError::InvalidCard),
                };
                *turn = Chancellor { cards, veto: VetoStatus::CanVeto };
                if !self.discard_card(discarded) {
                    return Ok(());
                }
                self.broadcast_table();
                self.broadcast(&Message::ChancellorDiscard { name: self.name_of(chancellor) });
                self.send_to(chancellor, &Message::Cards { cards: cards.to_vec() });
            }
            Chancellor { cards, .. } if player == chancellor => {
                let (discarded, enacted) = match card_idx {
                    0 => (cards[0], cards[1]),
                    1 => (cards[1], cards[0]),
                    _ => return Err(GameError::InvalidCard),
                };
                if !self.discard_card(discarded) {
                    return Ok(());
                }
                self.broadcast_table();
                self.broadcast(&Message::Enact {
                    president: self.name_of(president),
                    chancellor: self.name_of(chancellor),
                    policy: enacted,
                });
                self.enact(enacted, false);
            }
            _ => return Err(GameError::InvalidAction),
        }

        Ok(())
    }

    /// Called when the chancellor proposes to veto the agenda.
    pub(super) fn request_veto(&mut self, player: usize) -> Result<(), GameError> {
        let GameState::LegislativeSession { president, chancellor, turn } = &mut self.state else {
            return Err(GameError::InvalidAction);
        };
        let LegislativeSessionTurn::Chancellor { veto, .. } = turn else {
            return Err(GameError::InvalidAction);
        };
        if player != *chancellor || *veto != VetoStatus::CanVeto {
            return Err(GameError::InvalidAction);
        }
        *veto = VetoStatus::Requested;

        let (president, chancellor) = (*president, *chancellor);
        self.broadcast(&Message::VetoRequest {
            president: self.name_of(president),
            chancellor: self.name_of(chancellor),
        });
        Ok(())
    }

    /// Called when the president consents to a proposed veto; both policies are discarded.
    pub(super) fn accept_veto(&mut self, player: usize) -> Result<(), GameError> {
        let GameState::LegislativeSession { president, chancellor, turn } = self.state else {
            return Err(GameError::InvalidAction);
        };
        let LegislativeSessionTurn::Chancellor { cards, veto: VetoStatus::Requested } = turn else {
            return Err(GameError::InvalidAction);
        };
        if player != president {
            return Err(GameError::InvalidAction);
        }

        log::info!("[{}] Agenda vetoed", self.id);
        self.broadcast(&Message::VetoAccept {
            president: self.name_of(president),
            chancellor: self.name_of(chancellor),
        });
        for card in cards {
            if !self.discard_card(card) {
                return Ok(());
            }
        }
        self.fail_government();
        Ok(())
    }

    /// Called when the president refuses a proposed veto; the chancellor must enact a policy.
    pub(super) fn reject_veto(&mut self, player: usize) -> Result<(), GameError> {
        let GameState::LegislativeSession { president, chancellor, turn } = &mut self.state else {
            return Err(GameError::InvalidAction);
        };
        let LegislativeSessionTurn::Chancellor { veto, .. } = turn else {
            return Err(GameError::InvalidAction);
        };
        if player != *president || *veto != VetoStatus::Requested {
            return Err(GameError::InvalidAction);
        }
        *veto = VetoStatus::Denied;

        let (president, chancellor) = (*president, *chancellor);
        self.broadcast(&Message::VetoReject {
            president: self.name_of(president),
            chancellor: self.name_of(chancellor),
        });
        Ok(())
    }

    /// Places a policy on the table, then either ends the game or moves play along.
    ///
    /// Policies enacted from the top of the deck never grant an executive action.
    pub(super) fn enact(&mut self, card: Party, forced: bool) {
        if let Err(err) = self.deck.enact(card) {
            return self.abort(err);
        }
        self.broadcast_table();
        log::info!("[{}] {:?} policy enacted", self.id, card);

        if let Some(party) = self.deck.board().check_tracks() {
            self.end(match party {
                Party::Liberal => WinCondition::LiberalPolicyTrack,
                Party::Fascist => WinCondition::FascistPolicyTrack,
            });
            return;
        }

        let action = match (forced, card) {
            (false, Party::Fascist) => self.deck.board().get_executive_power(self.player_count()),
            _ => None,
        };
        match action {
            Some(action) => self.start_executive_action(action),
            None => self.next_president(),
        }
    }

    /// Returns any cards still in a player's hand to the discard pile.
    ///
    /// Returns `false` if the game had to be aborted.
    pub(super) fn discard_hand(&mut self) -> bool {
        let GameState::LegislativeSession { turn, .. } = self.state else {
            return true;
        };
        let hand = match &turn {
            LegislativeSessionTurn::President { cards } => &cards[..],
            LegislativeSessionTurn::Chancellor { cards, .. } => &cards[..],
        };
        hand.iter().all(|card| self.discard_card(*card))
    }

    /// Moves a held policy onto the discard pile. Losing track of a card aborts the game.
    fn discard_card(&mut self, card: Party) -> bool {
        match self.deck.discard(card) {
            Ok(()) => true,
            Err(err) => {
                self.abort(err);
                false
            }
        }
    }
}
