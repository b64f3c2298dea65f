use super::message::Message;
use super::{Game, GameState, WinCondition};
use crate::error::GameError;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Debug)]
pub enum ExecutiveAction {
    /// The president must investigate a player's loyalty.
    InvestigatePlayer,
    /// The president must call a special election.
    SpecialElection,
    /// The president must peek at the top three cards on the deck.
    PolicyPeak,
    /// The president must execute a player.
    Execution,
}

impl Game {
    /// Begins an executive action.
    pub(super) fn start_executive_action(&mut self, action: ExecutiveAction) {
        use ExecutiveAction::*;

        let GameState::LegislativeSession { president, .. } = self.state else {
            log::error!("[{}] Executive action outside a legislative session", self.id);
            return self.next_president();
        };
        let name = self.name_of(president);
        log::info!("[{}] {} gains the {:?} power", self.id, name, action);

        match action {
            PolicyPeak => {
                let cards = self.deck.peek_three(&mut self.rng);
                self.send_to(president, &Message::PeekCards { cards });
                self.broadcast(&Message::Peek { president: name });
                self.next_president();
            }
            InvestigatePlayer => {
                self.state = GameState::ChoosePlayer { action, president };
                self.broadcast(&Message::Investigate { president: name });
            }
            SpecialElection => {
                self.state = GameState::ChoosePlayer { action, president };
                self.broadcast(&Message::PresidentSelect { president: name });
            }
            Execution => {
                self.state = GameState::ChoosePlayer { action, president };
                self.broadcast(&Message::Execute { president: name });
            }
        }
    }

    /// Called when the president chooses the subject of their executive action.
    pub(super) fn choose_player(
        &mut self,
        player: usize,
        expected: ExecutiveAction,
        name: &str,
    ) -> Result<(), GameError> {
        use ExecutiveAction::*;

        let GameState::ChoosePlayer { action, president } = self.state else {
            return Err(GameError::InvalidAction);
        };
        if action != expected || player != president {
            return Err(GameError::InvalidAction);
        }

        let other = self.find_player(name)?;
        let mut eligible = self.eligible_players().exclude(president);
        if action == InvestigatePlayer {
            eligible = eligible.not_investigated();
        }
        if !eligible.make().includes(other) {
            return Err(GameError::InvalidPlayerChoice);
        }

        let (president_name, other_name) = (self.name_of(president), self.name_of(other));
        match action {
            InvestigatePlayer => {
                let Some(target) = self.players[other].as_mut() else {
                    return Err(GameError::InvalidPlayerIndex);
                };
                let result = target.party().ok_or(GameError::InvalidAction)?;
                target.investigated = true;
                self.send_to(president, &Message::InvestigateResult { name: other_name.clone(), result });
                self.broadcast(&Message::Investigated { president: president_name, name: other_name });
                self.next_president();
            }
            SpecialElection => {
                self.broadcast(&Message::PresidentSelected { president: president_name, name: other_name });
                self.start_nomination(other);
            }
            Execution => {
                let Some(target) = self.players[other].as_mut() else {
                    return Err(GameError::InvalidPlayerIndex);
                };
                target.alive = false;
                let hitler = target.is_hitler();
                log::info!("[{}] {} executed {}", self.id, president_name, other_name);
                self.broadcast(&Message::Executed { president: president_name, name: other_name });
                if hitler {
                    self.end(WinCondition::HitlerExecuted);
                } else {
                    self.next_president();
                }
            }
            PolicyPeak => return Err(GameError::InvalidAction),
        }
        Ok(())
    }
}
