use super::{party::Party, player::Role, votes::Vote, WinCondition};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An event sent by the game to one or all of its players.
#[derive(Clone, Serialize, PartialEq, Eq, Debug)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Message {
    Chat {
        sender: String,
        message: String,
    },
    Join {
        name: String,
    },
    Quit {
        name: String,
    },
    Connected {
        name: String,
    },
    Disconnected {
        name: String,
    },
    /// Sent to a connection that has been superseded by a newer one for the same player.
    #[serde(rename = "connected-other")]
    ConnectedOther,
    /// The player's secret role, and what they know about everyone else's.
    /// A `None` role means the player is unknown to the recipient.
    Start {
        role: Role,
        players: BTreeMap<String, Option<Role>>,
    },
    End {
        winner: Party,
        reason: WinCondition,
        roles: BTreeMap<String, Role>,
    },
    Error {
        message: String,
    },
    President {
        name: String,
        candidates: Vec<String>,
    },
    StartVote {
        president: String,
        chancellor: String,
    },
    Vote {
        vote: Vote,
    },
    VoteResult {
        passed: bool,
        votes: BTreeMap<String, Vote>,
    },
    PresidentDiscard {
        name: String,
    },
    ChancellorDiscard {
        name: String,
    },
    Cards {
        cards: Vec<Party>,
    },
    Table {
        deck: usize,
        discarded: usize,
        #[serde(rename = "tableLiberal")]
        table_liberal: usize,
        #[serde(rename = "tableFascist")]
        table_fascist: usize,
        #[serde(rename = "failedGovernments")]
        failed_governments: usize,
    },
    Enact {
        president: String,
        chancellor: String,
        policy: Party,
    },
    EnactForce {
        policy: Party,
    },
    VetoRequest {
        president: String,
        chancellor: String,
    },
    VetoAccept {
        president: String,
        chancellor: String,
    },
    VetoReject {
        president: String,
        chancellor: String,
    },
    Peek {
        president: String,
    },
    PeekCards {
        cards: [Party; 3],
    },
    Investigate {
        president: String,
    },
    Investigated {
        president: String,
        name: String,
    },
    InvestigateResult {
        name: String,
        result: Party,
    },
    PresidentSelect {
        president: String,
    },
    PresidentSelected {
        president: String,
        name: String,
    },
    Execute {
        president: String,
    },
    Executed {
        president: String,
        name: String,
    },
}

/// A command sent by a player to the game.
#[derive(Clone, Deserialize, PartialEq, Eq, Debug)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Command {
    Start,
    Chat { message: String },
    Quit,
    Vote { vote: String },
    PickChancellor { name: String },
    Discard { index: usize },
    VetoRequest,
    VetoAccept,
    VetoReject,
    PresidentSelect { name: String },
    Execute { name: String },
    Investigate { name: String },
}
