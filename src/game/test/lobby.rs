use super::test_utils::*;
use crate::error::GameError;
use crate::game::{Command, GameState, Message, MAX_PLAYERS};

#[test]
fn players_are_announced_as_they_join() {
    let t = lobby(3, 0);
    assert!(t.received(0, &Message::Join { name: player_name(1) }));
    assert!(t.received(0, &Message::Join { name: player_name(2) }));
    assert!(!t.received(2, &Message::Join { name: player_name(2) }));
    assert_eq!(t.game.player_names(), vec!["Player0", "Player1", "Player2"]);
}

#[test]
fn names_must_be_unique_and_valid() {
    let mut t = lobby(2, 0);
    let conn = RecordingConnection::new(50);
    assert_eq!(t.game.join("Player1", None, Box::new(conn.clone())), Err(GameError::NameTaken));
    assert_eq!(t.game.join("no", None, Box::new(conn.clone())), Err(GameError::InvalidName));
    assert_eq!(t.game.join("bad name", None, Box::new(conn)), Err(GameError::InvalidName));
    assert_eq!(t.game.player_count(), 2);
}

#[test]
fn table_has_ten_seats() {
    let mut t = lobby(MAX_PLAYERS, 0);
    let conn = RecordingConnection::new(50);
    assert_eq!(t.game.join("Latecomer", None, Box::new(conn)), Err(GameError::GameFull));
}

#[test]
fn cannot_start_with_four_players() {
    let mut t = lobby(4, 0);
    t.send(0, Command::Start);
    assert!(!t.game.started());
    assert!(t.messages(0).iter().all(|m| !matches!(m, Message::Start { .. })));
}

#[test]
fn new_players_cannot_join_a_started_game() {
    let mut t = started(5, 0);
    let conn = RecordingConnection::new(50);
    assert_eq!(
        t.game.join("Latecomer", None, Box::new(conn)),
        Err(GameError::CannotJoinStartedGame)
    );
}

#[test]
fn chat_is_broadcast() {
    let mut t = lobby(3, 0);
    t.send(1, Command::Chat { message: "hello".into() });
    assert!(t.everyone_received(&Message::Chat {
        sender: player_name(1),
        message: "hello".into()
    }));
}

#[test]
fn leaving_the_lobby_frees_the_seat() {
    let mut t = lobby(3, 0);
    t.send(1, Command::Quit);
    assert_eq!(t.game.player_count(), 2);
    assert!(t.game.player(1).is_none());
    assert!(t.received(0, &Message::Quit { name: player_name(1) }));

    let conn = RecordingConnection::new(50);
    assert_eq!(t.game.join("Newcomer", None, Box::new(conn)), Ok(1));
}

#[test]
fn reconnecting_replaces_the_old_connection() {
    let mut t = started(5, 0);
    t.make_president(0);
    let token = t.game.player(2).unwrap().auth_token.clone();

    let conn = RecordingConnection::new(100);
    assert_eq!(t.game.join(&player_name(2), Some(&token), Box::new(conn.clone())), Ok(2));

    assert!(t.received(2, &Message::ConnectedOther));
    assert!(t.connections[2].closed());
    assert!(t.received(0, &Message::Connected { name: player_name(2) }));

    let messages = conn.messages();
    assert!(matches!(messages[0], Message::Start { .. }));
    assert!(matches!(messages[1], Message::Table { .. }));
    assert!(matches!(&messages[2], Message::President { name, .. } if name == "Player0"));
}

#[test]
fn rejoining_needs_the_right_token() {
    let mut t = started(5, 0);
    let conn = RecordingConnection::new(100);
    assert_eq!(
        t.game.join(&player_name(2), Some("guess"), Box::new(conn.clone())),
        Err(GameError::NameTaken)
    );
    assert_eq!(t.game.join(&player_name(2), Some(""), Box::new(conn)), Err(GameError::NameTaken));
    assert!(!t.connections[2].closed());
}

#[test]
fn reconnecting_voter_sees_their_ballot() {
    let mut t = started(5, 0);
    t.make_president(0);
    t.nominate(1);
    t.send(2, Command::Vote { vote: "Ja".into() });

    let token = t.game.player(2).unwrap().auth_token.clone();
    let conn = RecordingConnection::new(100);
    t.game.join(&player_name(2), Some(&token), Box::new(conn.clone())).unwrap();

    let messages = conn.messages();
    assert!(messages.contains(&Message::StartVote {
        president: player_name(0),
        chancellor: player_name(1)
    }));
    assert!(messages.contains(&Message::Vote { vote: crate::game::votes::Vote::Ja }));
}

#[test]
fn stale_disconnects_are_ignored() {
    let mut t = started(5, 0);
    let token = t.game.player(2).unwrap().auth_token.clone();
    let conn = RecordingConnection::new(100);
    t.game.join(&player_name(2), Some(&token), Box::new(conn)).unwrap();

    t.game.disconnect(2, 2);
    assert!(t.game.player(2).unwrap().connected);

    t.game.disconnect(2, 100);
    assert!(!t.game.player(2).unwrap().connected);
    assert!(t.received(0, &Message::Disconnected { name: player_name(2) }));
    assert_eq!(t.game.connected_players(), 4);
}

#[test]
fn leaving_president_passes_the_presidency_on() {
    let mut t = started(5, 0);
    t.make_president(0);
    t.send(0, Command::Quit);

    let player = t.game.player(0).unwrap();
    assert!(!player.alive);
    assert!(!player.connected);
    assert!(t.received(1, &Message::Quit { name: player_name(0) }));
    assert!(matches!(t.game.state, GameState::Nomination { president: 1 }));
}

#[test]
fn leaving_voter_completes_the_quorum() {
    let mut t = started(5, 0);
    t.make_president(0);
    t.nominate(1);
    for seat in 0..4 {
        t.send(seat, Command::Vote { vote: "ja".into() });
    }
    assert!(matches!(t.game.state, GameState::Election { .. }));

    t.send(4, Command::Quit);
    assert!(matches!(t.game.state, GameState::LegislativeSession { .. }));
}

#[test]
fn leaving_chancellor_abandons_the_session() {
    let mut t = started(5, 0);
    t.make_president(0);
    t.elect(1);
    t.send(1, Command::Quit);

    assert_eq!(t.game.deck.discard_count(), 3);
    assert!(matches!(t.game.state, GameState::Nomination { president: 2 }));
    t.assert_cards_conserved();
}

#[test]
fn ended_games_cannot_be_joined() {
    let mut t = started(5, 0);
    t.game.state = GameState::GameOver(None);
    let conn = RecordingConnection::new(100);
    assert_eq!(t.game.join("Latecomer", None, Box::new(conn)), Err(GameError::GameOver));
}
