use thiserror::Error;

/// The result of attempting to perform an invalid operation on a [Game](crate::game::Game)
/// or on the [SessionManager](crate::session::SessionManager).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("game does not exist")]
    GameNotFound,
    #[error("too few players in the game")]
    TooFewPlayers,
    #[error("too many players in the game")]
    TooManyPlayers,
    #[error("not enough players left")]
    NotEnoughPlayers,
    #[error("no player exists with the given name")]
    PlayerNotFound,
    #[error("a player with that name has already joined")]
    NameTaken,
    #[error("names must be 3 to 16 letters, digits, dashes or underscores")]
    InvalidName,
    #[error("cannot join a game in progress")]
    CannotJoinStartedGame,
    #[error("the game is full")]
    GameFull,
    #[error("this player cannot be chosen for this action")]
    InvalidPlayerChoice,
    #[error("invalid player index")]
    InvalidPlayerIndex,
    #[error("this action cannot be performed during this phase of the game")]
    InvalidAction,
    #[error("an invalid card was chosen")]
    InvalidCard,
    #[error("a policy went missing")]
    CardNotHeld,
    #[error("the game has already ended")]
    GameOver,
}
