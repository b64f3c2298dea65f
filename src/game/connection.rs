use super::message::Message;

/// Uniquely identifies one client connection for the lifetime of the process.
pub type ConnectionId = u64;

/// A way to deliver messages to one connected client.
///
/// Implementations must not block: `send` only queues the message for delivery.
pub trait Connection: Send + Sync {
    /// The identity of this connection.
    fn id(&self) -> ConnectionId;

    /// Queues a message for delivery to the client.
    fn send(&self, message: &Message);

    /// Terminates the connection.
    fn close(&self);
}

/// The registry that owns a game.
///
/// A game asks to be removed once it is over; it never creates or looks up games.
pub trait Registry: Send + Sync {
    fn remove(&self, game_id: &str);
}
