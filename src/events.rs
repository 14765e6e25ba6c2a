//! Typed chat events emitted by the session engine's dispatch table.

use std::collections::HashMap;

/// The server accepted our registration; the connection is now usable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatConnect {
    pub hostname: String,
}

/// A user joined a channel the bot is in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatJoin {
    pub channel: String,
    pub username: String,
}

/// A user left a channel the bot is in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatPart {
    pub channel: String,
    pub username: String,
}

/// The server sent us a keepalive PING. The session engine answers with PONG before this event
/// reaches handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChatPing;

/// The server answered one of our own keepalive PINGs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatPong {
    pub server: String,
    pub timestamp_unix: i64,
}

/// A chat message sent to a channel the bot is in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatPrivateMessage {
    pub channel: String,
    pub username: String,
    pub message: String,
    pub tags: HashMap<String, String>,
}
