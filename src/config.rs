use std::time::Duration;

/// Overridable constants for a [`ChatSession`](crate::session::ChatSession).
///
/// The `Default` impl matches Twitch's own production chat gateway and the keepalive/timeout
/// values the reference implementation uses; most consumers never need to change this.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// `host:port` of the chat gateway to dial.
    pub server_addr: String,
    /// The capability string sent as `CAP REQ :<capabilities>` right after connecting.
    pub capabilities: String,
    /// How long to wait for a line before sending a keepalive PING.
    pub ping_idle_timeout: Duration,
    /// How long to wait for a PONG after sending a keepalive PING before giving up on the
    /// connection.
    pub pong_timeout: Duration,
    /// TCP keepalive period applied to the underlying socket.
    pub tcp_keepalive: Duration,
    /// Timeout applied to HTTP requests made by the refreshing auth provider.
    pub http_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> SessionConfig {
        SessionConfig {
            server_addr: "irc.chat.twitch.tv:6697".to_owned(),
            capabilities: "twitch.tv/commands twitch.tv/membership twitch.tv/tags".to_owned(),
            ping_idle_timeout: Duration::from_secs(15),
            pong_timeout: Duration::from_secs(5),
            tcp_keepalive: Duration::from_secs(10),
            http_timeout: Duration::from_secs(10),
        }
    }
}
