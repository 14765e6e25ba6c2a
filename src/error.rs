use thiserror::Error;

/// Errors that can occur while a [`ChatSession`](crate::session::ChatSession) is connected or
/// connecting.
#[derive(Error, Debug)]
pub enum SessionError {
    /// The TLS handshake or the underlying TCP connect failed.
    #[error("failed to connect to {addr}: {source}")]
    ConnectFailed {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    /// The TLS handshake itself was rejected.
    #[error("TLS handshake failed: {0}")]
    TlsError(#[from] native_tls::Error),
    /// Reading from or writing to the socket failed.
    #[error("socket I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Fetching credentials from the login provider failed.
    #[error("failed to obtain login credentials: {0}")]
    LoginError(String),
    /// The server never answered our keepalive PING.
    #[error("did not receive a PONG back after sending PING")]
    PingTimeout,
    /// The remote closed the connection without a prior error.
    #[error("remote unexpectedly closed the connection")]
    RemoteClosed,
    /// `join`/`part` was called with an empty channel name.
    #[error("channel name must not be blank")]
    BlankChannel,
}

/// Errors returned from the [`refreshing auth provider`](crate::auth::RefreshingAuthProvider).
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("access token must not be blank")]
    BlankAccessToken,
    #[error("client id must not be blank")]
    BlankClientId,
    #[error("client secret must not be blank")]
    BlankClientSecret,
    #[error("refresh token must not be blank")]
    BlankRefreshToken,
    #[error("user id must not be blank")]
    BlankUserId,
    #[error("credential store error: {0}")]
    Store(String),
    #[error("HTTP request to Twitch failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Twitch rejected the request: {0}")]
    RemoteRejected(String),
}
