//! The IRC session engine: a single TLS connection driven by four cooperating tasks (reader,
//! writer, parser, keepalive), handed typed events to dispatch as lines arrive.

use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinSet;
use tokio_native_tls::TlsConnector;
use tracing::{debug, info, warn};

use crate::auth::LoginCredentials;
use crate::config::SessionConfig;
use crate::dispatch::EventHandlers;
use crate::error::SessionError;
use crate::events::{ChatConnect, ChatJoin, ChatPart, ChatPing, ChatPong, ChatPrivateMessage};
use crate::message::IrcMessage;

/// Owns one Twitch chat connection's lifecycle: dialing, authenticating, and running the
/// reader/writer/parser/keepalive tasks until disconnect.
pub struct ChatSession<L: LoginCredentials> {
    config: SessionConfig,
    credentials: L,
    handlers: Arc<EventHandlers>,
    outgoing_tx: mpsc::Sender<String>,
    outgoing_rx: Arc<Mutex<mpsc::Receiver<String>>>,
}

impl<L: LoginCredentials> ChatSession<L> {
    pub fn new(credentials: L, handlers: EventHandlers, config: SessionConfig) -> ChatSession<L> {
        let (outgoing_tx, outgoing_rx) = mpsc::channel(64);
        ChatSession {
            config,
            credentials,
            handlers: Arc::new(handlers),
            outgoing_tx,
            outgoing_rx: Arc::new(Mutex::new(outgoing_rx)),
        }
    }

    /// Join a channel, prepending `#` if the caller left it off.
    pub async fn join(&self, channel: &str) -> Result<(), SessionError> {
        if channel.is_empty() {
            return Err(SessionError::BlankChannel);
        }
        self.send_line(format!("JOIN {}", normalize_channel(channel)))
            .await
    }

    /// Leave a channel, prepending `#` if the caller left it off.
    pub async fn part(&self, channel: &str) -> Result<(), SessionError> {
        if channel.is_empty() {
            return Err(SessionError::BlankChannel);
        }
        self.send_line(format!("PART {}", normalize_channel(channel)))
            .await
    }

    /// Send a chat message to a channel.
    pub async fn say(&self, channel: &str, message: &str) -> Result<(), SessionError> {
        self.send_line(format!(
            "PRIVMSG {} :{message}",
            normalize_channel(channel)
        ))
        .await
    }

    /// Reply to a specific message, threading the reply via `reply-parent-msg-id`.
    pub async fn reply(
        &self,
        source: &ChatPrivateMessage,
        text: &str,
    ) -> Result<(), SessionError> {
        let reply_id = source.tags.get("id").cloned().unwrap_or_default();
        self.send_line(format!(
            "@reply-parent-msg-id={reply_id} PRIVMSG {} :{text}",
            normalize_channel(&source.channel)
        ))
        .await
    }

    async fn send_line(&self, line: String) -> Result<(), SessionError> {
        self.outgoing_tx
            .send(format!("{line}\r\n"))
            .await
            .map_err(|_| SessionError::RemoteClosed)
    }

    /// Dial, negotiate capabilities, authenticate, and run the session until disconnect.
    ///
    /// Resolves `Ok(())` once the connection has torn down normally (the disconnect signal was
    /// set by the reader or the keepalive task); resolves `Err` only if the connection could
    /// never be established in the first place.
    pub async fn connect(&self) -> Result<(), SessionError> {
        info!(addr = %self.config.server_addr, "dialing twitch chat");

        let tcp_stream =
            TcpStream::connect(&self.config.server_addr)
                .await
                .map_err(|source| SessionError::ConnectFailed {
                    addr: self.config.server_addr.clone(),
                    source,
                })?;

        socket2::SockRef::from(&tcp_stream)
            .set_tcp_keepalive(
                &socket2::TcpKeepalive::new().with_time(self.config.tcp_keepalive),
            )
            .map_err(|source| SessionError::ConnectFailed {
                addr: self.config.server_addr.clone(),
                source,
            })?;

        let domain = self
            .config
            .server_addr
            .rsplit_once(':')
            .map(|(host, _)| host)
            .unwrap_or(self.config.server_addr.as_str());

        let mut builder = native_tls::TlsConnector::builder();
        builder.min_protocol_version(Some(native_tls::Protocol::Tlsv12));
        let connector: TlsConnector = builder.build()?.into();
        let tls_stream = connector.connect(domain, tcp_stream).await?;
        let (read_half, write_half) = tokio::io::split(tls_stream);

        let (disconnect_tx, disconnect_rx) = watch::channel(false);
        let (incoming_tx, incoming_rx) = mpsc::channel::<String>(64);
        let (keepalive_reset_tx, keepalive_reset_rx) = mpsc::channel::<()>(16);
        let (pong_tx, pong_rx) = mpsc::channel::<()>(1);

        let mut tasks = JoinSet::new();

        tasks.spawn(reader_task(
            read_half,
            incoming_tx,
            keepalive_reset_tx,
            disconnect_tx.clone(),
            disconnect_rx.clone(),
        ));
        tasks.spawn(writer_task(
            write_half,
            Arc::clone(&self.outgoing_rx),
            disconnect_rx.clone(),
        ));
        tasks.spawn(parser_task(
            incoming_rx,
            Arc::clone(&self.handlers),
            self.outgoing_tx.clone(),
            pong_tx,
            disconnect_rx.clone(),
            self.config.server_addr.clone(),
        ));
        tasks.spawn(keepalive_task(
            self.outgoing_tx.clone(),
            keepalive_reset_rx,
            pong_rx,
            disconnect_tx,
            disconnect_rx,
            self.config.ping_idle_timeout,
            self.config.pong_timeout,
        ));

        let (login, access_token) = self
            .credentials
            .get_credentials()
            .await
            .map_err(|e| SessionError::LoginError(e.to_string()))?;

        self.send_line(format!("CAP REQ :{}", self.config.capabilities))
            .await?;
        self.send_line(format!("PASS oauth:{access_token}")).await?;
        self.send_line(format!("NICK {login}")).await?;

        while let Some(result) = tasks.join_next().await {
            if let Err(join_err) = result {
                warn!(error = %join_err, "session task panicked");
            }
        }

        info!("session torn down");
        Ok(())
    }

    /// Repeatedly `connect` until it returns an error. There is no reconnect backoff.
    pub async fn start(&self) -> SessionError {
        loop {
            if let Err(err) = self.connect().await {
                return err;
            }
        }
    }
}

fn normalize_channel(channel: &str) -> String {
    if let Some(stripped) = channel.strip_prefix('#') {
        format!("#{stripped}")
    } else {
        format!("#{channel}")
    }
}

async fn reader_task(
    read_half: impl AsyncRead + Unpin + Send + 'static,
    incoming_tx: mpsc::Sender<String>,
    keepalive_reset_tx: mpsc::Sender<()>,
    disconnect_tx: watch::Sender<bool>,
    mut disconnect_rx: watch::Receiver<bool>,
) {
    let mut lines = BufReader::new(read_half).lines();
    loop {
        tokio::select! {
            _ = disconnect_rx.changed() => {
                debug!("reader task ending: disconnect signaled");
                return;
            }
            line = lines.next_line() => {
                match line {
                    Ok(Some(line)) => {
                        let _ = keepalive_reset_tx.try_send(());
                        if incoming_tx.send(line).await.is_err() {
                            return;
                        }
                    }
                    Ok(None) => {
                        info!("reader task ending: remote closed the connection");
                        let _ = disconnect_tx.send(true);
                        return;
                    }
                    Err(err) => {
                        warn!(error = %err, "reader task ending: socket read error");
                        let _ = disconnect_tx.send(true);
                        return;
                    }
                }
            }
        }
    }
}

async fn writer_task(
    mut write_half: impl AsyncWrite + Unpin + Send + 'static,
    outgoing_rx: Arc<Mutex<mpsc::Receiver<String>>>,
    mut disconnect_rx: watch::Receiver<bool>,
) {
    let mut outgoing_rx = outgoing_rx.lock().await;
    loop {
        tokio::select! {
            _ = disconnect_rx.changed() => {
                debug!("writer task ending: disconnect signaled");
                return;
            }
            maybe_line = outgoing_rx.recv() => {
                match maybe_line {
                    Some(line) => {
                        if let Err(err) = write_half.write_all(line.as_bytes()).await {
                            warn!(error = %err, "writer task ending: socket write error");
                            return;
                        }
                    }
                    None => {
                        debug!("writer task ending: outgoing channel closed");
                        return;
                    }
                }
            }
        }
    }
}

async fn parser_task(
    mut incoming_rx: mpsc::Receiver<String>,
    handlers: Arc<EventHandlers>,
    outgoing_tx: mpsc::Sender<String>,
    pong_tx: mpsc::Sender<()>,
    mut disconnect_rx: watch::Receiver<bool>,
    server_addr: String,
) {
    loop {
        tokio::select! {
            _ = disconnect_rx.changed() => {
                debug!("parser task ending: disconnect signaled");
                return;
            }
            maybe_line = incoming_rx.recv() => {
                let Some(line) = maybe_line else {
                    debug!("parser task ending: incoming channel closed");
                    return;
                };
                match IrcMessage::parse(&line) {
                    Ok(message) => {
                        dispatch_message(&message, &handlers, &outgoing_tx, &pong_tx, &server_addr).await;
                    }
                    Err(err) => {
                        warn!(error = %err, raw = %line, "dropping malformed IRC line");
                    }
                }
            }
        }
    }
}

async fn dispatch_message(
    message: &IrcMessage,
    handlers: &EventHandlers,
    outgoing_tx: &mpsc::Sender<String>,
    pong_tx: &mpsc::Sender<()>,
    server_addr: &str,
) {
    match message.command.as_str() {
        "001" => {
            handlers.dispatch_connect(&ChatConnect {
                hostname: server_addr.to_owned(),
            });
        }
        "JOIN" => {
            if let (Some(channel), Some(source)) = (message.params.first(), &message.source) {
                handlers.dispatch_join(&ChatJoin {
                    channel: channel.clone(),
                    username: source.username.clone().unwrap_or_default(),
                });
            }
        }
        "PART" => {
            if let (Some(channel), Some(source)) = (message.params.first(), &message.source) {
                handlers.dispatch_part(&ChatPart {
                    channel: channel.clone(),
                    username: source.username.clone().unwrap_or_default(),
                });
            }
        }
        "PING" => {
            if let Some(token) = message.params.first() {
                let _ = outgoing_tx.send(format!("PONG :{token}\r\n")).await;
            }
            handlers.dispatch_ping(&ChatPing);
        }
        "PONG" => {
            let server = message.params.first().cloned().unwrap_or_default();
            let timestamp_unix = message
                .params
                .get(1)
                .map(|raw| raw.trim_start_matches(':'))
                .and_then(|raw| raw.parse().ok())
                .unwrap_or(0);
            let _ = pong_tx.try_send(());
            handlers.dispatch_pong(&ChatPong {
                server,
                timestamp_unix,
            });
        }
        "PRIVMSG" => {
            if let (Some(channel), Some(text), Some(source)) = (
                message.params.first(),
                message.params.get(1),
                &message.source,
            ) {
                handlers.dispatch_private_message(&ChatPrivateMessage {
                    channel: channel.clone(),
                    username: source.username.clone().unwrap_or_default(),
                    message: text.clone(),
                    tags: (*message.tags).clone(),
                });
            }
        }
        other => {
            debug!(command = %other, "ignoring unhandled IRC command");
        }
    }
}

async fn keepalive_task(
    outgoing_tx: mpsc::Sender<String>,
    mut keepalive_reset_rx: mpsc::Receiver<()>,
    mut pong_rx: mpsc::Receiver<()>,
    disconnect_tx: watch::Sender<bool>,
    mut disconnect_rx: watch::Receiver<bool>,
    idle_timeout: Duration,
    pong_timeout: Duration,
) {
    loop {
        let idle = tokio::time::sleep(idle_timeout);
        tokio::pin!(idle);

        tokio::select! {
            _ = disconnect_rx.changed() => {
                debug!("keepalive task ending: disconnect signaled");
                return;
            }
            _ = keepalive_reset_rx.recv() => {
                continue;
            }
            _ = &mut idle => {
                let now = std::time::SystemTime::now()
                    .duration_since(std::time::UNIX_EPOCH)
                    .unwrap_or_default()
                    .as_secs();
                if outgoing_tx.send(format!("PING :{now}\r\n")).await.is_err() {
                    return;
                }

                let pong_wait = tokio::time::sleep(pong_timeout);
                tokio::pin!(pong_wait);
                tokio::select! {
                    _ = disconnect_rx.changed() => {
                        return;
                    }
                    _ = pong_rx.recv() => {
                        continue;
                    }
                    _ = &mut pong_wait => {
                        warn!("keepalive task ending: PONG timeout, signaling disconnect");
                        let _ = disconnect_tx.send(true);
                        return;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_channel_names() {
        assert_eq!(normalize_channel("foo"), "#foo");
        assert_eq!(normalize_channel("#foo"), "#foo");
    }
}
