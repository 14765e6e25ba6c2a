//! A thin composition layer over [`ChatSession`] and [`EventHandlers`] adding a command-prefix
//! router, grounded on the reference `TwitchBot` facade.

use std::collections::HashMap;
use std::sync::Arc;

use crate::auth::LoginCredentials;
use crate::config::SessionConfig;
use crate::dispatch::EventHandlers;
use crate::error::SessionError;
use crate::events::{ChatConnect, ChatJoin, ChatPart, ChatPing, ChatPong, ChatPrivateMessage};
use crate::session::ChatSession;

type CommandHandler = Box<dyn Fn(&ChatCommandContext) + Send + Sync>;

/// Passed to a registered command handler when an incoming `ChatPrivateMessage` matches its
/// command name.
pub struct ChatCommandContext {
    pub command_name: String,
    pub command_params: Vec<String>,
    pub message: ChatPrivateMessage,
    session: Arc<dyn ChatSessionHandle>,
}

impl ChatCommandContext {
    /// Reply to the message that triggered this command.
    pub async fn reply(&self, text: &str) -> Result<(), SessionError> {
        self.session.reply(&self.message, text).await
    }

    /// Say something in an arbitrary channel.
    pub async fn say(&self, channel: &str, text: &str) -> Result<(), SessionError> {
        self.session.say(channel, text).await
    }
}

/// Object-safe handle to the subset of `ChatSession` operations a command context needs, so
/// `Bot` doesn't need to be generic over `L` just to hand contexts to handlers.
#[async_trait::async_trait]
trait ChatSessionHandle: Send + Sync {
    async fn say(&self, channel: &str, text: &str) -> Result<(), SessionError>;
    async fn reply(&self, msg: &ChatPrivateMessage, text: &str) -> Result<(), SessionError>;
}

#[async_trait::async_trait]
impl<L: LoginCredentials> ChatSessionHandle for ChatSession<L> {
    async fn say(&self, channel: &str, text: &str) -> Result<(), SessionError> {
        ChatSession::say(self, channel, text).await
    }

    async fn reply(&self, msg: &ChatPrivateMessage, text: &str) -> Result<(), SessionError> {
        ChatSession::reply(self, msg, text).await
    }
}

/// Builds up handlers and a command registry, then wires them into a [`ChatSession`] on
/// [`Bot::build`].
pub struct BotBuilder<L: LoginCredentials> {
    credentials: L,
    config: SessionConfig,
    handlers: EventHandlers,
    commands: HashMap<String, Vec<CommandHandler>>,
    prefix: String,
}

impl<L: LoginCredentials> BotBuilder<L> {
    pub fn new(credentials: L) -> BotBuilder<L> {
        BotBuilder {
            credentials,
            config: SessionConfig::default(),
            handlers: EventHandlers::new(),
            commands: HashMap::new(),
            prefix: "!".to_owned(),
        }
    }

    pub fn with_config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    /// Change the command prefix (default `!`).
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn on_connect(mut self, handler: impl Fn(&ChatConnect) + Send + Sync + 'static) -> Self {
        self.handlers.on_connect(handler);
        self
    }

    pub fn on_join(mut self, handler: impl Fn(&ChatJoin) + Send + Sync + 'static) -> Self {
        self.handlers.on_join(handler);
        self
    }

    pub fn on_part(mut self, handler: impl Fn(&ChatPart) + Send + Sync + 'static) -> Self {
        self.handlers.on_part(handler);
        self
    }

    pub fn on_ping(mut self, handler: impl Fn(&ChatPing) + Send + Sync + 'static) -> Self {
        self.handlers.on_ping(handler);
        self
    }

    pub fn on_pong(mut self, handler: impl Fn(&ChatPong) + Send + Sync + 'static) -> Self {
        self.handlers.on_pong(handler);
        self
    }

    pub fn on_private_message(
        mut self,
        handler: impl Fn(&ChatPrivateMessage) + Send + Sync + 'static,
    ) -> Self {
        self.handlers.on_private_message(handler);
        self
    }

    /// Register a handler for `<prefix><name> args...` messages.
    pub fn on_command(
        mut self,
        name: impl Into<String>,
        handler: impl Fn(&ChatCommandContext) + Send + Sync + 'static,
    ) -> Self {
        self.commands
            .entry(name.into())
            .or_default()
            .push(Box::new(handler));
        self
    }

    /// Finalize registration and build the underlying session.
    pub fn build(self) -> Bot<L> {
        let BotBuilder {
            credentials,
            config,
            mut handlers,
            commands,
            prefix,
        } = self;

        let commands = Arc::new(commands);
        let router_prefix = prefix.clone();
        let router_commands = Arc::clone(&commands);
        // The router closure is installed into `handlers` before the session exists, so it
        // can't capture a handle to it directly. `session_handle` is filled in once the
        // session is constructed, just below.
        let session_handle: Arc<std::sync::OnceLock<Arc<dyn ChatSessionHandle>>> =
            Arc::new(std::sync::OnceLock::new());
        let router_handle = Arc::clone(&session_handle);

        handlers.on_private_message(move |message: &ChatPrivateMessage| {
            let Some(rest) = message.message.strip_prefix(&router_prefix) else {
                return;
            };
            if rest.is_empty() {
                return;
            }
            let mut parts = rest.split_whitespace();
            let Some(command_name) = parts.next() else {
                return;
            };
            let Some(command_handlers) = router_commands.get(command_name) else {
                return;
            };
            let Some(session) = router_handle.get() else {
                return;
            };
            let context = ChatCommandContext {
                command_name: command_name.to_owned(),
                command_params: parts.map(str::to_owned).collect(),
                message: message.clone(),
                session: Arc::clone(session),
            };
            for handler in command_handlers {
                handler(&context);
            }
        });

        let session = Arc::new(ChatSession::new(credentials, handlers, config));
        session_handle
            .set(session.clone() as Arc<dyn ChatSessionHandle>)
            .ok();

        Bot { session }
    }
}

/// A composed chat bot: a running session plus a command router.
pub struct Bot<L: LoginCredentials> {
    session: Arc<ChatSession<L>>,
}

impl<L: LoginCredentials> Bot<L> {
    pub fn builder(credentials: L) -> BotBuilder<L> {
        BotBuilder::new(credentials)
    }

    pub async fn join(&self, channel: &str) -> Result<(), SessionError> {
        self.session.join(channel).await
    }

    pub async fn say(&self, channel: &str, text: &str) -> Result<(), SessionError> {
        self.session.say(channel, text).await
    }

    pub async fn reply(&self, msg: &ChatPrivateMessage, text: &str) -> Result<(), SessionError> {
        self.session.reply(msg, text).await
    }

    /// Run the underlying session until it gives up (no reconnect backoff).
    pub async fn start(&self) -> SessionError {
        self.session.start().await
    }
}
