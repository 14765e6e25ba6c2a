#![warn(missing_docs)]
//! Connect to Twitch chat from a Rust application.
//!
//! This crate provides the core of a Twitch chat bot: a long-lived, TLS-secured IRC session
//! to Twitch's chat gateway, an IRCv3 tagged-message parser, a refreshing OAuth credential
//! provider, and a small event-dispatch and command-routing layer on top.
//!
//! # Getting started
//!
//! ```no_run
//! use twitch_chatbot::auth::StaticLoginCredentials;
//! use twitch_chatbot::bot::Bot;
//!
//! #[tokio::main]
//! pub async fn main() {
//!     let credentials = StaticLoginCredentials::anonymous();
//!
//!     let bot = Bot::builder(credentials)
//!         .on_connect(|event| println!("connected to {}", event.hostname))
//!         .on_private_message(|msg| println!("(#{}) {}: {}", msg.channel, msg.username, msg.message))
//!         .build();
//!
//!     bot.join("sodapoppin").await.unwrap();
//!     bot.start().await;
//! }
//! ```
//!
//! # Logging in
//!
//! [`auth::StaticLoginCredentials`] covers read-only/anonymous connections. For a bot that sends
//! messages, use [`auth::RefreshingAuthProvider`] together with an [`auth::AuthStore`]
//! implementation (a filesystem-backed one, [`auth::FilesystemAuthStore`], is included) -- it
//! validates the stored access token on every connect and refreshes it automatically when
//! Twitch rejects it.
//!
//! # Logging
//!
//! This crate emits [`tracing`] events throughout the session engine, the parser, and the auth
//! provider; it does not install a subscriber itself. Wire one up in your application (e.g. with
//! `tracing-subscriber`) to see them.

pub mod auth;
pub mod bot;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod events;
pub mod message;
pub mod session;

pub use bot::Bot;
pub use config::SessionConfig;
pub use message::IrcMessage;
pub use session::ChatSession;
