//! Append-only, insertion-ordered handler registries.
//!
//! Mirrors the reference implementation's `[]func(...)` slices: handlers are appended at setup
//! time and fanned out synchronously, in registration order, on the task that parsed the
//! triggering line. There is no way to remove a handler.

use crate::events::{ChatConnect, ChatJoin, ChatPart, ChatPing, ChatPong, ChatPrivateMessage};

type Handler<T> = Box<dyn Fn(&T) + Send + Sync>;

/// The registry of event handlers a [`ChatSession`](crate::session::ChatSession) dispatches to.
/// Command routing is layered on top of this by [`Bot`](crate::bot::Bot), which registers its
/// own [`on_private_message`](EventHandlers::on_private_message) handler.
#[derive(Default)]
pub struct EventHandlers {
    on_connect: Vec<Handler<ChatConnect>>,
    on_join: Vec<Handler<ChatJoin>>,
    on_part: Vec<Handler<ChatPart>>,
    on_ping: Vec<Handler<ChatPing>>,
    on_pong: Vec<Handler<ChatPong>>,
    on_private_message: Vec<Handler<ChatPrivateMessage>>,
}

impl EventHandlers {
    pub fn new() -> EventHandlers {
        EventHandlers::default()
    }

    pub fn on_connect(&mut self, handler: impl Fn(&ChatConnect) + Send + Sync + 'static) {
        self.on_connect.push(Box::new(handler));
    }

    pub fn on_join(&mut self, handler: impl Fn(&ChatJoin) + Send + Sync + 'static) {
        self.on_join.push(Box::new(handler));
    }

    pub fn on_part(&mut self, handler: impl Fn(&ChatPart) + Send + Sync + 'static) {
        self.on_part.push(Box::new(handler));
    }

    pub fn on_ping(&mut self, handler: impl Fn(&ChatPing) + Send + Sync + 'static) {
        self.on_ping.push(Box::new(handler));
    }

    pub fn on_pong(&mut self, handler: impl Fn(&ChatPong) + Send + Sync + 'static) {
        self.on_pong.push(Box::new(handler));
    }

    pub fn on_private_message(
        &mut self,
        handler: impl Fn(&ChatPrivateMessage) + Send + Sync + 'static,
    ) {
        self.on_private_message.push(Box::new(handler));
    }

    pub(crate) fn dispatch_connect(&self, event: &ChatConnect) {
        for handler in &self.on_connect {
            handler(event);
        }
    }

    pub(crate) fn dispatch_join(&self, event: &ChatJoin) {
        for handler in &self.on_join {
            handler(event);
        }
    }

    pub(crate) fn dispatch_part(&self, event: &ChatPart) {
        for handler in &self.on_part {
            handler(event);
        }
    }

    pub(crate) fn dispatch_ping(&self, event: &ChatPing) {
        for handler in &self.on_ping {
            handler(event);
        }
    }

    pub(crate) fn dispatch_pong(&self, event: &ChatPong) {
        for handler in &self.on_pong {
            handler(event);
        }
    }

    pub(crate) fn dispatch_private_message(&self, event: &ChatPrivateMessage) {
        for handler in &self.on_private_message {
            handler(event);
        }
    }
}

impl std::fmt::Debug for EventHandlers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventHandlers")
            .field("on_connect", &self.on_connect.len())
            .field("on_join", &self.on_join.len())
            .field("on_part", &self.on_part.len())
            .field("on_ping", &self.on_ping.len())
            .field("on_private_message", &self.on_private_message.len())
            .finish()
    }
}
