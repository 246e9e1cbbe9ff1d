//! Chat widget state machine.
//!
//! The widget is `closed` or `open`; the message log is append-only. Bubbles
//! are inserted into `#chatLog` as markup, so message text is HTML-escaped
//! on the way in. Scheduling of the delayed focus and bot reply belongs to
//! the session; this module only owns state and rendering.

use crate::escape::escape_html;
use crate::i18n::{Dictionary, Language};
use crate::page::{ids, Document, Element};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

impl Sender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Bot => "bot",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub text: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChatState {
    #[default]
    Closed,
    Open,
}

#[derive(Debug, Clone, Default)]
pub struct ChatWidget {
    state: ChatState,
    log: Vec<ChatMessage>,
}

/// What a click did to the widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatTransition {
    Opened,
    Closed,
}

impl ChatWidget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ChatState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == ChatState::Open
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.log
    }

    /// Move to `open`/`closed` and mirror it onto the page. Returns the
    /// transition, or `None` if the widget was already in that state.
    pub fn set_open(&mut self, document: &mut Document, open: bool) -> Option<ChatTransition> {
        let next = if open { ChatState::Open } else { ChatState::Closed };
        let changed = next != self.state;
        self.state = next;
        self.render(document);

        match (changed, next) {
            (false, _) => None,
            (true, ChatState::Open) => Some(ChatTransition::Opened),
            (true, ChatState::Closed) => Some(ChatTransition::Closed),
        }
    }

    pub fn toggle(&mut self, document: &mut Document) -> Option<ChatTransition> {
        let open = !self.is_open();
        self.set_open(document, open)
    }

    pub fn render(&self, document: &mut Document) {
        let open = self.is_open();

        if let Some(widget) = document.get_mut(ids::CHAT_WIDGET) {
            widget.set_attr("data-state", if open { "open" } else { "closed" });
        }
        if let Some(toggle) = document.get_mut(ids::CHAT_TOGGLE) {
            toggle.set_attr("aria-expanded", if open { "true" } else { "false" });
        }
        if let Some(panel) = document.get_mut(ids::CHAT_PANEL) {
            panel.set_attr("aria-hidden", if open { "false" } else { "true" });
        }
    }

    /// Toggle button flips, close button forces closed.
    pub fn on_click(&mut self, document: &mut Document, target: &str) -> Option<ChatTransition> {
        match target {
            ids::CHAT_TOGGLE => self.toggle(document),
            ids::CHAT_CLOSE => self.set_open(document, false),
            _ => None,
        }
    }

    /// Pointer interaction outside the open widget closes it.
    pub fn on_pointer_down(
        &mut self,
        document: &mut Document,
        target: &str,
    ) -> Option<ChatTransition> {
        if self.is_open() && !document.is_within(target, ids::CHAT_WIDGET) {
            return self.set_open(document, false);
        }
        None
    }

    /// Append a message to the log and its bubble to `#chatLog`.
    pub fn append(&mut self, document: &mut Document, sender: Sender, text: &str) -> ChatMessage {
        let message = ChatMessage {
            text: text.to_string(),
            sender,
            timestamp: Utc::now(),
        };

        if let Some(log) = document.get_mut(ids::CHAT_LOG) {
            log.children.push(
                Element::new("div")
                    .with_class("msg")
                    .with_class(sender.as_str())
                    .with_attr("data-sender", sender.as_str())
                    .with_attr("data-time", &message.timestamp.to_rfc3339())
                    .with_text(&escape_html(text)),
            );
        }

        self.log.push(message.clone());
        message
    }

    /// Take the trimmed chat input, clearing the field. Blank input is left
    /// untouched and yields `None`.
    pub fn take_input(document: &mut Document) -> Option<String> {
        let input = document.get_mut(ids::CHAT_INPUT)?;
        let text = input.value.trim().to_string();
        if text.is_empty() {
            return None;
        }
        input.value.clear();
        Some(text)
    }
}

/// Copy for the canned bot reply.
pub fn bot_reply_text(
    dictionary: Option<&Dictionary>,
    language: Language,
    backend_ready: bool,
) -> String {
    let key = if backend_ready {
        "chat.reply_ack"
    } else {
        "chat.reply_pending"
    };

    if let Some(text) = dictionary.and_then(|d| d.get_str(key)) {
        return text.to_string();
    }

    let strings = language.strings();
    if backend_ready {
        strings.chat_reply_ack.to_string()
    } else {
        strings.chat_reply_pending.to_string()
    }
}
