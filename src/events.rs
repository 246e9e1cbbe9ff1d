//! Engine event subscriptions.
//!
//! The bus keeps weak references to handlers; the strong reference lives in
//! the [`Subscription`] guard handed back to the subscriber. Dropping the
//! guard unsubscribes. Handlers run synchronously, in registration order,
//! after the bus lock has been released, so a handler may subscribe or emit.

use crate::chat::{ChatMessage, ChatTransition};
use crate::delivery::DeliveryOutcome;
use crate::i18n::Language;
use crate::theme::Theme;
use std::sync::{Arc, Mutex, PoisonError, Weak};

/// Something observable happened in a session.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// A dictionary was written to the page
    LanguageApplied(Language),
    /// Fetching or parsing a dictionary failed; the page kept its last state
    LocaleFailed { language: Language, reason: String },
    ThemeChanged(Theme),
    NavToggled { open: bool },
    ChatToggled(ChatTransition),
    ChatMessage(ChatMessage),
    ContactSubmitted(DeliveryOutcome),
    ContactRejected { fields: Vec<String> },
    /// A `.reveal` element was shown for the first time
    Revealed(String),
}

type Handler = dyn Fn(&EngineEvent) + Send + Sync;

#[derive(Clone, Default)]
pub struct EventBus {
    handlers: Arc<Mutex<Vec<Weak<Handler>>>>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

/// Keeps a handler registered until dropped.
#[must_use = "dropping a Subscription unsubscribes its handler"]
pub struct Subscription {
    _handler: Arc<Handler>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, handler: impl Fn(&EngineEvent) + Send + Sync + 'static) -> Subscription {
        let strong: Arc<Handler> = Arc::new(handler);
        self.handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::downgrade(&strong));
        Subscription { _handler: strong }
    }

    pub fn emit(&self, event: &EngineEvent) {
        let live: Vec<Arc<Handler>> = {
            let mut handlers = self.handlers.lock().unwrap_or_else(PoisonError::into_inner);
            handlers.retain(|h| h.strong_count() > 0);
            handlers.iter().filter_map(Weak::upgrade).collect()
        };

        for handler in live {
            handler(event);
        }
    }

    /// Live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|h| h.strong_count() > 0)
            .count()
    }
}
