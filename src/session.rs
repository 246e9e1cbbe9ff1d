//! Session context: the one object that owns a page and drives every
//! controller against it.
//!
//! Initialization order: preferences are read when the session is built,
//! before anything is rendered; [`Session::start`] then renders the stored
//! theme, the closed nav and chat, and loads the stored language.
//!
//! The page and controller state sit behind one mutex. It is never held
//! across an `.await`, and events are emitted only after it is released.

use crate::binder;
use crate::chat::{self, ChatMessage, ChatTransition, ChatWidget, Sender};
use crate::config::Config;
use crate::contact::{self, ValidationFailed};
use crate::delivery::{ContactChannel, DeliveryOutcome};
use crate::events::{EngineEvent, EventBus, Subscription};
use crate::i18n::{Dictionary, Language, LocaleMetrics};
use crate::locale::LocaleLoader;
use crate::nav::NavDisclosure;
use crate::page::{ids, Document};
use crate::prefs::{FileStorage, PreferenceStorage, PreferenceStore};
use crate::reveal;
use crate::theme::{self, Theme};
use crate::timers::{TaskKey, Timers};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, error, info};

/// A user interaction, addressed by element id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    Click(String),
    PointerDown(String),
    /// Submission of the form with this id
    Submit(String),
    /// The element with this id entered the viewport
    Visible(String),
}

/// What became of a language switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageOutcome {
    /// The dictionary was written to the page
    Applied,
    /// A newer switch was requested before this one completed
    Stale,
    /// The dictionary could not be fetched or parsed; the page kept its text
    Failed,
}

struct State {
    document: Document,
    prefs: PreferenceStore,
    dictionary: Option<Arc<Dictionary>>,
    language: Language,
    theme: Theme,
    nav: NavDisclosure,
    chat: ChatWidget,
}

fn lock(state: &Mutex<State>) -> MutexGuard<'_, State> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Clone)]
pub struct Session {
    config: Arc<Config>,
    state: Arc<Mutex<State>>,
    loader: LocaleLoader,
    channel: ContactChannel,
    timers: Timers,
    events: EventBus,
}

impl Session {
    pub fn new(config: Config, document: Document, storage: Box<dyn PreferenceStorage>) -> Self {
        let mut prefs = PreferenceStore::new(storage);
        let language = prefs.language();
        let theme = prefs.theme();

        Self {
            loader: LocaleLoader::new(&config.site_base_url),
            channel: ContactChannel::from_config(&config),
            config: Arc::new(config),
            state: Arc::new(Mutex::new(State {
                document,
                prefs,
                dictionary: None,
                language,
                theme,
                nav: NavDisclosure::new(),
                chat: ChatWidget::new(),
            })),
            timers: Timers::new(),
            events: EventBus::new(),
        }
    }

    /// Session whose preferences persist to the file at `config.prefs_path`.
    pub fn with_file_prefs(config: Config, document: Document) -> Self {
        let storage = FileStorage::new(&config.prefs_path);
        Self::new(config, document, Box::new(storage))
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        lock(&self.state)
    }

    /// Cold start: render the stored theme and closed widgets with built-in
    /// copy, then load the stored language.
    pub async fn start(&self) -> LanguageOutcome {
        let (language, theme) = {
            let mut guard = self.lock();
            let state = &mut *guard;
            theme::render(&mut state.document, state.theme, None, state.language);
            state.nav.render(&mut state.document);
            state.chat.render(&mut state.document);
            (state.language, state.theme)
        };

        info!("Starting session (lang={}, theme={})", language, theme);
        self.set_language(language).await
    }

    /// Switch to `language`. The choice is persisted and the page's `lang`
    /// and `dir` are updated before the dictionary is requested; the text is
    /// only rewritten if no newer switch has been requested by the time the
    /// dictionary arrives.
    ///
    /// The ticket is issued under the same lock that records the choice, so
    /// the newest ticket always belongs to the language `lang` names.
    pub async fn set_language(&self, language: Language) -> LanguageOutcome {
        let ticket = {
            let mut guard = self.lock();
            let state = &mut *guard;
            state.language = language;
            state.prefs.set_language(language);
            state.document.root.set_attr("lang", language.code());
            state.document.root.set_attr("dir", language.direction().as_str());
            self.loader.issue()
        };

        let (ticket, dictionary) = match self.loader.fetch_with_ticket(ticket, language).await {
            Ok(fetched) => fetched,
            Err(e) => {
                error!("Keeping current translations: {}", e);
                self.events.emit(&EngineEvent::LocaleFailed {
                    language,
                    reason: e.to_string(),
                });
                return LanguageOutcome::Failed;
            }
        };

        {
            let mut guard = self.lock();
            let state = &mut *guard;

            if !self.loader.is_current(ticket) {
                self.loader.metrics().record_stale();
                debug!("Dropping stale '{}' dictionary", language);
                return LanguageOutcome::Stale;
            }

            let dictionary = Arc::new(dictionary);
            let report = binder::apply(&mut state.document, &dictionary, language);
            theme::render(&mut state.document, state.theme, Some(&dictionary), language);
            state.dictionary = Some(dictionary);
            self.loader.metrics().record_applied();
            debug!("Applied '{}' dictionary ({} bindings)", language, report.bound);
        }

        self.events.emit(&EngineEvent::LanguageApplied(language));
        LanguageOutcome::Applied
    }

    /// Flip between the two supported languages.
    pub async fn toggle_language(&self) -> LanguageOutcome {
        let next = self.lock().language.toggled();
        self.set_language(next).await
    }

    /// Flip, persist and render the theme. Returns the new theme.
    pub fn toggle_theme(&self) -> Theme {
        let next = {
            let mut guard = self.lock();
            let state = &mut *guard;
            let next = state.theme.toggled();
            state.theme = next;
            state.prefs.set_theme(next);
            theme::render(
                &mut state.document,
                next,
                state.dictionary.as_deref(),
                state.language,
            );
            next
        };

        self.events.emit(&EngineEvent::ThemeChanged(next));
        next
    }

    /// Set the nav disclosure to `explicit`, or flip it. Returns the new state.
    pub fn toggle_nav(&self, explicit: Option<bool>) -> bool {
        let open = {
            let mut guard = self.lock();
            let state = &mut *guard;
            state.nav.toggle(&mut state.document, explicit)
        };
        self.events.emit(&EngineEvent::NavToggled { open });
        open
    }

    pub fn open_chat(&self) -> Option<ChatTransition> {
        self.chat_transition(|chat, doc| chat.set_open(doc, true))
    }

    pub fn close_chat(&self) -> Option<ChatTransition> {
        self.chat_transition(|chat, doc| chat.set_open(doc, false))
    }

    pub fn toggle_chat(&self) -> Option<ChatTransition> {
        self.chat_transition(|chat, doc| chat.toggle(doc))
    }

    fn chat_transition(
        &self,
        f: impl FnOnce(&mut ChatWidget, &mut Document) -> Option<ChatTransition>,
    ) -> Option<ChatTransition> {
        let transition = {
            let mut guard = self.lock();
            let state = &mut *guard;
            f(&mut state.chat, &mut state.document)
        };
        self.after_chat_transition(transition);
        transition
    }

    fn after_chat_transition(&self, transition: Option<ChatTransition>) {
        let Some(transition) = transition else {
            return;
        };
        match transition {
            ChatTransition::Opened => self.schedule_chat_focus(),
            ChatTransition::Closed => {
                self.timers.cancel(TaskKey::ChatFocus);
            }
        }
        self.events.emit(&EngineEvent::ChatToggled(transition));
    }

    fn schedule_chat_focus(&self) {
        let state = self.state.clone();
        self.timers
            .schedule(TaskKey::ChatFocus, self.config.chat_focus_delay, move || {
                let mut state = lock(&state);
                if state.chat.is_open() {
                    state.document.focused = Some(ids::CHAT_INPUT.to_string());
                }
            });
    }

    /// Send whatever is in the chat input. The visitor's message is appended
    /// right away; the bot reply follows after the configured delay. Blank
    /// input does nothing.
    pub fn send_chat(&self) -> Option<ChatMessage> {
        let message = {
            let mut guard = self.lock();
            let state = &mut *guard;
            let text = ChatWidget::take_input(&mut state.document)?;
            state.chat.append(&mut state.document, Sender::User, &text)
        };
        self.events.emit(&EngineEvent::ChatMessage(message.clone()));

        let state = self.state.clone();
        let events = self.events.clone();
        let backend_ready = self.config.chat_backend_ready;
        self.timers
            .schedule(TaskKey::ChatReply, self.config.chat_reply_delay, move || {
                let reply = {
                    let mut guard = lock(&state);
                    let state = &mut *guard;
                    let text = chat::bot_reply_text(
                        state.dictionary.as_deref(),
                        state.language,
                        backend_ready,
                    );
                    state.chat.append(&mut state.document, Sender::Bot, &text)
                };
                events.emit(&EngineEvent::ChatMessage(reply));
            });

        Some(message)
    }

    /// Validate the contact form and, if every field passes, hand the payload
    /// to the delivery channel, reset the form and confirm in the chat.
    pub fn submit_contact(&self) -> Result<DeliveryOutcome, ValidationFailed> {
        let submitted = {
            let mut guard = self.lock();
            let state = &mut *guard;
            let dictionary = state.dictionary.clone();

            match contact::validate(&mut state.document, dictionary.as_deref(), state.language) {
                Err(e) => Err(e),
                Ok(()) => {
                    let payload = contact::build_payload(&state.document);
                    let outcome = self.channel.submit(&payload);
                    contact::reset(&mut state.document);

                    let text = dictionary
                        .as_deref()
                        .and_then(|d| d.get_str("contact.sent"))
                        .unwrap_or(state.language.strings().contact_sent)
                        .to_string();
                    let message = state.chat.append(&mut state.document, Sender::Bot, &text);
                    let transition = state.chat.set_open(&mut state.document, true);
                    Ok((outcome, message, transition))
                }
            }
        };

        match submitted {
            Err(e) => {
                info!("Contact submission blocked: {}", e);
                self.events.emit(&EngineEvent::ContactRejected {
                    fields: e.fields.clone(),
                });
                Err(e)
            }
            Ok((outcome, message, transition)) => {
                self.events.emit(&EngineEvent::ContactSubmitted(outcome.clone()));
                self.events.emit(&EngineEvent::ChatMessage(message));
                self.after_chat_transition(transition);
                Ok(outcome)
            }
        }
    }

    /// Route a user interaction to the controllers it concerns.
    pub async fn handle(&self, event: UiEvent) {
        match event {
            UiEvent::Click(target) => self.click(&target).await,
            UiEvent::PointerDown(target) => {
                let transition = {
                    let mut guard = self.lock();
                    let state = &mut *guard;
                    state.chat.on_pointer_down(&mut state.document, &target)
                };
                self.after_chat_transition(transition);
            }
            UiEvent::Submit(form) => match form.as_str() {
                ids::CHAT_FORM => {
                    self.send_chat();
                }
                ids::CONTACT_FORM => {
                    let _ = self.submit_contact();
                }
                other => debug!("Ignoring submit of unknown form '{}'", other),
            },
            UiEvent::Visible(target) => {
                self.reveal(&target);
            }
        }
    }

    /// Show a `.reveal` element the first time it scrolls into view.
    /// Returns false if it was already shown or is not a reveal target.
    pub fn reveal(&self, id: &str) -> bool {
        let shown = reveal::reveal(&mut self.lock().document, id);
        if shown {
            self.events.emit(&EngineEvent::Revealed(id.to_string()));
        }
        shown
    }

    async fn click(&self, target: &str) {
        let (nav, chat) = {
            let mut guard = self.lock();
            let state = &mut *guard;
            let nav = state.nav.on_click(&mut state.document, target);
            let chat = state.chat.on_click(&mut state.document, target);

            let href = match target {
                ids::PRIMARY_BUTTON => Some("/products".to_string()),
                ids::SECONDARY_BUTTON => Some("/contact".to_string()),
                _ => state
                    .document
                    .get(target)
                    .filter(|el| el.tag == "a")
                    .and_then(|el| el.attr("href"))
                    .map(str::to_string),
            };
            if let Some(href) = href {
                debug!("Navigating to {}", href);
                state.document.location = Some(href);
            }
            (nav, chat)
        };

        if let Some(open) = nav {
            self.events.emit(&EngineEvent::NavToggled { open });
        }
        self.after_chat_transition(chat);

        match target {
            ids::LANG_TOGGLE => {
                self.toggle_language().await;
            }
            ids::THEME_TOGGLE => {
                self.toggle_theme();
            }
            _ => {}
        }
    }

    /// Type `value` into the control with `id`. Returns false if there is none.
    pub fn set_input(&self, id: &str, value: &str) -> bool {
        match self.lock().document.get_mut(id) {
            Some(el) => {
                el.value = value.to_string();
                true
            }
            None => false,
        }
    }

    /// Read the current page.
    pub fn with_document<R>(&self, f: impl FnOnce(&Document) -> R) -> R {
        f(&self.lock().document)
    }

    pub fn language(&self) -> Language {
        self.lock().language
    }

    pub fn theme(&self) -> Theme {
        self.lock().theme
    }

    pub fn nav_is_open(&self) -> bool {
        self.lock().nav.is_open()
    }

    pub fn chat_is_open(&self) -> bool {
        self.lock().chat.is_open()
    }

    pub fn chat_messages(&self) -> Vec<ChatMessage> {
        self.lock().chat.messages().to_vec()
    }

    pub fn subscribe(
        &self,
        handler: impl Fn(&EngineEvent) + Send + Sync + 'static,
    ) -> Subscription {
        self.events.subscribe(handler)
    }

    pub fn metrics(&self) -> Arc<LocaleMetrics> {
        self.loader.metrics().clone()
    }

    pub fn timers(&self) -> &Timers {
        &self.timers
    }
}
